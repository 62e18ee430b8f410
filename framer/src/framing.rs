//! Framer runtime: entry, exit, recurrence and transitions over the arena.
//!
//! Everything here runs to completion within one `step`. Enters run top-down
//! and exits bottom-up. Auxes are exited before the exit acts of the frame
//! that owns them. Within a cycle every aux segue finishes before any
//! preact of the frames above it is evaluated.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::act::{Act, ActContext};
use crate::core::link::Link;
use crate::core::outline::exen;
use crate::core::types::{ActionContext, Control, FrameId, FramerId, Schedule, Status};
use crate::error::{FramingError, FramingResult};
use crate::frame::{Frame, Preact};
use crate::house::{House, frame_scope};
use crate::store::{STATE_FIELDS, state_path};
use crate::tasking::{self, Lifecycle, TaskerState};

/// Which acts of a frame to run.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Hook(ActionContext),
    /// The act of a plain preact, or the needs of a transit or suspend.
    Preact(usize),
}

#[derive(Debug, Clone, Copy)]
enum PreactKind {
    Act,
    Transit(Option<FrameId>),
    Suspend(Option<FramerId>, bool),
}

impl House {
    /// Pump one control token into a framer.
    pub fn step(&mut self, id: FramerId, control: Control) -> FramingResult<Status> {
        let mut run = FramerRun { house: self, id };
        tasking::step(&mut run, control)
    }

    pub fn step_named(&mut self, name: &str, control: Control) -> FramingResult<Status> {
        let id = self
            .framer_id(name)
            .ok_or_else(|| FramingError::unknown("framer", name))?;
        self.step(id, control)
    }

    fn is_runnable(&self, id: FramerId) -> bool {
        let framer = &self.framers[id.0];
        framer.resolved && !framer.pruned && framer.schedule() != Schedule::Moot
    }

    fn first_frame(&self, id: FramerId) -> Option<FrameId> {
        self.framers[id.0].first.as_ref().and_then(Link::resolved)
    }

    // --- act dispatch ---

    /// Run the acts in `slot` of `frame`. With `guard`, stop at the first act
    /// that does not return `Some(true)` and report `false`.
    fn run_slot(&mut self, frame: FrameId, slot: Slot, guard: bool) -> FramingResult<bool> {
        let House {
            frames,
            framers,
            store,
            ..
        } = self;
        let Frame {
            name,
            framer,
            count,
            beacts,
            preacts,
            enacts,
            renacts,
            reacts,
            exacts,
            rexacts,
            ..
        } = &mut frames[frame.0];
        let owner = &mut framers[framer.0];

        let (context, acts): (ActionContext, &mut [Act]) = match slot {
            Slot::Hook(ActionContext::Beact) => (ActionContext::Beact, beacts.as_mut_slice()),
            Slot::Hook(ActionContext::Enact) => (ActionContext::Enact, enacts.as_mut_slice()),
            Slot::Hook(ActionContext::Renact) => (ActionContext::Renact, renacts.as_mut_slice()),
            Slot::Hook(ActionContext::React) => (ActionContext::React, reacts.as_mut_slice()),
            Slot::Hook(ActionContext::Exact) => (ActionContext::Exact, exacts.as_mut_slice()),
            Slot::Hook(ActionContext::Rexact) => (ActionContext::Rexact, rexacts.as_mut_slice()),
            Slot::Hook(ActionContext::Preact) => return Ok(true),
            Slot::Preact(index) => match preacts.get_mut(index) {
                Some(Preact::Act(act)) => (ActionContext::Preact, std::slice::from_mut(act)),
                Some(Preact::Transit(transit)) => (ActionContext::Preact, transit.needs.as_mut_slice()),
                Some(Preact::Suspend(suspend)) => (ActionContext::Preact, suspend.needs.as_mut_slice()),
                None => return Ok(false),
            },
        };

        for act in acts {
            let result = {
                let mut ctx = ActContext::new(
                    &mut *store,
                    &owner.tasker.name,
                    name.as_str(),
                    context,
                    &mut owner.tasker.done,
                );
                act.call(&mut ctx)
            };
            let result = result.map_err(|err| {
                FramingError::act(
                    act.actor_name(),
                    context,
                    frame_scope(name.as_str(), &owner.tasker.name, *count),
                    err,
                )
            })?;
            if guard && result != Some(true) {
                debug!(
                    framer = %owner.tasker.name,
                    frame = %name,
                    context = %context,
                    actor = %act.actor_name(),
                    "condition not met"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn run_hooks(&mut self, frame: FrameId, context: ActionContext) -> FramingResult<()> {
        self.run_slot(frame, Slot::Hook(context), false)?;
        Ok(())
    }

    // --- guards ---

    /// True if the framer can begin at its first frame.
    pub(crate) fn check_start(&mut self, id: FramerId) -> FramingResult<bool> {
        let Some(first) = self.first_frame(id) else {
            debug!(framer = %self.framers[id.0].name(), "no first frame");
            return Ok(false);
        };
        let outline = self.frames[first.0].outline.clone();
        if outline.is_empty() {
            return Ok(false);
        }
        self.check_enter(&outline, &[])
    }

    /// Entry guard for a set of frames about to be entered while `exits`
    /// are being exited.
    ///
    /// An aux claimed by an earlier frame of `enters` counts as owned, so two
    /// frames of one outline cannot share it.
    fn check_enter(&mut self, enters: &[FrameId], exits: &[FrameId]) -> FramingResult<bool> {
        let mut claimed: Vec<(FramerId, FrameId)> = Vec::new();
        for &frame in enters {
            if !self.run_slot(frame, Slot::Hook(ActionContext::Beact), true)? {
                return Ok(false);
            }
            for aux in self.frames[frame.0].resolved_auxes() {
                let taken = claimed
                    .iter()
                    .any(|&(owned, owner)| owned == aux && owner != frame);
                if taken || !self.can_own(aux, frame, exits) {
                    debug!(
                        aux = %self.framers[aux.0].name(),
                        frame = %self.frames[frame.0].name,
                        "aux is owned elsewhere"
                    );
                    return Ok(false);
                }
                if !self.check_start(aux)? {
                    return Ok(false);
                }
                claimed.push((aux, frame));
            }
        }
        Ok(true)
    }

    fn can_own(&self, aux: FramerId, frame: FrameId, exits: &[FrameId]) -> bool {
        match self.framers[aux.0].main {
            None => true,
            Some(main) => main == frame || exits.contains(&main),
        }
    }

    // --- activation and timers ---

    /// Make `frame` the active frame, derive the active outline and restart
    /// the timers.
    fn activate(&mut self, id: FramerId, frame: FrameId) -> FramingResult<()> {
        let stamp = self.store.stamp();
        let outline = self.frames[frame.0].outline.clone();
        let framer = &mut self.framers[id.0];
        framer.active = Some(frame);
        framer.actives = outline;
        framer.stamp = Some(stamp);
        framer.elapsed = 0.0;
        framer.recurred = 0;
        self.apply_suspensions(id);
        self.mirror(id)
    }

    /// Restore the active outline after a suspension is released.
    fn reactivate(&mut self, id: FramerId) {
        if let Some(active) = self.framers[id.0].active {
            self.framers[id.0].actives = self.frames[active.0].outline.clone();
            self.apply_suspensions(id);
        }
    }

    /// Truncate the active outline at the topmost frame with an engaged
    /// suspension.
    fn apply_suspensions(&mut self, id: FramerId) {
        let framer = &self.framers[id.0];
        let cut = framer
            .actives
            .iter()
            .position(|frame| !self.frames[frame.0].engaged_auxes().is_empty());
        if let Some(cut) = cut {
            self.framers[id.0].actives.truncate(cut + 1);
        }
    }

    fn mirror(&mut self, id: FramerId) -> FramingResult<()> {
        let framer = &self.framers[id.0];
        let name = framer.name();
        let (active, human) = match framer.active {
            Some(frame) => (
                self.frames[frame.0].name.clone(),
                self.frames[frame.0].human.clone(),
            ),
            None => (String::new(), String::new()),
        };
        let values: [Value; 4] = [
            Value::from(framer.elapsed),
            Value::from(framer.recurred),
            Value::from(active),
            Value::from(human),
        ];
        for (field, value) in STATE_FIELDS.into_iter().zip(values) {
            self.store.set(&state_path(name, field), value)?;
        }
        Ok(())
    }

    // --- framer level ---

    pub(crate) fn enter_all(&mut self, id: FramerId) -> FramingResult<()> {
        let first = self.first_frame(id).ok_or_else(|| {
            FramingError::Structure(format!(
                "framer '{}' has no first frame",
                self.framers[id.0].name()
            ))
        })?;
        self.framers[id.0].tasker.done = false;
        self.activate(id, first)?;
        let actives = self.framers[id.0].actives.clone();
        for frame in actives {
            self.enter(frame)?;
        }
        debug!(
            framer = %self.framers[id.0].name(),
            frame = %self.frames[first.0].name,
            "outline entered"
        );
        Ok(())
    }

    /// Exit the whole active outline bottom-up. With `abort`, failures are
    /// logged and teardown continues.
    pub(crate) fn exit_all(&mut self, id: FramerId, abort: bool) -> FramingResult<()> {
        if let Some(active) = self.framers[id.0].active {
            let mut outline = self.frames[active.0].outline.clone();
            self.framers[id.0].actives.clone_from(&outline);
            outline.reverse();
            for frame in outline {
                tolerate(abort, self.exit(frame, abort))?;
            }
        }
        let framer = &mut self.framers[id.0];
        framer.active = None;
        framer.actives.clear();
        framer.tasker.done = !abort;
        debug!(framer = %framer.name(), abort, "outline exited");
        Ok(())
    }

    /// One cycle of transition logic.
    fn segue(&mut self, id: FramerId) -> FramingResult<()> {
        if self.framers[id.0].active.is_none() {
            return Ok(());
        }
        let now = self.store.stamp();
        let framer = &mut self.framers[id.0];
        framer.elapsed = framer.stamp.map_or(0.0, |stamp| (now - stamp).max(0.0));
        self.mirror(id)?;

        let actives = self.framers[id.0].actives.clone();
        for &frame in &actives {
            self.segue_auxes(frame)?;
        }
        for frame in actives {
            if self.precur(id, frame)? {
                break;
            }
        }
        Ok(())
    }

    fn recur(&mut self, id: FramerId) -> FramingResult<()> {
        if self.framers[id.0].active.is_none() {
            return Ok(());
        }
        let actives = self.framers[id.0].actives.clone();
        for frame in actives {
            self.recur_frame(frame)?;
        }
        self.framers[id.0].recurred += 1;
        self.mirror(id)
    }

    // --- frame level ---

    fn enter(&mut self, frame: FrameId) -> FramingResult<()> {
        self.run_hooks(frame, ActionContext::Enact)?;
        self.enter_auxes(frame)
    }

    fn renter(&mut self, frame: FrameId) -> FramingResult<()> {
        self.run_hooks(frame, ActionContext::Renact)?;
        self.enter_auxes(frame)
    }

    fn enter_auxes(&mut self, frame: FrameId) -> FramingResult<()> {
        for aux in self.frames[frame.0].resolved_auxes() {
            self.claim(aux, frame);
            self.enter_all(aux)?;
        }
        Ok(())
    }

    fn exit(&mut self, frame: FrameId, abort: bool) -> FramingResult<()> {
        self.exit_auxes(frame, abort)?;
        tolerate(abort, self.run_hooks(frame, ActionContext::Exact))
    }

    fn rexit(&mut self, frame: FrameId) -> FramingResult<()> {
        self.exit_auxes(frame, false)?;
        self.run_hooks(frame, ActionContext::Rexact)
    }

    fn exit_auxes(&mut self, frame: FrameId, abort: bool) -> FramingResult<()> {
        self.release_suspensions(frame, abort)?;
        for aux in self.frames[frame.0].resolved_auxes() {
            tolerate(abort, self.exit_all(aux, abort))?;
            self.unclaim(aux);
        }
        Ok(())
    }

    fn recur_frame(&mut self, frame: FrameId) -> FramingResult<()> {
        self.run_hooks(frame, ActionContext::React)?;
        for aux in self.running_auxes(frame) {
            self.recur(aux)?;
        }
        Ok(())
    }

    fn segue_auxes(&mut self, frame: FrameId) -> FramingResult<()> {
        for aux in self.running_auxes(frame) {
            self.segue(aux)?;
        }
        Ok(())
    }

    fn running_auxes(&self, frame: FrameId) -> Vec<FramerId> {
        let frame = &self.frames[frame.0];
        let mut auxes = frame.resolved_auxes();
        auxes.extend(frame.engaged_auxes());
        auxes
    }

    /// Non-insular auxes, originals and named clones alike, take dynamic
    /// ownership from the frame that entered them.
    fn claim(&mut self, aux: FramerId, frame: FrameId) {
        let aux = &mut self.framers[aux.0];
        if !aux.insular {
            aux.main = Some(frame);
        }
    }

    fn unclaim(&mut self, aux: FramerId) {
        let aux = &mut self.framers[aux.0];
        if !aux.insular {
            aux.main = None;
        }
    }

    // --- preacts ---

    /// Evaluate the preacts of `frame` in order. True once one fires.
    fn precur(&mut self, id: FramerId, frame: FrameId) -> FramingResult<bool> {
        for index in 0..self.frames[frame.0].preacts.len() {
            let kind = match &self.frames[frame.0].preacts[index] {
                Preact::Act(_) => PreactKind::Act,
                Preact::Transit(transit) => PreactKind::Transit(transit.far.resolved()),
                Preact::Suspend(suspend) => {
                    PreactKind::Suspend(suspend.aux.resolved(), suspend.engaged)
                }
            };
            let fired = match kind {
                PreactKind::Act => self.run_slot(frame, Slot::Preact(index), true)?,
                PreactKind::Transit(Some(far)) => {
                    self.run_slot(frame, Slot::Preact(index), true)? && self.transit(id, far)?
                }
                PreactKind::Suspend(Some(aux), engaged) => {
                    self.suspend(id, frame, index, aux, engaged)?
                }
                PreactKind::Transit(None) | PreactKind::Suspend(None, _) => {
                    return Err(FramingError::Structure(format!(
                        "unresolved preact in {}",
                        self.scope(frame)
                    )));
                }
            };
            if fired {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Carry out a transition to `far`. False if the entry guard refuses.
    fn transit(&mut self, id: FramerId, far: FrameId) -> FramingResult<bool> {
        let active = self.framers[id.0].active.ok_or_else(|| {
            FramingError::Structure(format!(
                "framer '{}' has no active frame",
                self.framers[id.0].name()
            ))
        })?;
        let nears = self.frames[active.0].outline.clone();
        let far_outline = self.frames[far.0].outline.clone();
        let plan = exen(&nears, far, &far_outline);

        if !plan.exits.is_empty() || !plan.enters.is_empty() {
            if !self.check_enter(&plan.enters, &plan.exits)? {
                debug!(
                    framer = %self.framers[id.0].name(),
                    to = %self.frames[far.0].name,
                    "would like to transition but cannot"
                );
                return Ok(false);
            }
            info!(
                framer = %self.framers[id.0].name(),
                from = %self.frames[active.0].name,
                to = %self.frames[far.0].name,
                "transition"
            );
            for &frame in plan.exits.iter().rev() {
                self.exit(frame, false)?;
            }
            self.activate(id, far)?;
            for &frame in &plan.enters {
                self.enter(frame)?;
            }
        } else {
            debug!(
                framer = %self.framers[id.0].name(),
                to = %self.frames[far.0].name,
                "forced re-entry"
            );
            for &frame in plan.reexens.iter().rev() {
                self.rexit(frame)?;
            }
            self.activate(id, active)?;
            for &frame in &plan.reexens {
                self.renter(frame)?;
            }
        }
        Ok(true)
    }

    /// Conditional aux preact at `index` of `frame`.
    fn suspend(
        &mut self,
        id: FramerId,
        frame: FrameId,
        index: usize,
        aux: FramerId,
        engaged: bool,
    ) -> FramingResult<bool> {
        if engaged {
            if self.framers[aux.0].done() {
                self.release(frame, index, aux, false)?;
                self.reactivate(id);
            }
            return Ok(false);
        }

        if !self.run_slot(frame, Slot::Preact(index), true)? {
            return Ok(false);
        }
        if !self.can_own(aux, frame, &[]) || !self.check_start(aux)? {
            debug!(
                framer = %self.framers[id.0].name(),
                aux = %self.framers[aux.0].name(),
                "would like to suspend but cannot"
            );
            return Ok(false);
        }

        self.claim(aux, frame);
        self.enter_all(aux)?;
        if let Some(Preact::Suspend(suspend)) = self.frames[frame.0].preacts.get_mut(index) {
            suspend.engaged = true;
        }
        self.framers[id.0].actives = self.frames[frame.0].head.clone();
        info!(
            framer = %self.framers[id.0].name(),
            frame = %self.frames[frame.0].name,
            aux = %self.framers[aux.0].name(),
            "conditional aux engaged"
        );
        Ok(true)
    }

    /// Exit the aux of an engaged suspension and disengage it.
    fn release(&mut self, frame: FrameId, index: usize, aux: FramerId, abort: bool) -> FramingResult<()> {
        if let Some(Preact::Suspend(suspend)) = self.frames[frame.0].preacts.get_mut(index) {
            suspend.engaged = false;
        }
        let exited = self.exit_all(aux, abort);
        self.unclaim(aux);
        info!(
            frame = %self.frames[frame.0].name,
            aux = %self.framers[aux.0].name(),
            "conditional aux released"
        );
        exited
    }

    fn release_suspensions(&mut self, frame: FrameId, abort: bool) -> FramingResult<()> {
        let engaged: Vec<(usize, FramerId)> = self.frames[frame.0]
            .preacts
            .iter()
            .enumerate()
            .filter_map(|(index, preact)| match preact {
                Preact::Suspend(suspend) if suspend.is_engaged() => {
                    suspend.aux.resolved().map(|aux| (index, aux))
                }
                _ => None,
            })
            .collect();
        for (index, aux) in engaged {
            tolerate(abort, self.release(frame, index, aux, abort))?;
        }
        Ok(())
    }
}

/// In abort mode, log a teardown failure and carry on.
fn tolerate(abort: bool, result: FramingResult<()>) -> FramingResult<()> {
    match result {
        Err(err) if abort => {
            warn!(err = %err, "teardown step failed during abort");
            Ok(())
        }
        other => other,
    }
}

/// A framer viewed as a tasker.
struct FramerRun<'a> {
    house: &'a mut House,
    id: FramerId,
}

impl Lifecycle for FramerRun<'_> {
    fn state(&self) -> &TaskerState {
        &self.house.framers[self.id.0].tasker
    }

    fn state_mut(&mut self) -> &mut TaskerState {
        &mut self.house.framers[self.id.0].tasker
    }

    fn ready(&mut self) -> FramingResult<bool> {
        Ok(self.house.is_runnable(self.id))
    }

    fn start(&mut self) -> FramingResult<bool> {
        if !self.house.is_runnable(self.id) {
            return Err(FramingError::Structure(format!(
                "framer '{}' is not resolved and cannot run",
                self.house.framers[self.id.0].name()
            )));
        }
        if !self.house.check_start(self.id)? {
            return Ok(false);
        }
        self.house.enter_all(self.id)?;
        Ok(true)
    }

    fn run(&mut self) -> FramingResult<()> {
        self.house.segue(self.id)?;
        self.house.recur(self.id)
    }

    fn stop(&mut self) -> FramingResult<()> {
        self.house.exit_all(self.id, false)
    }

    fn abort(&mut self) -> FramingResult<()> {
        self.house.exit_all(self.id, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{Always, Complete, ShareEquals};
    use crate::frame::{AuxLink, Suspend, Transit};
    use crate::test_support::Journal;

    fn started(house: &mut House, framer: FramerId) {
        house.resolve().expect("resolve");
        assert_eq!(house.step(framer, Control::Start).expect("start"), Status::Started);
    }

    #[test]
    fn start_enters_first_outline_top_down() {
        let journal = Journal::default();
        let mut house = House::new("test");
        let f = house.add_framer("F", Schedule::Active, 0.0).expect("F");
        let root = house.add_frame(f, "R").expect("R");
        let a = house.add_frame(f, "A").expect("A");
        house.attach(a, root).expect("attach");
        journal.hook_all(&mut house, &[root, a]);

        started(&mut house, f);

        assert_eq!(journal.take(), vec!["beact:R", "beact:A", "enact:R", "enact:A"]);
        assert_eq!(house.framer(f).active(), Some(root));
        assert_eq!(house.active_outline_names(f), vec!["R", "A"]);
        assert_eq!(
            house.store().get("framer.F.state.active"),
            Some(&serde_json::json!("R"))
        );
    }

    #[test]
    fn start_mirrors_every_state_field() {
        let mut house = House::new("test");
        let f = house.add_framer("F", Schedule::Active, 0.0).expect("F");
        let a = house.add_frame(f, "A").expect("A");
        house.set_human(a, "frame A", None);

        started(&mut house, f);

        for field in STATE_FIELDS {
            assert!(
                house.store().get(&state_path("F", field)).is_some(),
                "missing mirror of {field}"
            );
        }
        assert_eq!(
            house.store().get(&state_path("F", "human")),
            Some(&Value::from("frame A"))
        );
    }

    #[test]
    fn failed_entry_guard_refuses_start() {
        let mut house = House::new("test");
        let f = house.add_framer("F", Schedule::Active, 0.0).expect("F");
        let a = house.add_frame(f, "A").expect("A");
        house
            .add_act(
                a,
                ActionContext::Beact,
                crate::act::Act::new(ShareEquals)
                    .with_parm("path", "door.open")
                    .with_parm("value", true),
            )
            .expect("beact");
        house.resolve().expect("resolve");

        assert_eq!(house.step(f, Control::Start).expect("start"), Status::Stopped);
        assert!(house.framer(f).active().is_none());

        house.store_mut().set("door.open", true).expect("set");
        assert_eq!(house.step(f, Control::Start).expect("start"), Status::Started);
    }

    #[test]
    fn start_before_resolve_is_an_error_and_aborts() {
        let mut house = House::new("test");
        let f = house.add_framer("F", Schedule::Active, 0.0).expect("F");
        house.add_frame(f, "A").expect("A");
        assert!(house.step(f, Control::Start).is_err());
        assert_eq!(house.framer(f).status(), Status::Aborted);
    }

    #[test]
    fn step_named_rejects_unknown_framer() {
        let mut house = House::new("test");
        assert!(matches!(
            house.step_named("ghost", Control::Start),
            Err(FramingError::Unknown { .. })
        ));
    }

    #[test]
    fn engaged_suspension_truncates_outline_until_aux_done() {
        let mut house = House::new("test");
        let f = house.add_framer("F", Schedule::Active, 0.0).expect("F");
        let a = house.add_frame(f, "A").expect("A");
        let a1 = house.add_frame(f, "A1").expect("A1");
        house.attach(a1, a).expect("attach");
        let x = house.add_framer("X", Schedule::Aux, 0.0).expect("X");
        let xa = house.add_frame(x, "Work").expect("X.Work");
        house
            .add_preact(xa, Preact::Act(crate::act::Act::new(Complete)))
            .expect("complete");
        house
            .add_suspend(
                a,
                Suspend::new(AuxLink::framer("X")).need(crate::act::Act::new(Always)),
            )
            .expect("suspend");

        started(&mut house, f);
        house.step(f, Control::Run).expect("run 1");
        assert_eq!(house.active_outline_names(f), vec!["A"]);
        assert_eq!(house.framer(x).main(), Some(a));
        assert!(house.framer(x).active().is_some());

        // The aux reports done during its own segue on the next cycle.
        house.step(f, Control::Run).expect("run 2");
        house.step(f, Control::Run).expect("run 3");
        assert!(house.framer(x).active().is_none());
        assert_eq!(house.framer(x).main(), None);
    }

    #[test]
    fn transition_refused_by_guard_keeps_outline() {
        let mut house = House::new("test");
        let f = house.add_framer("F", Schedule::Active, 0.0).expect("F");
        let a = house.add_frame(f, "A").expect("A");
        let b = house.add_frame(f, "B").expect("B");
        house.add_transit(a, Transit::to("B")).expect("transit");
        house
            .add_act(
                b,
                ActionContext::Beact,
                crate::act::Act::new(ShareEquals)
                    .with_parm("path", "gate")
                    .with_parm("value", "open"),
            )
            .expect("guard");
        started(&mut house, f);

        house.step(f, Control::Run).expect("run");
        assert_eq!(house.framer(f).active(), Some(a));

        house.store_mut().set("gate", "open").expect("set");
        house.step(f, Control::Run).expect("run");
        assert_eq!(house.framer(f).active(), Some(b));
    }
}
