//! The house: arena and registry scope for framers, frames and the store.
//!
//! Frames and framers live in flat arenas and refer to each other by handle.
//! Back-references (`Frame::over`, `Framer::main`) are plain handles, so there
//! are no ownership cycles. Names are registered per house (framers) and per
//! framer (frames); nothing is global.
//!
//! Building a house is two-phase: frames, links and acts are declared by name,
//! then [`House::resolve`] materializes moot clones, binds every link,
//! computes aux maps, traces outlines, and resolves acts. Topology is fixed
//! from then on.

use std::fmt::Write as _;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, info};

use crate::act::{Act, ResolveContext};
use crate::core::link::Link;
use crate::core::types::{ActionContext, FrameId, FramerId, Schedule};
use crate::error::{FramingError, FramingResult, LinkKind};
use crate::frame::{AuxLink, Frame, Preact, RESERVED_FRAME_NAMES, Suspend, Transit};
use crate::framer::Framer;
use crate::store::Store;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("valid name regex"));

const HOOK_CONTEXTS: [ActionContext; 6] = [
    ActionContext::Beact,
    ActionContext::Enact,
    ActionContext::Renact,
    ActionContext::React,
    ActionContext::Exact,
    ActionContext::Rexact,
];

#[derive(Debug, Default)]
pub struct House {
    name: String,
    pub(crate) framers: Vec<Framer>,
    pub(crate) frames: Vec<Frame>,
    pub(crate) registry: IndexMap<String, FramerId>,
    pub(crate) store: Store,
}

impl House {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn framer(&self, id: FramerId) -> &Framer {
        &self.framers[id.0]
    }

    pub fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.0]
    }

    pub fn framer_id(&self, name: &str) -> Option<FramerId> {
        self.registry.get(name).copied()
    }

    pub fn frame_id(&self, framer: &str, frame: &str) -> Option<FrameId> {
        let framer = self.framer_id(framer)?;
        self.framers[framer.0].lookup(frame)
    }

    /// Registered (unpruned) framers in creation order.
    pub fn framer_ids(&self) -> impl Iterator<Item = FramerId> + '_ {
        self.registry.values().copied()
    }

    /// `frame 'A' of framer 'F'`, with the declaration line when known.
    pub(crate) fn scope(&self, frame: FrameId) -> String {
        let frame = &self.frames[frame.0];
        frame_scope(&frame.name, self.framers[frame.framer.0].name(), frame.count)
    }

    fn framer_scope(&self, framer: FramerId) -> String {
        let framer = &self.framers[framer.0];
        let mut scope = format!("framer '{}'", framer.name());
        if let Some(count) = framer.count {
            let _ = write!(scope, " (line {count})");
        }
        scope
    }

    // --- build ---

    pub fn add_framer(
        &mut self,
        name: &str,
        schedule: Schedule,
        period: f64,
    ) -> FramingResult<FramerId> {
        if !NAME_RE.is_match(name) {
            return Err(FramingError::Register(format!(
                "invalid framer name '{name}'"
            )));
        }
        self.register_framer(Framer::new(name, schedule, period))
    }

    pub(crate) fn register_framer(&mut self, framer: Framer) -> FramingResult<FramerId> {
        if self.registry.contains_key(framer.name()) {
            return Err(FramingError::Register(format!(
                "framer '{}' already exists in house '{}'",
                framer.name(),
                self.name
            )));
        }
        let id = FramerId(self.framers.len());
        self.registry.insert(framer.name().to_string(), id);
        debug!(framer = %framer.name(), schedule = %framer.schedule(), "framer registered");
        self.framers.push(framer);
        Ok(id)
    }

    pub fn add_frame(&mut self, framer: FramerId, name: &str) -> FramingResult<FrameId> {
        self.ensure_mutable(framer)?;
        if !NAME_RE.is_match(name) {
            return Err(FramingError::Register(format!("invalid frame name '{name}'")));
        }
        if RESERVED_FRAME_NAMES.contains(&name) {
            return Err(FramingError::Register(format!(
                "frame name '{name}' is reserved"
            )));
        }
        self.push_frame(framer, Frame::new(name, framer))
    }

    pub(crate) fn push_frame(&mut self, framer: FramerId, frame: Frame) -> FramingResult<FrameId> {
        let owner = &mut self.framers[framer.0];
        if owner.names.contains_key(&frame.name) {
            return Err(FramingError::Register(format!(
                "frame '{}' already exists in framer '{}'",
                frame.name,
                owner.name()
            )));
        }
        let id = FrameId(self.frames.len());
        owner.names.insert(frame.name.clone(), id);
        self.frames.push(frame);
        Ok(id)
    }

    fn ensure_mutable(&self, framer: FramerId) -> FramingResult<()> {
        let framer = &self.framers[framer.0];
        if framer.resolved || framer.pruned {
            return Err(FramingError::Structure(format!(
                "framer '{}' is fixed after resolve",
                framer.name()
            )));
        }
        Ok(())
    }

    /// True if `ancestor` is `frame` or one of its overs.
    pub fn is_ancestor_or_self(&self, ancestor: FrameId, frame: FrameId) -> bool {
        let mut cursor = Some(frame);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.frames[current.0].over;
        }
        false
    }

    /// Make `frame` an under of `over`, detaching it from any previous over.
    ///
    /// Fails without mutating anything if this would create a cycle, if the
    /// frames belong to different framers, or if `frame` is already under
    /// `over`.
    pub fn attach(&mut self, frame: FrameId, over: FrameId) -> FramingResult<()> {
        let framer = self.frames[frame.0].framer;
        self.ensure_mutable(framer)?;
        if self.frames[over.0].framer != framer {
            return Err(FramingError::Structure(format!(
                "cannot attach {} under {}",
                self.scope(frame),
                self.scope(over)
            )));
        }
        if self.is_ancestor_or_self(frame, over) {
            return Err(FramingError::Structure(format!(
                "attaching {} under '{}' would create a cycle",
                self.scope(frame),
                self.frames[over.0].name
            )));
        }
        if self.frames[frame.0].over == Some(over) {
            return Err(FramingError::Structure(format!(
                "{} is already under '{}'",
                self.scope(frame),
                self.frames[over.0].name
            )));
        }

        if let Some(previous) = self.frames[frame.0].over {
            self.frames[previous.0].unders.retain(|under| *under != frame);
        }
        self.frames[over.0].unders.push(frame);
        self.frames[frame.0].over = Some(over);
        Ok(())
    }

    pub fn set_first(&mut self, framer: FramerId, frame: &str) -> FramingResult<()> {
        self.ensure_mutable(framer)?;
        self.framers[framer.0].first = Some(Link::named(frame));
        Ok(())
    }

    pub fn set_next(&mut self, frame: FrameId, next: &str) -> FramingResult<()> {
        self.ensure_mutable(self.frames[frame.0].framer)?;
        self.frames[frame.0].next = Some(Link::named(next));
        Ok(())
    }

    /// Record the authored text and source line of a frame for diagnostics.
    pub fn set_human(&mut self, frame: FrameId, human: &str, count: Option<usize>) {
        let frame = &mut self.frames[frame.0];
        frame.human = human.to_string();
        frame.count = count;
    }

    /// Add `act` to the list for `context`. Preacts added this way win the
    /// cycle when they return `Some(true)`.
    pub fn add_act(
        &mut self,
        frame: FrameId,
        context: ActionContext,
        mut act: Act,
    ) -> FramingResult<()> {
        self.ensure_mutable(self.frames[frame.0].framer)?;
        act.bind(frame, context);
        match self.frames[frame.0].acts_mut(context) {
            Some(acts) => acts.push(act),
            None => self.frames[frame.0].preacts.push(Preact::Act(act)),
        }
        Ok(())
    }

    /// Append a preact. Preacts are evaluated in the order they are added.
    pub fn add_preact(&mut self, frame: FrameId, mut preact: Preact) -> FramingResult<()> {
        self.ensure_mutable(self.frames[frame.0].framer)?;
        match &mut preact {
            Preact::Act(act) => act.bind(frame, ActionContext::Preact),
            Preact::Transit(transit) => {
                for need in &mut transit.needs {
                    need.bind(frame, ActionContext::Preact);
                }
            }
            Preact::Suspend(suspend) => {
                for need in &mut suspend.needs {
                    need.bind(frame, ActionContext::Preact);
                }
                suspend.engaged = false;
            }
        }
        self.frames[frame.0].preacts.push(preact);
        Ok(())
    }

    pub fn add_transit(&mut self, frame: FrameId, transit: Transit) -> FramingResult<()> {
        self.add_preact(frame, Preact::Transit(transit))
    }

    pub fn add_suspend(&mut self, frame: FrameId, suspend: Suspend) -> FramingResult<()> {
        self.add_preact(frame, Preact::Suspend(suspend))
    }

    pub fn add_aux(&mut self, frame: FrameId, aux: AuxLink) -> FramingResult<()> {
        self.ensure_mutable(self.frames[frame.0].framer)?;
        self.frames[frame.0].auxes.push(aux);
        Ok(())
    }

    // --- resolve ---

    /// Bind every late link of every unresolved framer.
    ///
    /// Must be called once after the house is fully declared and before the
    /// first `Start`. Framers already resolved by an earlier call are left as
    /// they are. `Moot` framers are templates and are never resolved.
    pub fn resolve(&mut self) -> FramingResult<()> {
        self.materialize_moots()?;

        let pending: Vec<FramerId> = self
            .framer_ids()
            .filter(|id| {
                let framer = &self.framers[id.0];
                !framer.resolved && framer.schedule() != Schedule::Moot
            })
            .collect();

        for id in &pending {
            self.resolve_framer(*id)?;
        }
        for id in &pending {
            let mut stack = vec![*id];
            let auxes = self.collect_auxes(*id, &mut stack)?;
            self.framers[id.0].auxes = auxes;
        }
        for id in &pending {
            let frames: Vec<FrameId> = self.framers[id.0].frames().collect();
            for frame in &frames {
                self.trace_outline(*frame);
            }
            for frame in frames {
                self.resolve_acts(frame)?;
            }
            self.framers[id.0].resolved = true;
        }

        info!(house = %self.name, framers = pending.len(), "house resolved");
        Ok(())
    }

    fn resolve_framer(&mut self, id: FramerId) -> FramingResult<()> {
        let framer = &self.framers[id.0];
        let first = match &framer.first {
            Some(Link::Unresolved(name)) => {
                Some(framer.lookup(name).ok_or_else(|| FramingError::Resolve {
                    kind: LinkKind::First,
                    name: name.clone(),
                    scope: self.framer_scope(id),
                })?)
            }
            Some(Link::Resolved(frame)) => Some(*frame),
            None => framer.frames().next(),
        };
        let frames: Vec<FrameId> = framer.frames().collect();
        self.framers[id.0].first = first.map(Link::Resolved);

        for frame in frames {
            self.resolve_frame_links(frame)?;
        }
        debug!(framer = %self.framers[id.0].name(), "framer links resolved");
        Ok(())
    }

    fn resolve_frame_links(&mut self, id: FrameId) -> FramingResult<()> {
        let framer = self.frames[id.0].framer;

        if let Some(Link::Unresolved(name)) = &self.frames[id.0].next {
            let target = self.framers[framer.0]
                .lookup(name)
                .ok_or_else(|| FramingError::Resolve {
                    kind: LinkKind::Next,
                    name: name.clone(),
                    scope: self.scope(id),
                })?;
            self.frames[id.0].next = Some(Link::Resolved(target));
        }
        let next = self.frames[id.0].next.as_ref().and_then(Link::resolved);

        for index in 0..self.frames[id.0].preacts.len() {
            let Preact::Transit(transit) = &self.frames[id.0].preacts[index] else {
                continue;
            };
            let Link::Unresolved(name) = &transit.far else {
                continue;
            };
            let target = match name.as_str() {
                "me" => Some(id),
                "next" => next,
                other => self.framers[framer.0].lookup(other),
            };
            let target = target.ok_or_else(|| FramingError::Resolve {
                kind: LinkKind::Transit,
                name: name.clone(),
                scope: self.scope(id),
            })?;
            if let Preact::Transit(transit) = &mut self.frames[id.0].preacts[index] {
                transit.far = Link::Resolved(target);
            }
        }

        let links: Vec<AuxLink> = self.frames[id.0].aux_links().cloned().collect();
        let mut bound = Vec::with_capacity(links.len());
        for link in links {
            bound.push(self.resolve_aux_link(id, &link)?);
        }
        for (link, aux) in self.frames[id.0].aux_links_mut().zip(bound) {
            *link = AuxLink::Resolved(aux);
        }
        Ok(())
    }

    fn resolve_aux_link(&self, frame: FrameId, link: &AuxLink) -> FramingResult<FramerId> {
        let name = match link {
            AuxLink::Resolved(aux) => return Ok(*aux),
            AuxLink::Named(name) | AuxLink::Materialized { name, .. } => name,
            AuxLink::Moot { original, .. } => {
                return Err(FramingError::Resolve {
                    kind: LinkKind::Clone,
                    name: original.clone(),
                    scope: self.scope(frame),
                });
            }
        };
        let aux = self.framer_id(name).ok_or_else(|| FramingError::Resolve {
            kind: LinkKind::Aux,
            name: name.clone(),
            scope: self.scope(frame),
        })?;
        let schedule = self.framers[aux.0].schedule();
        if schedule != Schedule::Aux {
            return Err(FramingError::Schedule {
                name: name.clone(),
                expected: Schedule::Aux,
                found: schedule,
                scope: self.scope(frame),
            });
        }
        Ok(aux)
    }

    /// Auxes reachable beneath `id`, keyed by tag or name. `stack` holds the
    /// chain of framers being expanded and detects recursion.
    fn collect_auxes(
        &self,
        id: FramerId,
        stack: &mut Vec<FramerId>,
    ) -> FramingResult<IndexMap<String, FramerId>> {
        let mut auxes = IndexMap::new();
        for frame in self.framers[id.0].frames() {
            for aux in self.frames[frame.0].linked_auxes() {
                if stack.contains(&aux) {
                    let mut path: Vec<&str> =
                        stack.iter().map(|each| self.framers[each.0].name()).collect();
                    path.push(self.framers[aux.0].name());
                    return Err(FramingError::RecursiveAux {
                        name: self.framers[aux.0].name().to_string(),
                        path: path.join(" -> "),
                    });
                }
                auxes.insert(self.framers[aux.0].aux_key(), aux);
                stack.push(aux);
                let nested = self.collect_auxes(aux, stack)?;
                stack.pop();
                for (key, nested_aux) in nested {
                    auxes.entry(key).or_insert(nested_aux);
                }
            }
        }
        Ok(auxes)
    }

    /// Derive `head` and `outline` of `id` from the linked hierarchy.
    pub(crate) fn trace_outline(&mut self, id: FrameId) {
        let mut head = vec![id];
        let mut cursor = self.frames[id.0].over;
        while let Some(over) = cursor {
            head.push(over);
            cursor = self.frames[over.0].over;
        }
        head.reverse();

        let mut outline = head.clone();
        let mut cursor = self.frames[id.0].primary();
        while let Some(under) = cursor {
            outline.push(under);
            cursor = self.frames[under.0].primary();
        }

        let frame = &mut self.frames[id.0];
        frame.head = head;
        frame.outline = outline;
    }

    fn resolve_acts(&mut self, id: FrameId) -> FramingResult<()> {
        let scope = self.scope(id);

        for context in HOOK_CONTEXTS {
            let mut acts = self.frames[id.0]
                .acts_mut(context)
                .map(std::mem::take)
                .unwrap_or_default();
            let outcome = {
                let ctx = ResolveContext::new(self, id);
                acts.iter_mut()
                    .try_for_each(|act| resolve_act(act, &ctx, context, &scope))
            };
            if let Some(slot) = self.frames[id.0].acts_mut(context) {
                *slot = acts;
            }
            outcome?;
        }

        let mut preacts = std::mem::take(&mut self.frames[id.0].preacts);
        let outcome = {
            let ctx = ResolveContext::new(self, id);
            preacts.iter_mut().try_for_each(|preact| {
                let context = ActionContext::Preact;
                match preact {
                    Preact::Act(act) => resolve_act(act, &ctx, context, &scope),
                    Preact::Transit(transit) => transit
                        .needs
                        .iter_mut()
                        .try_for_each(|need| resolve_act(need, &ctx, context, &scope)),
                    Preact::Suspend(suspend) => suspend
                        .needs
                        .iter_mut()
                        .try_for_each(|need| resolve_act(need, &ctx, context, &scope)),
                }
            })
        };
        self.frames[id.0].preacts = preacts;
        outcome
    }

    // --- teardown ---

    /// Irreversibly destroy a stopped framer, and with it every insular clone
    /// owned by one of its frames.
    pub fn prune(&mut self, id: FramerId) -> FramingResult<()> {
        let framer = &self.framers[id.0];
        if framer.pruned {
            return Ok(());
        }
        if framer.active.is_some() {
            return Err(FramingError::Structure(format!(
                "cannot prune framer '{}' while its outline is entered",
                framer.name()
            )));
        }

        let frames: Vec<FrameId> = framer.frames().collect();
        let insulars: Vec<FramerId> = self
            .framers
            .iter()
            .enumerate()
            .filter(|(_, each)| {
                each.insular && !each.pruned && each.main.is_some_and(|main| frames.contains(&main))
            })
            .map(|(index, _)| FramerId(index))
            .collect();
        for insular in insulars {
            self.prune(insular)?;
        }

        for frame in &frames {
            let frame = &mut self.frames[frame.0];
            frame.beacts.clear();
            frame.preacts.clear();
            frame.enacts.clear();
            frame.renacts.clear();
            frame.reacts.clear();
            frame.exacts.clear();
            frame.rexacts.clear();
            frame.auxes.clear();
        }

        let framer = &mut self.framers[id.0];
        framer.pruned = true;
        framer.main = None;
        framer.auxes.clear();
        let name = framer.name().to_string();
        self.registry.shift_remove(&name);
        info!(framer = %name, "framer pruned");
        Ok(())
    }

    // --- introspection ---

    /// Names of the frames in a framer's current active outline.
    pub fn active_outline_names(&self, id: FramerId) -> Vec<String> {
        self.framers[id.0]
            .actives
            .iter()
            .map(|frame| self.frames[frame.0].name.clone())
            .collect()
    }

    /// Indented rendering of a framer's frame hierarchy. Frames on the active
    /// outline are marked with `*`.
    pub fn hierarchy(&self, id: FramerId) -> String {
        let framer = &self.framers[id.0];
        let mut out = format!("{}\n", framer.name());
        for frame in framer.frames() {
            if self.frames[frame.0].over.is_none() {
                self.render_frame(&mut out, framer.actives(), frame, 1);
            }
        }
        out
    }

    fn render_frame(&self, out: &mut String, actives: &[FrameId], id: FrameId, depth: usize) {
        let frame = &self.frames[id.0];
        let marker = if actives.contains(&id) { " *" } else { "" };
        let _ = writeln!(out, "{}{}{}", "  ".repeat(depth), frame.name, marker);
        for under in &frame.unders {
            self.render_frame(out, actives, *under, depth + 1);
        }
    }
}

pub(crate) fn frame_scope(frame: &str, framer: &str, count: Option<usize>) -> String {
    let mut scope = format!("frame '{frame}' of framer '{framer}'");
    if let Some(count) = count {
        let _ = write!(scope, " (line {count})");
    }
    scope
}

fn resolve_act(
    act: &mut Act,
    ctx: &ResolveContext<'_>,
    context: ActionContext,
    scope: &str,
) -> FramingResult<()> {
    act.resolve(ctx)
        .map_err(|source| FramingError::act(act.actor_name(), context, scope.to_string(), source))
}
