//! Framers: taskers that run a hierarchical state machine of frames.

use indexmap::IndexMap;

use crate::core::link::Link;
use crate::core::types::{Desire, FrameId, FramerId, Schedule, Status};
use crate::tasking::TaskerState;

#[derive(Debug)]
pub struct Framer {
    pub(crate) tasker: TaskerState,
    pub(crate) first: Option<Link<FrameId>>,
    pub(crate) active: Option<FrameId>,
    pub(crate) actives: Vec<FrameId>,
    /// Frame registry in creation order.
    pub(crate) names: IndexMap<String, FrameId>,
    /// Store stamp at the last (re)activation.
    pub(crate) stamp: Option<f64>,
    pub(crate) elapsed: f64,
    pub(crate) recurred: u64,
    /// Frame that owns this framer while it runs as an aux.
    pub(crate) main: Option<FrameId>,
    pub(crate) original: bool,
    pub(crate) insular: bool,
    pub(crate) tag: Option<String>,
    /// Originals this framer was cloned from, outermost first.
    pub(crate) lineage: Vec<String>,
    /// Auxes reachable beneath this framer's frames, keyed by tag or name.
    pub(crate) auxes: IndexMap<String, FramerId>,
    pub(crate) resolved: bool,
    pub(crate) pruned: bool,
    pub human: String,
    pub count: Option<usize>,
}

impl Framer {
    pub(crate) fn new(name: impl Into<String>, schedule: Schedule, period: f64) -> Self {
        Self {
            tasker: TaskerState::new(name, schedule, period),
            first: None,
            active: None,
            actives: Vec::new(),
            names: IndexMap::new(),
            stamp: None,
            elapsed: 0.0,
            recurred: 0,
            main: None,
            original: true,
            insular: false,
            tag: None,
            lineage: Vec::new(),
            auxes: IndexMap::new(),
            resolved: false,
            pruned: false,
            human: String::new(),
            count: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.tasker.name
    }

    pub fn tasker(&self) -> &TaskerState {
        &self.tasker
    }

    pub fn status(&self) -> Status {
        self.tasker.status
    }

    pub fn desire(&self) -> Desire {
        self.tasker.desire
    }

    pub fn schedule(&self) -> Schedule {
        self.tasker.schedule
    }

    pub fn period(&self) -> f64 {
        self.tasker.period
    }

    pub fn done(&self) -> bool {
        self.tasker.done
    }

    pub fn first(&self) -> Option<&Link<FrameId>> {
        self.first.as_ref()
    }

    /// Leaf-most frame of the current outline.
    pub fn active(&self) -> Option<FrameId> {
        self.active
    }

    /// Frames currently executed, root-first. May be a prefix of the active
    /// frame's outline while a conditional aux is engaged.
    pub fn actives(&self) -> &[FrameId] {
        &self.actives
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn recurred(&self) -> u64 {
        self.recurred
    }

    pub fn main(&self) -> Option<FrameId> {
        self.main
    }

    /// True for authored framers, false for clones.
    pub fn is_original(&self) -> bool {
        self.original
    }

    pub fn is_insular(&self) -> bool {
        self.insular
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn is_pruned(&self) -> bool {
        self.pruned
    }

    /// Look up one of this framer's frames by name.
    pub fn lookup(&self, name: &str) -> Option<FrameId> {
        self.names.get(name).copied()
    }

    /// Frame names in creation order.
    pub fn frame_names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Frames in creation order.
    pub fn frames(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.names.values().copied()
    }

    pub fn auxes(&self) -> &IndexMap<String, FramerId> {
        &self.auxes
    }

    /// Key under which this framer appears in an owner's aux map.
    pub(crate) fn aux_key(&self) -> String {
        self.tag.clone().unwrap_or_else(|| self.tasker.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_framer_is_an_unresolved_original() {
        let framer = Framer::new("F", Schedule::Active, 0.5);
        assert!(framer.is_original());
        assert!(!framer.is_resolved());
        assert_eq!(framer.status(), Status::Stopped);
        assert_eq!(framer.desire(), Desire::Start);
        assert_eq!(framer.period(), 0.5);
        assert!(framer.active().is_none());
    }

    #[test]
    fn aux_key_prefers_tag() {
        let mut framer = Framer::new("F.A.X", Schedule::Aux, 0.0);
        assert_eq!(framer.aux_key(), "F.A.X");
        framer.tag = Some("A.X".to_string());
        assert_eq!(framer.aux_key(), "A.X");
    }
}
