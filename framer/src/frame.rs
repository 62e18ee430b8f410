//! Frames: nodes of a framer's hierarchy and the acts bound to them.

use crate::act::Act;
use crate::core::link::Link;
use crate::core::types::{ActionContext, FrameId, FramerId};

/// Frame names with special meaning as transition targets.
pub const RESERVED_FRAME_NAMES: [&str; 2] = ["next", "me"];

/// Clone tag that requests an insular clone owned by the declaring frame.
pub const INSULAR_TAG: &str = "mine";

/// How a moot clone is identified once materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MootTag {
    /// Owned permanently by the declaring frame and pruned with it.
    Insular,
    /// Addressable across frames by this name for the life of the house.
    Named(String),
}

/// Reference from a frame to an auxiliary framer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxLink {
    Named(String),
    /// Clone request recorded at build time, materialized during resolve.
    Moot { original: String, tag: MootTag },
    /// Moot whose clone exists as `name` but is not yet linked.
    Materialized {
        original: String,
        tag: MootTag,
        name: String,
    },
    Resolved(FramerId),
}

impl AuxLink {
    pub fn framer(name: impl Into<String>) -> Self {
        AuxLink::Named(name.into())
    }

    /// Request an insular clone of `original`.
    pub fn insular(original: impl Into<String>) -> Self {
        AuxLink::Moot {
            original: original.into(),
            tag: MootTag::Insular,
        }
    }

    /// Request a clone of `original` addressable as `tag`.
    pub fn clone_as(original: impl Into<String>, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let tag = if tag == INSULAR_TAG {
            MootTag::Insular
        } else {
            MootTag::Named(tag)
        };
        AuxLink::Moot {
            original: original.into(),
            tag,
        }
    }

    pub fn resolved(&self) -> Option<FramerId> {
        match self {
            AuxLink::Resolved(id) => Some(*id),
            _ => None,
        }
    }
}

/// Transition preact: when every need holds, go to `far`.
#[derive(Debug)]
pub struct Transit {
    pub(crate) far: Link<FrameId>,
    pub(crate) needs: Vec<Act>,
}

impl Transit {
    /// Transition to the frame called `far` (or `next` / `me`).
    pub fn to(far: impl Into<String>) -> Self {
        Self {
            far: Link::named(far),
            needs: Vec::new(),
        }
    }

    pub fn need(mut self, need: Act) -> Self {
        self.needs.push(need);
        self
    }

    pub fn far(&self) -> &Link<FrameId> {
        &self.far
    }
}

/// Conditional auxiliary preact.
///
/// When every need holds and the aux can start, the aux is entered, the
/// owning framer's active outline is truncated to this frame's head, and the
/// suspension is engaged. The same structure releases it: once the aux
/// reports done, or when the owning frame exits, the aux is exited and the
/// full outline is restored.
#[derive(Debug)]
pub struct Suspend {
    pub(crate) aux: AuxLink,
    pub(crate) needs: Vec<Act>,
    pub(crate) engaged: bool,
}

impl Suspend {
    pub fn new(aux: AuxLink) -> Self {
        Self {
            aux,
            needs: Vec::new(),
            engaged: false,
        }
    }

    pub fn need(mut self, need: Act) -> Self {
        self.needs.push(need);
        self
    }

    pub fn aux(&self) -> &AuxLink {
        &self.aux
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }
}

/// Entry of a frame's preact list.
#[derive(Debug)]
pub enum Preact {
    Act(Act),
    Transit(Transit),
    Suspend(Suspend),
}

#[derive(Debug)]
pub struct Frame {
    pub(crate) name: String,
    pub(crate) framer: FramerId,
    pub(crate) over: Option<FrameId>,
    pub(crate) unders: Vec<FrameId>,
    pub(crate) next: Option<Link<FrameId>>,
    pub(crate) outline: Vec<FrameId>,
    pub(crate) head: Vec<FrameId>,
    pub(crate) beacts: Vec<Act>,
    pub(crate) preacts: Vec<Preact>,
    pub(crate) enacts: Vec<Act>,
    pub(crate) renacts: Vec<Act>,
    pub(crate) reacts: Vec<Act>,
    pub(crate) exacts: Vec<Act>,
    pub(crate) rexacts: Vec<Act>,
    pub(crate) auxes: Vec<AuxLink>,
    pub human: String,
    pub count: Option<usize>,
}

impl Frame {
    pub(crate) fn new(name: impl Into<String>, framer: FramerId) -> Self {
        Self {
            name: name.into(),
            framer,
            over: None,
            unders: Vec::new(),
            next: None,
            outline: Vec::new(),
            head: Vec::new(),
            beacts: Vec::new(),
            preacts: Vec::new(),
            enacts: Vec::new(),
            renacts: Vec::new(),
            reacts: Vec::new(),
            exacts: Vec::new(),
            rexacts: Vec::new(),
            auxes: Vec::new(),
            human: String::new(),
            count: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn framer(&self) -> FramerId {
        self.framer
    }

    pub fn over(&self) -> Option<FrameId> {
        self.over
    }

    pub fn unders(&self) -> &[FrameId] {
        &self.unders
    }

    /// The primary under, used when not further disambiguated.
    pub fn primary(&self) -> Option<FrameId> {
        self.unders.first().copied()
    }

    pub fn next(&self) -> Option<&Link<FrameId>> {
        self.next.as_ref()
    }

    /// Root through self down the primary unders. Empty until traced.
    pub fn outline(&self) -> &[FrameId] {
        &self.outline
    }

    /// Root through self. Empty until traced.
    pub fn head(&self) -> &[FrameId] {
        &self.head
    }

    pub fn auxes(&self) -> &[AuxLink] {
        &self.auxes
    }

    pub fn preacts(&self) -> &[Preact] {
        &self.preacts
    }

    /// Hook acts for a non-preact context.
    pub fn acts(&self, context: ActionContext) -> &[Act] {
        match context {
            ActionContext::Beact => &self.beacts,
            ActionContext::Enact => &self.enacts,
            ActionContext::Renact => &self.renacts,
            ActionContext::React => &self.reacts,
            ActionContext::Exact => &self.exacts,
            ActionContext::Rexact => &self.rexacts,
            ActionContext::Preact => &[],
        }
    }

    pub(crate) fn acts_mut(&mut self, context: ActionContext) -> Option<&mut Vec<Act>> {
        match context {
            ActionContext::Beact => Some(&mut self.beacts),
            ActionContext::Enact => Some(&mut self.enacts),
            ActionContext::Renact => Some(&mut self.renacts),
            ActionContext::React => Some(&mut self.reacts),
            ActionContext::Exact => Some(&mut self.exacts),
            ActionContext::Rexact => Some(&mut self.rexacts),
            ActionContext::Preact => None,
        }
    }

    /// Every aux link of this frame, including those of suspend preacts.
    pub(crate) fn aux_links(&self) -> impl Iterator<Item = &AuxLink> {
        let suspends = self.preacts.iter().filter_map(|preact| match preact {
            Preact::Suspend(suspend) => Some(&suspend.aux),
            _ => None,
        });
        self.auxes.iter().chain(suspends)
    }

    pub(crate) fn aux_links_mut(&mut self) -> impl Iterator<Item = &mut AuxLink> {
        let suspends = self.preacts.iter_mut().filter_map(|preact| match preact {
            Preact::Suspend(suspend) => Some(&mut suspend.aux),
            _ => None,
        });
        self.auxes.iter_mut().chain(suspends)
    }

    /// Resolved plain auxes, in declaration order.
    pub(crate) fn resolved_auxes(&self) -> Vec<FramerId> {
        self.auxes.iter().filter_map(AuxLink::resolved).collect()
    }

    /// Every resolved aux, plain or conditional, in declaration order.
    pub(crate) fn linked_auxes(&self) -> Vec<FramerId> {
        let suspends = self.preacts.iter().filter_map(|preact| match preact {
            Preact::Suspend(suspend) => suspend.aux.resolved(),
            _ => None,
        });
        self.auxes
            .iter()
            .filter_map(AuxLink::resolved)
            .chain(suspends)
            .collect()
    }

    /// Resolved auxes of currently engaged suspensions.
    pub(crate) fn engaged_auxes(&self) -> Vec<FramerId> {
        self.preacts
            .iter()
            .filter_map(|preact| match preact {
                Preact::Suspend(suspend) if suspend.engaged => suspend.aux.resolved(),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_as_mine_is_insular() {
        assert_eq!(
            AuxLink::clone_as("Pump", INSULAR_TAG),
            AuxLink::Moot {
                original: "Pump".to_string(),
                tag: MootTag::Insular,
            }
        );
    }

    #[test]
    fn aux_links_include_suspend_targets() {
        let mut frame = Frame::new("A", FramerId(0));
        frame.auxes.push(AuxLink::framer("X"));
        frame
            .preacts
            .push(Preact::Suspend(Suspend::new(AuxLink::framer("Y"))));
        frame.preacts.push(Preact::Transit(Transit::to("B")));

        let names: Vec<String> = frame
            .aux_links_mut()
            .map(|link| match link {
                AuxLink::Named(name) => name.clone(),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["X".to_string(), "Y".to_string()]);
    }

    #[test]
    fn engaged_auxes_only_reports_engaged_resolved_suspends() {
        let mut frame = Frame::new("A", FramerId(0));
        let mut engaged = Suspend::new(AuxLink::Resolved(FramerId(4)));
        engaged.engaged = true;
        frame.preacts.push(Preact::Suspend(engaged));
        frame
            .preacts
            .push(Preact::Suspend(Suspend::new(AuxLink::Resolved(FramerId(5)))));
        assert_eq!(frame.engaged_auxes(), vec![FramerId(4)]);
    }
}
