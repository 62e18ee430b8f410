//! Acts: parameterized behaviors bound to a frame and a lifecycle context.
//!
//! An [`Act`] pairs a shared [`Actor`] body with its own parameters. Cloning
//! an act for another frame copies the parameters and shares the actor, so
//! clones of a framer can be tuned independently without duplicating
//! behavior. The runtime never looks inside an actor.

use std::fmt;
use std::rc::Rc;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::core::types::{ActionContext, FrameId, FramerId};
use crate::house::House;
use crate::store::{Store, state_path};

/// Act parameters.
pub type Parms = Map<String, Value>;

/// Behavior invoked by an act.
///
/// Guards, needs and preacts are significant only when they return
/// `Some(true)`. Hooks (enter, recur, exit) may return anything; the result is
/// ignored.
pub trait Actor {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    fn act(&self, parms: &mut Parms, ctx: &mut ActContext<'_>) -> Result<Option<bool>>;

    /// Post-build fixup, called once before first use.
    fn resolve(&self, _parms: &mut Parms, _ctx: &ResolveContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Everything an actor can touch while it runs.
pub struct ActContext<'a> {
    pub store: &'a mut Store,
    framer: &'a str,
    frame: &'a str,
    context: ActionContext,
    done: &'a mut bool,
}

impl<'a> ActContext<'a> {
    pub(crate) fn new(
        store: &'a mut Store,
        framer: &'a str,
        frame: &'a str,
        context: ActionContext,
        done: &'a mut bool,
    ) -> Self {
        Self {
            store,
            framer,
            frame,
            context,
            done,
        }
    }

    /// Name of the framer that owns the running act.
    pub fn framer(&self) -> &str {
        self.framer
    }

    /// Name of the frame the running act belongs to.
    pub fn frame(&self) -> &str {
        self.frame
    }

    pub fn context(&self) -> ActionContext {
        self.context
    }

    /// Mark the owning framer as done.
    pub fn complete(&mut self) {
        *self.done = true;
    }

    /// Read one of the owning framer's mirrored state fields.
    pub fn state(&self, field: &str) -> Option<&Value> {
        self.store.get(&state_path(self.framer, field))
    }
}

/// Read-only view of the house handed to actors during resolution.
pub struct ResolveContext<'a> {
    house: &'a House,
    frame: FrameId,
}

impl<'a> ResolveContext<'a> {
    pub(crate) fn new(house: &'a House, frame: FrameId) -> Self {
        Self { house, frame }
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame
    }

    pub fn frame_name(&self) -> &str {
        self.house.frame(self.frame).name()
    }

    pub fn framer_name(&self) -> &str {
        let framer = self.house.frame(self.frame).framer();
        self.house.framer(framer).name()
    }

    /// Look up a frame by name within the act's own framer.
    pub fn lookup_frame(&self, name: &str) -> Option<FrameId> {
        let framer = self.house.frame(self.frame).framer();
        self.house.framer(framer).lookup(name)
    }

    pub fn lookup_framer(&self, name: &str) -> Option<FramerId> {
        self.house.framer_id(name)
    }

    pub fn store(&self) -> &Store {
        self.house.store()
    }
}

/// A parameterized actor bound to a frame.
pub struct Act {
    actor: Rc<dyn Actor>,
    pub parms: Parms,
    frame: Option<FrameId>,
    context: Option<ActionContext>,
}

impl Act {
    pub fn new(actor: impl Actor + 'static) -> Self {
        Self::shared(Rc::new(actor))
    }

    /// Bind an actor body that is already shared elsewhere.
    pub fn shared(actor: Rc<dyn Actor>) -> Self {
        Self {
            actor,
            parms: Parms::new(),
            frame: None,
            context: None,
        }
    }

    pub fn with_parm(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parms.insert(key.to_string(), value.into());
        self
    }

    pub fn actor_name(&self) -> &str {
        self.actor.name()
    }

    /// Frame this act is bound to, once added to one.
    pub fn frame(&self) -> Option<FrameId> {
        self.frame
    }

    pub fn context(&self) -> Option<ActionContext> {
        self.context
    }

    /// True if both acts share the same actor body.
    pub fn shares_actor(&self, other: &Act) -> bool {
        Rc::ptr_eq(&self.actor, &other.actor)
    }

    pub(crate) fn bind(&mut self, frame: FrameId, context: ActionContext) {
        self.frame = Some(frame);
        self.context = Some(context);
    }

    pub fn call(&mut self, ctx: &mut ActContext<'_>) -> Result<Option<bool>> {
        self.actor.act(&mut self.parms, ctx)
    }

    pub fn resolve(&mut self, ctx: &ResolveContext<'_>) -> Result<()> {
        self.actor.resolve(&mut self.parms, ctx)
    }

    /// Copy this act for `frame`: parameters are copied, the actor is shared.
    pub fn clone_for(&self, frame: FrameId) -> Act {
        Act {
            actor: Rc::clone(&self.actor),
            parms: self.parms.clone(),
            frame: Some(frame),
            context: self.context,
        }
    }
}

impl fmt::Debug for Act {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Act")
            .field("actor", &self.actor.name())
            .field("parms", &self.parms)
            .field("frame", &self.frame)
            .field("context", &self.context)
            .finish()
    }
}
