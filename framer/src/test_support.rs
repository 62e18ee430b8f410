//! Test-only helpers: recording actors, tree builders, temp configs.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::act::{Act, ActContext, Actor, Parms};
use crate::core::types::{ActionContext, FrameId, FramerId, Schedule};
use crate::house::House;
use crate::io::config::{EngineConfig, write_config};

/// Hook contexts a [`Journal`] records by default.
pub const HOOKS: [ActionContext; 6] = [
    ActionContext::Beact,
    ActionContext::Enact,
    ActionContext::Renact,
    ActionContext::React,
    ActionContext::Exact,
    ActionContext::Rexact,
];

/// Shared, ordered log of act invocations as `context:frame` (or
/// `context:framer/frame` when built with [`Journal::qualified`]).
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Rc<RefCell<Vec<String>>>,
    qualified: bool,
}

impl Journal {
    /// Journal whose entries include the framer name.
    pub fn qualified() -> Self {
        Self {
            qualified: true,
            ..Self::default()
        }
    }

    pub fn act(&self) -> Act {
        Act::new(Recorder {
            journal: self.clone(),
        })
    }

    /// Attach a recorder to every hook context of each frame.
    pub fn hook_all(&self, house: &mut House, frames: &[FrameId]) {
        for &frame in frames {
            for context in HOOKS {
                house.add_act(frame, context, self.act()).expect("add recorder");
            }
        }
    }

    /// Attach a recorder to `contexts` of each frame.
    pub fn hook(&self, house: &mut House, frames: &[FrameId], contexts: &[ActionContext]) {
        for &frame in frames {
            for &context in contexts {
                house.add_act(frame, context, self.act()).expect("add recorder");
            }
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// Return and clear the recorded entries.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    fn push(&self, entry: String) {
        self.entries.borrow_mut().push(entry);
    }
}

/// Records each invocation into its journal and always holds.
#[derive(Debug)]
pub struct Recorder {
    journal: Journal,
}

impl Actor for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn act(&self, _parms: &mut Parms, ctx: &mut ActContext<'_>) -> Result<Option<bool>> {
        let entry = if self.journal.qualified {
            format!("{}:{}/{}", ctx.context(), ctx.framer(), ctx.frame())
        } else {
            format!("{}:{}", ctx.context(), ctx.frame())
        };
        self.journal.push(entry);
        Ok(Some(true))
    }
}

/// Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Failing;

impl Actor for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn act(&self, _parms: &mut Parms, _ctx: &mut ActContext<'_>) -> Result<Option<bool>> {
        bail!("deliberate failure")
    }
}

/// Add frames named `names` to `framer`, each attached under the previous one.
pub fn chain(house: &mut House, framer: FramerId, names: &[&str]) -> Vec<FrameId> {
    let mut frames: Vec<FrameId> = Vec::with_capacity(names.len());
    for name in names {
        let frame = house.add_frame(framer, name).expect("add frame");
        if let Some(&over) = frames.last() {
            house.attach(frame, over).expect("attach");
        }
        frames.push(frame);
    }
    frames
}

/// Framer `F` with frames `R > (A > A1, B)`, returned as `[R, A, A1, B]`.
pub fn fork(house: &mut House) -> (FramerId, [FrameId; 4]) {
    let framer = house
        .add_framer("F", Schedule::Active, 0.0)
        .expect("add framer");
    let frames = chain(house, framer, &["R", "A", "A1"]);
    let (root, a, a1) = (frames[0], frames[1], frames[2]);
    let b = house.add_frame(framer, "B").expect("add frame");
    house.attach(b, root).expect("attach");
    (framer, [root, a, a1, b])
}

/// A temp directory holding `engine.toml` written from `config`.
pub struct TempConfig {
    pub dir: tempfile::TempDir,
    pub path: PathBuf,
}

impl TempConfig {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("engine.toml");
        write_config(&path, config)?;
        Ok(Self { dir, path })
    }
}
