//! Shared deterministic types for the tasker protocol and frame lifecycle.
//!
//! These types define stable contracts between the protocol, the runtime and
//! external drivers. They carry no state of their own.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Observable state of a tasker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Stopped,
    Readied,
    Started,
    Running,
    Aborted,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Stopped => "stopped",
            Status::Readied => "readied",
            Status::Started => "started",
            Status::Running => "running",
            Status::Aborted => "aborted",
        }
    }

    /// True for `Started` and `Running`, the states in which an outline is entered.
    pub fn is_live(self) -> bool {
        matches!(self, Status::Started | Status::Running)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Control token sent by a driver on each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Ready,
    Start,
    Run,
    Stop,
    Abort,
}

impl Control {
    pub fn as_str(self) -> &'static str {
        match self {
            Control::Ready => "ready",
            Control::Start => "start",
            Control::Run => "run",
            Control::Stop => "stop",
            Control::Abort => "abort",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a tasker would like to be sent next. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Desire {
    Ready,
    Start,
    Run,
    Stop,
    Abort,
}

impl Desire {
    /// The control token that satisfies this desire.
    pub fn control(self) -> Control {
        match self {
            Desire::Ready => Control::Ready,
            Desire::Start => Control::Start,
            Desire::Run => Control::Run,
            Desire::Stop => Control::Stop,
            Desire::Abort => Control::Abort,
        }
    }
}

/// Scheduling context of a tasker.
///
/// Only `Active`, `Inactive` and `Slave` taskers are pumped by a driver.
/// `Aux` framers are driven by the frame that owns them, and `Moot` framers
/// are templates that exist only to be cloned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    Inactive,
    Active,
    Slave,
    Aux,
    Moot,
}

impl Schedule {
    pub fn as_str(self) -> &'static str {
        match self {
            Schedule::Inactive => "inactive",
            Schedule::Active => "active",
            Schedule::Slave => "slave",
            Schedule::Aux => "aux",
            Schedule::Moot => "moot",
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle context an act is bound to within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionContext {
    /// Guard evaluated before entry.
    Beact,
    /// Evaluated during segue; the first `true` wins the cycle.
    Preact,
    Enact,
    Renact,
    React,
    Exact,
    Rexact,
}

impl ActionContext {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionContext::Beact => "beact",
            ActionContext::Preact => "preact",
            ActionContext::Enact => "enact",
            ActionContext::Renact => "renact",
            ActionContext::React => "react",
            ActionContext::Exact => "exact",
            ActionContext::Rexact => "rexact",
        }
    }
}

impl fmt::Display for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a frame in its house arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub(crate) usize);

/// Index of a framer in its house arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramerId(pub(crate) usize);

impl FrameId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl FramerId {
    pub fn index(self) -> usize {
        self.0
    }
}
