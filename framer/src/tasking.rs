//! Tasker control protocol.
//!
//! A tasker is pumped one control token at a time by an external driver and
//! answers with its resulting status. The transition table lives in [`step`]
//! and is shared by every tasker kind; kinds plug in their behavior through
//! [`Lifecycle`].
//!
//! | status \ control | Ready | Start | Run | Stop | Abort |
//! |---|---|---|---|---|---|
//! | Stopped/Readied | ready check | start check, begin | desire=Start | no-op | Aborted |
//! | Started/Running | no-op | desire=Run | one unit of work | teardown | abrupt teardown |
//! | Aborted | Aborted | Aborted | Aborted | Aborted | no-op |

use tracing::{debug, error, info, warn};

use crate::core::types::{Control, Desire, Schedule, Status};
use crate::error::FramingResult;

/// Protocol state shared by every tasker kind.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskerState {
    pub name: String,
    /// Minimum desired interval between runs, in seconds. Advisory.
    pub period: f64,
    pub schedule: Schedule,
    pub status: Status,
    pub desire: Desire,
    /// Completion flag, meaningful mainly for aux and slave taskers.
    pub done: bool,
}

impl TaskerState {
    pub fn new(name: impl Into<String>, schedule: Schedule, period: f64) -> Self {
        let desire = if schedule == Schedule::Active {
            Desire::Start
        } else {
            Desire::Stop
        };
        Self {
            name: name.into(),
            period: period.max(0.0),
            schedule,
            status: Status::Stopped,
            desire,
            done: false,
        }
    }
}

/// Behavior hooks driven by [`step`].
///
/// Hooks never change `status` themselves; `step` does that from their
/// results. `ready` and `start` return `false` to refuse, which is a normal
/// outcome, not an error.
pub trait Lifecycle {
    fn state(&self) -> &TaskerState;
    fn state_mut(&mut self) -> &mut TaskerState;

    fn ready(&mut self) -> FramingResult<bool> {
        Ok(true)
    }

    /// Check start conditions and, if they hold, begin execution.
    fn start(&mut self) -> FramingResult<bool>;

    /// Perform one unit of work.
    fn run(&mut self) -> FramingResult<()>;

    /// Full teardown with normal completion semantics.
    fn stop(&mut self) -> FramingResult<()>;

    /// Abrupt teardown. Must be best-effort: called again after any failure.
    fn abort(&mut self) -> FramingResult<()>;
}

/// Consume one control token and return the resulting status.
///
/// Any error raised by a hook forces the tasker to `Aborted` (after a
/// best-effort abort teardown) and is returned to the driver.
pub fn step<T: Lifecycle + ?Sized>(tasker: &mut T, control: Control) -> FramingResult<Status> {
    let before = tasker.state().status;
    match dispatch(tasker, before, control) {
        Ok(()) => {
            let state = tasker.state();
            if state.status != before {
                debug!(
                    tasker = %state.name,
                    control = %control,
                    from = %before,
                    to = %state.status,
                    "status changed"
                );
            }
            Ok(state.status)
        }
        Err(err) => {
            if control != Control::Abort || !before.is_live() {
                if let Err(teardown) = tasker.abort() {
                    warn!(tasker = %tasker.state().name, err = %teardown, "teardown after failure also failed");
                }
            }
            let state = tasker.state_mut();
            state.desire = Desire::Abort;
            state.status = Status::Aborted;
            error!(tasker = %state.name, control = %control, err = %err, "step failed, tasker aborted");
            Err(err)
        }
    }
}

fn dispatch<T: Lifecycle + ?Sized>(
    tasker: &mut T,
    status: Status,
    control: Control,
) -> FramingResult<()> {
    match status {
        Status::Aborted => {
            // Terminal until rebuilt.
            tasker.state_mut().status = Status::Aborted;
        }
        Status::Stopped | Status::Readied => match control {
            Control::Ready => {
                let readied = tasker.ready()?;
                tasker.state_mut().status = if readied {
                    Status::Readied
                } else {
                    Status::Stopped
                };
            }
            Control::Start => {
                if tasker.start()? {
                    let state = tasker.state_mut();
                    state.status = Status::Started;
                    state.desire = Desire::Run;
                    info!(tasker = %state.name, "started");
                } else {
                    let state = tasker.state_mut();
                    state.status = Status::Stopped;
                    info!(tasker = %state.name, "would like to start but cannot");
                }
            }
            Control::Run => {
                let state = tasker.state_mut();
                state.desire = Desire::Start;
                debug!(tasker = %state.name, "run requested before start");
            }
            Control::Stop => {}
            Control::Abort => {
                let state = tasker.state_mut();
                state.status = Status::Aborted;
                state.desire = Desire::Abort;
                info!(tasker = %state.name, "aborted");
            }
        },
        Status::Started | Status::Running => match control {
            Control::Ready => {}
            Control::Start => tasker.state_mut().desire = Desire::Run,
            Control::Run => {
                tasker.run()?;
                let state = tasker.state_mut();
                state.status = Status::Running;
                state.desire = Desire::Run;
            }
            Control::Stop => {
                tasker.stop()?;
                let state = tasker.state_mut();
                state.status = Status::Stopped;
                state.desire = Desire::Stop;
                info!(tasker = %state.name, "stopped");
            }
            Control::Abort => {
                tasker.abort()?;
                let state = tasker.state_mut();
                state.status = Status::Aborted;
                state.desire = Desire::Abort;
                info!(tasker = %state.name, "aborted");
            }
        },
    }
    Ok(())
}

/// Plain tasker with no behavior beyond the protocol.
///
/// Counts units of work; useful as a placeholder tasker and as the reference
/// for protocol behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Tasker {
    state: TaskerState,
    runs: u64,
}

impl Tasker {
    pub fn new(name: impl Into<String>, schedule: Schedule, period: f64) -> Self {
        Self {
            state: TaskerState::new(name, schedule, period),
            runs: 0,
        }
    }

    /// Units of work performed since the last start.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn step(&mut self, control: Control) -> FramingResult<Status> {
        step(self, control)
    }
}

impl Lifecycle for Tasker {
    fn state(&self) -> &TaskerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut TaskerState {
        &mut self.state
    }

    fn start(&mut self) -> FramingResult<bool> {
        self.runs = 0;
        self.state.done = false;
        Ok(true)
    }

    fn run(&mut self) -> FramingResult<()> {
        self.runs += 1;
        Ok(())
    }

    fn stop(&mut self) -> FramingResult<()> {
        self.state.done = true;
        Ok(())
    }

    fn abort(&mut self) -> FramingResult<()> {
        self.state.done = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FramingError;

    fn tasker() -> Tasker {
        Tasker::new("t", Schedule::Active, 0.0)
    }

    #[test]
    fn active_tasker_desires_start_initially() {
        let t = tasker();
        assert_eq!(t.state().status, Status::Stopped);
        assert_eq!(t.state().desire, Desire::Start);

        let idle = Tasker::new("idle", Schedule::Inactive, 0.0);
        assert_eq!(idle.state().desire, Desire::Stop);
    }

    #[test]
    fn negative_period_clamps_to_zero() {
        let t = Tasker::new("t", Schedule::Slave, -1.0);
        assert_eq!(t.state().period, 0.0);
    }

    #[test]
    fn run_before_start_sets_desire_without_error() {
        let mut t = Tasker::new("t", Schedule::Inactive, 0.0);
        let status = t.step(Control::Run).expect("run");
        assert_eq!(status, Status::Stopped);
        assert_eq!(t.state().desire, Desire::Start);
        assert_eq!(t.runs(), 0);
    }

    #[test]
    fn stop_on_stopped_is_noop() {
        let mut t = tasker();
        let before = t.state().clone();
        let status = t.step(Control::Stop).expect("stop");
        assert_eq!(status, Status::Stopped);
        assert_eq!(t.state(), &before);
    }

    #[test]
    fn ready_then_start_then_run_then_stop() {
        let mut t = tasker();
        assert_eq!(t.step(Control::Ready).expect("ready"), Status::Readied);
        assert_eq!(t.step(Control::Start).expect("start"), Status::Started);
        assert_eq!(t.state().desire, Desire::Run);
        assert_eq!(t.step(Control::Run).expect("run"), Status::Running);
        assert_eq!(t.step(Control::Run).expect("run"), Status::Running);
        assert_eq!(t.runs(), 2);
        assert_eq!(t.step(Control::Ready).expect("ready"), Status::Running);
        assert_eq!(t.step(Control::Stop).expect("stop"), Status::Stopped);
        assert_eq!(t.state().desire, Desire::Stop);
        assert!(t.state().done);
    }

    #[test]
    fn start_while_running_only_sets_desire() {
        let mut t = tasker();
        t.step(Control::Start).expect("start");
        t.step(Control::Run).expect("run");
        t.state_mut().desire = Desire::Stop;
        assert_eq!(t.step(Control::Start).expect("start"), Status::Running);
        assert_eq!(t.state().desire, Desire::Run);
    }

    #[test]
    fn aborted_is_terminal() {
        let mut t = tasker();
        t.step(Control::Start).expect("start");
        assert_eq!(t.step(Control::Abort).expect("abort"), Status::Aborted);
        assert!(!t.state().done);
        for control in [Control::Ready, Control::Start, Control::Run, Control::Stop] {
            assert_eq!(t.step(control).expect("step"), Status::Aborted);
        }
        let before = t.state().clone();
        assert_eq!(t.step(Control::Abort).expect("abort"), Status::Aborted);
        assert_eq!(t.state(), &before);
    }

    #[test]
    fn abort_from_stopped_needs_no_teardown() {
        let mut t = tasker();
        assert_eq!(t.step(Control::Abort).expect("abort"), Status::Aborted);
        assert_eq!(t.state().desire, Desire::Abort);
    }

    struct Refusing {
        state: TaskerState,
    }

    impl Lifecycle for Refusing {
        fn state(&self) -> &TaskerState {
            &self.state
        }
        fn state_mut(&mut self) -> &mut TaskerState {
            &mut self.state
        }
        fn ready(&mut self) -> FramingResult<bool> {
            Ok(false)
        }
        fn start(&mut self) -> FramingResult<bool> {
            Ok(false)
        }
        fn run(&mut self) -> FramingResult<()> {
            Ok(())
        }
        fn stop(&mut self) -> FramingResult<()> {
            Ok(())
        }
        fn abort(&mut self) -> FramingResult<()> {
            Ok(())
        }
    }

    #[test]
    fn refused_checks_leave_tasker_stopped() {
        let mut t = Refusing {
            state: TaskerState::new("r", Schedule::Active, 0.0),
        };
        assert_eq!(step(&mut t, Control::Ready).expect("ready"), Status::Stopped);
        assert_eq!(step(&mut t, Control::Start).expect("start"), Status::Stopped);
        assert_eq!(t.state.desire, Desire::Start);
    }

    struct Failing {
        state: TaskerState,
        aborts: u32,
    }

    impl Lifecycle for Failing {
        fn state(&self) -> &TaskerState {
            &self.state
        }
        fn state_mut(&mut self) -> &mut TaskerState {
            &mut self.state
        }
        fn start(&mut self) -> FramingResult<bool> {
            Ok(true)
        }
        fn run(&mut self) -> FramingResult<()> {
            Err(FramingError::Structure("boom".to_string()))
        }
        fn stop(&mut self) -> FramingResult<()> {
            Ok(())
        }
        fn abort(&mut self) -> FramingResult<()> {
            self.aborts += 1;
            Ok(())
        }
    }

    #[test]
    fn failure_while_running_forces_abort_and_propagates() {
        let mut t = Failing {
            state: TaskerState::new("f", Schedule::Active, 0.0),
            aborts: 0,
        };
        step(&mut t, Control::Start).expect("start");
        let err = step(&mut t, Control::Run).expect_err("run fails");
        assert!(err.to_string().contains("boom"));
        assert_eq!(t.state.status, Status::Aborted);
        assert_eq!(t.state.desire, Desire::Abort);
        assert_eq!(t.aborts, 1);
    }
}
