//! Single-framer driver for `framer run`.
//!
//! Starts one top-level framer, advances store time by a fixed tick and pumps
//! `Run` until the framer is done, the cycle cap is reached, or the framer
//! aborts. This is not a scheduler.

use serde::Serialize;
use tracing::{debug, info};

use crate::core::types::{Control, FramerId, Status};
use crate::error::{FramingResult, error_chain};
use crate::house::House;
use crate::io::config::EngineConfig;

/// Reason why `run_cycles` stopped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriveStop {
    /// The framer reported done and `stop_when_done` is set.
    Done,
    /// `max_cycles` runs were performed.
    MaxCycles { max_cycles: u32 },
    /// The framer would not start.
    Refused,
    /// A step failed and the framer aborted.
    Aborted { error: String },
}

/// State of the driven framer after one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub cycle: u32,
    pub stamp: f64,
    pub status: Status,
    pub active: Option<String>,
    pub outline: Vec<String>,
    pub done: bool,
}

/// Summary of a drive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveOutcome {
    pub framer: String,
    pub cycles: u32,
    pub status: Status,
    pub stop: DriveStop,
}

/// Drive `framer` to completion under `config`.
///
/// Act failures abort the framer and are reported through
/// [`DriveStop::Aborted`] rather than as an error.
pub fn run_cycles<F: FnMut(&CycleReport)>(
    house: &mut House,
    framer: FramerId,
    config: &EngineConfig,
    mut on_cycle: F,
) -> FramingResult<DriveOutcome> {
    let name = house.framer(framer).name().to_string();
    let outcome = |house: &House, cycles: u32, stop: DriveStop| DriveOutcome {
        framer: name.clone(),
        cycles,
        status: house.framer(framer).status(),
        stop,
    };

    house.step(framer, Control::Ready)?;
    if let Err(err) = house.step(framer, Control::Start) {
        let error = error_chain(&err);
        return Ok(outcome(house, 0, DriveStop::Aborted { error }));
    }
    if !house.framer(framer).status().is_live() {
        info!(framer = %name, "framer refused to start");
        return Ok(outcome(house, 0, DriveStop::Refused));
    }

    let mut cycles = 0u32;
    let stop = loop {
        if cycles >= config.max_cycles {
            break DriveStop::MaxCycles {
                max_cycles: config.max_cycles,
            };
        }
        house.store_mut().advance(config.tick_secs);
        let stepped = house.step(framer, Control::Run);
        cycles += 1;
        on_cycle(&report(house, framer, cycles));
        if let Err(err) = stepped {
            break DriveStop::Aborted {
                error: error_chain(&err),
            };
        }
        if config.stop_when_done && house.framer(framer).done() {
            break DriveStop::Done;
        }
    };

    if house.framer(framer).status().is_live() {
        house.step(framer, Control::Stop)?;
    }
    debug!(framer = %name, cycles, "drive finished");
    Ok(outcome(house, cycles, stop))
}

fn report(house: &House, framer: FramerId, cycle: u32) -> CycleReport {
    let state = house.framer(framer);
    CycleReport {
        cycle,
        stamp: house.store().stamp(),
        status: state.status(),
        active: state.active().map(|frame| house.frame(frame).name().to_string()),
        outline: house.active_outline_names(framer),
        done: state.done(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::act::Act;
    use crate::actors::{Complete, RecurredAtLeast};
    use crate::core::types::{ActionContext, Schedule};
    use crate::frame::Transit;
    use crate::test_support::Failing;

    fn two_step_house() -> (House, FramerId) {
        let mut house = House::new("drive");
        let f = house.add_framer("F", Schedule::Active, 0.0).expect("F");
        let a = house.add_frame(f, "A").expect("A");
        let b = house.add_frame(f, "B").expect("B");
        house
            .add_transit(
                a,
                Transit::to("B").need(Act::new(RecurredAtLeast).with_parm("count", 2)),
            )
            .expect("transit");
        house
            .add_act(b, ActionContext::React, Act::new(Complete))
            .expect("complete");
        house.resolve().expect("resolve");
        (house, f)
    }

    #[test]
    fn drive_stops_when_done() {
        let (mut house, f) = two_step_house();
        let mut reports = Vec::new();
        let outcome = run_cycles(&mut house, f, &EngineConfig::default(), |report| {
            reports.push(report.clone());
        })
        .expect("drive");

        assert_eq!(outcome.stop, DriveStop::Done);
        assert_eq!(outcome.status, Status::Stopped);
        assert_eq!(outcome.cycles, 3);
        assert_eq!(reports[0].active.as_deref(), Some("A"));
        assert_eq!(reports[2].active.as_deref(), Some("B"));
        assert!((house.store().stamp() - 0.375).abs() < 1e-9);
    }

    #[test]
    fn drive_respects_max_cycles() {
        let (mut house, f) = two_step_house();
        let config = EngineConfig {
            max_cycles: 2,
            ..EngineConfig::default()
        };
        let outcome = run_cycles(&mut house, f, &config, |_| {}).expect("drive");
        assert_eq!(outcome.stop, DriveStop::MaxCycles { max_cycles: 2 });
        assert_eq!(outcome.cycles, 2);
    }

    #[test]
    fn act_failure_is_reported_as_abort() {
        let mut house = House::new("drive");
        let f = house.add_framer("F", Schedule::Active, 0.0).expect("F");
        let a = house.add_frame(f, "A").expect("A");
        house
            .add_act(a, ActionContext::React, Act::new(Failing))
            .expect("failing");
        house.resolve().expect("resolve");

        let outcome = run_cycles(&mut house, f, &EngineConfig::default(), |_| {}).expect("drive");
        assert_eq!(outcome.status, Status::Aborted);
        assert_eq!(outcome.cycles, 1);
        let DriveStop::Aborted { error } = outcome.stop else {
            panic!("expected abort, got {:?}", outcome.stop);
        };
        assert!(error.contains("failing react act failed"), "{error}");
    }
}
