//! Bundled demo houses for the `framer` binary.

use crate::act::Act;
use crate::actors::{Always, Complete, ElapsedAtLeast, Poke, RecurredAtLeast, ShareEquals};
use crate::core::types::{ActionContext, FrameId, FramerId, Schedule};
use crate::error::{FramingError, FramingResult};
use crate::frame::{AuxLink, Suspend, Transit};
use crate::house::House;
use crate::io::config::EngineConfig;

/// A named, buildable house with one top-level framer to drive.
pub struct Scenario {
    pub name: &'static str,
    pub summary: &'static str,
    /// Framer the driver pumps.
    pub main: &'static str,
    build: fn(&mut House, f64) -> FramingResult<()>,
}

impl Scenario {
    /// Build and resolve a fresh house for this scenario.
    pub fn build(&self, config: &EngineConfig) -> FramingResult<(House, FramerId)> {
        let mut house = House::new(self.name);
        (self.build)(&mut house, config.framer.period)?;
        house.resolve()?;
        let main = house
            .framer_id(self.main)
            .ok_or_else(|| FramingError::unknown("framer", self.main))?;
        Ok((house, main))
    }
}

static SCENARIOS: [Scenario; 3] = [
    Scenario {
        name: "traffic",
        summary: "signal cycling green, yellow, red on elapsed time via next links",
        main: "light",
        build: traffic,
    },
    Scenario {
        name: "pump",
        summary: "station that primes an insular pump clone as a conditional aux",
        main: "station",
        build: pump,
    },
    Scenario {
        name: "mission",
        summary: "nested outline with a forced re-entry before moving on",
        main: "mission",
        build: mission,
    },
];

pub fn scenarios() -> &'static [Scenario] {
    &SCENARIOS
}

pub fn find(name: &str) -> FramingResult<&'static Scenario> {
    SCENARIOS
        .iter()
        .find(|scenario| scenario.name == name)
        .ok_or_else(|| FramingError::unknown("scenario", name))
}

fn poke(path: &str, value: impl Into<serde_json::Value>) -> Act {
    Act::new(Poke).with_parm("path", path).with_parm("value", value)
}

fn share(path: &str, value: impl Into<serde_json::Value>) -> Act {
    Act::new(ShareEquals)
        .with_parm("path", path)
        .with_parm("value", value)
}

fn elapsed(secs: f64) -> Act {
    Act::new(ElapsedAtLeast).with_parm("secs", secs)
}

fn recurred(count: u64) -> Act {
    Act::new(RecurredAtLeast).with_parm("count", count)
}

fn frame(house: &mut House, framer: FramerId, name: &str, human: &str) -> FramingResult<FrameId> {
    let frame = house.add_frame(framer, name)?;
    house.set_human(frame, human, None);
    Ok(frame)
}

fn traffic(house: &mut House, period: f64) -> FramingResult<()> {
    let light = house.add_framer("light", Schedule::Active, period)?;
    let cycle = frame(house, light, "Cycle", "frame Cycle")?;
    let phases = [
        ("Green", "Yellow", "green", 1.0),
        ("Yellow", "Red", "yellow", 0.25),
        ("Red", "Green", "red", 1.0),
    ];
    for (name, next, color, secs) in phases {
        let phase = frame(house, light, name, &format!("frame {name} in Cycle"))?;
        house.attach(phase, cycle)?;
        house.set_next(phase, next)?;
        house.add_act(phase, ActionContext::Enact, poke("light.color", color))?;
        house.add_transit(phase, Transit::to("next").need(elapsed(secs)))?;
    }
    house.add_act(cycle, ActionContext::Enact, poke("light.power", "on"))?;
    house.add_act(cycle, ActionContext::Exact, poke("light.power", "off"))?;
    Ok(())
}

fn pump(house: &mut House, period: f64) -> FramingResult<()> {
    let prime = house.add_framer("Prime", Schedule::Moot, period)?;
    let fill = frame(house, prime, "Fill", "frame Fill")?;
    let ready = frame(house, prime, "Ready", "frame Ready")?;
    house.add_transit(fill, Transit::to("Ready").need(recurred(3)))?;
    house.add_act(ready, ActionContext::Enact, poke("pump.primed", true))?;
    house.add_act(ready, ActionContext::React, Act::new(Complete))?;

    let meter = house.add_framer("meter", Schedule::Aux, period)?;
    let tick = frame(house, meter, "Tick", "frame Tick")?;
    house.add_act(tick, ActionContext::Enact, poke("meter.on", true))?;
    house.add_act(tick, ActionContext::Exact, poke("meter.on", false))?;

    let station = house.add_framer("station", Schedule::Active, period)?;
    let idle = frame(house, station, "Idle", "frame Idle")?;
    let pumping = frame(house, station, "Pumping", "frame Pumping")?;
    let done = frame(house, station, "Done", "frame Done")?;
    house.add_act(idle, ActionContext::Enact, poke("pump.primed", false))?;
    house.add_suspend(
        idle,
        Suspend::new(AuxLink::insular("Prime")).need(share("pump.primed", false)),
    )?;
    house.add_transit(idle, Transit::to("Pumping").need(share("pump.primed", true)))?;
    house.add_aux(pumping, AuxLink::framer("meter"))?;
    house.add_act(pumping, ActionContext::Enact, poke("pump.running", true))?;
    house.add_transit(pumping, Transit::to("Done").need(elapsed(0.5)))?;
    house.add_act(done, ActionContext::Enact, poke("pump.running", false))?;
    house.add_act(done, ActionContext::React, Act::new(Complete))?;
    Ok(())
}

fn mission(house: &mut House, period: f64) -> FramingResult<()> {
    let mission = house.add_framer("mission", Schedule::Active, period)?;
    let root = frame(house, mission, "Mission", "frame Mission")?;
    let ascent = frame(house, mission, "Ascent", "frame Ascent in Mission")?;
    let burn = frame(house, mission, "Burn", "frame Burn in Ascent")?;
    let orbit = frame(house, mission, "Orbit", "frame Orbit in Mission")?;
    house.attach(ascent, root)?;
    house.attach(burn, ascent)?;
    house.attach(orbit, root)?;

    house.add_act(root, ActionContext::Beact, Act::new(Always))?;
    house.add_act(root, ActionContext::Enact, poke("mission.phase", "go"))?;
    house.add_transit(ascent, Transit::to("Orbit").need(share("mission.burned", true)))?;
    house.add_transit(burn, Transit::to("me").need(recurred(2)))?;
    house.add_act(burn, ActionContext::Rexact, poke("mission.burned", true))?;
    house.add_act(burn, ActionContext::Renact, poke("mission.phase", "coast"))?;
    house.add_act(orbit, ActionContext::Enact, poke("mission.phase", "orbit"))?;
    house.add_act(orbit, ActionContext::React, Act::new(Complete))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{DriveStop, run_cycles};
    use serde_json::json;

    #[test]
    fn every_scenario_builds() {
        let config = EngineConfig::default();
        for scenario in scenarios() {
            let (house, main) = scenario.build(&config).expect(scenario.name);
            assert_eq!(house.framer(main).name(), scenario.main);
        }
    }

    #[test]
    fn unknown_scenario_is_reported() {
        assert!(matches!(find("nope"), Err(FramingError::Unknown { .. })));
    }

    #[test]
    fn traffic_cycles_colors_in_order() {
        let config = EngineConfig::default();
        let (mut house, main) = find("traffic").expect("traffic").build(&config).expect("build");
        let mut phases: Vec<String> = Vec::new();

        let outcome = run_cycles(&mut house, main, &config, |report| {
            if let Some(leaf) = report.outline.last()
                && phases.last() != Some(leaf)
            {
                phases.push(leaf.clone());
            }
        })
        .expect("drive");

        assert_eq!(
            outcome.stop,
            DriveStop::MaxCycles {
                max_cycles: config.max_cycles
            }
        );
        assert_eq!(phases[..4], ["Green", "Yellow", "Red", "Green"]);
        assert_eq!(house.store().get("light.power"), Some(&json!("off")));
    }

    #[test]
    fn pump_primes_then_finishes() {
        let config = EngineConfig::default();
        let (mut house, main) = find("pump").expect("pump").build(&config).expect("build");
        let outcome = run_cycles(&mut house, main, &config, |_| {}).expect("drive");
        assert_eq!(outcome.stop, DriveStop::Done);
        assert_eq!(house.store().get("pump.primed"), Some(&json!(true)));
        assert_eq!(house.store().get("pump.running"), Some(&json!(false)));
        assert_eq!(house.store().get("meter.on"), Some(&json!(false)));
    }

    #[test]
    fn mission_reenters_burn_then_reaches_orbit() {
        let config = EngineConfig::default();
        let (mut house, main) = find("mission").expect("mission").build(&config).expect("build");
        let outcome = run_cycles(&mut house, main, &config, |_| {}).expect("drive");
        assert_eq!(outcome.stop, DriveStop::Done);
        assert_eq!(house.store().get("mission.phase"), Some(&json!("orbit")));
    }
}
