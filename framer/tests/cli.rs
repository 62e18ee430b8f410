//! CLI tests for the `framer` binary.
//!
//! Spawns the binary and checks exit codes and stdout for the bundled
//! scenarios.

use std::process::Command;

use framer::io::config::{EngineConfig, load_config};
use framer::test_support::TempConfig;
use serde_json::Value;

fn framer() -> Command {
    Command::new(env!("CARGO_BIN_EXE_framer"))
}

#[test]
fn list_names_every_scenario() {
    let output = framer().arg("list").output().expect("framer list");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    for name in ["traffic", "pump", "mission"] {
        assert!(stdout.contains(name), "missing {name} in {stdout}");
    }
}

#[test]
fn outline_prints_framer_hierarchy() {
    let output = framer()
        .args(["outline", "traffic"])
        .output()
        .expect("framer outline");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("# light (active)"), "{stdout}");
    for frame in ["Cycle", "Green", "Yellow", "Red"] {
        assert!(stdout.contains(frame), "missing {frame} in {stdout}");
    }
}

#[test]
fn unknown_scenario_exits_with_failure() {
    let status = framer()
        .args(["outline", "nope"])
        .status()
        .expect("framer outline");

    assert_eq!(status.code(), Some(1));
}

#[test]
fn run_honors_config_cycle_cap() {
    let config = EngineConfig {
        max_cycles: 3,
        ..EngineConfig::default()
    };
    let temp = TempConfig::new(&config).expect("temp config");

    let output = framer()
        .arg("run")
        .arg("traffic")
        .arg("--config")
        .arg(&temp.path)
        .output()
        .expect("framer run");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    // Three cycle reports, the outcome, then the store snapshot.
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0]["cycle"], 1);
    let outcome = &lines[3];
    assert_eq!(outcome["framer"], "light");
    assert_eq!(outcome["stop"]["kind"], "max_cycles");
    assert_eq!(outcome["status"], "stopped");
    assert_eq!(lines[4]["light"]["power"], "off");
}

#[test]
fn init_config_refuses_to_overwrite_without_force() {
    let temp = TempConfig::new(&EngineConfig {
        max_cycles: 7,
        ..EngineConfig::default()
    })
    .expect("temp config");

    let status = framer()
        .arg("init-config")
        .arg(&temp.path)
        .status()
        .expect("framer init-config");
    assert_eq!(status.code(), Some(1));
    assert_eq!(load_config(&temp.path).expect("load").max_cycles, 7);

    let status = framer()
        .args(["init-config", "--force"])
        .arg(&temp.path)
        .status()
        .expect("framer init-config --force");
    assert!(status.success());
    assert_eq!(
        load_config(&temp.path).expect("load"),
        EngineConfig::default()
    );
}
