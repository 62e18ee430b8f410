//! Command-line entry point for the frame engine.
//!
//! Runs the bundled scenarios through the single-framer driver and manages the
//! engine config file.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use framer::drive::run_cycles;
use framer::io::config::{EngineConfig, load_config, write_config};
use framer::scenario::{find, scenarios};

const DEFAULT_CONFIG: &str = "framer.toml";

#[derive(Parser)]
#[command(
    name = "framer",
    version,
    about = "Cooperative tasker and hierarchical frame state machine engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List bundled scenarios.
    List,
    /// Print the frame hierarchy of a scenario's framers.
    Outline { scenario: String },
    /// Drive a scenario and print one JSON line per cycle.
    Run {
        scenario: String,
        /// Config file (defaults apply when missing).
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        /// Override `max_cycles` from the config.
        #[arg(long)]
        cycles: Option<u32>,
    },
    /// Write a default config file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
        #[arg(default_value = DEFAULT_CONFIG)]
        path: PathBuf,
    },
}

fn main() {
    framer::logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::List => cmd_list(),
        Command::Outline { scenario } => cmd_outline(&scenario),
        Command::Run {
            scenario,
            config,
            cycles,
        } => cmd_run(&scenario, &config, cycles),
        Command::InitConfig { force, path } => cmd_init_config(&path, force),
    }
}

fn cmd_list() -> Result<()> {
    for scenario in scenarios() {
        println!("{:<10} {}", scenario.name, scenario.summary);
    }
    Ok(())
}

fn cmd_outline(name: &str) -> Result<()> {
    let scenario = find(name)?;
    let (house, _) = scenario
        .build(&EngineConfig::default())
        .with_context(|| format!("build scenario {name}"))?;
    for id in house.framer_ids() {
        let framer = house.framer(id);
        println!("# {} ({})", framer.name(), framer.schedule());
        print!("{}", house.hierarchy(id));
    }
    Ok(())
}

fn cmd_run(name: &str, config_path: &Path, cycles: Option<u32>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(cycles) = cycles {
        if cycles == 0 {
            bail!("--cycles must be > 0");
        }
        config.max_cycles = cycles;
    }
    let scenario = find(name)?;
    let (mut house, main) = scenario
        .build(&config)
        .with_context(|| format!("build scenario {name}"))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut write_err = None;
    let outcome = run_cycles(&mut house, main, &config, |report| {
        if write_err.is_some() {
            return;
        }
        let line = serde_json::to_string(report)
            .map_err(anyhow::Error::from)
            .and_then(|line| writeln!(out, "{line}").map_err(anyhow::Error::from));
        if let Err(err) = line {
            write_err = Some(err);
        }
    })
    .with_context(|| format!("drive scenario {name}"))?;
    if let Some(err) = write_err {
        return Err(err.context("write cycle report"));
    }

    let summary = serde_json::to_string(&outcome).context("serialize outcome")?;
    writeln!(out, "{summary}").context("write outcome")?;
    let snapshot = serde_json::to_string(&house.store().snapshot()).context("serialize store")?;
    writeln!(out, "{snapshot}").context("write store")?;
    Ok(())
}

fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &EngineConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}
