//! # Notebot Control
//!
//! Runs one autonomous period against the simulated robot: loads the
//! configuration, resolves the routine for the alliance, preloads a note,
//! and ticks every controller at the configured cycle time until the period
//! ends or a shutdown signal arrives.

use clap::Parser;
use notebot_common::config::{ConfigError, ConfigLoader};
use notebot_common::consts::AUTONOMOUS_DURATION;
use notebot_common::field::Alliance;
use notebot_control::autonomous::RoutineCatalogue;
use notebot_control::config::ControllerConfig;
use notebot_control::cycle::{CycleRunner, Mode, Pacing, Robot, rt_setup};
use notebot_control::sim::SimRobot;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Notebot Control: note handling and autonomous routines
#[derive(Parser, Debug)]
#[command(name = "notebot_control")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Tick-driven note handling and autonomous control")]
struct Args {
    /// Path to the TOML configuration. Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Autonomous routine by exact name (overrides the config file).
    #[arg(long)]
    routine: Option<String>,

    /// Alliance colour: red or blue (overrides the config file).
    #[arg(long)]
    alliance: Option<Alliance>,

    /// Print the routine catalogue and exit.
    #[arg(long)]
    list_routines: bool,

    /// Run cycles back to back instead of in real time.
    #[arg(long)]
    fast: bool,

    /// CPU core to pin the loop to (rt feature only).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (rt feature only).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = read_config(&args);
    let level = match (&config, args.verbose) {
        (_, true) => Level::DEBUG,
        (Ok(config), false) => config.shared.log_level.into(),
        (Err(_), false) => Level::INFO,
    };
    setup_tracing(&args, level);

    info!("Notebot Control v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, config))
    {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Notebot Control shutdown complete");
}

fn read_config(args: &Args) -> Result<ControllerConfig, ConfigError> {
    let mut config = match args.config {
        Some(ref path) => ControllerConfig::load(path)?,
        None => ControllerConfig::default(),
    };
    if let Some(ref routine) = args.routine {
        config.routine = Some(routine.clone());
    }
    if let Some(alliance) = args.alliance {
        config.alliance = alliance;
    }
    Ok(config)
}

fn run(args: &Args, config: ControllerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalogue = RoutineCatalogue::builtin()?;

    if args.list_routines {
        for routine in catalogue.enabled() {
            println!("{} ({} legs)", routine.name(), routine.len());
        }
        return Ok(());
    }

    let loaded = config.resolve(&catalogue)?;
    let alliance = loaded.config.alliance;
    info!(
        "Config OK: service={}, cycle_time={}ms, alliance={:?}, routine='{}'",
        loaded.config.shared.service_name,
        loaded.cycle_time.as_millis(),
        alliance,
        loaded.routine.name(),
    );

    rt_setup(args.cpu_core, args.rt_priority)?;

    let start = loaded
        .routine
        .start_pose()
        .unwrap_or_else(|| alliance.close_straight_pose());
    let mut sim = SimRobot::new(&loaded.config.sim, alliance, loaded.cycle_time).with_preload();
    sim.place(start);

    let mut robot = Robot::new(sim, loaded.timings, loaded.routine, loaded.cycle_time)?;
    robot.set_mode(Mode::Autonomous);

    let pacing = if args.fast { Pacing::Fast } else { Pacing::RealTime };
    let mut runner = CycleRunner::new(robot, pacing);

    let running = runner.stop_handle();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    let cycles = (AUTONOMOUS_DURATION.as_nanos() / loaded.cycle_time.as_nanos()) as u32;
    info!("Entering autonomous period ({cycles} cycles, {pacing:?})");
    let ran = runner.run_cycles(cycles)?;
    if ran < cycles {
        warn!("Autonomous period interrupted after {ran} of {cycles} cycles");
    }

    let finished = runner.robot.sequencer().is_finished();
    runner.robot.set_mode(Mode::Disabled);
    runner.robot.tick();

    let sequencer = runner.robot.sequencer();
    let sim = runner.robot.io();
    info!(
        "Autonomous summary: legs={}/{}, finished={}, notes_fired={}, notes_left={}",
        sequencer.legs_completed(),
        sequencer.routine().len(),
        finished,
        sim.notes_fired(),
        sim.field_notes().len(),
    );
    let stats = &runner.stats;
    info!(
        "Cycle stats: count={}, mean={:?}, min={:?}, max={:?}, stddev={:?}, worst_latency={:?}, overruns={}",
        stats.cycles,
        stats.mean(),
        stats.fastest,
        stats.slowest,
        stats.std_dev(),
        stats.worst_latency,
        stats.overruns,
    );

    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
