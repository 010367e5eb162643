//! # Line follower executable
//!
//! Runs the line follower headless against the track described in the
//! parameters. The general execution methodology consists of:
//!
//!     - Initialise the session, logging, parameters and track
//!     - Main loop, once per 30 ms cycle of simulated time:
//!         - Execute any scripted commands which are due
//!         - Tick the line follower
//!         - Archive the tick
//!     - Save a summary of the run
//!
//! The software root must be given by the `LINE_FOLLOWER_SW_ROOT` environment
//! variable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use chrono::Utc;
use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, warn};
use serde::Serialize;
use structopt::StructOpt;

use lf_lib::{
    line_follower::{LineFollower, LineFollowerMode, TickRecord},
    sim_cmd::SimCmd,
    track::{Track, TrackParams},
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter, LogLevels},
    script_interpreter::{Pending, ScriptInterpreter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.03;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Headless line follower simulation
#[derive(Debug, StructOpt)]
#[structopt(name = "lf_exec")]
struct Opts {
    /// Line follower parameter file, relative to the params directory
    #[structopt(long, default_value = "line_follower.toml")]
    params: String,

    /// Track parameter file, relative to the params directory
    #[structopt(long, default_value = "track.toml")]
    track: String,

    /// Script of timed simulation commands
    #[structopt(long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Simulated time after which the run is ended
    #[structopt(long, default_value = "120")]
    max_duration_s: f64,

    /// Hold each cycle to its real time period
    #[structopt(long)]
    realtime: bool,

    /// Log every tick of the control loop
    #[structopt(long)]
    trace_ticks: bool,
}

/// Summary of a run, saved into the session when the run ends.
#[derive(Debug, Serialize)]
struct RunSummary {
    finished_at: String,
    num_cycles: u64,
    sim_time_s: f64,
    num_resets: u32,
    final_x: f64,
    final_y: f64,
    final_heading_deg: f64,
    stopped: bool,
    stop_time_s: Option<f64>,
    num_cycle_overruns: u64,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("lf_exec", "sessions").wrap_err("Failed to create the session")?;

    let mut log_levels = LogLevels {
        file: LevelFilter::Debug,
        stdout: LevelFilter::Info,
        targets: Vec::new(),
    };
    if opts.trace_ticks {
        log_levels = log_levels.with_target("lf_lib::line_follower", LevelFilter::Trace);
    }
    logger_init(&log_levels, &session).wrap_err("Failed to initialise logging")?;

    info!("Line Follower Simulation\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("Options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let track_params: TrackParams =
        util::params::load(&opts.track).wrap_err("Could not load track params")?;
    let track = Track::new(&track_params).wrap_err("Could not build the track")?;
    info!(
        "Track loaded with {} waypoints, stop bar at {:?}",
        track.waypoints().len(),
        track.stop_bar()
    );

    // ---- INITIALISE SCRIPT ----

    let mut script: Option<ScriptInterpreter<SimCmd>> = match opts.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);
            let s = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;
            info!(
                "Loaded script lasts {:.02} s and contains {} commands\n",
                s.get_duration(),
                s.get_num_cmds()
            );
            Some(s)
        }
        None => None,
    };
    let mut end_of_script = script.is_none();

    // ---- MODULE INIT ----

    let mut line_follower = LineFollower::init(&opts.params, &track, 0.0)
        .wrap_err("Failed to initialise the line follower")?;
    info!("LineFollower init complete");

    let mut archiver =
        Archiver::from_path(&session, "ticks.csv").wrap_err("Failed to create the tick archive")?;

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let mut num_cycles: u64 = 0;
    let mut num_resets: u32 = 0;
    let mut num_cycle_overruns: u64 = 0;
    'main: loop {
        let cycle_start_instant = Instant::now();
        let sim_time_s = cycle_time_s(num_cycles);

        // ---- COMMAND PROCESSING ----

        if let Some(ref mut s) = script {
            if !end_of_script {
                match s.get_pending(sim_time_s) {
                    Pending::None => (),
                    Pending::Some(cmds) => {
                        for cmd in cmds {
                            info!("Executing {:?} at {:.3} s", cmd, sim_time_s);
                            match cmd {
                                SimCmd::Reset => {
                                    // The tick of this cycle must measure a full period
                                    line_follower.reset(sim_time_s - CYCLE_PERIOD_S);
                                    num_resets += 1;
                                }
                                SimCmd::Exit => break 'main,
                            }
                        }
                    }
                    Pending::EndOfScript => {
                        info!("End of script reached");
                        end_of_script = true;
                    }
                }
            }
        }

        // ---- CONTROL ----

        let report = line_follower.tick(sim_time_s);

        archiver
            .serialise(TickRecord::from(&report))
            .wrap_err("Failed to archive the tick")?;

        num_cycles += 1;

        // ---- EXIT CONDITIONS ----

        if line_follower.mode() == LineFollowerMode::Stopped && end_of_script {
            info!("Vehicle stopped and no commands remain, exiting");
            break;
        }

        if sim_time_s >= opts.max_duration_s {
            warn!(
                "Maximum duration of {:.1} s reached before the vehicle stopped",
                opts.max_duration_s
            );
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        if opts.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => {
                    warn!(
                        "Cycle overran by {:.06} s",
                        cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                    );
                    num_cycle_overruns += 1;
                }
            }
        }
    }

    // ---- SHUTDOWN ----

    let vehicle = line_follower.vehicle();
    let summary = RunSummary {
        finished_at: Utc::now().to_rfc3339(),
        num_cycles,
        sim_time_s: num_cycles as f64 * CYCLE_PERIOD_S,
        num_resets,
        final_x: vehicle.pose.position.x,
        final_y: vehicle.pose.position.y,
        final_heading_deg: util::maths::wrap_deg_360(vehicle.pose.heading_deg),
        stopped: vehicle.stopped,
        stop_time_s: line_follower.stop_time_s(),
        num_cycle_overruns,
    };

    info!("Run summary: {:#?}", summary);
    info!("{} ticks archived", archiver.num_records());

    session.save("summary.json", summary);
    session.exit();

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Simulated time of the given cycle, the first cycle falling one period after
/// the start.
fn cycle_time_s(cycle: u64) -> f64 {
    (cycle + 1) as f64 * CYCLE_PERIOD_S
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
