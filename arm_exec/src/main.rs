//! Main arm executive entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logger and all modules
//!     - Spawn the channel collaborators (simulation client, telemetry drain)
//!     - Main loop (fixed rate):
//!         - Joint feedback acquisition
//!         - Arm control processing (forward kinematics, command build)
//!         - Command, telemetry and frame publication
//!
//! # Modules
//!
//! All modules (e.g. `arm_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use arm_lib::{
    channels::ArmChannels,
    data_store::DataStore,
    exec::{self, ExecParams},
    sim_client::{self, SimParams},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, trace};
use std::env;
use std::sync::mpsc;
use std::thread;

// Internal
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Feedback publication rate of the simulation client.
const SIM_RATE_HZ: f64 = 25.0;

/// First-order lag gain of the simulation client.
const SIM_LAG_GAIN: f64 = 0.1;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Executive\n");
    info!(
        "Software root: {:?}",
        host::get_sw_root().map_err(|_| color_eyre::eyre::eyre!(
            "The software root environment variable ({}) is not set",
            host::SW_ROOT_ENV_VAR
        ))?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ExecParams =
        util::params::load("arm_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- PROCESS CLI ARGUMENTS ----

    // An optional single argument limits the number of cycles to run, used
    // for scripted checkouts. No argument runs until interrupted.
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let max_cycles = match args.len() {
        1 => None,
        2 => Some(
            args[1]
                .parse::<u64>()
                .wrap_err("The cycle count argument must be a positive integer")?,
        ),
        _ => return Err(color_eyre::eyre::eyre!("Usage: arm_exec [num_cycles]")),
    };

    // ---- INITIALISE DATA STORE AND MODULES ----

    debug!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.arm_ctrl
        .init("arm_ctrl.toml", &session)
        .wrap_err("Failed to initialise ArmCtrl")?;
    trace!("ArmCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- SPAWN COLLABORATORS ----

    let (feedback_tx, feedback_rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (tm_tx, tm_rx) = mpsc::channel();
    let (frame_tx, frame_rx) = mpsc::channel();

    let channels = ArmChannels {
        feedback_rx,
        cmd_tx,
        tm_tx,
        frame_tx: Some(frame_tx),
    };

    // The simulation client plays the part of the physical arm controller
    let sim_params = SimParams {
        rate_hz: SIM_RATE_HZ,
        lag_gain: SIM_LAG_GAIN,
        feedback_joint_names: ds.arm_ctrl.feedback_joint_names().to_vec(),
    };
    let sim_handle = sim_client::spawn(cmd_rx, feedback_tx, sim_params);

    // Drain threads log the derived outputs at trace level
    let tm_handle = thread::spawn(move || {
        for tm in tm_rx.iter() {
            trace!(
                "Tool pose: ({:.4}, {:.4}, {:.4}) m, rpy ({:.4}, {:.4}, {:.4}) rad",
                tm.x_m,
                tm.y_m,
                tm.z_m,
                tm.roll_rad,
                tm.pitch_rad,
                tm.yaw_rad
            );
        }
    });
    let frame_handle = thread::spawn(move || {
        for frame in frame_rx.iter() {
            trace!("Frame {} -> {}", frame.parent_frame, frame.child_frame);
        }
    });

    // ---- MAIN LOOP ----

    exec::run(&mut ds, &channels, &exec_params, max_cycles).wrap_err("Executive failed")?;

    // ---- SHUTDOWN ----

    info!(
        "Executive stopped after {} cycles ({} feedback rejections)",
        ds.num_cycles, ds.num_fb_rejections
    );

    // Dropping the channels lets the collaborator threads run down
    drop(channels);

    sim_handle
        .join()
        .map_err(|_| color_eyre::eyre::eyre!("The simulation client thread panicked"))?;
    tm_handle
        .join()
        .map_err(|_| color_eyre::eyre::eyre!("The telemetry drain thread panicked"))?;
    frame_handle
        .join()
        .map_err(|_| color_eyre::eyre::eyre!("The frame drain thread panicked"))?;

    Ok(())
}
