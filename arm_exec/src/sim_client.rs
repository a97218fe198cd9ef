//! # Simulation client
//!
//! A simulated arm controller for closed-loop runs without hardware. It
//! consumes trajectory commands, tracks the latest demanded point with a
//! first-order lag, and publishes joint feedback at its own rate,
//! independent of the executive's cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// Internal
use comms_if::eqpt::arm::{JointStateMsg, JointTrajectoryCmd};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulation client.
#[derive(Debug, Clone)]
pub struct SimParams {
    /// Feedback publication rate.
    ///
    /// Units: hertz
    pub rate_hz: f64,

    /// First-order lag gain per publication step, in (0, 1]. A gain of 1
    /// snaps to the demand immediately.
    pub lag_gain: f64,

    /// Joint names in the order feedback is published, which is also the
    /// order the simulated state vector is kept in.
    pub feedback_joint_names: Vec<String>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Spawn the simulation client on its own thread.
///
/// The thread exits when the feedback channel's consumer is dropped.
pub fn spawn(
    cmd_rx: Receiver<JointTrajectoryCmd>,
    feedback_tx: Sender<JointStateMsg>,
    params: SimParams,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let step_period = Duration::from_secs_f64(1.0 / params.rate_hz);

        let num_joints = params.feedback_joint_names.len();
        let mut position_rad = vec![0.0; num_joints];
        let mut target_rad = vec![0.0; num_joints];

        info!("Simulation client running at {} Hz", params.rate_hz);

        loop {
            // Take the newest command's final point as the tracking target
            while let Ok(cmd) = cmd_rx.try_recv() {
                let point = match cmd.points.last() {
                    Some(p) => p,
                    None => continue,
                };

                for (name, demand) in cmd.joint_names.iter().zip(&point.positions_rad) {
                    match params.feedback_joint_names.iter().position(|n| n == name) {
                        Some(i) => target_rad[i] = *demand,
                        None => warn!("Ignoring demand for unknown joint `{}`", name),
                    }
                }
            }

            for (q, t) in position_rad.iter_mut().zip(&target_rad) {
                *q += params.lag_gain * (*t - *q);
            }

            let msg = JointStateMsg {
                position_rad: position_rad.clone(),
            };

            if feedback_tx.send(msg).is_err() {
                info!("Feedback consumer dropped, simulation client stopping");
                return;
            }

            thread::sleep(step_period);
        }
    })
}
