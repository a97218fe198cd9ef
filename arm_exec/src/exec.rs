//! # Cyclic executive
//!
//! Runs the fixed-rate sense-compute-act loop:
//!
//! 1. Drain the feedback channel into the snapshot (sense).
//! 2. Run the arm control module (compute).
//! 3. Publish the command, telemetry and frame broadcast (act).
//! 4. Sleep out the remainder of the cycle period.
//!
//! A cycle never blocks waiting for feedback, and the command is published
//! every cycle even when no feedback has arrived yet.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Deserialize;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use crate::arm_ctrl::{self, ArmCtrlError};
use crate::channels::ArmChannels;
use crate::data_store::DataStore;
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the cyclic executive.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ExecParams {
    /// Frequency of the control cycle.
    ///
    /// Units: hertz
    pub cycle_frequency_hz: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in the cyclic executive.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("Cycle frequency shall be finite and positive, got {0} Hz")]
    InvalidCycleFrequency(f64),

    #[error("The {0} channel is closed")]
    ChannelClosed(&'static str),

    #[error("Arm control processing failed: {0}")]
    ArmCtrlError(#[from] ArmCtrlError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ExecParams {
    fn default() -> Self {
        Self {
            cycle_frequency_hz: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the cyclic executive.
///
/// Runs until `max_cycles` cycles have elapsed, or forever when `max_cycles`
/// is `None`.
pub fn run(
    ds: &mut DataStore,
    channels: &ArmChannels,
    params: &ExecParams,
    max_cycles: Option<u64>,
) -> Result<(), ExecError> {
    if !params.cycle_frequency_hz.is_finite() || params.cycle_frequency_hz <= 0.0 {
        return Err(ExecError::InvalidCycleFrequency(params.cycle_frequency_hz));
    }

    let cycle_period = Duration::from_secs_f64(1.0 / params.cycle_frequency_hz);

    info!(
        "Executive starting at {} Hz ({} ms cycle)",
        params.cycle_frequency_hz,
        cycle_period.as_millis()
    );

    loop {
        let cycle_start_instant = Instant::now();

        ds.cycle_start(params.cycle_frequency_hz);

        // SENSE: drain all feedback recieved since the last cycle
        while let Ok(msg) = channels.feedback_rx.try_recv() {
            if let Err(e) = ds.feedback.ingest(&msg) {
                warn!("Rejecting feedback message: {}", e);
                ds.num_fb_rejections += 1;
            }
        }

        ds.arm_ctrl_input = arm_ctrl::InputData {
            position_rad: ds.feedback.position_rad().map(|p| p.to_vec()),
        };

        // COMPUTE
        let (output, status_rpt) = ds.arm_ctrl.proc(&ds.arm_ctrl_input)?;
        ds.arm_ctrl_status_rpt = status_rpt;

        // ACT: derived outputs first, then the command which is always sent
        if let Some(tm) = output.tool_pose_tm {
            if channels.tm_tx.send(tm).is_err() {
                warn!("Tool pose telemetry channel is closed");
            }
        }

        if let (Some(frame), Some(frame_tx)) = (&output.tool_frame, &channels.frame_tx) {
            if frame_tx.send(frame.clone()).is_err() {
                warn!("Tool frame broadcast channel is closed");
            }
        }

        channels
            .cmd_tx
            .send(output.cmd.clone())
            .map_err(|_| ExecError::ChannelClosed("command"))?;

        ds.arm_ctrl_output = Some(output);

        if ds.is_1_hz_cycle {
            info!(
                "Cycle {} ({:.1} s): fk_ok = {}, awaiting_feedback = {}",
                ds.num_cycles,
                ds.sim_time_s,
                ds.arm_ctrl_status_rpt.fk_ok,
                ds.arm_ctrl_status_rpt.awaiting_feedback
            );
        }

        // Sleep out the rest of the cycle
        let cycle_elapsed = cycle_start_instant.elapsed();
        if cycle_elapsed < cycle_period {
            ds.num_consec_cycle_overruns = 0;
            thread::sleep(cycle_period - cycle_elapsed);
        } else {
            ds.num_consec_cycle_overruns += 1;
            warn!(
                "Cycle {} overran its period by {:.3} ms ({} consecutive overruns)",
                ds.num_cycles,
                (cycle_elapsed - cycle_period).as_secs_f64() * 1e3,
                ds.num_consec_cycle_overruns
            );
        }

        ds.num_cycles += 1;

        if let Some(max) = max_cycles {
            if ds.num_cycles >= max as u128 {
                info!("Reached the configured cycle count ({}), stopping", max);
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arm_ctrl::{ArmCtrl, Params};
    use comms_if::eqpt::arm::JointStateMsg;
    use std::sync::mpsc;

    fn test_setup() -> (DataStore, ArmChannels, TestEndpoints) {
        let mut ds = DataStore::default();
        ds.arm_ctrl = ArmCtrl::with_params(Params::default()).unwrap();

        let (feedback_tx, feedback_rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (tm_tx, tm_rx) = mpsc::channel();

        let channels = ArmChannels {
            feedback_rx,
            cmd_tx,
            tm_tx,
            frame_tx: None,
        };

        (
            ds,
            channels,
            TestEndpoints {
                feedback_tx,
                cmd_rx,
                tm_rx,
            },
        )
    }

    struct TestEndpoints {
        feedback_tx: mpsc::Sender<JointStateMsg>,
        cmd_rx: mpsc::Receiver<comms_if::eqpt::arm::JointTrajectoryCmd>,
        tm_rx: mpsc::Receiver<comms_if::eqpt::arm::ToolPoseTm>,
    }

    #[test]
    fn test_invalid_frequency_rejected() {
        let (mut ds, channels, _endpoints) = test_setup();

        let params = ExecParams {
            cycle_frequency_hz: 0.0,
        };

        assert!(matches!(
            run(&mut ds, &channels, &params, Some(1)),
            Err(ExecError::InvalidCycleFrequency(_))
        ));
    }

    #[test]
    fn test_loop_liveness_without_feedback() {
        // With no feedback at all the executive must still emit one valid
        // command per cycle and keep its cadence
        let (mut ds, channels, endpoints) = test_setup();

        let params = ExecParams {
            cycle_frequency_hz: 50.0,
        };

        let start = Instant::now();
        run(&mut ds, &channels, &params, Some(5)).unwrap();
        let elapsed = start.elapsed();

        let cmds: Vec<_> = endpoints.cmd_rx.try_iter().collect();
        assert_eq!(cmds.len(), 5);
        for cmd in &cmds {
            cmd.validate().unwrap();
        }

        // No feedback, so no derived telemetry
        assert_eq!(endpoints.tm_rx.try_iter().count(), 0);
        assert!(ds.arm_ctrl_status_rpt.awaiting_feedback);

        // 5 cycles at 50 Hz is 100 ms, allow some slack below
        assert!(elapsed >= Duration::from_millis(80));
    }

    #[test]
    fn test_feedback_produces_telemetry() {
        let (mut ds, channels, endpoints) = test_setup();

        let params = ExecParams {
            cycle_frequency_hz: 100.0,
        };

        // Two messages: the first only sizes the snapshot
        endpoints
            .feedback_tx
            .send(JointStateMsg {
                position_rad: vec![0.0; 6],
            })
            .unwrap();
        endpoints
            .feedback_tx
            .send(JointStateMsg {
                position_rad: vec![0.0; 6],
            })
            .unwrap();

        run(&mut ds, &channels, &params, Some(2)).unwrap();

        assert!(ds.arm_ctrl_status_rpt.fk_ok);

        let tms: Vec<_> = endpoints.tm_rx.try_iter().collect();
        assert_eq!(tms.len(), 2);
        assert!((tms[0].x_m - (-0.8172)).abs() < 1e-6);
    }

    #[test]
    fn test_mismatched_feedback_counted() {
        let (mut ds, channels, endpoints) = test_setup();

        let params = ExecParams {
            cycle_frequency_hz: 100.0,
        };

        endpoints
            .feedback_tx
            .send(JointStateMsg {
                position_rad: vec![0.0; 6],
            })
            .unwrap();
        endpoints
            .feedback_tx
            .send(JointStateMsg {
                position_rad: vec![0.0; 3],
            })
            .unwrap();

        run(&mut ds, &channels, &params, Some(1)).unwrap();

        assert_eq!(ds.num_fb_rejections, 1);
        assert_eq!(endpoints.cmd_rx.try_iter().count(), 1);
    }
}
