//! # Arm Equipment Interface
//!
//! Message shapes exchanged between the arm executive and its collaborators:
//!
//! - [`JointStateMsg`] - joint position feedback from the arm controller.
//! - [`JointTrajectoryCmd`] - joint-space trajectory demands sent to the arm
//!   controller.
//! - [`ToolPoseTm`] - derived tool pose telemetry for quick monitoring.
//! - [`ToolFrameMsg`] - tool frame broadcast for an optional visualisation
//!   collaborator.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Joint position feedback published by the arm controller.
///
/// The ordering of `position_rad` is fixed by the feedback channel and is not
/// necessarily the same as the ordering of [`JointTrajectoryCmd::joint_names`],
/// the executive is responsible for any cross-mapping.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JointStateMsg {
    /// The sensed position of each joint.
    ///
    /// Units: radians
    pub position_rad: Vec<f64>,
}

/// A single point along a joint-space trajectory.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrajectoryPoint {
    /// The demanded position of each joint, ordered as
    /// [`JointTrajectoryCmd::joint_names`].
    ///
    /// Units: radians
    pub positions_rad: Vec<f64>,

    /// Time after the start of trajectory execution at which this point
    /// shall be reached. Shall be non-negative.
    ///
    /// Units: seconds
    pub time_from_start_s: f64,
}

/// Joint-space trajectory demands that are sent to the arm controller.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JointTrajectoryCmd {
    /// Names of the joints being demanded, in the order expected by the
    /// physical controller.
    pub joint_names: Vec<String>,

    /// The points of the trajectory. Each point's position vector shall have
    /// the same length as `joint_names`.
    pub points: Vec<TrajectoryPoint>,

    /// Time at which this command was emitted.
    pub timestamp: DateTime<Utc>,
}

/// Tool pose telemetry packet, a lossy Euler-angle view of the tool frame
/// relative to the arm base frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default)]
pub struct ToolPoseTm {
    /// Tool position in the base frame.
    ///
    /// Units: meters
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,

    /// Tool orientation in the base frame, extrinsic X-Y-Z Euler angles.
    ///
    /// Units: radians
    pub roll_rad: f64,
    pub pitch_rad: f64,
    pub yaw_rad: f64,
}

/// Tool frame broadcast for a visualisation collaborator.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ToolFrameMsg {
    /// Name of the frame the pose is expressed in.
    pub parent_frame: String,

    /// Name of the broadcast frame.
    pub child_frame: String,

    /// Position of the child frame origin in the parent frame.
    ///
    /// Units: meters
    pub position_m: [f64; 3],

    /// Attitude of the child frame in the parent frame, as a unit quaternion
    /// in `[x, y, z, w]` order.
    pub attitude_q: [f64; 4],

    /// Time at which this frame was computed.
    pub timestamp: DateTime<Utc>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Ways in which a [`JointTrajectoryCmd`] can violate its invariants.
#[derive(Debug, thiserror::Error)]
pub enum CmdValidationError {
    #[error("Point {index} has {num_positions} positions but there are {num_joints} joint names")]
    PositionLengthMismatch {
        index: usize,
        num_positions: usize,
        num_joints: usize,
    },

    #[error("Point {index} has a negative time from start ({time_from_start_s} s)")]
    NegativeTimeFromStart { index: usize, time_from_start_s: f64 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointTrajectoryCmd {
    /// Check the command's invariants: every point's position vector matches
    /// the joint name list in length, and no point lies in negative time.
    pub fn validate(&self) -> Result<(), CmdValidationError> {
        for (index, point) in self.points.iter().enumerate() {
            if point.positions_rad.len() != self.joint_names.len() {
                return Err(CmdValidationError::PositionLengthMismatch {
                    index,
                    num_positions: point.positions_rad.len(),
                    num_joints: self.joint_names.len(),
                });
            }

            if point.time_from_start_s < 0.0 {
                return Err(CmdValidationError::NegativeTimeFromStart {
                    index,
                    time_from_start_s: point.time_from_start_s,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cmd(num_joints: usize, positions: Vec<Vec<f64>>, times: Vec<f64>) -> JointTrajectoryCmd {
        JointTrajectoryCmd {
            joint_names: (0..num_joints).map(|i| format!("joint_{}", i)).collect(),
            points: positions
                .into_iter()
                .zip(times)
                .map(|(positions_rad, time_from_start_s)| TrajectoryPoint {
                    positions_rad,
                    time_from_start_s,
                })
                .collect(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_validate_ok() {
        let c = cmd(3, vec![vec![0.0; 3], vec![0.1; 3]], vec![0.0, 1.0]);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_length_mismatch() {
        let c = cmd(3, vec![vec![0.0; 2]], vec![1.0]);
        assert!(matches!(
            c.validate(),
            Err(CmdValidationError::PositionLengthMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_validate_negative_time() {
        let c = cmd(2, vec![vec![0.0; 2]], vec![-0.5]);
        assert!(matches!(
            c.validate(),
            Err(CmdValidationError::NegativeTimeFromStart { index: 0, .. })
        ));
    }
}
