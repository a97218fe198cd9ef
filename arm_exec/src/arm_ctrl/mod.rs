//! # Arm Control Module
//!
//! Owns the kinematic chain and the solvers operating on it. Each cycle the
//! module:
//!
//! 1. Builds the joint trajectory command to be sent to the arm controller,
//!    cross-mapping the configured target from feedback order into command
//!    order.
//! 2. If joint feedback is available, runs forward kinematics on it and
//!    derives the tool pose telemetry and tool frame broadcast.
//!
//! A forward kinematics failure only suppresses the derived outputs, the
//! command is produced every cycle regardless so the arm controller never
//! starves.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use state::{ArmCtrl, InputData, OutputData, StatusReport};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in ArmCtrl
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Expected {expected} joint names in `{list}` but found {actual}")]
    InvalidJointNameCount {
        list: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Command joint `{0}` does not appear in the feedback joint list")]
    JointNameMismatch(String),

    #[error("The built trajectory command is invalid: {0}")]
    InvalidCmd(#[from] comms_if::eqpt::arm::CmdValidationError),

    #[error("Kinematics error: {0}")]
    KinError(#[from] crate::kin::KinError),
}
