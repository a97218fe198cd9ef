//! # Arm library.
//!
//! This library allows other crates in the workspace (and the integration
//! tests) to access items defined inside the arm executive crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm control module - derives the tool pose from feedback and builds the trajectory command
pub mod arm_ctrl;

/// Channel endpoints connecting the executive to its external collaborators
pub mod channels;

/// Global data store for the executive
pub mod data_store;

/// The cyclic executive itself - the fixed-rate sense-compute-act loop
pub mod exec;

/// Joint feedback snapshot - the latest sensed joint positions
pub mod fb;

/// Kinematics module - chain model, forward/inverse solvers and pose conversion
pub mod kin;

/// Simulation client - a simulated arm controller for closed-loop testing without hardware
pub mod sim_client;
