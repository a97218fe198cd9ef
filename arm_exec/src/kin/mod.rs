//! Kinematics module
//!
//! Models the arm as a serial chain of Denavit-Hartenberg segments and
//! provides the solvers operating on it:
//!
//! - [`fk`]: joint angles to tool pose.
//! - [`jacobian`]: desired tool-frame twist to joint velocities.
//! - [`ik`]: desired tool pose to joint angles (bounded Newton-Raphson).
//! - [`pose`]: tool pose representation and its Euler telemetry view.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod chain;
pub mod fk;
mod ik;
pub mod jacobian;
mod pose;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use chain::*;
pub use ik::*;
pub use jacobian::VelSolver;
pub use pose::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during kinematics calculations.
///
/// None of these are fatal - callers skip the affected calculation and
/// continue.
#[derive(Debug, thiserror::Error)]
pub enum KinError {
    #[error("Joint vector has {actual} elements but the chain has {expected} joints")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Jacobian is near-singular (smallest singular value {min_singular_value:.3e})")]
    NearSingular { min_singular_value: f64 },
}
