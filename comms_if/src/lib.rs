//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software. Only the
//! message shapes are defined here - the transport which carries them
//! (channels in this workspace, a middleware in a deployed system) is an
//! external collaborator.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command, feedback and telemetry definitions for equipment (the arm)
pub mod eqpt;
