//! Channel endpoints connecting the executive to its collaborators
//!
//! The executive itself is single threaded. Feedback ingestion, command
//! dispatch and telemetry drain all happen over channels so the producing
//! and consuming sides never block the cyclic loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::mpsc::{Receiver, Sender};

// Internal
use comms_if::eqpt::arm::{JointStateMsg, JointTrajectoryCmd, ToolFrameMsg, ToolPoseTm};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The executive's channel endpoints.
pub struct ArmChannels {
    /// Joint feedback from the arm controller (or simulation client).
    pub feedback_rx: Receiver<JointStateMsg>,

    /// Trajectory commands to the arm controller.
    pub cmd_tx: Sender<JointTrajectoryCmd>,

    /// Tool pose telemetry.
    pub tm_tx: Sender<ToolPoseTm>,

    /// Tool frame broadcast, `None` when no visualisation collaborator is
    /// attached.
    pub frame_tx: Option<Sender<ToolFrameMsg>>,
}
