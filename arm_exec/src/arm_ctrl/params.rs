//! Parameters for the arm control module

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the arm control module.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Joint names in the order used by the feedback channel and the
    /// kinematic chain (base outwards).
    pub feedback_joint_names: Vec<String>,

    /// Joint names in the order expected by the arm controller's command
    /// interface. Shall be a permutation of `feedback_joint_names`.
    pub command_joint_names: Vec<String>,

    /// The demanded joint positions, in feedback joint order. Normalised
    /// into (-pi, pi] at initialisation.
    ///
    /// Units: radians
    pub target_pos_rad: Vec<f64>,

    /// Time from trajectory start at which the target shall be reached.
    ///
    /// Units: seconds
    pub time_from_start_s: f64,

    /// Name of the arm base frame for the tool frame broadcast.
    pub base_frame: String,

    /// Name of the broadcast tool frame.
    pub tool_frame: String,

    /// Iteration cap for the inverse kinematics solver.
    pub ik_max_iterations: usize,

    /// Pose error norm tolerance for the inverse kinematics solver.
    pub ik_tolerance: f64,

    /// Damping factor for the velocity solver, zero for the exact
    /// pseudo-inverse.
    pub ik_damping: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        let names = |n: &[&str]| n.iter().map(|s| s.to_string()).collect();

        Self {
            feedback_joint_names: names(&[
                "shoulder_pan_joint",
                "shoulder_lift_joint",
                "elbow_joint",
                "wrist_1_joint",
                "wrist_2_joint",
                "wrist_3_joint",
            ]),
            command_joint_names: names(&[
                "elbow_joint",
                "shoulder_lift_joint",
                "shoulder_pan_joint",
                "wrist_1_joint",
                "wrist_2_joint",
                "wrist_3_joint",
            ]),
            target_pos_rad: vec![0.0, -std::f64::consts::FRAC_PI_2, 0.0, 0.0, 0.0, 0.0],
            time_from_start_s: 1.0,
            base_frame: String::from("base"),
            tool_frame: String::from("fk_tooltip"),
            ik_max_iterations: 100,
            ik_tolerance: 1e-4,
            ik_damping: 0.0,
        }
    }
}
