//! Arm control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};

// Internal
use super::{ArmCtrlError, Params};
use crate::kin::{self, Chain, IkSolution, IkSolver, ToolPose, VelSolver};
use comms_if::eqpt::arm::{JointTrajectoryCmd, ToolFrameMsg, ToolPoseTm, TrajectoryPoint};
use util::{maths::normalize_angle, module::State, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
pub struct ArmCtrl {
    /// Parameters for this module
    params: Params,

    /// The arm's kinematic chain
    chain: Chain,

    /// Pre-built trajectory command, re-stamped each cycle.
    cmd_template: JointTrajectoryCmd,

    /// The inverse kinematics solver, configured from the parameters.
    ik_solver: IkSolver,

    /// Status report on this module's processing.
    report: StatusReport,
}

/// Input data to the arm control module.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// The sensed joint positions in feedback order, or `None` if no
    /// feedback has been recieved yet.
    pub position_rad: Option<Vec<f64>>,
}

/// Output data from the arm control module.
#[derive(Debug, Clone)]
pub struct OutputData {
    /// The trajectory command for this cycle. Always produced.
    pub cmd: JointTrajectoryCmd,

    /// Derived tool pose telemetry, `None` when feedback is missing or
    /// forward kinematics failed.
    pub tool_pose_tm: Option<ToolPoseTm>,

    /// Tool frame broadcast, produced under the same conditions as
    /// `tool_pose_tm`.
    pub tool_frame: Option<ToolFrameMsg>,
}

/// Status report on the arm control module's processing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusReport {
    /// Whether forward kinematics succeeded this cycle.
    pub fk_ok: bool,

    /// Whether the module is still waiting for the first joint feedback.
    pub awaiting_feedback: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ArmCtrl {
    fn default() -> Self {
        Self {
            params: Params::default(),
            chain: Chain::ur5e(),
            cmd_template: JointTrajectoryCmd {
                joint_names: Vec::new(),
                points: Vec::new(),
                timestamp: Utc::now(),
            },
            ik_solver: IkSolver::default(),
            report: StatusReport::default(),
        }
    }
}

impl State for ArmCtrl {
    type InitData = &'static str;
    type InitError = ArmCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ArmCtrlError;

    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), ArmCtrlError> {
        *self = Self::with_params(util::params::load(init_data)?)?;

        Ok(())
    }

    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), ArmCtrlError> {
        self.report = StatusReport::default();

        let mut cmd = self.cmd_template.clone();
        cmd.timestamp = Utc::now();

        let (tool_pose_tm, tool_frame) = match &input_data.position_rad {
            Some(position_rad) => match kin::fk::solve(&self.chain, position_rad) {
                Ok(pose) => {
                    self.report.fk_ok = true;

                    let frame = ToolFrameMsg {
                        parent_frame: self.params.base_frame.clone(),
                        child_frame: self.params.tool_frame.clone(),
                        position_m: [pose.position_m.x, pose.position_m.y, pose.position_m.z],
                        attitude_q: pose.attitude_q(),
                        timestamp: cmd.timestamp,
                    };

                    (Some(pose.to_tm()), Some(frame))
                }
                Err(e) => {
                    // The command is still emitted below, only the derived
                    // outputs are skipped
                    warn!("Forward kinematics failed: {}", e);
                    (None, None)
                }
            },
            None => {
                self.report.awaiting_feedback = true;
                (None, None)
            }
        };

        Ok((
            OutputData {
                cmd,
                tool_pose_tm,
                tool_frame,
            },
            self.report,
        ))
    }
}

impl ArmCtrl {
    /// Build a fully configured module from the given parameters.
    ///
    /// Checks the joint name lists against the chain and against each other,
    /// normalises the target angles and pre-builds the trajectory command.
    /// Any mismatch is fatal as the cross-mapping would silently demand the
    /// wrong joints otherwise.
    pub fn with_params(params: Params) -> Result<Self, ArmCtrlError> {
        let chain = Chain::ur5e();
        let num_joints = chain.num_joints();

        if params.feedback_joint_names.len() != num_joints {
            return Err(ArmCtrlError::InvalidJointNameCount {
                list: "feedback_joint_names",
                expected: num_joints,
                actual: params.feedback_joint_names.len(),
            });
        }
        if params.command_joint_names.len() != num_joints {
            return Err(ArmCtrlError::InvalidJointNameCount {
                list: "command_joint_names",
                expected: num_joints,
                actual: params.command_joint_names.len(),
            });
        }
        if params.target_pos_rad.len() != num_joints {
            return Err(ArmCtrlError::InvalidJointNameCount {
                list: "target_pos_rad",
                expected: num_joints,
                actual: params.target_pos_rad.len(),
            });
        }

        // Command-order to feedback-order index map, built by name lookup so
        // a demand expressed in feedback order can be scattered into command
        // order
        let cmd_map = params
            .command_joint_names
            .iter()
            .map(|name| {
                params
                    .feedback_joint_names
                    .iter()
                    .position(|n| n == name)
                    .ok_or_else(|| ArmCtrlError::JointNameMismatch(name.clone()))
            })
            .collect::<Result<Vec<usize>, ArmCtrlError>>()?;

        // Normalise the target and scatter it into command order
        let target_norm: Vec<f64> = params
            .target_pos_rad
            .iter()
            .map(|a| normalize_angle(*a))
            .collect();

        let positions_rad: Vec<f64> = cmd_map.iter().map(|&i| target_norm[i]).collect();

        let cmd_template = JointTrajectoryCmd {
            joint_names: params.command_joint_names.clone(),
            points: vec![TrajectoryPoint {
                positions_rad,
                time_from_start_s: params.time_from_start_s,
            }],
            timestamp: Utc::now(),
        };

        // The template is emitted verbatim every cycle, so a configuration
        // which violates the command invariants is fatal here
        cmd_template.validate()?;

        let ik_solver = IkSolver {
            max_iterations: params.ik_max_iterations,
            tolerance: params.ik_tolerance,
            vel_solver: VelSolver {
                damping: params.ik_damping,
                ..Default::default()
            },
        };

        Ok(Self {
            params,
            chain,
            cmd_template,
            ik_solver,
            report: StatusReport::default(),
        })
    }

    /// Solve inverse kinematics for the given target pose, seeding from the
    /// given joint angles in feedback order.
    pub fn solve_ik(
        &self,
        target: &ToolPose,
        q0_rad: &[f64],
    ) -> Result<IkSolution, ArmCtrlError> {
        Ok(self.ik_solver.solve(&self.chain, target, q0_rad)?)
    }

    /// Get the joint names in feedback order.
    pub fn feedback_joint_names(&self) -> &[String] {
        &self.params.feedback_joint_names
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_cmd_cross_mapping() {
        let arm_ctrl = ArmCtrl::with_params(Params::default()).unwrap();

        let cmd = &arm_ctrl.cmd_template;
        assert_eq!(cmd.joint_names[0], "elbow_joint");
        assert_eq!(cmd.joint_names[1], "shoulder_lift_joint");
        assert_eq!(cmd.joint_names[2], "shoulder_pan_joint");

        // The shoulder lift demand lands in command slot 1
        let point = &cmd.points[0];
        assert!((point.positions_rad[1] - (-FRAC_PI_2)).abs() < 1e-12);
        assert!((point.positions_rad[0]).abs() < 1e-12);
        assert!((point.time_from_start_s - 1.0).abs() < 1e-12);

        cmd.validate().unwrap();
    }

    #[test]
    fn test_target_normalised() {
        let params = Params {
            target_pos_rad: vec![3.0 * PI / 2.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            ..Default::default()
        };

        let arm_ctrl = ArmCtrl::with_params(params).unwrap();

        // Shoulder pan is command slot 2; 3pi/2 wraps to -pi/2
        let point = &arm_ctrl.cmd_template.points[0];
        assert!((point.positions_rad[2] - (-FRAC_PI_2)).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_command_joint_rejected() {
        let mut params = Params::default();
        params.command_joint_names[0] = String::from("no_such_joint");

        assert!(matches!(
            ArmCtrl::with_params(params),
            Err(ArmCtrlError::JointNameMismatch(_))
        ));
    }

    #[test]
    fn test_negative_time_from_start_rejected() {
        let params = Params {
            time_from_start_s: -1.0,
            ..Default::default()
        };

        assert!(matches!(
            ArmCtrl::with_params(params),
            Err(ArmCtrlError::InvalidCmd(_))
        ));
    }

    #[test]
    fn test_wrong_name_count_rejected() {
        let mut params = Params::default();
        params.feedback_joint_names.pop();

        assert!(matches!(
            ArmCtrl::with_params(params),
            Err(ArmCtrlError::InvalidJointNameCount {
                expected: 6,
                actual: 5,
                ..
            })
        ));
    }

    #[test]
    fn test_solve_ik_from_configured_solver() {
        let arm_ctrl = ArmCtrl::with_params(Params::default()).unwrap();

        let q_true = [0.1, -1.2, 1.0, 0.3, 0.5, 0.2];
        let target = crate::kin::fk::solve(&arm_ctrl.chain, &q_true).unwrap();

        let q0: Vec<f64> = q_true.iter().map(|q| q + 0.05).collect();
        let solution = arm_ctrl.solve_ik(&target, &q0).unwrap();

        assert!(matches!(
            solution.status,
            crate::kin::IkStatus::Converged { .. }
        ));
    }

    #[test]
    fn test_proc_with_feedback() {
        let mut arm_ctrl = ArmCtrl::with_params(Params::default()).unwrap();

        let input = InputData {
            position_rad: Some(vec![0.0; 6]),
        };

        let (output, report) = arm_ctrl.proc(&input).unwrap();

        assert!(report.fk_ok);
        assert!(!report.awaiting_feedback);

        let tm = output.tool_pose_tm.unwrap();
        assert!((tm.x_m - (-0.8172)).abs() < 1e-6);
        assert!((tm.y_m - (-0.2329)).abs() < 1e-6);
        assert!((tm.z_m - 0.0628).abs() < 1e-6);

        let frame = output.tool_frame.unwrap();
        assert_eq!(frame.parent_frame, "base");
        assert_eq!(frame.child_frame, "fk_tooltip");
    }

    #[test]
    fn test_proc_without_feedback_still_commands() {
        let mut arm_ctrl = ArmCtrl::with_params(Params::default()).unwrap();

        let (output, report) = arm_ctrl.proc(&InputData::default()).unwrap();

        assert!(report.awaiting_feedback);
        assert!(output.tool_pose_tm.is_none());
        assert!(output.tool_frame.is_none());
        output.cmd.validate().unwrap();
    }

    #[test]
    fn test_proc_bad_feedback_still_commands() {
        let mut arm_ctrl = ArmCtrl::with_params(Params::default()).unwrap();

        // Wrong length, forward kinematics will fail
        let input = InputData {
            position_rad: Some(vec![0.0; 4]),
        };

        let (output, report) = arm_ctrl.proc(&input).unwrap();

        assert!(!report.fk_ok);
        assert!(output.tool_pose_tm.is_none());
        output.cmd.validate().unwrap();
    }
}
