//! Iterative inverse kinematics solver

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{UnitQuaternion, Vector6};

// Internal
use super::{fk, Chain, KinError, ToolPose, VelSolver};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Iterative (Newton-Raphson) inverse kinematics solver.
///
/// Repeatedly solves the linearised velocity problem and integrates the
/// result until the pose error falls below `tolerance` or `max_iterations`
/// is reached. Convergence depends on the seed: a seed in the wrong basin,
/// or close to a singularity with an undamped [`VelSolver`], can prevent
/// convergence entirely.
#[derive(Debug, Clone, Copy)]
pub struct IkSolver {
    /// Iteration cap, after which the best estimate found so far is
    /// returned with a [`IkStatus::DidNotConverge`] status.
    pub max_iterations: usize,

    /// Pose error norm below which the solve counts as converged.
    ///
    /// The error is the 6-element twist stacking the position error in
    /// meters and the rotation error as a scaled rotation axis in radians.
    pub tolerance: f64,

    /// The velocity solver used for the linearised step.
    pub vel_solver: VelSolver,
}

/// The result of an inverse kinematics solve.
///
/// Always carries a joint vector: on non-convergence it is the best (lowest
/// pose error) estimate encountered, which callers may still use as a seed
/// for a retry.
#[derive(Debug, Clone)]
pub struct IkSolution {
    /// The solved (or best-estimate) joint angles.
    ///
    /// Units: radians
    pub q_rad: Vec<f64>,

    /// Whether the solve converged.
    pub status: IkStatus,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Convergence status of an inverse kinematics solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IkStatus {
    /// The pose error norm fell below the tolerance.
    Converged {
        /// Number of iterations taken.
        iterations: usize,
    },

    /// The iteration cap was reached first.
    DidNotConverge {
        /// Pose error norm of the returned best estimate.
        error_norm: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for IkSolver {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-4,
            vel_solver: VelSolver::default(),
        }
    }
}

impl IkSolver {
    /// Solve for the joint angles reaching the target pose, starting from
    /// the given seed.
    ///
    /// # Outputs
    /// - On success an [`IkSolution`] - check its `status` for convergence.
    /// - `KinError::DimensionMismatch` if the seed has the wrong length.
    /// - `KinError::NearSingular` if an undamped velocity solve hits a
    ///   singular configuration during iteration.
    pub fn solve(
        &self,
        chain: &Chain,
        target: &ToolPose,
        q0_rad: &[f64],
    ) -> Result<IkSolution, KinError> {
        let mut q = q0_rad.to_vec();

        let mut best_q = q.clone();
        let mut best_err = f64::INFINITY;

        for iter in 0..self.max_iterations {
            let current = fk::solve(chain, &q)?;
            let error = pose_error(target, &current);
            let error_norm = error.norm();

            if error_norm < best_err {
                best_err = error_norm;
                best_q = q.clone();
            }

            if error_norm <= self.tolerance {
                return Ok(IkSolution {
                    q_rad: q,
                    status: IkStatus::Converged { iterations: iter },
                });
            }

            let qdot = self.vel_solver.solve(chain, &q, &error)?;

            for (qi, qd) in q.iter_mut().zip(qdot.iter()) {
                *qi += qd;
            }
        }

        Ok(IkSolution {
            q_rad: best_q,
            status: IkStatus::DidNotConverge {
                error_norm: best_err,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// The twist carrying `current` onto `target`, in the base frame.
///
/// The angular part is the scaled axis of the relative rotation, which is
/// well defined for any rotation error below pi radians.
fn pose_error(target: &ToolPose, current: &ToolPose) -> Vector6<f64> {
    let dp = target.position_m - current.position_m;

    let rel = target.rotation * current.rotation.inverse();
    let dr = UnitQuaternion::from_rotation_matrix(&rel).scaled_axis();

    Vector6::new(dp.x, dp.y, dp.z, dr.x, dr.y, dr.z)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kin::Chain;

    #[test]
    fn test_ik_recovers_known_config() {
        let chain = Chain::ur5e();
        let solver = IkSolver::default();

        let q_true = [0.1, -1.2, 1.0, 0.3, 0.5, 0.2];
        let target = fk::solve(&chain, &q_true).unwrap();

        // Seed slightly off the true solution
        let q0: Vec<f64> = q_true.iter().map(|q| q + 0.05).collect();

        let solution = solver.solve(&chain, &target, &q0).unwrap();

        assert!(
            matches!(solution.status, IkStatus::Converged { .. }),
            "solve did not converge: {:?}",
            solution.status
        );

        // The solved config must reach the target pose, though it need not
        // equal q_true joint for joint
        let reached = fk::solve(&chain, &solution.q_rad).unwrap();
        assert!((reached.position_m - target.position_m).norm() < 1e-3);
        assert!((reached.rotation.matrix() - target.rotation.matrix()).norm() < 1e-3);
    }

    #[test]
    fn test_ik_reports_non_convergence() {
        let chain = Chain::ur5e();
        let solver = IkSolver {
            max_iterations: 2,
            tolerance: 1e-12,
            ..Default::default()
        };

        let q_true = [0.1, -1.2, 1.0, 0.3, 0.5, 0.2];
        let target = fk::solve(&chain, &q_true).unwrap();

        // Seed far from the solution, with far too few iterations allowed
        let q0 = [1.5, -0.2, -1.0, 1.2, -0.8, 2.0];

        let solution = solver.solve(&chain, &target, &q0).unwrap();

        match solution.status {
            IkStatus::DidNotConverge { error_norm } => {
                assert!(error_norm.is_finite());
                assert!(error_norm > 1e-12);
            }
            other => panic!("expected non-convergence, got {:?}", other),
        }

        assert_eq!(solution.q_rad.len(), 6);
    }

    #[test]
    fn test_ik_converges_immediately_at_target() {
        let chain = Chain::ur5e();
        let solver = IkSolver::default();

        let q_true = [0.1, -1.2, 1.0, 0.3, 0.5, 0.2];
        let target = fk::solve(&chain, &q_true).unwrap();

        let solution = solver.solve(&chain, &target, &q_true).unwrap();

        assert_eq!(solution.status, IkStatus::Converged { iterations: 0 });
    }
}
