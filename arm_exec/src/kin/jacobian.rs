//! Jacobian velocity solver
//!
//! Maps desired tool-frame twists to joint velocities through the geometric
//! Jacobian. Two inversion strategies are provided: the exact pseudo-inverse,
//! which rejects near-singular configurations, and damped least squares,
//! which trades tracking accuracy for bounded velocities near singularities.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{DMatrix, DVector, Vector3, Vector6};

// Internal
use super::{fk, Chain, KinError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Solver mapping a desired tool-frame twist to joint velocities.
#[derive(Debug, Clone, Copy)]
pub struct VelSolver {
    /// Damping factor for the damped least squares inversion.
    ///
    /// Zero selects the exact pseudo-inverse, which fails with
    /// [`KinError::NearSingular`] close to singular configurations. A
    /// positive value keeps the solve well-conditioned everywhere at the
    /// cost of some tracking accuracy.
    pub damping: f64,

    /// Smallest acceptable singular value for the exact pseudo-inverse.
    ///
    /// Ignored when `damping` is positive.
    pub min_singular_value: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for VelSolver {
    fn default() -> Self {
        Self {
            damping: 0.0,
            min_singular_value: 1e-6,
        }
    }
}

impl VelSolver {
    /// Solve for the joint velocities producing the given tool-frame twist
    /// at the given configuration.
    ///
    /// The twist is `[vx, vy, vz, wx, wy, wz]` in the base frame.
    ///
    /// # Outputs
    /// - On success the joint velocity vector, one entry per actuated joint.
    /// - `KinError::DimensionMismatch` if `q_rad` has the wrong length.
    /// - `KinError::NearSingular` if `damping` is zero and the Jacobian's
    ///   smallest singular value is below `min_singular_value`.
    pub fn solve(
        &self,
        chain: &Chain,
        q_rad: &[f64],
        twist: &Vector6<f64>,
    ) -> Result<Vec<f64>, KinError> {
        let jac = jacobian(chain, q_rad)?;

        let qdot = if self.damping > 0.0 {
            self.solve_damped(&jac, twist)
        } else {
            self.solve_pinv(&jac, twist)?
        };

        Ok(qdot.iter().copied().collect())
    }

    /// Damped least squares: `qdot = J^T (J J^T + lambda^2 I)^-1 twist`.
    ///
    /// The damped normal matrix is positive definite for any `lambda > 0`,
    /// so the LU solve cannot fail.
    fn solve_damped(&self, jac: &DMatrix<f64>, twist: &Vector6<f64>) -> DVector<f64> {
        let jjt = jac * jac.transpose();
        let damped = jjt + DMatrix::identity(6, 6).scale(self.damping * self.damping);

        let rhs = DVector::from_column_slice(twist.as_slice());
        let y = damped
            .lu()
            .solve(&rhs)
            .unwrap_or_else(|| DVector::zeros(6));

        jac.transpose() * y
    }

    /// Exact pseudo-inverse via SVD, rejecting ill-conditioned Jacobians.
    fn solve_pinv(
        &self,
        jac: &DMatrix<f64>,
        twist: &Vector6<f64>,
    ) -> Result<DVector<f64>, KinError> {
        let svd = jac.clone().svd(true, true);

        let min_sv = svd
            .singular_values
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);

        if min_sv < self.min_singular_value {
            return Err(KinError::NearSingular {
                min_singular_value: min_sv,
            });
        }

        let rhs = DVector::from_column_slice(twist.as_slice());

        // Unreachable: both U and V^T were requested above
        svd.solve(&rhs, 0.0)
            .map_err(|_| KinError::NearSingular {
                min_singular_value: min_sv,
            })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the 6 x N geometric Jacobian of the chain at the given
/// configuration.
///
/// Column `i` is the tool-frame twist produced by unit velocity on joint
/// `i`: the linear part is `z_i x (p_tip - p_i)` and the angular part is
/// `z_i`, where `z_i` and `p_i` are the joint's axis and origin in the base
/// frame.
pub fn jacobian(chain: &Chain, q_rad: &[f64]) -> Result<DMatrix<f64>, KinError> {
    let frames = fk::frames(chain, q_rad)?;

    let p_tip = Vector3::new(frames.tip[(0, 3)], frames.tip[(1, 3)], frames.tip[(2, 3)]);

    let mut jac = DMatrix::zeros(6, frames.joint_frames.len());

    for (i, frame) in frames.joint_frames.iter().enumerate() {
        let z = Vector3::new(frame[(0, 2)], frame[(1, 2)], frame[(2, 2)]);
        let p = Vector3::new(frame[(0, 3)], frame[(1, 3)], frame[(2, 3)]);

        let linear = z.cross(&(p_tip - p));

        jac[(0, i)] = linear.x;
        jac[(1, i)] = linear.y;
        jac[(2, i)] = linear.z;
        jac[(3, i)] = z.x;
        jac[(4, i)] = z.y;
        jac[(5, i)] = z.z;
    }

    Ok(jac)
}
