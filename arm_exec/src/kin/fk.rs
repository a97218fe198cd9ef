//! Forward kinematics solver

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Matrix4;

// Internal
use super::{Chain, JointType, KinError, ToolPose};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The intermediate frames of the chain at a given configuration.
///
/// Used by the Jacobian builder, which needs each joint's axis and origin as
/// well as the tip.
pub(crate) struct ChainFrames {
    /// For each actuated joint, the accumulated transform of the frame the
    /// joint rotates in (i.e. before the joint's own DH transform is
    /// applied). In the DH convention joint `i` rotates about the Z axis of
    /// frame `i - 1`.
    pub joint_frames: Vec<Matrix4<f64>>,

    /// The accumulated transform of the tool (tip) frame.
    pub tip: Matrix4<f64>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Solve the forward kinematics of the chain at the given joint angles.
///
/// Composes the fixed base transform and each joint's DH transform
/// (parameterised by `theta0 + angle`) left to right.
///
/// # Outputs
/// - On success the tool pose in the base frame.
/// - `KinError::DimensionMismatch` if `q_rad` does not have one angle per
///   actuated joint.
pub fn solve(chain: &Chain, q_rad: &[f64]) -> Result<ToolPose, KinError> {
    let frames = frames(chain, q_rad)?;

    Ok(ToolPose::from_homogeneous(&frames.tip))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute all intermediate frames of the chain at the given joint angles.
pub(crate) fn frames(chain: &Chain, q_rad: &[f64]) -> Result<ChainFrames, KinError> {
    if q_rad.len() != chain.num_joints() {
        return Err(KinError::DimensionMismatch {
            expected: chain.num_joints(),
            actual: q_rad.len(),
        });
    }

    let mut joint_frames = Vec::with_capacity(chain.num_joints());
    let mut tip = Matrix4::identity();
    let mut angles = q_rad.iter();

    for seg in chain.segments() {
        let theta_rad = match seg.joint_type {
            JointType::Fixed => seg.dh.theta0_rad,
            JointType::RevoluteZ => {
                // The frame recorded here is the one the joint rotates in
                joint_frames.push(tip);

                // Length was checked above so the iterator cannot run dry
                let angle = angles.next().copied().unwrap_or(0.0);
                seg.dh.theta0_rad + angle
            }
        };

        tip *= dh_matrix(seg.dh.a_m, seg.dh.alpha_rad, seg.dh.d_m, theta_rad);
    }

    Ok(ChainFrames { joint_frames, tip })
}

/// The standard DH homogeneous transform for one segment:
/// `RotZ(theta) * TransZ(d) * TransX(a) * RotX(alpha)`.
fn dh_matrix(a_m: f64, alpha_rad: f64, d_m: f64, theta_rad: f64) -> Matrix4<f64> {
    let (st, ct) = theta_rad.sin_cos();
    let (sa, ca) = alpha_rad.sin_cos();

    Matrix4::new(
        ct, -st * ca, st * sa, a_m * ct, //
        st, ct * ca, -ct * sa, a_m * st, //
        0.0, sa, ca, d_m, //
        0.0, 0.0, 0.0, 1.0,
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kin::Chain;
    use nalgebra::{Matrix3, Vector3};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_fk_deterministic() {
        let chain = Chain::ur5e();
        let q = [0.3, -0.9, 1.1, -0.2, 0.7, -1.4];

        let a = solve(&chain, &q).unwrap();
        let b = solve(&chain, &q).unwrap();

        assert_eq!(a.position_m, b.position_m);
        assert_eq!(a.rotation, b.rotation);
    }

    #[test]
    fn test_fk_dimension_mismatch() {
        let chain = Chain::ur5e();

        let result = solve(&chain, &[0.0; 5]);

        assert!(matches!(
            result,
            Err(KinError::DimensionMismatch {
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_fk_zero_configuration() {
        // At the all-zero configuration the tool position follows directly
        // from summing the DH link lengths/offsets:
        //   x = a2 + a3 = -0.8172
        //   y = -(d4 + d6) = -0.2329
        //   z = d1 - d5 = 0.0628
        let chain = Chain::ur5e();

        let pose = solve(&chain, &[0.0; 6]).unwrap();

        assert!((pose.position_m.x - (-0.8172)).abs() < 1e-6);
        assert!((pose.position_m.y - (-0.2329)).abs() < 1e-6);
        assert!((pose.position_m.z - 0.0628).abs() < 1e-6);
    }

    #[test]
    fn test_fk_shoulder_lift_down() {
        // Shoulder lift at -pi/2 points the upper and forearm straight up.
        // Composing the six DH transforms by hand gives:
        //   position = (-d5, -(d4 + d6), d1 + |a2| + |a3|)
        //   rotation = [[0, 1, 0], [0, 0, -1], [-1, 0, 0]]
        let chain = Chain::ur5e();
        let q = [0.0, -FRAC_PI_2, 0.0, 0.0, 0.0, 0.0];

        let pose = solve(&chain, &q).unwrap();

        let expected_pos = Vector3::new(-0.0997, -0.2329, 0.9797);
        assert!(
            (pose.position_m - expected_pos).norm() < 1e-6,
            "tool position {} differs from analytic {}",
            pose.position_m,
            expected_pos
        );

        let expected_rot = Matrix3::new(
            0.0, 1.0, 0.0, //
            0.0, 0.0, -1.0, //
            -1.0, 0.0, 0.0,
        );
        assert!((pose.rotation.matrix() - expected_rot).norm() < 1e-6);
    }

    #[test]
    fn test_frames_count() {
        let chain = Chain::ur5e();

        let frames = frames(&chain, &[0.0; 6]).unwrap();

        assert_eq!(frames.joint_frames.len(), 6);
    }
}
