//! Tool pose representation and conversion

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix4, Rotation3, UnitQuaternion, Vector3};

// Internal
use comms_if::eqpt::arm::ToolPoseTm;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose of the tool (end-effector) frame relative to the arm base frame.
///
/// Orientation is kept internally as a rotation matrix, which is free of
/// representation singularities. The Euler-angle view produced by
/// [`ToolPose::to_tm`] is a derived, lossy telemetry view and is never
/// round-tripped internally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolPose {
    /// Position of the tool frame origin in the base frame.
    ///
    /// Units: meters
    pub position_m: Vector3<f64>,

    /// Attitude of the tool frame in the base frame.
    pub rotation: Rotation3<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ToolPose {
    /// The identity pose - tool frame coincident with the base frame.
    pub fn identity() -> Self {
        Self {
            position_m: Vector3::zeros(),
            rotation: Rotation3::identity(),
        }
    }

    /// Build a pose from a homogeneous transform matrix.
    ///
    /// The upper-left 3x3 block is assumed to be a proper rotation, as is
    /// always the case for transforms composed from DH segments.
    pub fn from_homogeneous(t: &Matrix4<f64>) -> Self {
        Self {
            position_m: Vector3::new(t[(0, 3)], t[(1, 3)], t[(2, 3)]),
            rotation: Rotation3::from_matrix_unchecked(t.fixed_view::<3, 3>(0, 0).into_owned()),
        }
    }

    /// Convert the pose into its Euler-angle telemetry view.
    ///
    /// The angles follow the extrinsic X-Y-Z convention (roll about the base
    /// X axis, then pitch about Y, then yaw about Z), matching
    /// [`ToolPose::from_tm`].
    ///
    /// # Notes
    /// - At pitch = +/- pi/2 the convention is gimbal-locked: roll and yaw
    ///   become degenerate and only their sum/difference is recoverable.
    ///   The returned angles still reproduce the rotation, but this view is
    ///   not invertible angle-for-angle at that boundary. This is a known
    ///   property of the telemetry view, not of the pose itself.
    pub fn to_tm(&self) -> ToolPoseTm {
        let (roll_rad, pitch_rad, yaw_rad) = self.rotation.euler_angles();

        ToolPoseTm {
            x_m: self.position_m.x,
            y_m: self.position_m.y,
            z_m: self.position_m.z,
            roll_rad,
            pitch_rad,
            yaw_rad,
        }
    }

    /// Rebuild a pose from its Euler-angle telemetry view.
    ///
    /// Uses the same extrinsic X-Y-Z convention as [`ToolPose::to_tm`], so
    /// `from_tm(to_tm(p))` reproduces `p` away from the pitch = +/- pi/2
    /// singularity (and reproduces the same rotation even at it).
    pub fn from_tm(tm: &ToolPoseTm) -> Self {
        Self {
            position_m: Vector3::new(tm.x_m, tm.y_m, tm.z_m),
            rotation: Rotation3::from_euler_angles(tm.roll_rad, tm.pitch_rad, tm.yaw_rad),
        }
    }

    /// Get the pose's attitude as a unit quaternion in `[x, y, z, w]` order,
    /// the form used by the tool frame broadcast.
    pub fn attitude_q(&self) -> [f64; 4] {
        let q = UnitQuaternion::from_rotation_matrix(&self.rotation);

        [q.i, q.j, q.k, q.w]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_euler_round_trip() {
        let pose = ToolPose {
            position_m: Vector3::new(0.1, -0.2, 0.3),
            rotation: Rotation3::from_euler_angles(0.4, -0.7, 1.2),
        };

        let back = ToolPose::from_tm(&pose.to_tm());

        assert!((pose.position_m - back.position_m).norm() < 1e-12);
        assert!((pose.rotation.matrix() - back.rotation.matrix()).norm() < 1e-12);
    }

    #[test]
    fn test_euler_round_trip_at_gimbal_lock() {
        // At pitch = pi/2 the individual roll/yaw angles are degenerate, but
        // the reconstructed rotation must still match
        let pose = ToolPose {
            position_m: Vector3::zeros(),
            rotation: Rotation3::from_euler_angles(0.3, std::f64::consts::FRAC_PI_2, -0.5),
        };

        let back = ToolPose::from_tm(&pose.to_tm());

        assert!((pose.rotation.matrix() - back.rotation.matrix()).norm() < 1e-9);
    }

    #[test]
    fn test_attitude_q_identity() {
        let q = ToolPose::identity().attitude_q();

        assert!((q[0]).abs() < 1e-12);
        assert!((q[1]).abs() < 1e-12);
        assert!((q[2]).abs() < 1e-12);
        assert!((q[3] - 1.0).abs() < 1e-12);
    }
}
