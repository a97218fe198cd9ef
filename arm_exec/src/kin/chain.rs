//! Kinematic chain model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::FRAC_PI_2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Denavit-Hartenberg constants for a single segment.
///
/// These four scalars fully describe the rigid transform from the previous
/// segment's frame to this one, parameterised by the joint angle for
/// revolute segments.
#[derive(Debug, Clone, Copy)]
pub struct DhParams {
    /// Link length.
    ///
    /// Units: meters
    pub a_m: f64,

    /// Link twist.
    ///
    /// Units: radians
    pub alpha_rad: f64,

    /// Link offset.
    ///
    /// Units: meters
    pub d_m: f64,

    /// Joint angle offset, added to the commanded/sensed joint angle.
    ///
    /// Units: radians
    pub theta0_rad: f64,
}

/// A single segment of the chain: a joint plus the DH transform it drives.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub joint_type: JointType,
    pub dh: DhParams,
}

/// The kinematic chain itself.
///
/// Immutable after construction and shared read-only by all solvers.
#[derive(Debug, Clone)]
pub struct Chain {
    segments: Vec<Segment>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The type of joint driving a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointType {
    /// Non-actuated segment, the DH transform is constant.
    Fixed,

    /// Revolute joint about the local Z axis.
    RevoluteZ,
}

/// Possible errors that can occur when building a chain.
///
/// Chain construction happens once at startup, so these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Segment {0} contains a non-finite DH parameter")]
    NonFiniteDh(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Chain {
    /// Build a chain from the given segments, checking that all DH data is
    /// finite.
    pub fn new(segments: Vec<Segment>) -> Result<Self, ChainError> {
        for (i, seg) in segments.iter().enumerate() {
            let finite = seg.dh.a_m.is_finite()
                && seg.dh.alpha_rad.is_finite()
                && seg.dh.d_m.is_finite()
                && seg.dh.theta0_rad.is_finite();

            if !finite {
                return Err(ChainError::NonFiniteDh(i));
            }
        }

        Ok(Self { segments })
    }

    /// Build the UR5e chain.
    ///
    /// Segment 0 is the fixed base transform, segments 1 to 6 are the six
    /// revolute joints in serial order (shoulder pan out to wrist 3). The DH
    /// constants match the physical device's frame conventions and must not
    /// be altered.
    pub fn ur5e() -> Self {
        let dh = |a_m, alpha_rad, d_m, theta0_rad| DhParams {
            a_m,
            alpha_rad,
            d_m,
            theta0_rad,
        };

        Self {
            segments: vec![
                // Base
                Segment {
                    joint_type: JointType::Fixed,
                    dh: dh(0.0, 0.0, 0.0, 0.0),
                },
                // Shoulder pan
                Segment {
                    joint_type: JointType::RevoluteZ,
                    dh: dh(0.0, FRAC_PI_2, 0.1625, 0.0),
                },
                // Shoulder lift
                Segment {
                    joint_type: JointType::RevoluteZ,
                    dh: dh(-0.425, 0.0, 0.0, 0.0),
                },
                // Elbow
                Segment {
                    joint_type: JointType::RevoluteZ,
                    dh: dh(-0.3922, 0.0, 0.0, 0.0),
                },
                // Wrist 1
                Segment {
                    joint_type: JointType::RevoluteZ,
                    dh: dh(0.0, FRAC_PI_2, 0.1333, 0.0),
                },
                // Wrist 2
                Segment {
                    joint_type: JointType::RevoluteZ,
                    dh: dh(0.0, -FRAC_PI_2, 0.0997, 0.0),
                },
                // Wrist 3
                Segment {
                    joint_type: JointType::RevoluteZ,
                    dh: dh(0.0, 0.0, 0.0996, 0.0),
                },
            ],
        }
    }

    /// Get the number of actuated joints in the chain.
    pub fn num_joints(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.joint_type == JointType::RevoluteZ)
            .count()
    }

    /// Get the chain's segments, base first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ur5e_chain_shape() {
        let chain = Chain::ur5e();

        assert_eq!(chain.segments().len(), 7);
        assert_eq!(chain.num_joints(), 6);
        assert_eq!(chain.segments()[0].joint_type, JointType::Fixed);
    }

    #[test]
    fn test_non_finite_dh_rejected() {
        let result = Chain::new(vec![Segment {
            joint_type: JointType::RevoluteZ,
            dh: DhParams {
                a_m: f64::NAN,
                alpha_rad: 0.0,
                d_m: 0.0,
                theta0_rad: 0.0,
            },
        }]);

        assert!(matches!(result, Err(ChainError::NonFiniteDh(0))));
    }
}
