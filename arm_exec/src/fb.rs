//! Joint feedback snapshot
//!
//! Maintains the latest sensed joint positions recieved from the arm
//! controller. The snapshot is owned by the data store and written only by
//! the executive when it drains the feedback channel at the start of each
//! cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use comms_if::eqpt::arm::JointStateMsg;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The latest sensed joint positions.
#[derive(Debug, Clone, Default)]
pub struct FeedbackSnapshot {
    /// Sensed joint positions, in the feedback joint order.
    ///
    /// Units: radians
    position_rad: Vec<f64>,

    /// Whether the snapshot has been sized by a first message.
    initialised: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur when ingesting a feedback message.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("Feedback message has {actual} joints but the snapshot has {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FeedbackSnapshot {
    /// Ingest a feedback message into the snapshot.
    ///
    /// The very first message only sizes the snapshot: the vector is
    /// allocated zero-filled to the message's length and the message's
    /// values are dropped. This reproduces the behaviour of the deployed
    /// controller, whose consumers saw an all-zero snapshot until the
    /// second message arrived. Every later message is copied index-wise.
    ///
    /// # Outputs
    /// - `FeedbackError::DimensionMismatch` if a later message's length
    ///   differs from the snapshot's. The snapshot keeps its previous
    ///   values.
    pub fn ingest(&mut self, msg: &JointStateMsg) -> Result<(), FeedbackError> {
        if !self.initialised {
            self.position_rad = vec![0.0; msg.position_rad.len()];
            self.initialised = true;
            return Ok(());
        }

        if msg.position_rad.len() != self.position_rad.len() {
            return Err(FeedbackError::DimensionMismatch {
                expected: self.position_rad.len(),
                actual: msg.position_rad.len(),
            });
        }

        self.position_rad.copy_from_slice(&msg.position_rad);

        Ok(())
    }

    /// Get the sensed joint positions, or `None` if no message has been
    /// recieved yet.
    pub fn position_rad(&self) -> Option<&[f64]> {
        if self.initialised {
            Some(&self.position_rad)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn msg(position_rad: Vec<f64>) -> JointStateMsg {
        JointStateMsg { position_rad }
    }

    #[test]
    fn test_empty_before_first_message() {
        let snapshot = FeedbackSnapshot::default();

        assert!(snapshot.position_rad().is_none());
    }

    #[test]
    fn test_first_message_sizes_but_zero_fills() {
        let mut snapshot = FeedbackSnapshot::default();

        snapshot.ingest(&msg(vec![0.5, -0.3, 1.2])).unwrap();

        // Sized to the message but the values are dropped
        assert_eq!(snapshot.position_rad(), Some(&[0.0, 0.0, 0.0][..]));
    }

    #[test]
    fn test_second_message_overwrites() {
        let mut snapshot = FeedbackSnapshot::default();

        snapshot.ingest(&msg(vec![0.5, -0.3, 1.2])).unwrap();
        snapshot.ingest(&msg(vec![0.6, -0.2, 1.1])).unwrap();

        assert_eq!(snapshot.position_rad(), Some(&[0.6, -0.2, 1.1][..]));
    }

    #[test]
    fn test_mismatched_message_rejected() {
        let mut snapshot = FeedbackSnapshot::default();

        snapshot.ingest(&msg(vec![0.0; 6])).unwrap();
        snapshot.ingest(&msg(vec![0.1; 6])).unwrap();

        let result = snapshot.ingest(&msg(vec![0.9; 4]));

        assert!(matches!(
            result,
            Err(FeedbackError::DimensionMismatch {
                expected: 6,
                actual: 4
            })
        ));

        // Previous values are kept
        assert_eq!(snapshot.position_rad(), Some(&[0.1; 6][..]));
    }
}
