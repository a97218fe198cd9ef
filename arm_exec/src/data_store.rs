//! # Executive data store
//!
//! The data store is the central frame of data within the executive. It
//! contains all the data that modules will use during their processing, and
//! is the only container passed around between module processing functions.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::arm_ctrl;
use crate::fb::FeedbackSnapshot;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Executive data store
#[derive(Default)]
pub struct DataStore {
    /// Number of cycles already executed.
    pub num_cycles: u128,

    /// True when the current cycle falls on a whole second boundary, used
    /// to throttle periodic reporting.
    pub is_1_hz_cycle: bool,

    /// Elapsed executive time.
    ///
    /// Units: seconds
    pub sim_time_s: f64,

    /// The latest joint feedback.
    pub feedback: FeedbackSnapshot,

    // ARM CONTROL
    pub arm_ctrl: arm_ctrl::ArmCtrl,
    pub arm_ctrl_input: arm_ctrl::InputData,
    pub arm_ctrl_output: Option<arm_ctrl::OutputData>,
    pub arm_ctrl_status_rpt: arm_ctrl::StatusReport,

    // MONITORING COUNTERS
    /// Number of consecutive cycles which have overrun their period.
    pub num_consec_cycle_overruns: u64,

    /// Number of feedback messages rejected for a dimension mismatch.
    pub num_fb_rejections: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform the start of cycle updates on the data in the store.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.sim_time_s = self.num_cycles as f64 / cycle_frequency_hz;

        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz.round() as u128).max(1) == 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cycle_start_timing() {
        let mut ds = DataStore::default();

        ds.cycle_start(10.0);
        assert!(ds.is_1_hz_cycle);
        assert!((ds.sim_time_s - 0.0).abs() < 1e-12);

        ds.num_cycles = 15;
        ds.cycle_start(10.0);
        assert!(!ds.is_1_hz_cycle);
        assert!((ds.sim_time_s - 1.5).abs() < 1e-12);

        ds.num_cycles = 20;
        ds.cycle_start(10.0);
        assert!(ds.is_1_hz_cycle);
    }
}
