//! # Stop detector
//!
//! Latches the vehicle into its terminal stopped state once both physical
//! sensors are over the stop bar on the same tick.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use serde::Serialize;

use crate::kinematics::Vehicle;
use crate::sensor::StopHits;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The stop detector.
#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct StopDetector {
    /// Time at which the stop latched
    stop_time_s: Option<f64>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StopDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if both sensors report the stop bar.
    pub fn check(left_hit_stop: bool, right_hit_stop: bool) -> bool {
        left_hit_stop && right_hit_stop
    }

    /// Update the detector with this tick's stop bar readings.
    ///
    /// Returns true on the tick the stop condition is first met, at which
    /// point the vehicle's `stopped` flag is set. Readings taken once the
    /// vehicle has stopped are ignored.
    pub fn update(&mut self, vehicle: &mut Vehicle, hits: &StopHits, time_s: f64) -> bool {
        if vehicle.stopped || !Self::check(hits.left, hits.right) {
            return false;
        }

        vehicle.stopped = true;
        vehicle.speed = 0.0;
        self.stop_time_s = Some(time_s);

        info!(
            "Stop bar detected at ({:.1}, {:.1}), vehicle stopped at {:.3} s",
            vehicle.pose.position.x, vehicle.pose.position.y, time_s
        );

        true
    }

    /// Time at which the vehicle stopped, if it has.
    pub fn stop_time_s(&self) -> Option<f64> {
        self.stop_time_s
    }

    pub fn reset(&mut self) {
        self.stop_time_s = None;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::kinematics::Pose;

    #[test]
    fn test_check_needs_both() {
        assert!(StopDetector::check(true, true));
        assert!(!StopDetector::check(true, false));
        assert!(!StopDetector::check(false, true));
        assert!(!StopDetector::check(false, false));
    }

    #[test]
    fn test_update_latches_once() {
        let mut det = StopDetector::new();
        let mut v = Vehicle::new(Pose::new(150.0, 530.0, 270.0), 1.5);

        assert!(!det.update(&mut v, &StopHits { left: true, right: false }, 1.0));
        assert!(!v.stopped);

        assert!(det.update(&mut v, &StopHits { left: true, right: true }, 2.0));
        assert!(v.stopped);
        assert_eq!(v.speed, 0.0);
        assert_eq!(det.stop_time_s(), Some(2.0));

        // Already latched, later readings change nothing
        assert!(!det.update(&mut v, &StopHits { left: true, right: true }, 3.0));
        assert!(!det.update(&mut v, &StopHits::default(), 4.0));
        assert!(v.stopped);
        assert_eq!(det.stop_time_s(), Some(2.0));
    }
}
