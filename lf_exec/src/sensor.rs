//! # Sensor module
//!
//! Models the two binary line sensors mounted ahead of the vehicle, plus the
//! virtual centre sensor half way between them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::kinematics::Pose;
use crate::track::TrackOracle;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Mounting geometry of the sensors, fixed for the lifetime of the vehicle.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct SensorParams {
    /// Distance ahead of the vehicle centre, along the heading, of the sensor
    /// bar.
    ///
    /// Units: world units
    pub forward_offset: f64,

    /// Distance of each sensor from the centre of the sensor bar.
    ///
    /// Units: world units
    pub lateral_offset: f64,

    /// Half size of the square sampled by each sensor.
    ///
    /// Units: world units
    pub tolerance: f64
}

/// World positions of the sensors.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SensorPositions {
    pub left: Vector2<f64>,
    pub right: Vector2<f64>,
    pub center: Vector2<f64>
}

/// Which sensors see the guide line.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineHits {
    pub left: bool,
    pub right: bool,
    pub center: bool
}

/// Which of the two physical sensors see the stop bar.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StopHits {
    pub left: bool,
    pub right: bool
}

/// The sensor model, bound to the track it reads.
#[derive(Debug, Clone)]
pub struct SensorModel<O> {
    params: SensorParams,
    oracle: O
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            forward_offset: 30.0,
            lateral_offset: 20.0,
            tolerance: 5.0
        }
    }
}

impl<O> SensorModel<O>
where
    O: TrackOracle
{
    pub fn new(params: SensorParams, oracle: O) -> Self {
        Self { params, oracle }
    }

    /// Compute the sensor positions for the given pose.
    pub fn sensor_positions(&self, pose: &Pose) -> SensorPositions {
        let forward = pose.forward();

        // Perpendicular to the heading, pointing to the left sensor
        let lateral = Vector2::new(-forward.y, forward.x);

        let bar_centre = pose.position + forward * self.params.forward_offset;
        let left = bar_centre + lateral * self.params.lateral_offset;
        let right = bar_centre - lateral * self.params.lateral_offset;

        SensorPositions {
            left,
            right,
            center: (left + right) / 2.0
        }
    }

    /// Returns true if the sensor at `point` sees the guide line.
    pub fn query(&self, point: &Vector2<f64>) -> bool {
        self.oracle.hit_test_line(point.x, point.y, self.params.tolerance)
    }

    /// Returns true if the sensor at `point` sees the stop bar.
    pub fn query_stop(&self, point: &Vector2<f64>) -> bool {
        self.oracle.hit_test_stop_bar(point.x, point.y, self.params.tolerance)
    }

    /// Read all three sensors against the guide line.
    pub fn read_line(&self, positions: &SensorPositions) -> LineHits {
        LineHits {
            left: self.query(&positions.left),
            right: self.query(&positions.right),
            center: self.query(&positions.center)
        }
    }

    /// Read the two physical sensors against the stop bar.
    pub fn read_stop(&self, positions: &SensorPositions) -> StopHits {
        StopHits {
            left: self.query_stop(&positions.left),
            right: self.query_stop(&positions.right)
        }
    }

    pub fn params(&self) -> &SensorParams {
        &self.params
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
