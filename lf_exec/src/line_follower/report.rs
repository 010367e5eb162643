//! Per-tick output of the line follower

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::{
    kinematics::{Pose, Vehicle},
    steer::SensorState,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything the line follower did in one tick.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct TickReport {
    /// Time the tick was run at
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Time step used by the controller
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Pose at the end of the tick
    pub pose: Pose,

    /// Units: world units/tick
    pub speed: f64,

    /// Sensor state, `None` if the tick ended before the line was read
    /// (vehicle stopped or stopping).
    pub sensor_state: Option<SensorState>,

    pub stopped: bool,

    /// True only on the tick the stop bar was detected
    pub newly_stopped: bool,

    /// Error passed to the PID controller, `None` if it was not run
    pub error: Option<f64>,

    /// Unclamped PID output, `None` if it was not run
    ///
    /// Units: degrees
    pub pid_output: Option<f64>,

    /// Heading change applied this tick
    ///
    /// Units: degrees
    pub steering_deg: f64,

    /// Search nudge applied this tick, if any
    ///
    /// Units: degrees
    pub search_nudge_deg: Option<f64>
}

/// Flat form of [`TickReport`] for CSV archiving.
#[derive(Debug, Clone, Serialize)]
pub struct TickRecord {
    pub time_s: f64,
    pub dt_s: f64,
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
    pub speed: f64,
    pub sensor_state: String,
    pub stopped: bool,
    pub error: Option<f64>,
    pub pid_output: Option<f64>,
    pub steering_deg: f64,
    pub search_nudge_deg: Option<f64>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TickReport {
    pub(super) fn new(time_s: f64, dt_s: f64) -> Self {
        Self {
            time_s,
            dt_s,
            pose: Pose::new(0.0, 0.0, 0.0),
            speed: 0.0,
            sensor_state: None,
            stopped: false,
            newly_stopped: false,
            error: None,
            pid_output: None,
            steering_deg: 0.0,
            search_nudge_deg: None
        }
    }

    pub(super) fn fill_vehicle(&mut self, vehicle: &Vehicle) {
        self.pose = vehicle.pose;
        self.speed = vehicle.speed;
        self.stopped = vehicle.stopped;
    }
}

impl From<&TickReport> for TickRecord {
    fn from(r: &TickReport) -> Self {
        Self {
            time_s: r.time_s,
            dt_s: r.dt_s,
            x: r.pose.position.x,
            y: r.pose.position.y,
            heading_deg: r.pose.heading_deg,
            speed: r.speed,
            sensor_state: r.sensor_state.map(|s| s.to_string()).unwrap_or_default(),
            stopped: r.stopped,
            error: r.error,
            pid_output: r.pid_output,
            steering_deg: r.steering_deg,
            search_nudge_deg: r.search_nudge_deg
        }
    }
}
