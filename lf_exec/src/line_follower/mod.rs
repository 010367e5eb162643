//! # Line follower module
//!
//! The closed control loop of the line following vehicle. Each call to
//! [`LineFollower::tick`]:
//!
//!  1. Positions the sensors from the current pose and reads the track.
//!  1. Checks the stop bar, latching the vehicle into the stopped state if
//!     both sensors see it.
//!  1. Classifies the line readings and derives the steering demand.
//!  1. Runs the PID controller (or the line search when the line is lost).
//!  1. Integrates the vehicle pose.
//!
//! Once stopped the vehicle stays put until [`LineFollower::reset`] is called.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod report;

pub use params::{Params, VehicleParams};
pub use report::{TickRecord, TickReport};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, trace};
use serde::Serialize;

use crate::{
    kinematics::{self, Vehicle},
    pid::PidController,
    sensor::{SensorModel, SensorPositions},
    steer::{self, Search, SensorState, SteerDemand},
    stop::StopDetector,
    track::TrackOracle,
    trail::Trail,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A line following vehicle bound to the track it follows.
pub struct LineFollower<O> {
    params: Params,

    sensors: SensorModel<O>,

    vehicle: Vehicle,

    pid: PidController,

    search: Search,

    stop_detector: StopDetector,

    trail: Trail,

    /// Time of the previous tick, or of the start/reset before the first one
    last_time_s: f64,

    /// Sensor state on the previous running tick
    prev_state: Option<SensorState>,

    /// Number of ticks since the start or last reset
    num_ticks: u64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur while setting up the line follower.
#[derive(Debug, thiserror::Error)]
pub enum LineFollowerError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String)
}

/// The mode of the vehicle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum LineFollowerMode {
    /// Following the line
    Running,

    /// Stopped on the stop bar, waiting for a reset
    Stopped
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<O> LineFollower<O>
where
    O: TrackOracle
{
    /// Initialise the line follower from a parameter file.
    ///
    /// `params_path` is relative to the software root's `params` directory.
    pub fn init(
        params_path: &str,
        oracle: O,
        start_time_s: f64
    ) -> Result<Self, LineFollowerError> {
        let params: Params = util::params::load(params_path)?;

        Self::new(params, oracle, start_time_s)
    }

    /// Create a new line follower with the vehicle at its start pose.
    pub fn new(
        params: Params,
        oracle: O,
        start_time_s: f64
    ) -> Result<Self, LineFollowerError> {
        params.validate()?;

        Ok(Self {
            sensors: SensorModel::new(params.sensors, oracle),
            vehicle: Vehicle::new(params.vehicle.start_pose(), params.vehicle.start_speed),
            pid: PidController::new(&params.pid),
            search: Search::new(),
            stop_detector: StopDetector::new(),
            trail: Trail::new(params.trail_len),
            last_time_s: start_time_s,
            prev_state: None,
            num_ticks: 0,
            params
        })
    }

    /// Advance the control loop to `time_s`.
    pub fn tick(&mut self, time_s: f64) -> TickReport {
        let mut dt_s = time_s - self.last_time_s;
        if !(dt_s > 0.0) {
            dt_s = self.params.min_dt_s;
        }
        self.last_time_s = time_s;
        self.num_ticks += 1;

        let mut report = TickReport::new(time_s, dt_s);

        // ---- STOP DETECTION ----

        if self.vehicle.stopped {
            report.fill_vehicle(&self.vehicle);
            return report;
        }

        let positions = self.sensors.sensor_positions(&self.vehicle.pose);
        let stop_hits = self.sensors.read_stop(&positions);

        if self.stop_detector.update(&mut self.vehicle, &stop_hits, time_s) {
            report.newly_stopped = true;
            report.fill_vehicle(&self.vehicle);
            return report;
        }

        // ---- STEERING ----

        let hits = self.sensors.read_line(&positions);
        let state = steer::classify(hits.left, hits.right, hits.center);

        if self.prev_state != Some(state) {
            debug!(
                "Sensor state {} -> {}",
                self.prev_state.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                state
            );
            self.prev_state = Some(state);
        }
        report.sensor_state = Some(state);

        let (speed, steering_deg) = match steer::derive(
            state, self.pid.prev_error(), &self.params.steer
        ) {
            // The PID controller is not run while searching, so its history is
            // left as it was when the line was lost.
            SteerDemand::Search { speed } => {
                let nudge = self.search.nudge(time_s, &self.params.steer);
                report.search_nudge_deg = nudge;
                (speed, nudge.unwrap_or(0.0))
            }
            SteerDemand::Track { error, speed } => {
                let output = self.pid.compute(error, dt_s);
                let max = self.params.steer.max_turn_rate_deg;
                report.error = Some(error);
                report.pid_output = Some(output);
                (speed, util::maths::clamp(output, -max, max))
            }
        };
        report.steering_deg = steering_deg;

        // ---- INTEGRATION ----

        kinematics::step(&mut self.vehicle, speed, steering_deg, &self.params.world);
        self.trail.push(self.vehicle.pose.position);

        report.fill_vehicle(&self.vehicle);

        trace!(
            "t = {:.3} s, state = {}, steer = {:+.3} deg, pose = ({:.2}, {:.2}, {:.2} deg)",
            time_s, state, steering_deg,
            self.vehicle.pose.position.x,
            self.vehicle.pose.position.y,
            self.vehicle.pose.heading_deg
        );

        report
    }

    /// Reset the vehicle to its start pose with fresh controller state.
    ///
    /// `time_s` is taken as the time of the previous tick for the purpose of
    /// measuring the next time step.
    pub fn reset(&mut self, time_s: f64) {
        info!(
            "Resetting line follower after {} ticks (was {:?})",
            self.num_ticks, self.mode()
        );

        self.vehicle = Vehicle::new(
            self.params.vehicle.start_pose(),
            self.params.vehicle.start_speed
        );
        self.pid.reset();
        self.search.reset();
        self.stop_detector.reset();
        self.trail.clear();
        self.last_time_s = time_s;
        self.prev_state = None;
        self.num_ticks = 0;
    }

    /// Current sensor positions, for display.
    pub fn sensor_positions(&self) -> SensorPositions {
        self.sensors.sensor_positions(&self.vehicle.pose)
    }
}

impl<O> LineFollower<O> {
    pub fn mode(&self) -> LineFollowerMode {
        if self.vehicle.stopped {
            LineFollowerMode::Stopped
        }
        else {
            LineFollowerMode::Running
        }
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Time at which the vehicle stopped, if it has since the last reset.
    pub fn stop_time_s(&self) -> Option<f64> {
        self.stop_detector.stop_time_s()
    }

    /// Number of ticks since the start or last reset.
    pub fn num_ticks(&self) -> u64 {
        self.num_ticks
    }
}

impl From<util::params::LoadError> for LineFollowerError {
    fn from(e: util::params::LoadError) -> Self {
        LineFollowerError::ParamLoadError(e)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
