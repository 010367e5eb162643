//! Line follower parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::{
    kinematics::{Pose, WorldParams},
    pid::PidParams,
    sensor::SensorParams,
    steer::SteerParams,
};
use super::LineFollowerError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the line follower.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Params {
    pub pid: PidParams,

    pub sensors: SensorParams,

    pub steer: SteerParams,

    pub vehicle: VehicleParams,

    pub world: WorldParams,

    /// Maximum number of positions kept in the trail.
    pub trail_len: usize,

    /// Time step used when the measured time step is not positive.
    ///
    /// Units: seconds
    pub min_dt_s: f64
}

/// Initial state of the vehicle, restored on every reset.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct VehicleParams {
    /// Units: world units
    pub start_position: [f64; 2],

    /// Units: degrees
    pub start_heading_deg: f64,

    /// Units: world units/tick
    pub start_speed: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            pid: PidParams::default(),
            sensors: SensorParams::default(),
            steer: SteerParams::default(),
            vehicle: VehicleParams::default(),
            world: WorldParams::default(),
            trail_len: 100,
            min_dt_s: 0.001
        }
    }
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            start_position: [150.0, 500.0],
            start_heading_deg: 270.0,
            start_speed: 1.5
        }
    }
}

impl VehicleParams {
    pub fn start_pose(&self) -> Pose {
        Pose::new(
            self.start_position[0],
            self.start_position[1],
            self.start_heading_deg
        )
    }
}

impl Params {
    /// Check the parameters are consistent.
    pub fn validate(&self) -> Result<(), LineFollowerError> {
        let invalid = |msg: String| Err(LineFollowerError::InvalidParams(msg));

        let values = [
            ("pid.k_p", self.pid.k_p),
            ("pid.k_i", self.pid.k_i),
            ("pid.k_d", self.pid.k_d),
            ("pid.deriv_damping", self.pid.deriv_damping),
            ("pid.integral_limit", self.pid.integral_limit),
            ("pid.smoothing", self.pid.smoothing),
            ("sensors.forward_offset", self.sensors.forward_offset),
            ("sensors.lateral_offset", self.sensors.lateral_offset),
            ("sensors.tolerance", self.sensors.tolerance),
            ("steer.edge_error", self.steer.edge_error),
            ("steer.center_error_gain", self.steer.center_error_gain),
            ("steer.search_speed", self.steer.search_speed),
            ("steer.edge_speed", self.steer.edge_speed),
            ("steer.center_speed", self.steer.center_speed),
            ("steer.both_speed", self.steer.both_speed),
            ("steer.search_period_s", self.steer.search_period_s),
            ("steer.search_nudge_deg", self.steer.search_nudge_deg),
            ("steer.max_turn_rate_deg", self.steer.max_turn_rate_deg),
            ("vehicle.start_position[0]", self.vehicle.start_position[0]),
            ("vehicle.start_position[1]", self.vehicle.start_position[1]),
            ("vehicle.start_heading_deg", self.vehicle.start_heading_deg),
            ("vehicle.start_speed", self.vehicle.start_speed),
            ("world.width", self.world.width),
            ("world.height", self.world.height),
            ("world.margin", self.world.margin),
            ("min_dt_s", self.min_dt_s),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return invalid(format!("{} must be finite, found {}", name, value));
        }

        if !(self.pid.integral_limit >= 0.0) {
            return invalid(format!(
                "pid.integral_limit must not be negative, found {}", self.pid.integral_limit
            ));
        }
        if !(0.0..=1.0).contains(&self.pid.smoothing) {
            return invalid(format!(
                "pid.smoothing must be in [0, 1], found {}", self.pid.smoothing
            ));
        }
        if !(self.sensors.tolerance >= 0.0) {
            return invalid(format!(
                "sensors.tolerance must not be negative, found {}", self.sensors.tolerance
            ));
        }
        if !(self.steer.max_turn_rate_deg >= 0.0) {
            return invalid(format!(
                "steer.max_turn_rate_deg must not be negative, found {}",
                self.steer.max_turn_rate_deg
            ));
        }
        if !(self.steer.search_period_s >= 0.0) {
            return invalid(format!(
                "steer.search_period_s must not be negative, found {}",
                self.steer.search_period_s
            ));
        }
        if !(self.world.margin >= 0.0)
            || !(self.world.width > 2.0 * self.world.margin)
            || !(self.world.height > 2.0 * self.world.margin)
        {
            return invalid(format!(
                "world of {} x {} is too small for a margin of {}",
                self.world.width, self.world.height, self.world.margin
            ));
        }
        if self.trail_len == 0 {
            return invalid("trail_len must be at least 1".into());
        }
        if !(self.min_dt_s > 0.0) {
            return invalid(format!("min_dt_s must be positive, found {}", self.min_dt_s));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file_matches_default() {
        let params: Params = util::params::from_str(
            include_str!("../../../params/line_follower.toml")
        ).unwrap();

        assert_eq!(params, Params::default());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        let mut p = Params::default();
        p.world.margin = 400.0;
        assert!(matches!(p.validate(), Err(LineFollowerError::InvalidParams(_))));

        let mut p = Params::default();
        p.pid.smoothing = 1.5;
        assert!(p.validate().is_err());

        let mut p = Params::default();
        p.trail_len = 0;
        assert!(p.validate().is_err());

        let mut p = Params::default();
        p.min_dt_s = 0.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let mut p = Params::default();
        p.pid.k_p = f64::NAN;
        match p.validate() {
            Err(LineFollowerError::InvalidParams(msg)) => assert!(msg.contains("pid.k_p")),
            other => panic!("Expected InvalidParams, got {:?}", other)
        }

        let mut p = Params::default();
        p.steer.both_speed = f64::INFINITY;
        assert!(matches!(p.validate(), Err(LineFollowerError::InvalidParams(_))));

        let mut p = Params::default();
        p.sensors.lateral_offset = f64::NEG_INFINITY;
        assert!(matches!(p.validate(), Err(LineFollowerError::InvalidParams(_))));
    }
}
