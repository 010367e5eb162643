//! # Steering state machine
//!
//! Classifies the sensor readings into a [`SensorState`] and derives the
//! steering demand for the tick from it. When the line is lost the vehicle
//! switches to an open loop search which nudges the heading periodically.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;
use log::debug;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the steering state machine.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct SteerParams {
    /// Magnitude of the error used when only one edge sensor sees the line.
    /// The error is positive for the left sensor.
    pub edge_error: f64,

    /// Gain applied to the previous PID error when only the centre sensor
    /// sees the line.
    pub center_error_gain: f64,

    /// Speed while searching for the line.
    ///
    /// Units: world units/tick
    pub search_speed: f64,

    /// Speed when one edge sensor sees the line.
    ///
    /// Units: world units/tick
    pub edge_speed: f64,

    /// Speed when only the centre sensor sees the line.
    ///
    /// Units: world units/tick
    pub center_speed: f64,

    /// Speed when both sensors see the line.
    ///
    /// Units: world units/tick
    pub both_speed: f64,

    /// Minimum time between two search nudges.
    ///
    /// Units: seconds
    pub search_period_s: f64,

    /// Size of a search nudge.
    ///
    /// Units: degrees
    pub search_nudge_deg: f64,

    /// Limit applied to the PID output before it is applied to the heading.
    ///
    /// Units: degrees/tick
    pub max_turn_rate_deg: f64
}

/// Timing of the line-lost search behaviour.
#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct Search {
    /// Time of the last nudge, `None` if there hasn't been one yet
    last_nudge_time_s: Option<f64>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Discrete state of the line sensors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorState {
    /// No sensor sees the line
    None,

    /// Only the left sensor sees the line
    Left,

    /// Only the right sensor sees the line
    Right,

    /// Neither edge sensor sees the line but the centre does
    Center,

    /// Both edge sensors see the line
    Both
}

/// What the steering state machine asks of the controller this tick.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub enum SteerDemand {
    /// Steer with the PID controller towards zero error
    Track {
        error: f64,
        speed: f64
    },

    /// The line is lost, search for it without using the PID controller
    Search {
        speed: f64
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SteerParams {
    fn default() -> Self {
        Self {
            edge_error: 3.0,
            center_error_gain: 0.5,
            search_speed: 0.8,
            edge_speed: 1.0,
            center_speed: 1.3,
            both_speed: 1.5,
            search_period_s: 0.5,
            search_nudge_deg: 2.0,
            max_turn_rate_deg: 3.0
        }
    }
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SensorState::None => "NONE",
            SensorState::Left => "LEFT",
            SensorState::Right => "RIGHT",
            SensorState::Center => "CENTER",
            SensorState::Both => "BOTH"
        };
        f.write_str(s)
    }
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the heading nudge to apply at `time_s`, if one is due.
    ///
    /// A nudge is due on the first search tick and then once more than
    /// `search_period_s` has passed since the last one. Its sign alternates
    /// with the parity of the current half second, positive on even halves.
    pub fn nudge(&mut self, time_s: f64, params: &SteerParams) -> Option<f64> {
        if let Some(last) = self.last_nudge_time_s {
            if time_s - last <= params.search_period_s {
                return None;
            }
        }

        self.last_nudge_time_s = Some(time_s);

        let half_seconds = (time_s * 2.0).floor();
        let nudge = if util::maths::rem_euclid(half_seconds, 2.0) == 0.0 {
            params.search_nudge_deg
        }
        else {
            -params.search_nudge_deg
        };

        debug!("Searching for line, nudging heading by {} deg", nudge);

        Some(nudge)
    }

    pub fn reset(&mut self) {
        self.last_nudge_time_s = None;
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Classify the sensor readings.
///
/// Both edge sensors take precedence over one, and the edge sensors take
/// precedence over the centre sensor.
pub fn classify(left: bool, right: bool, center: bool) -> SensorState {
    match (left, right, center) {
        (true, true, _) => SensorState::Both,
        (true, false, _) => SensorState::Left,
        (false, true, _) => SensorState::Right,
        (false, false, true) => SensorState::Center,
        (false, false, false) => SensorState::None
    }
}

/// Derive the steering demand for a sensor state.
///
/// `prev_error` is the error last passed to the PID controller. When only the
/// centre sensor sees the line there is no fresh measurement, so a damped copy
/// of the previous error is carried forward.
pub fn derive(state: SensorState, prev_error: f64, params: &SteerParams) -> SteerDemand {
    match state {
        SensorState::None => SteerDemand::Search {
            speed: params.search_speed
        },
        SensorState::Left => SteerDemand::Track {
            error: params.edge_error,
            speed: params.edge_speed
        },
        SensorState::Right => SteerDemand::Track {
            error: -params.edge_error,
            speed: params.edge_speed
        },
        SensorState::Center => SteerDemand::Track {
            error: params.center_error_gain * prev_error,
            speed: params.center_speed
        },
        SensorState::Both => SteerDemand::Track {
            error: 0.0,
            speed: params.both_speed
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classify_precedence() {
        assert_eq!(classify(true, true, true), SensorState::Both);
        assert_eq!(classify(true, true, false), SensorState::Both);
        assert_eq!(classify(true, false, true), SensorState::Left);
        assert_eq!(classify(false, true, true), SensorState::Right);
        assert_eq!(classify(false, false, true), SensorState::Center);
        assert_eq!(classify(false, false, false), SensorState::None);
    }

    #[test]
    fn test_derive() {
        let p = SteerParams::default();

        assert_eq!(derive(SensorState::None, 2.0, &p), SteerDemand::Search { speed: 0.8 });
        assert_eq!(derive(SensorState::Left, 2.0, &p), SteerDemand::Track { error: 3.0, speed: 1.0 });
        assert_eq!(derive(SensorState::Right, 2.0, &p), SteerDemand::Track { error: -3.0, speed: 1.0 });
        assert_eq!(derive(SensorState::Center, 2.0, &p), SteerDemand::Track { error: 1.0, speed: 1.3 });
        assert_eq!(derive(SensorState::Both, 2.0, &p), SteerDemand::Track { error: 0.0, speed: 1.5 });
    }

    #[test]
    fn test_center_error_decays() {
        let p = SteerParams::default();
        let mut error = 3.0;

        for _ in 0..4 {
            error = match derive(SensorState::Center, error, &p) {
                SteerDemand::Track { error, .. } => error,
                d => panic!("unexpected demand {:?}", d)
            };
        }
        assert_eq!(error, 3.0 / 16.0);
    }

    #[test]
    fn test_search_nudges() {
        let p = SteerParams::default();
        let mut search = Search::new();

        // First search tick nudges immediately, 0.2 s is in an even half second
        assert_eq!(search.nudge(0.2, &p), Some(2.0));

        // Nothing until more than half a second has passed
        assert_eq!(search.nudge(0.5, &p), None);
        assert_eq!(search.nudge(0.7, &p), None);

        // 0.75 s is in the second (odd) half second
        assert_eq!(search.nudge(0.75, &p), Some(-2.0));
        assert_eq!(search.nudge(1.3, &p), Some(2.0));

        search.reset();
        assert_eq!(search.nudge(1.4, &p), Some(2.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(SensorState::Center.to_string(), "CENTER");
        assert_eq!(SensorState::None.to_string(), "NONE");
    }
}
