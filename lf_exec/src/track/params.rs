//! Track parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing the track the vehicle follows.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TrackParams {
    /// Waypoints of the guide line, in order. The line is closed by joining
    /// the last waypoint back to the first.
    ///
    /// Units: world units
    pub waypoints: Vec<[f64; 2]>,

    /// Width of the painted guide line.
    ///
    /// Units: world units
    pub line_width: f64,

    /// Width (along the world X axis) of the stop bar, which is centred on the
    /// first waypoint.
    ///
    /// Units: world units
    pub stop_bar_width: f64,

    /// Height (along the world Y axis) of the stop bar.
    ///
    /// Units: world units
    pub stop_bar_height: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TrackParams {
    /// The reference track: a closed loop of thirteen stations in an 800x600
    /// world, starting and finishing at the bottom left.
    fn default() -> Self {
        Self {
            waypoints: vec![
                [150.0, 500.0],
                [150.0, 400.0],
                [300.0, 400.0],
                [300.0, 300.0],
                [150.0, 300.0],
                [150.0, 200.0],
                [450.0, 200.0],
                [450.0, 350.0],
                [550.0, 350.0],
                [550.0, 100.0],
                [650.0, 100.0],
                [650.0, 450.0],
                [400.0, 450.0],
            ],
            line_width: 15.0,
            stop_bar_width: 80.0,
            stop_bar_height: 10.0
        }
    }
}
