//! # Track module
//!
//! Provides the track geometry oracle used by the sensors. The oracle answers
//! whether a small square tolerance box around a point touches the painted
//! guide line or the stop bar. The control loop only ever sees the
//! [`TrackOracle`] trait, so any geometry (or a mock) can be injected.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
pub use params::TrackParams;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Spatial queries against a track.
///
/// Both queries consider the square `[x - tolerance, x + tolerance] x
/// [y - tolerance, y + tolerance]` rather than the bare point.
pub trait TrackOracle {
    /// Returns true if the guide line touches the tolerance box around the
    /// point.
    fn hit_test_line(&self, x: f64, y: f64, tolerance: f64) -> bool;

    /// Returns true if the stop bar touches the tolerance box around the
    /// point.
    fn hit_test_stop_bar(&self, x: f64, y: f64, tolerance: f64) -> bool;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Rect {
    /// Corner with the smallest coordinates
    pub min: Vector2<f64>,

    /// Corner with the largest coordinates
    pub max: Vector2<f64>
}

/// A closed-loop track made of a thick polyline guide line and one stop bar
/// anchored at the first waypoint.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    waypoints: Vec<Vector2<f64>>,

    /// Half the width of the painted line
    line_half_width: f64,

    stop_bar: Rect
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while building a track.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("A track needs at least 2 waypoints, found {0}")]
    TooFewWaypoints(usize),

    #[error("Track dimension {0} must be strictly positive, found {1}")]
    NonPositiveDimension(&'static str, f64),

    #[error("Waypoint {0} is not finite")]
    NonFiniteWaypoint(usize)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> TrackOracle for &T
where
    T: TrackOracle + ?Sized
{
    fn hit_test_line(&self, x: f64, y: f64, tolerance: f64) -> bool {
        (**self).hit_test_line(x, y, tolerance)
    }

    fn hit_test_stop_bar(&self, x: f64, y: f64, tolerance: f64) -> bool {
        (**self).hit_test_stop_bar(x, y, tolerance)
    }
}

impl Rect {
    /// Build a rectangle of the given size centred on a point.
    pub fn from_centre(centre: Vector2<f64>, width: f64, height: f64) -> Self {
        let half = Vector2::new(width / 2.0, height / 2.0);
        Self {
            min: centre - half,
            max: centre + half
        }
    }

    /// Returns true if the two rectangles share at least one point (edges
    /// included).
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Distance from the rectangle to a point, zero if the point is inside.
    pub fn distance_to_point(&self, point: &Vector2<f64>) -> f64 {
        let dx = (self.min.x - point.x).max(point.x - self.max.x).max(0.0);
        let dy = (self.min.y - point.y).max(point.y - self.max.y).max(0.0);
        dx.hypot(dy)
    }

    /// Returns true if the segment `a -> b` passes through the rectangle.
    ///
    /// Uses Liang-Barsky clipping of the segment's parameter range.
    pub fn intersects_segment(&self, a: &Vector2<f64>, b: &Vector2<f64>) -> bool {
        let d = b - a;
        let mut t_enter = 0f64;
        let mut t_exit = 1f64;

        let bounds = [
            (-d.x, a.x - self.min.x),
            (d.x, self.max.x - a.x),
            (-d.y, a.y - self.min.y),
            (d.y, self.max.y - a.y),
        ];

        for &(p, q) in bounds.iter() {
            if p == 0.0 {
                // Parallel to this edge, reject if outside it
                if q < 0.0 {
                    return false;
                }
                continue;
            }

            let r = q / p;
            if p < 0.0 {
                if r > t_exit {
                    return false;
                }
                t_enter = t_enter.max(r);
            }
            else {
                if r < t_enter {
                    return false;
                }
                t_exit = t_exit.min(r);
            }
        }

        t_enter <= t_exit
    }

    /// Shortest distance between the rectangle and the segment `a -> b`.
    pub fn distance_to_segment(&self, a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
        if self.intersects_segment(a, b) {
            return 0.0;
        }

        // For disjoint convex shapes the closest pair always involves a
        // vertex of one of them.
        let corners = [
            self.min,
            Vector2::new(self.max.x, self.min.y),
            self.max,
            Vector2::new(self.min.x, self.max.y),
        ];

        corners
            .iter()
            .map(|c| point_segment_distance(c, a, b))
            .chain([self.distance_to_point(a), self.distance_to_point(b)].iter().copied())
            .fold(f64::INFINITY, f64::min)
    }
}

impl Track {
    /// Build a new track from its parameters.
    pub fn new(params: &TrackParams) -> Result<Self, TrackError> {
        if params.waypoints.len() < 2 {
            return Err(TrackError::TooFewWaypoints(params.waypoints.len()));
        }

        for (i, w) in params.waypoints.iter().enumerate() {
            if !w[0].is_finite() || !w[1].is_finite() {
                return Err(TrackError::NonFiniteWaypoint(i));
            }
        }

        for &(name, value) in [
            ("line_width", params.line_width),
            ("stop_bar_width", params.stop_bar_width),
            ("stop_bar_height", params.stop_bar_height),
        ]
        .iter()
        {
            if !(value > 0.0) {
                return Err(TrackError::NonPositiveDimension(name, value));
            }
        }

        let waypoints: Vec<Vector2<f64>> = params
            .waypoints
            .iter()
            .map(|w| Vector2::new(w[0], w[1]))
            .collect();

        let stop_bar = Rect::from_centre(
            waypoints[0],
            params.stop_bar_width,
            params.stop_bar_height
        );

        Ok(Self {
            waypoints,
            line_half_width: params.line_width / 2.0,
            stop_bar
        })
    }

    /// The waypoints of the track, without the closing point.
    pub fn waypoints(&self) -> &[Vector2<f64>] {
        &self.waypoints
    }

    /// The stop bar region.
    pub fn stop_bar(&self) -> &Rect {
        &self.stop_bar
    }

    /// Iterate over the segments of the closed guide line, including the
    /// segment joining the last waypoint back to the first.
    pub fn segments(&self) -> impl Iterator<Item = (&Vector2<f64>, &Vector2<f64>)> + '_ {
        self.waypoints
            .iter()
            .zip(self.waypoints.iter().cycle().skip(1))
    }

    /// Shortest distance from the tolerance box around a point to the centre
    /// line of the track.
    pub fn distance_to_line(&self, x: f64, y: f64, tolerance: f64) -> f64 {
        let tol_box = Rect::from_centre(Vector2::new(x, y), 2.0 * tolerance, 2.0 * tolerance);

        self.segments()
            .map(|(a, b)| tol_box.distance_to_segment(a, b))
            .fold(f64::INFINITY, f64::min)
    }
}

impl TrackOracle for Track {
    fn hit_test_line(&self, x: f64, y: f64, tolerance: f64) -> bool {
        self.distance_to_line(x, y, tolerance) <= self.line_half_width
    }

    fn hit_test_stop_bar(&self, x: f64, y: f64, tolerance: f64) -> bool {
        let tol_box = Rect::from_centre(Vector2::new(x, y), 2.0 * tolerance, 2.0 * tolerance);
        self.stop_bar.overlaps(&tol_box)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Shortest distance from a point to the segment `a -> b`.
pub fn point_segment_distance(p: &Vector2<f64>, a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();

    // Degenerate segment
    if len_sq == 0.0 {
        return (p - a).norm();
    }

    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const TOL: f64 = 5.0;

    fn reference_track() -> Track {
        Track::new(&TrackParams::default()).unwrap()
    }

    #[test]
    fn test_point_segment_distance() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(10.0, 0.0);

        assert_eq!(point_segment_distance(&Vector2::new(5.0, 3.0), &a, &b), 3.0);
        assert_eq!(point_segment_distance(&Vector2::new(-3.0, 4.0), &a, &b), 5.0);
        assert_eq!(point_segment_distance(&Vector2::new(13.0, -4.0), &a, &b), 5.0);
        assert_eq!(point_segment_distance(&Vector2::new(3.0, 4.0), &a, &a), 5.0);
    }

    #[test]
    fn test_rect_segment() {
        let r = Rect::from_centre(Vector2::new(0.0, 0.0), 2.0, 2.0);

        // Straight through, diagonal through, fully inside, and missing
        assert!(r.intersects_segment(&Vector2::new(-5.0, 0.0), &Vector2::new(5.0, 0.0)));
        assert!(r.intersects_segment(&Vector2::new(-5.0, -5.0), &Vector2::new(5.0, 5.0)));
        assert!(r.intersects_segment(&Vector2::new(-0.5, 0.0), &Vector2::new(0.5, 0.0)));
        assert!(!r.intersects_segment(&Vector2::new(-5.0, 3.0), &Vector2::new(5.0, 3.0)));
        assert!(!r.intersects_segment(&Vector2::new(2.0, 0.0), &Vector2::new(5.0, 0.0)));

        assert_eq!(r.distance_to_segment(&Vector2::new(-5.0, 3.0), &Vector2::new(5.0, 3.0)), 2.0);
        assert_eq!(r.distance_to_segment(&Vector2::new(4.0, 0.0), &Vector2::new(9.0, 0.0)), 3.0);
        assert_eq!(r.distance_to_segment(&Vector2::new(-5.0, 0.0), &Vector2::new(5.0, 0.0)), 0.0);
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::from_centre(Vector2::new(0.0, 0.0), 4.0, 2.0);

        assert!(a.overlaps(&Rect::from_centre(Vector2::new(3.0, 0.0), 2.0, 2.0)));
        assert!(a.overlaps(&Rect::from_centre(Vector2::new(0.0, 0.0), 1.0, 1.0)));
        assert!(!a.overlaps(&Rect::from_centre(Vector2::new(0.0, 2.5), 2.0, 2.0)));
    }

    #[test]
    fn test_track_line_hits() {
        let track = reference_track();

        // On the first segment, (150, 500) -> (150, 400)
        assert!(track.hit_test_line(150.0, 450.0, TOL));

        // Box reaches to within 5 units of the centre line
        assert!(track.hit_test_line(160.0, 470.0, TOL));

        // Box is 15 units away, more than the 7.5 half width
        assert!(!track.hit_test_line(170.0, 470.0, TOL));

        // Middle of the closing segment, (400, 450) -> (150, 500)
        assert!(track.hit_test_line(275.0, 475.0, TOL));

        // Middle of an empty area
        assert!(!track.hit_test_line(400.0, 300.0, TOL));
    }

    #[test]
    fn test_track_stop_bar_hits() {
        let track = reference_track();

        assert_eq!(track.stop_bar().min, Vector2::new(110.0, 495.0));
        assert_eq!(track.stop_bar().max, Vector2::new(190.0, 505.0));

        assert!(track.hit_test_stop_bar(150.0, 500.0, TOL));
        assert!(track.hit_test_stop_bar(189.0, 500.0, TOL));
        assert!(track.hit_test_stop_bar(150.0, 490.0, TOL));
        assert!(!track.hit_test_stop_bar(196.0, 500.0, TOL));
        assert!(!track.hit_test_stop_bar(150.0, 470.0, TOL));
    }

    #[test]
    fn test_track_closed_loop() {
        let track = reference_track();
        let segments: Vec<_> = track.segments().collect();

        assert_eq!(segments.len(), 13);
        assert_eq!(*segments[12].0, Vector2::new(400.0, 450.0));
        assert_eq!(*segments[12].1, Vector2::new(150.0, 500.0));
    }

    #[test]
    fn test_params_file_matches_default() {
        let params: TrackParams = util::params::from_str(
            include_str!("../../../params/track.toml")
        ).unwrap();

        assert_eq!(params, TrackParams::default());
    }

    #[test]
    fn test_invalid_tracks() {
        let mut params = TrackParams::default();
        params.waypoints.truncate(1);
        assert!(matches!(Track::new(&params), Err(TrackError::TooFewWaypoints(1))));

        let mut params = TrackParams::default();
        params.line_width = 0.0;
        assert!(matches!(
            Track::new(&params),
            Err(TrackError::NonPositiveDimension("line_width", _))
        ));

        let mut params = TrackParams::default();
        params.waypoints[3][1] = f64::NAN;
        assert!(matches!(Track::new(&params), Err(TrackError::NonFiniteWaypoint(3))));
    }
}
