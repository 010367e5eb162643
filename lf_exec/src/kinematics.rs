//! # Kinematics module
//!
//! Vehicle pose and the kinematic integrator which advances it each tick.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Position and heading of the vehicle in the world frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position of the vehicle centre.
    ///
    /// Units: world units
    pub position: Vector2<f64>,

    /// Heading, measured from the world X axis towards the world Y axis.
    /// This is an accumulator and is not wrapped into [0, 360).
    ///
    /// Units: degrees
    pub heading_deg: f64
}

/// The simulated vehicle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub pose: Pose,

    /// Speed demanded on the last tick.
    ///
    /// Units: world units/tick
    pub speed: f64,

    /// Set once the vehicle has detected the stop bar. Never cleared except
    /// by resetting the vehicle.
    pub stopped: bool
}

/// Extent of the world the vehicle moves in.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct WorldParams {
    /// Units: world units
    pub width: f64,

    /// Units: world units
    pub height: f64,

    /// Distance from the world edges the vehicle centre is kept within.
    ///
    /// Units: world units
    pub margin: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x: f64, y: f64, heading_deg: f64) -> Self {
        Self {
            position: Vector2::new(x, y),
            heading_deg
        }
    }

    pub fn heading_rad(&self) -> f64 {
        self.heading_deg.to_radians()
    }

    /// Unit vector pointing along the heading.
    pub fn forward(&self) -> Vector2<f64> {
        let h = self.heading_rad();
        Vector2::new(h.cos(), h.sin())
    }
}

impl Vehicle {
    pub fn new(pose: Pose, speed: f64) -> Self {
        Self {
            pose,
            speed,
            stopped: false
        }
    }
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: 20.0
        }
    }
}

impl WorldParams {
    /// Lowest allowed position of the vehicle centre.
    pub fn min(&self) -> Vector2<f64> {
        Vector2::new(self.margin, self.margin)
    }

    /// Highest allowed position of the vehicle centre.
    pub fn max(&self) -> Vector2<f64> {
        Vector2::new(self.width - self.margin, self.height - self.margin)
    }

    /// Clamp a position into the interior of the world.
    pub fn clamp(&self, position: Vector2<f64>) -> Vector2<f64> {
        let (min, max) = (self.min(), self.max());
        Vector2::new(
            util::maths::clamp(position.x, min.x, max.x),
            util::maths::clamp(position.y, min.y, max.y)
        )
    }

    /// Returns true if the position is within the interior of the world.
    pub fn contains(&self, position: &Vector2<f64>) -> bool {
        let (min, max) = (self.min(), self.max());
        position.x >= min.x && position.x <= max.x && position.y >= min.y && position.y <= max.y
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Advance the vehicle by one tick.
///
/// The steering is applied to the heading first and the vehicle then moves
/// `speed` units along the new heading. The resulting position is clamped to
/// the world interior, so motion into a wall is absorbed and the vehicle stays
/// against it. A stopped vehicle is not moved.
pub fn step(vehicle: &mut Vehicle, speed: f64, steering_deg: f64, world: &WorldParams) {
    if vehicle.stopped {
        return;
    }

    vehicle.speed = speed;
    vehicle.pose.heading_deg += steering_deg;
    vehicle.pose.position = world.clamp(vehicle.pose.position + vehicle.pose.forward() * speed);
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_step_straight() {
        let world = WorldParams::default();
        let mut v = Vehicle::new(Pose::new(400.0, 300.0, 0.0), 0.0);

        step(&mut v, 1.5, 0.0, &world);
        assert!((v.pose.position - Vector2::new(401.5, 300.0)).norm() < 1e-12);
        assert_eq!(v.speed, 1.5);

        // Steering is applied before moving
        step(&mut v, 2.0, 90.0, &world);
        assert_eq!(v.pose.heading_deg, 90.0);
        assert!((v.pose.position - Vector2::new(401.5, 302.0)).norm() < 1e-12);
    }

    #[test]
    fn test_heading_accumulates() {
        let world = WorldParams::default();
        let mut v = Vehicle::new(Pose::new(400.0, 300.0, 350.0), 0.0);

        for _ in 0..10 {
            step(&mut v, 0.0, 3.0, &world);
        }
        assert!((v.pose.heading_deg - 380.0).abs() < 1e-9);
    }

    #[test]
    fn test_corner_absorbs_motion() {
        let world = WorldParams::default();
        let mut v = Vehicle::new(Pose::new(20.0, 20.0, 225.0), 0.0);

        for _ in 0..10 {
            step(&mut v, 1.5, 1.0, &world);
        }
        assert_eq!(v.pose.position, Vector2::new(20.0, 20.0));
    }

    #[test]
    fn test_never_leaves_world() {
        let world = WorldParams::default();
        let mut v = Vehicle::new(Pose::new(400.0, 300.0, 0.0), 0.0);

        // Deterministic but irregular sequence of commands
        for i in 0..5000u32 {
            let speed = 0.5 + ((i * 7) % 13) as f64;
            let steering = ((i * 31) % 17) as f64 - 8.0;
            step(&mut v, speed, steering, &world);
            assert!(world.contains(&v.pose.position), "left the world at {:?}", v.pose);
        }
    }

    #[test]
    fn test_stopped_vehicle_does_not_move() {
        let world = WorldParams::default();
        let mut v = Vehicle::new(Pose::new(400.0, 300.0, 0.0), 1.0);
        v.stopped = true;

        step(&mut v, 1.5, 3.0, &world);
        assert_eq!(v.pose, Pose::new(400.0, 300.0, 0.0));
        assert_eq!(v.speed, 1.0);
    }
}
