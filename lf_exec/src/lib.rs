//! # Line follower library.
//!
//! Simulation of a line following vehicle: two binary sensors ahead of the
//! vehicle read a painted guide line, a PID controller steers on the
//! discretised sensor state, and the vehicle halts for good when both sensors
//! reach the stop bar.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Track geometry - answers whether a point is on the guide line or the stop bar
pub mod track;

/// Sensor model - positions the sensors on the vehicle and reads the track
pub mod sensor;

/// PID controller - turns the steering error into a heading correction
pub mod pid;

/// Steering state machine - classifies sensor readings and derives steering demands
pub mod steer;

/// Kinematics - vehicle pose and its integration
pub mod kinematics;

/// Stop detector - latches the vehicle into the stopped state at the stop bar
pub mod stop;

/// Trail of past vehicle positions
pub mod trail;

/// Line follower - the per-tick control loop tying the modules together
pub mod line_follower;

/// Simulation commands - external events replayed from scripts
pub mod sim_cmd;
