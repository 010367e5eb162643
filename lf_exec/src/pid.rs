//! # PID controller module
//!
//! Provides the PID controller which turns the steering error derived from the
//! sensor state into a heading correction.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the steering PID controller.
#[derive(Debug, Copy, Clone, Deserialize, PartialEq)]
pub struct PidParams {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Factor applied to the raw error derivative before it is used.
    pub deriv_damping: f64,

    /// The integral accumulation is clamped to `[-integral_limit,
    /// integral_limit]` on every update.
    pub integral_limit: f64,

    /// Weight of the new raw output in the exponential smoothing of the
    /// output. The previous output is weighted by `1 - smoothing`.
    pub smoothing: f64
}

/// A PID controller with a clamped integral and a low-pass filtered output.
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    #[serde(skip)]
    deriv_damping: f64,

    #[serde(skip)]
    integral_limit: f64,

    #[serde(skip)]
    smoothing: f64,

    /// Previous error
    prev_error: f64,

    /// The integral accumulation
    integral: f64,

    /// The previous smoothed output
    prev_output: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PidParams {
    fn default() -> Self {
        Self {
            k_p: 3.0,
            k_i: 0.00001,
            k_d: 0.00001,
            deriv_damping: 0.7,
            integral_limit: 50.0,
            smoothing: 0.3
        }
    }
}

impl PidController {

    /// Create a new controller from the given parameters, with no history.
    pub fn new(params: &PidParams) -> Self {
        Self {
            k_p: params.k_p,
            k_i: params.k_i,
            k_d: params.k_d,
            deriv_damping: params.deriv_damping,
            integral_limit: params.integral_limit.abs(),
            smoothing: params.smoothing,
            prev_error: 0f64,
            integral: 0f64,
            prev_output: 0f64
        }
    }

    /// Get the smoothed output of the controller for the given error.
    ///
    /// `dt` is the time since the previous call in seconds. If it is not
    /// positive the derivative term is zero, as it cannot be estimated.
    pub fn compute(&mut self, error: f64, dt: f64) -> f64 {
        let deriv = if dt > 0f64 {
            (error - self.prev_error) / dt * self.deriv_damping
        }
        else {
            0f64
        };

        // Anti-windup
        self.integral = util::maths::clamp(
            self.integral + error * dt,
            -self.integral_limit,
            self.integral_limit
        );

        let raw = 
            self.k_p * error 
            + self.k_i * self.integral 
            + self.k_d * deriv;

        // Low pass filter against chattering between sensor states
        let out = self.smoothing * raw + (1f64 - self.smoothing) * self.prev_output;

        self.prev_output = out;
        self.prev_error = error;

        out
    }

    /// The error passed into the last call to `compute`.
    pub fn prev_error(&self) -> f64 {
        self.prev_error
    }

    /// The current integral accumulation.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// The output returned by the last call to `compute`.
    pub fn prev_output(&self) -> f64 {
        self.prev_output
    }

    /// Forget all history, keeping the gains.
    pub fn reset(&mut self) {
        self.prev_error = 0f64;
        self.integral = 0f64;
        self.prev_output = 0f64;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
