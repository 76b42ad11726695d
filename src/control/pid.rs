//! PID controller for the DO control loop.
//!
//! Classic discrete PID with integral anti-windup and output clamping.
//! Owned exclusively by the DO control path: state advances only through
//! [`PidController::calculate`], and `reset()` must be called when the loop
//! switches from manual back to auto so stale integral/derivative history
//! cannot kick the blower.

use crate::config::defaults::PID_INTEGRAL_LIMIT;
use crate::types::PidSnapshot;

/// Discrete PID controller with anti-windup.
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    integral: f64,
    last_error: f64,
}

impl PidController {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral: 0.0,
            last_error: 0.0,
        }
    }

    /// Compute the next actuator command (0-100, blower speed %).
    ///
    /// `dt` is the control period in seconds. A non-positive `dt` zeroes the
    /// derivative term rather than dividing by it.
    pub fn calculate(&mut self, setpoint: f64, measured: f64, dt: f64) -> f64 {
        let error = setpoint - measured;

        self.integral += error * dt;
        self.integral = self.integral.clamp(-PID_INTEGRAL_LIMIT, PID_INTEGRAL_LIMIT);

        let derivative = if dt > 0.0 {
            (error - self.last_error) / dt
        } else {
            0.0
        };

        let output = self.kp * error + self.ki * self.integral + self.kd * derivative;

        self.last_error = error;

        output.clamp(0.0, 100.0)
    }

    /// Zero the integral and derivative history.
    ///
    /// Call on manual-to-auto mode transitions.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
    }

    /// Replace gains without resetting integral history.
    pub fn set_parameters(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Read-only view for the plant snapshot.
    pub fn snapshot(&self) -> PidSnapshot {
        PidSnapshot {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            integral: self.integral,
            last_error: self.last_error,
        }
    }
}
