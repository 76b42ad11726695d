//! System-wide default constants.
//!
//! Centralises magic numbers for the process model, control loop, and
//! bounded buffers. Grouped by subsystem for easy discovery.

// ============================================================================
// Tick Scheduling
// ============================================================================

/// Process and scenario tick period (milliseconds). One logical tick per second.
pub const TICK_PERIOD_MS: u64 = 1_000;

/// PID control sub-sampling: the controller runs every Nth process tick.
pub const CONTROL_INTERVAL_TICKS: u64 = 5;

/// Advisory refresh: the forecast runs every Nth process tick.
pub const ADVISORY_INTERVAL_TICKS: u64 = 60;

// ============================================================================
// Influent
// ============================================================================

/// Base influent BOD load (mg/L) before the time-of-day multiplier.
pub const BASE_INFLUENT_BOD: f64 = 600.0;

/// Nominal stage volume (m³) carried through every cascade stage.
pub const STAGE_VOLUME: f64 = 50.0;

// ============================================================================
// DO Control
// ============================================================================

/// Default PID proportional gain.
pub const PID_KP: f64 = 15.0;

/// Default PID integral gain.
pub const PID_KI: f64 = 0.8;

/// Default PID derivative gain.
pub const PID_KD: f64 = 2.0;

/// Anti-windup clamp on the PID integral term (symmetric, ±).
pub const PID_INTEGRAL_LIMIT: f64 = 50.0;

/// Default DO setpoint (mg/L).
pub const DEFAULT_DO_SETPOINT: f64 = 4.5;

/// Lowest operator-settable DO setpoint (mg/L).
pub const DO_SETPOINT_MIN: f64 = 1.0;

/// Highest operator-settable DO setpoint (mg/L).
pub const DO_SETPOINT_MAX: f64 = 8.0;

/// Physical DO concentration ceiling (mg/L); floor is 0.
pub const DO_MAX: f64 = 10.0;

// ============================================================================
// Bounded Buffers
// ============================================================================

/// Sensor history ring-buffer capacity (samples).
///
/// 300 samples at 1 Hz = 5 minutes of trend context.
pub const SENSOR_HISTORY_LEN: usize = 300;

/// Event log retention (entries). Oldest entries are silently dropped.
pub const EVENT_LOG_LEN: usize = 50;

// ============================================================================
// Alarm Engine
// ============================================================================

/// Fraction beyond a bound that escalates a threshold alarm to critical.
pub const ALARM_CRITICAL_MARGIN: f64 = 0.10;

/// Hysteresis fraction applied when clearing a threshold alarm.
pub const ALARM_CLEAR_HYSTERESIS: f64 = 0.05;

// ============================================================================
// Server
// ============================================================================

/// Default HTTP listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Default path for the persisted scenario progress file.
pub const DEFAULT_PROGRESS_PATH: &str = "reflow_progress.json";
