//! Dissolved-oxygen plant model.
//!
//! DO balance per tick: microbial consumption driven by the secondary-stage
//! BOD load, oxygen transfer from the blower, and natural surface decay.
//! Rates are per hour, integrated over `dt` seconds, and the result is
//! clamped to the physical range [0, 10] mg/L.

use crate::config::defaults::DO_MAX;

/// Microbial uptake: 0.5 mg/L per hour per 100 mg/L of BOD.
const CONSUMPTION_PER_100_BOD: f64 = 0.5;

/// Blower transfer at full speed: 2.0 mg/L per hour.
const BLOWER_TRANSFER_FULL: f64 = 2.0;

/// Surface/natural decay: 0.1 mg/L per hour.
const NATURAL_DECAY: f64 = 0.1;

/// Integrate DO over `dt_secs` given the secondary BOD load and commanded
/// blower speed (%).
pub fn step(current_do: f64, secondary_bod: f64, blower_speed: f64, dt_secs: f64) -> f64 {
    let hours = dt_secs / 3600.0;

    let consumption = (secondary_bod / 100.0) * CONSUMPTION_PER_100_BOD * hours;
    let addition = (blower_speed / 100.0) * BLOWER_TRANSFER_FULL * hours;
    let decay = NATURAL_DECAY * hours;

    (current_do - consumption + addition - decay).clamp(0.0, DO_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_terms() {
        // One hour at BOD 100, blower 100%: -0.5 + 2.0 - 0.1 = +1.4
        let out = step(4.0, 100.0, 100.0, 3600.0);
        assert!((out - 5.4).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_to_physical_range() {
        assert!((step(0.1, 10_000.0, 0.0, 3600.0) - 0.0).abs() < f64::EPSILON);
        assert!((step(9.9, 0.0, 100.0, 36_000.0) - DO_MAX).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_blower_drifts_down() {
        let out = step(4.0, 72.0, 0.0, 1.0);
        assert!(out < 4.0);
    }

    #[test]
    fn test_zero_dt_no_change() {
        assert!((step(4.0, 500.0, 100.0, 0.0) - 4.0).abs() < f64::EPSILON);
    }
}
