//! Forecast-based setpoint advisory engine.
//!
//! Looks two hours ahead using the same time-of-day banding as the influent
//! model and recommends a DO setpoint sized for the incoming load: aerate
//! ahead of the morning and day peaks, back off overnight to save blower
//! energy. The recommendation only changes the setpoint when the operator
//! explicitly accepts it.

use crate::types::AiState;

/// How far ahead the load forecast looks (hours).
const FORECAST_HORIZON_HOURS: u32 = 2;

/// A single forecast: predicted load multiplier, suggested setpoint, and
/// estimated energy savings if applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    pub predicted_load: f64,
    pub recommended_setpoint: f64,
    pub energy_savings: f64,
}

/// Forecast the load band two hours ahead of `hour` and look up the
/// recommended operating point.
pub fn recommend(hour: u32) -> Recommendation {
    let forecast_hour = (hour + FORECAST_HORIZON_HOURS) % 24;

    match forecast_hour {
        6..=11 => Recommendation {
            // Morning peak incoming
            predicted_load: 1.15,
            recommended_setpoint: 4.8,
            energy_savings: 8.0,
        },
        12..=17 => Recommendation {
            // Day shift peak
            predicted_load: 1.20,
            recommended_setpoint: 5.0,
            energy_savings: 10.0,
        },
        0..=5 => Recommendation {
            // Night shift low
            predicted_load: 0.85,
            recommended_setpoint: 3.5,
            energy_savings: 15.0,
        },
        _ => Recommendation {
            predicted_load: 0.95,
            recommended_setpoint: 4.2,
            energy_savings: 12.0,
        },
    }
}

/// Apply a fresh recommendation to the published advisory state.
pub fn refresh(ai: &mut AiState, hour: u32) {
    let rec = recommend(hour);
    ai.predicted_load = rec.predicted_load;
    ai.recommended_setpoint = rec.recommended_setpoint;
    ai.energy_savings = rec.energy_savings;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_banding() {
        // 04:00 + 2h = 06:00 → morning peak band
        let rec = recommend(4);
        assert!((rec.recommended_setpoint - 4.8).abs() < f64::EPSILON);
        assert!((rec.predicted_load - 1.15).abs() < f64::EPSILON);

        // 10:00 + 2h = 12:00 → day peak band
        let rec = recommend(10);
        assert!((rec.recommended_setpoint - 5.0).abs() < f64::EPSILON);

        // 22:00 + 2h = 00:00 → night band
        let rec = recommend(22);
        assert!((rec.recommended_setpoint - 3.5).abs() < f64::EPSILON);
        assert!((rec.energy_savings - 15.0).abs() < f64::EPSILON);

        // 16:00 + 2h = 18:00 → evening band
        let rec = recommend(16);
        assert!((rec.recommended_setpoint - 4.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wraparound_past_midnight() {
        // 23:00 + 2h = 01:00, not 25:00
        let rec = recommend(23);
        assert!((rec.recommended_setpoint - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_refresh_updates_published_state() {
        let mut ai = AiState {
            enabled: true,
            recommended_setpoint: 4.5,
            predicted_load: 1.0,
            energy_savings: 12.0,
        };
        refresh(&mut ai, 10);
        assert!((ai.recommended_setpoint - 5.0).abs() < f64::EPSILON);
        assert!((ai.predicted_load - 1.20).abs() < f64::EPSILON);
        assert!((ai.energy_savings - 10.0).abs() < f64::EPSILON);
        assert!(ai.enabled);
    }
}
