//! Treatment cascade transforms: primary, secondary, tertiary.
//!
//! Primary clarification is modelled as instantaneous fractional removal.
//! Secondary (biological) and tertiary (membrane) stages decay exponentially
//! with rate constants calibrated against their design removal targets:
//! secondary reaches 85% BOD / 90% TSS removal in 6 hours at DO = 3 mg/L,
//! tertiary 95% BOD / 99% TSS removal in 2 hours. Each transform is pure:
//! it takes the relevant upstream stage and produces one new stage.

use crate::types::StageData;

/// Primary clarifier removal fractions (instantaneous).
const PRIMARY_BOD_RETAINED: f64 = 0.8;
const PRIMARY_TSS_RETAINED: f64 = 0.6;

/// Secondary design point: 85% BOD removal over 6 h.
const SECONDARY_BOD_RESIDUAL: f64 = 0.15;
/// Secondary design point: 90% TSS removal over 6 h.
const SECONDARY_TSS_RESIDUAL: f64 = 0.10;
const SECONDARY_DESIGN_SECS: f64 = 6.0 * 3600.0;

/// Tertiary design point: 95% BOD removal over 2 h.
const TERTIARY_BOD_RESIDUAL: f64 = 0.05;
/// Tertiary design point: 99% TSS removal over 2 h.
const TERTIARY_TSS_RESIDUAL: f64 = 0.01;
const TERTIARY_DESIGN_SECS: f64 = 2.0 * 3600.0;

/// Effluent floors keep concentrations physical.
const TERTIARY_BOD_FLOOR: f64 = 0.5;
const TERTIARY_TSS_FLOOR: f64 = 0.1;

/// Per-second decay rate hitting `residual` fraction after `duration` seconds.
fn decay_rate(residual: f64, duration_secs: f64) -> f64 {
    -residual.ln() / duration_secs
}

/// Primary treatment (API separator / DAF): instant fractional removal.
pub fn primary(raw: &StageData) -> StageData {
    StageData {
        volume: raw.volume,
        bod: raw.bod * PRIMARY_BOD_RETAINED,
        tss: raw.tss * PRIMARY_TSS_RETAINED,
    }
}

/// Secondary treatment (MBBR): exponential decay modulated by DO.
///
/// Decay efficiency scales with `clamp(DO/3, 0.5, 1.0)` — the biology slows
/// when oxygen-starved but never below half rate, and excess DO above the
/// 3 mg/L optimum buys nothing.
pub fn secondary(current: &StageData, dissolved_oxygen: f64, dt_secs: f64) -> StageData {
    let do_efficiency = (dissolved_oxygen / 3.0).clamp(0.5, 1.0);
    let bod_rate = decay_rate(SECONDARY_BOD_RESIDUAL, SECONDARY_DESIGN_SECS);
    let tss_rate = decay_rate(SECONDARY_TSS_RESIDUAL, SECONDARY_DESIGN_SECS);

    StageData {
        volume: current.volume,
        bod: current.bod * (-bod_rate * dt_secs * do_efficiency).exp(),
        tss: current.tss * (-tss_rate * dt_secs * do_efficiency).exp(),
    }
}

/// Tertiary treatment (UF + RO): exponential decay with effluent floors.
pub fn tertiary(current: &StageData, dt_secs: f64) -> StageData {
    let bod_rate = decay_rate(TERTIARY_BOD_RESIDUAL, TERTIARY_DESIGN_SECS);
    let tss_rate = decay_rate(TERTIARY_TSS_RESIDUAL, TERTIARY_DESIGN_SECS);

    StageData {
        volume: current.volume,
        bod: (current.bod * (-bod_rate * dt_secs).exp()).max(TERTIARY_BOD_FLOOR),
        tss: (current.tss * (-tss_rate * dt_secs).exp()).max(TERTIARY_TSS_FLOOR),
    }
}
