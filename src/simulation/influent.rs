//! Raw influent load model.
//!
//! Industrial discharge follows a strong time-of-day pattern: low overnight,
//! ramping through the morning shift, peaking through the day shift, easing
//! off during evening cleanup. The model applies that banding to a base load
//! plus multiplicative noise. The RNG is injected so a seeded engine
//! reproduces the exact same influent series.

use rand::Rng;

use crate::config::defaults::BASE_INFLUENT_BOD;

/// Time-of-day load multiplier.
///
/// `hour` is the local hour of day (0-23).
pub fn load_multiplier(hour: u32) -> f64 {
    match hour {
        0..=5 => 0.6,   // night shift, low production
        6..=11 => 1.2,  // morning peak
        12..=17 => 1.4, // day shift peak
        _ => 0.8,       // evening cleanup
    }
}

/// Raw influent BOD (mg/L) for the given hour, with ±10% noise.
pub fn influent_bod<R: Rng>(hour: u32, rng: &mut R) -> f64 {
    let noise = rng.gen_range(0.9..1.1);
    BASE_INFLUENT_BOD * load_multiplier(hour) * noise
}

/// Raw influent TSS (mg/L) derived from BOD.
///
/// TSS runs 65-75% of BOD for industrial wastewater.
pub fn influent_tss<R: Rng>(bod: f64, rng: &mut R) -> f64 {
    bod * rng.gen_range(0.65..0.75)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_band_multipliers() {
        assert!((load_multiplier(3) - 0.6).abs() < f64::EPSILON);
        assert!((load_multiplier(8) - 1.2).abs() < f64::EPSILON);
        assert!((load_multiplier(14) - 1.4).abs() < f64::EPSILON);
        assert!((load_multiplier(21) - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_band_edges() {
        assert!((load_multiplier(0) - 0.6).abs() < f64::EPSILON);
        assert!((load_multiplier(5) - 0.6).abs() < f64::EPSILON);
        assert!((load_multiplier(6) - 1.2).abs() < f64::EPSILON);
        assert!((load_multiplier(11) - 1.2).abs() < f64::EPSILON);
        assert!((load_multiplier(12) - 1.4).abs() < f64::EPSILON);
        assert!((load_multiplier(17) - 1.4).abs() < f64::EPSILON);
        assert!((load_multiplier(18) - 0.8).abs() < f64::EPSILON);
        assert!((load_multiplier(23) - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bod_noise_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let bod = influent_bod(14, &mut rng);
            // 600 * 1.4 = 840 nominal, ±10%
            assert!(bod >= 840.0 * 0.9 && bod <= 840.0 * 1.1, "bod = {bod}");
        }
    }

    #[test]
    fn test_tss_fraction_of_bod() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let tss = influent_tss(600.0, &mut rng);
            assert!((390.0..450.0).contains(&tss), "tss = {tss}");
        }
    }

    #[test]
    fn test_seeded_reproducibility() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for hour in 0..24 {
            assert!((influent_bod(hour, &mut a) - influent_bod(hour, &mut b)).abs() < f64::EPSILON);
        }
    }
}
