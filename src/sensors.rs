//! Sensor modelling: measurement noise, bounded history, trend classification.
//!
//! Each channel carries two parallel views of the process: the *display
//! value* with channel-specific measurement noise applied, and the
//! *noise-free history* used for trend classification and charts. History is
//! a fixed-size ring (oldest evicted first) so memory stays bounded no
//! matter how long the engine runs.

use rand::Rng;

use crate::config::defaults::SENSOR_HISTORY_LEN;
use crate::types::{SensorChannel, SensorKind, Trend};

/// Relative change between 5-sample window means that flips the trend.
const TREND_THRESHOLD: f64 = 0.02;

/// Apply channel-specific measurement noise to a physical value.
///
/// DO, pH, and flow sensors have fixed absolute error bands; everything
/// else gets ±5% multiplicative noise.
pub fn add_noise<R: Rng>(kind: SensorKind, value: f64, rng: &mut R) -> f64 {
    let noise = match kind {
        SensorKind::DissolvedOxygen => (rng.gen::<f64>() - 0.5) * 0.4, // ±0.2
        SensorKind::Ph => (rng.gen::<f64>() - 0.5) * 0.2,              // ±0.1
        SensorKind::Flow => (rng.gen::<f64>() - 0.5) * 4.0,            // ±2
        _ => value * (rng.gen::<f64>() - 0.5) * 0.1,                   // ±5%
    };
    value + noise
}

/// Classify the short-term trend of a sample history.
///
/// Compares the mean of the most recent 5 samples against the mean of the
/// preceding 5 (of the last 10): a relative change above 2% is a trend,
/// anything else is stable. Fewer than 10 samples, or a zero baseline mean
/// (which would make the relative change undefined), classify as stable.
pub fn classify_trend<'a, I>(history: I) -> Trend
where
    I: IntoIterator<Item = &'a f64>,
    I::IntoIter: ExactSizeIterator + Clone,
{
    let iter = history.into_iter();
    let len = iter.len();
    if len < 10 {
        return Trend::Stable;
    }

    let last10 = iter.skip(len - 10);
    let earlier: f64 = last10.clone().take(5).sum::<f64>() / 5.0;
    let recent: f64 = last10.skip(5).sum::<f64>() / 5.0;

    if earlier == 0.0 {
        return Trend::Stable;
    }

    let change = (recent - earlier) / earlier;
    if change > TREND_THRESHOLD {
        Trend::Up
    } else if change < -TREND_THRESHOLD {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Advance one channel for the tick: push the noise-free physical value into
/// the bounded history, reclassify the trend, and publish the noisy display
/// value.
pub fn update_channel<R: Rng>(
    channel: &mut SensorChannel,
    kind: SensorKind,
    physical_value: f64,
    rng: &mut R,
) {
    channel.history.push_back(physical_value);
    while channel.history.len() > SENSOR_HISTORY_LEN {
        channel.history.pop_front();
    }

    channel.trend = classify_trend(channel.history.iter());
    channel.value = add_noise(kind, physical_value, rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_noise_bands() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1_000 {
            let v = add_noise(SensorKind::DissolvedOxygen, 4.0, &mut rng);
            assert!((v - 4.0).abs() <= 0.2 + 1e-12);

            let v = add_noise(SensorKind::Ph, 7.0, &mut rng);
            assert!((v - 7.0).abs() <= 0.1 + 1e-12);

            let v = add_noise(SensorKind::Flow, 50.0, &mut rng);
            assert!((v - 50.0).abs() <= 2.0 + 1e-12);

            let v = add_noise(SensorKind::Tds, 1200.0, &mut rng);
            assert!((v - 1200.0).abs() <= 1200.0 * 0.05 + 1e-9);
        }
    }

    #[test]
    fn test_trend_needs_ten_samples() {
        let history: Vec<f64> = (0..9).map(f64::from).collect();
        assert_eq!(classify_trend(history.iter()), Trend::Stable);
    }

    #[test]
    fn test_trend_up_down_stable() {
        let rising: Vec<f64> = vec![1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0];
        assert_eq!(classify_trend(rising.iter()), Trend::Up);

        let falling: Vec<f64> = vec![2.0, 2.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        assert_eq!(classify_trend(falling.iter()), Trend::Down);

        let flat: Vec<f64> = vec![5.0; 10];
        assert_eq!(classify_trend(flat.iter()), Trend::Stable);
    }

    #[test]
    fn test_trend_threshold_is_two_percent() {
        // +1.9%: stable; +2.1%: up
        let nearly: Vec<f64> = [[1.0; 5], [1.019; 5]].concat();
        assert_eq!(classify_trend(nearly.iter()), Trend::Stable);

        let over: Vec<f64> = [[1.0; 5], [1.021; 5]].concat();
        assert_eq!(classify_trend(over.iter()), Trend::Up);
    }

    #[test]
    fn test_trend_zero_baseline_guarded() {
        // Earlier window mean of exactly zero must not produce NaN/Infinity
        let history: Vec<f64> = [[0.0; 5], [3.0; 5]].concat();
        assert_eq!(classify_trend(history.iter()), Trend::Stable);
    }

    #[test]
    fn test_trend_uses_only_last_ten() {
        // Old samples beyond the 10-sample window must not matter
        let mut history: Vec<f64> = vec![100.0; 50];
        history.extend_from_slice(&[[1.0; 5], [2.0; 5]].concat());
        assert_eq!(classify_trend(history.iter()), Trend::Up);
    }

    #[test]
    fn test_history_bound_and_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut channel = SensorChannel::new(0.0);

        for i in 1..=400 {
            update_channel(&mut channel, SensorKind::Bod, f64::from(i), &mut rng);
        }

        assert_eq!(channel.history.len(), SENSOR_HISTORY_LEN);
        // Exactly the most recent values, in arrival order
        assert!((channel.history.front().copied().unwrap() - 101.0).abs() < f64::EPSILON);
        assert!((channel.history.back().copied().unwrap() - 400.0).abs() < f64::EPSILON);
        let collected: Vec<f64> = channel.history.iter().copied().collect();
        for w in collected.windows(2) {
            assert!((w[1] - w[0] - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_history_holds_noise_free_values() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut channel = SensorChannel::new(4.0);
        update_channel(&mut channel, SensorKind::DissolvedOxygen, 4.5, &mut rng);

        // The exact physical value lands in history; the display value is noisy
        assert!((channel.history.back().copied().unwrap() - 4.5).abs() < f64::EPSILON);
    }
}
