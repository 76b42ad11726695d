//! Sensor alarm thresholds.

use super::SensorKind;

/// Low/high alarm bounds for one channel. Some channels are one-sided.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorThresholds {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl SensorThresholds {
    const fn both(low: f64, high: f64) -> Self {
        Self {
            low: Some(low),
            high: Some(high),
        }
    }

    const fn high_only(high: f64) -> Self {
        Self {
            low: None,
            high: Some(high),
        }
    }
}

/// Alarm bounds for a channel.
///
/// DO and pressure protect the biology and the aeration header; TSS/BOD
/// catch secondary-stage upsets; flow bounds cover both pump starvation
/// and hydraulic overload.
pub fn thresholds_for(kind: SensorKind) -> SensorThresholds {
    match kind {
        SensorKind::DissolvedOxygen => SensorThresholds::both(1.5, 7.0),
        SensorKind::Ph => SensorThresholds::both(6.5, 8.5),
        SensorKind::Tss => SensorThresholds::high_only(800.0),
        SensorKind::Bod => SensorThresholds::high_only(850.0),
        SensorKind::Flow => SensorThresholds::both(10.0, 95.0),
        SensorKind::Tds => SensorThresholds::high_only(1500.0),
        SensorKind::Turbidity => SensorThresholds::high_only(80.0),
        SensorKind::Pressure => SensorThresholds::both(2.0, 9.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_channel_has_at_least_one_bound() {
        for kind in SensorKind::ALL {
            let t = thresholds_for(kind);
            assert!(
                t.low.is_some() || t.high.is_some(),
                "{kind} has no alarm bounds"
            );
        }
    }

    #[test]
    fn test_one_sided_channels() {
        assert!(thresholds_for(SensorKind::Tss).low.is_none());
        assert!(thresholds_for(SensorKind::Bod).low.is_none());
        assert!(thresholds_for(SensorKind::Tds).low.is_none());
        assert!(thresholds_for(SensorKind::Turbidity).low.is_none());
    }

    #[test]
    fn test_band_sanity() {
        for kind in SensorKind::ALL {
            let t = thresholds_for(kind);
            if let (Some(low), Some(high)) = (t.low, t.high) {
                assert!(low < high, "{kind} low bound above high bound");
            }
        }
    }
}
