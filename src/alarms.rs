//! Threshold alarm engine with hysteresis and per-condition dedup.
//!
//! Each tick every monitored channel is checked against its bounds. A bound
//! violation raises at most one uncleared alarm per (sensor, condition)
//! pair — re-evaluating an unchanged or still-breached condition never
//! duplicates, even though the message embeds the triggering value. Clearing
//! uses a 5% dead band around the bound so a value hovering at the threshold
//! cannot chatter the alarm list. Acknowledgement is an orthogonal operator
//! flag and has no effect on clearing. Alarms are never deleted, only
//! flagged.
//!
//! Known limitation: distinct physical causes tripping the same channel in
//! the same direction silently merge into one alarm.

use chrono::{DateTime, Utc};

use crate::config::defaults::{ALARM_CLEAR_HYSTERESIS, ALARM_CRITICAL_MARGIN};
use crate::types::{
    thresholds_for, Alarm, AlarmCondition, AlarmSeverity, SensorBank, SensorKind,
};

/// Owns the alarm list and the monotonic id counter.
#[derive(Debug, Clone)]
pub struct AlarmEngine {
    alarms: Vec<Alarm>,
    next_id: u64,
}

impl AlarmEngine {
    pub fn new() -> Self {
        Self {
            alarms: Vec::new(),
            next_id: 1,
        }
    }

    /// Evaluate every channel: raise new alarms, clear recovered ones, and
    /// refresh each channel's alarm flag. Returns clones of the alarms
    /// raised this tick (for event logging).
    pub fn evaluate(&mut self, sensors: &mut SensorBank, now: DateTime<Utc>) -> Vec<Alarm> {
        let mut raised = Vec::new();

        for kind in SensorKind::ALL {
            let value = sensors.get(kind).value;
            if let Some(alarm) = self.check_channel(kind, value, now) {
                raised.push(alarm);
            }
        }

        self.clear_recovered(sensors);

        for kind in SensorKind::ALL {
            let active = self.has_active_for(kind);
            sensors.get_mut(kind).alarm = active;
        }

        raised
    }

    /// Check one channel against its bounds, raising if needed.
    fn check_channel(
        &mut self,
        kind: SensorKind,
        value: f64,
        now: DateTime<Utc>,
    ) -> Option<Alarm> {
        let thresholds = thresholds_for(kind);

        let (condition, severity, message) = if let Some(high) =
            thresholds.high.filter(|&h| value > h)
        {
            let severity = if value > high * (1.0 + ALARM_CRITICAL_MARGIN) {
                AlarmSeverity::Critical
            } else {
                AlarmSeverity::Warning
            };
            (
                AlarmCondition::High,
                severity,
                format!("{} HIGH: {:.2}", kind.label(), value),
            )
        } else if let Some(low) = thresholds.low.filter(|&l| value < l) {
            let severity = if value < low * (1.0 - ALARM_CRITICAL_MARGIN) {
                AlarmSeverity::Critical
            } else {
                AlarmSeverity::Warning
            };
            (
                AlarmCondition::Low,
                severity,
                format!("{} LOW: {:.2}", kind.label(), value),
            )
        } else {
            return None;
        };

        // Dedup: an uncleared alarm for the same channel and direction
        // suppresses a new one (this subsumes message-identity dedup — the
        // value inside the message may drift while the condition persists)
        if self
            .alarms
            .iter()
            .any(|a| !a.cleared && a.sensor == kind && a.condition == condition)
        {
            return None;
        }

        let alarm = Alarm {
            id: self.next_id,
            timestamp: now,
            severity,
            message,
            sensor: kind,
            condition,
            acknowledged: false,
            cleared: false,
        };
        self.next_id += 1;

        tracing::warn!(
            sensor = %kind,
            severity = ?alarm.severity,
            message = %alarm.message,
            "Alarm raised"
        );

        self.alarms.push(alarm.clone());
        Some(alarm)
    }

    /// Clear alarms whose condition has recovered past the hysteresis band.
    fn clear_recovered(&mut self, sensors: &SensorBank) {
        for alarm in self.alarms.iter_mut().filter(|a| !a.cleared) {
            let value = sensors.get(alarm.sensor).value;
            let thresholds = thresholds_for(alarm.sensor);

            let recovered = match alarm.condition {
                AlarmCondition::High => thresholds
                    .high
                    .is_some_and(|h| value < h * (1.0 - ALARM_CLEAR_HYSTERESIS)),
                AlarmCondition::Low => thresholds
                    .low
                    .is_some_and(|l| value > l * (1.0 + ALARM_CLEAR_HYSTERESIS)),
            };

            if recovered {
                alarm.cleared = true;
                tracing::info!(sensor = %alarm.sensor, message = %alarm.message, "Alarm cleared");
            }
        }
    }

    /// Mark an alarm acknowledged. Returns false for an unknown id.
    pub fn acknowledge(&mut self, id: u64) -> bool {
        match self.alarms.iter_mut().find(|a| a.id == id) {
            Some(alarm) => {
                alarm.acknowledged = true;
                true
            }
            None => false,
        }
    }

    /// Any uncleared alarm referencing this channel?
    fn has_active_for(&self, kind: SensorKind) -> bool {
        self.alarms.iter().any(|a| !a.cleared && a.sensor == kind)
    }

    /// All alarms, raised order, cleared included.
    pub fn all(&self) -> &[Alarm] {
        &self.alarms
    }

    /// Uncleared alarms only.
    pub fn active(&self) -> impl Iterator<Item = &Alarm> {
        self.alarms.iter().filter(|a| !a.cleared)
    }

    pub fn to_vec(&self) -> Vec<Alarm> {
        self.alarms.clone()
    }
}

impl Default for AlarmEngine {
    fn default() -> Self {
        Self::new()
    }
}
