//! Equipment registry: actuator run state and cumulative runtime hours.
//!
//! Runtime hours feed maintenance scheduling, so they accrue only while a
//! unit is actually running. Toggles and speed/position writes are direct
//! operator actions; the per-tick accumulation runs from the engine.

use crate::types::{Blower, BypassValve, DosingPump, Equipment, EquipmentId, Pump};

/// Add runtime to a unit's hour counter if it is running.
fn accrue(hours: f64, running: bool, dt_secs: f64) -> f64 {
    if running {
        hours + dt_secs / 3600.0
    } else {
        hours
    }
}

/// Registry of all plant actuators.
#[derive(Debug, Clone)]
pub struct EquipmentRegistry {
    state: Equipment,
}

impl EquipmentRegistry {
    /// Commissioning state: everything running with realistic service hours.
    pub fn new() -> Self {
        Self {
            state: Equipment {
                blower: Blower {
                    speed: 50.0,
                    running: true,
                    hours: 1234.0,
                },
                feed_pump: Pump {
                    running: true,
                    hours: 5678.0,
                },
                recirc_pump: Pump {
                    running: true,
                    hours: 3456.0,
                },
                dosing_pump: DosingPump {
                    speed: 30.0,
                    running: true,
                    hours: 2345.0,
                },
                bypass_valve: BypassValve { position: 0.0 },
            },
        }
    }

    /// Flip a unit's running state; returns the new state.
    pub fn toggle(&mut self, unit: EquipmentId) -> bool {
        match unit {
            EquipmentId::FeedPump => {
                self.state.feed_pump.running = !self.state.feed_pump.running;
                self.state.feed_pump.running
            }
            EquipmentId::RecircPump => {
                self.state.recirc_pump.running = !self.state.recirc_pump.running;
                self.state.recirc_pump.running
            }
            EquipmentId::DosingPump => {
                self.state.dosing_pump.running = !self.state.dosing_pump.running;
                self.state.dosing_pump.running
            }
        }
    }

    /// Direct blower speed write (%), clamped to [0, 100].
    pub fn set_blower_speed(&mut self, speed: f64) {
        self.state.blower.speed = speed.clamp(0.0, 100.0);
    }

    /// Direct dosing pump speed write (%), clamped to [0, 100].
    pub fn set_dosing_pump_speed(&mut self, speed: f64) {
        self.state.dosing_pump.speed = speed.clamp(0.0, 100.0);
    }

    /// Direct bypass valve position write (%), clamped to [0, 100].
    pub fn set_bypass_valve_position(&mut self, position: f64) {
        self.state.bypass_valve.position = position.clamp(0.0, 100.0);
    }

    /// Per-tick runtime accumulation for every running unit.
    pub fn accumulate_runtime(&mut self, dt_secs: f64) {
        let s = &mut self.state;
        s.blower.hours = accrue(s.blower.hours, s.blower.running, dt_secs);
        s.feed_pump.hours = accrue(s.feed_pump.hours, s.feed_pump.running, dt_secs);
        s.recirc_pump.hours = accrue(s.recirc_pump.hours, s.recirc_pump.running, dt_secs);
        s.dosing_pump.hours = accrue(s.dosing_pump.hours, s.dosing_pump.running, dt_secs);
    }

    pub fn state(&self) -> &Equipment {
        &self.state
    }

    pub fn blower_speed(&self) -> f64 {
        self.state.blower.speed
    }
}

impl Default for EquipmentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
