//! Core process state types: stages, sensors, equipment, control, alarms, events.
//!
//! Everything here is a plain serializable snapshot type. The engine builds a
//! fresh [`PlantState`] each tick; consumers (API handlers, the scenario
//! engine, tests) only ever see owned clones, never partially-updated state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ============================================================================
// Treatment Stages
// ============================================================================

/// One treatment stage's load for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageData {
    /// Stage volume (m³)
    pub volume: f64,
    /// Biological Oxygen Demand (mg/L)
    pub bod: f64,
    /// Total Suspended Solids (mg/L)
    pub tss: f64,
}

impl StageData {
    pub const fn new(volume: f64, bod: f64, tss: f64) -> Self {
        Self { volume, bod, tss }
    }
}

/// The full cascade: raw influent through treated effluent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stages {
    pub raw: StageData,
    pub primary: StageData,
    pub secondary: StageData,
    pub tertiary: StageData,
    pub treated: StageData,
}

// ============================================================================
// Sensors
// ============================================================================

/// Direction of a sensor's short-term trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Monitored process quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    #[serde(rename = "DO")]
    DissolvedOxygen,
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "TSS")]
    Tss,
    #[serde(rename = "BOD")]
    Bod,
    #[serde(rename = "flow")]
    Flow,
    #[serde(rename = "TDS")]
    Tds,
    #[serde(rename = "turbidity")]
    Turbidity,
    #[serde(rename = "pressure")]
    Pressure,
}

impl SensorKind {
    /// All monitored channels, in display order.
    pub const ALL: [SensorKind; 8] = [
        SensorKind::DissolvedOxygen,
        SensorKind::Ph,
        SensorKind::Tss,
        SensorKind::Bod,
        SensorKind::Flow,
        SensorKind::Tds,
        SensorKind::Turbidity,
        SensorKind::Pressure,
    ];

    /// Uppercase label used in alarm messages and exports.
    pub fn label(self) -> &'static str {
        match self {
            SensorKind::DissolvedOxygen => "DO",
            SensorKind::Ph => "PH",
            SensorKind::Tss => "TSS",
            SensorKind::Bod => "BOD",
            SensorKind::Flow => "FLOW",
            SensorKind::Tds => "TDS",
            SensorKind::Turbidity => "TURBIDITY",
            SensorKind::Pressure => "PRESSURE",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One monitored channel: noisy display value, noise-free rolling history,
/// trend classification, and an active-alarm flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorChannel {
    pub value: f64,
    pub history: VecDeque<f64>,
    pub trend: Trend,
    pub alarm: bool,
}

impl SensorChannel {
    /// Channel seeded with one initial sample.
    pub fn new(initial: f64) -> Self {
        let mut history = VecDeque::new();
        history.push_back(initial);
        Self {
            value: initial,
            history,
            trend: Trend::Stable,
            alarm: false,
        }
    }
}

/// All monitored channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorBank {
    #[serde(rename = "DO")]
    pub dissolved_oxygen: SensorChannel,
    #[serde(rename = "pH")]
    pub ph: SensorChannel,
    #[serde(rename = "TSS")]
    pub tss: SensorChannel,
    #[serde(rename = "BOD")]
    pub bod: SensorChannel,
    pub flow: SensorChannel,
    #[serde(rename = "TDS")]
    pub tds: SensorChannel,
    pub turbidity: SensorChannel,
    pub pressure: SensorChannel,
}

impl SensorBank {
    pub fn get(&self, kind: SensorKind) -> &SensorChannel {
        match kind {
            SensorKind::DissolvedOxygen => &self.dissolved_oxygen,
            SensorKind::Ph => &self.ph,
            SensorKind::Tss => &self.tss,
            SensorKind::Bod => &self.bod,
            SensorKind::Flow => &self.flow,
            SensorKind::Tds => &self.tds,
            SensorKind::Turbidity => &self.turbidity,
            SensorKind::Pressure => &self.pressure,
        }
    }

    pub fn get_mut(&mut self, kind: SensorKind) -> &mut SensorChannel {
        match kind {
            SensorKind::DissolvedOxygen => &mut self.dissolved_oxygen,
            SensorKind::Ph => &mut self.ph,
            SensorKind::Tss => &mut self.tss,
            SensorKind::Bod => &mut self.bod,
            SensorKind::Flow => &mut self.flow,
            SensorKind::Tds => &mut self.tds,
            SensorKind::Turbidity => &mut self.turbidity,
            SensorKind::Pressure => &mut self.pressure,
        }
    }
}

// ============================================================================
// Equipment
// ============================================================================

/// Aeration blower: the DO control actuator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blower {
    /// Commanded speed (% of rated)
    pub speed: f64,
    pub running: bool,
    /// Cumulative runtime hours
    pub hours: f64,
}

/// Fixed-speed pump (feed / recirculation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pump {
    pub running: bool,
    pub hours: f64,
}

/// Variable-speed chemical dosing pump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DosingPump {
    pub speed: f64,
    pub running: bool,
    pub hours: f64,
}

/// Emergency bypass valve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BypassValve {
    /// Open position (%)
    pub position: f64,
}

/// All plant actuators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub blower: Blower,
    pub feed_pump: Pump,
    pub recirc_pump: Pump,
    pub dosing_pump: DosingPump,
    pub bypass_valve: BypassValve,
}

/// Operator-toggleable equipment units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentId {
    FeedPump,
    RecircPump,
    DosingPump,
}

impl EquipmentId {
    pub fn display_name(self) -> &'static str {
        match self {
            EquipmentId::FeedPump => "feed pump",
            EquipmentId::RecircPump => "recirculation pump",
            EquipmentId::DosingPump => "dosing pump",
        }
    }
}

// ============================================================================
// DO Control
// ============================================================================

/// DO control loop mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    Auto,
    Manual,
}

impl std::fmt::Display for ControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlMode::Auto => write!(f, "AUTO"),
            ControlMode::Manual => write!(f, "MANUAL"),
        }
    }
}

/// Read-only view of the PID internals for dashboards and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidSnapshot {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub integral: f64,
    pub last_error: f64,
}

/// DO control loop state as published in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoControl {
    /// Target DO concentration (mg/L)
    pub setpoint: f64,
    pub mode: ControlMode,
    pub pid: PidSnapshot,
    /// Last commanded blower speed (%)
    pub output: f64,
}

// ============================================================================
// Advisory (AI Optimizer)
// ============================================================================

/// Forecast-based setpoint advisory state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiState {
    pub enabled: bool,
    /// Suggested DO setpoint (mg/L)
    pub recommended_setpoint: f64,
    /// Forecast influent load multiplier two hours ahead
    pub predicted_load: f64,
    /// Estimated aeration energy savings (%) if the recommendation is applied
    pub energy_savings: f64,
}

// ============================================================================
// Alarms
// ============================================================================

/// Alarm severity ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSeverity {
    Info,
    Warning,
    Critical,
}

/// Which bound a threshold alarm tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmCondition {
    High,
    Low,
}

/// A raised threshold alarm. Never deleted — only flagged acknowledged/cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    /// Monotonic, unique within the engine's lifetime
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub severity: AlarmSeverity,
    /// Dedup key: at most one uncleared alarm exists per distinct message
    pub message: String,
    pub sensor: SensorKind,
    pub condition: AlarmCondition,
    pub acknowledged: bool,
    pub cleared: bool,
}

// ============================================================================
// Events
// ============================================================================

/// Event log entry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Info,
    Warning,
    Alarm,
    Control,
}

/// One append-only journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub message: String,
}

// ============================================================================
// Plant Snapshot
// ============================================================================

/// Complete, consistent snapshot of the process state after one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
    pub timestamp: DateTime<Utc>,
    pub running: bool,
    /// Ticks executed since engine start
    pub tick_count: u64,
    pub stages: Stages,
    pub sensors: SensorBank,
    pub equipment: Equipment,
    pub control: DoControl,
    pub ai: AiState,
    pub alarms: Vec<Alarm>,
    pub events: Vec<Event>,
}
