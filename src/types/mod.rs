//! Shared data structures for the wastewater digital twin.
//!
//! This module defines the snapshot types exchanged between the engine,
//! the scenario state machine, and the API layer:
//! - Process state: [`PlantState`], [`Stages`], [`SensorBank`], [`Equipment`]
//! - Control: [`DoControl`], [`PidSnapshot`], [`ControlMode`]
//! - Alarms and events: [`Alarm`], [`Event`]
//! - Scenario system: [`ScenarioState`], [`ScenarioScore`], [`ProgressMap`]

mod scenario;
mod state;
mod thresholds;

pub use scenario::{
    ProgressMap, ScenarioObjective, ScenarioProgress, ScenarioScore, ScenarioState, ScenarioStep,
    TimedEvent, TimedEventKind,
};
pub use state::{
    AiState, Alarm, AlarmCondition, AlarmSeverity, Blower, BypassValve, ControlMode, DoControl,
    DosingPump, Equipment, EquipmentId, Event, EventKind, PidSnapshot, PlantState, Pump,
    SensorBank, SensorChannel, SensorKind, StageData, Stages, Trend,
};
pub use thresholds::{thresholds_for, SensorThresholds};
