//! ReFlow: Wastewater Treatment Digital Twin
//!
//! Tick-driven digital-twin engine for a multi-stage industrial wastewater
//! treatment process.
//!
//! ## Architecture
//!
//! - **Simulation**: influent load, treatment cascade, DO mass balance
//! - **Control**: sub-sampled PID loop commanding the aeration blower
//! - **Monitoring**: noisy sensors with bounded history, threshold alarms
//!   with hysteresis, forecast-based setpoint advisories
//! - **Scenario Engine**: timed objectives, guided steps, and scoring
//!   layered on the live process, with persisted per-scenario progress
//! - **Engine Actor**: one task owning all state, ticking at 1 Hz and
//!   applying operator commands between ticks

pub mod advisory;
pub mod alarms;
pub mod api;
pub mod config;
pub mod control;
pub mod engine;
pub mod equipment;
pub mod events;
pub mod export;
pub mod scenario;
pub mod sensors;
pub mod simulation;
pub mod types;

// Re-export the engine surface
pub use engine::{EngineHandle, PlantEngine, PlantSim, SimOptions};

// Re-export commonly used types
pub use types::{
    Alarm, AlarmSeverity, ControlMode, EquipmentId, Event, EventKind, PlantState, ScenarioScore,
    ScenarioState, SensorKind, Trend,
};

// Re-export the scenario surface
pub use scenario::{
    FileProgress, InMemoryProgress, ProgressStore, ScenarioEngine, ScenarioError, ScenarioKind,
};
