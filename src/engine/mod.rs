//! Plant Engine - the single-owner actor driving the digital twin.
//!
//! One task owns every piece of mutable state: the process simulation
//! ([`PlantSim`]), the scenario state machine, and their shared tick timer.
//! Operator mutations and snapshot reads arrive as [`EngineCommand`]s over
//! an mpsc channel and interleave *between* ticks, so a mutation can never
//! observe or corrupt a half-finished tick. Reads reply with owned clones
//! over oneshot channels.
//!
//! Shutdown goes through a [`CancellationToken`]: cancelling twice is a
//! no-op, and the loop also exits when every handle is dropped.

mod plant;

pub use plant::{PlantSim, SimOptions};

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::export;
use crate::scenario::{ProgressStore, ScenarioEngine, ScenarioError};
use crate::types::{
    ControlMode, EquipmentId, EventKind, PlantState, ProgressMap, ScenarioScore, ScenarioState,
    TimedEventKind,
};

// ============================================================================
// Commands
// ============================================================================

/// Commands accepted by the engine task.
#[derive(Debug)]
pub enum EngineCommand {
    // Process mutators
    StartSimulation,
    StopSimulation,
    SetDoSetpoint(f64),
    SetDoMode(ControlMode),
    SetBlowerSpeed(f64),
    ToggleEquipment(EquipmentId),
    SetDosingPumpSpeed(f64),
    SetBypassValvePosition(f64),
    AcknowledgeAlarm {
        id: u64,
        reply: oneshot::Sender<bool>,
    },
    ToggleAi,
    AcceptAiRecommendation,

    // Scenario mutators
    StartScenario {
        id: String,
        reply: oneshot::Sender<Result<(), ScenarioError>>,
    },
    UpdateObjective {
        id: String,
        current: f64,
    },
    CompleteStep {
        id: String,
    },
    PauseScenario,
    ResumeScenario,
    EndScenario {
        reply: oneshot::Sender<ScenarioScore>,
    },

    // Read surface
    GetSnapshot {
        reply: oneshot::Sender<PlantState>,
    },
    GetScenario {
        reply: oneshot::Sender<Option<ScenarioState>>,
    },
    GetProgress {
        reply: oneshot::Sender<ProgressMap>,
    },
    GetCsvExport {
        reply: oneshot::Sender<String>,
    },
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable handle to a running [`PlantEngine`].
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
    cancel: CancellationToken,
}

impl EngineHandle {
    async fn send(&self, cmd: EngineCommand) -> Result<()> {
        self.tx.send(cmd).await.context("Engine channel closed")
    }

    pub async fn start_simulation(&self) -> Result<()> {
        self.send(EngineCommand::StartSimulation).await
    }

    pub async fn stop_simulation(&self) -> Result<()> {
        self.send(EngineCommand::StopSimulation).await
    }

    pub async fn set_do_setpoint(&self, value: f64) -> Result<()> {
        self.send(EngineCommand::SetDoSetpoint(value)).await
    }

    pub async fn set_do_mode(&self, mode: ControlMode) -> Result<()> {
        self.send(EngineCommand::SetDoMode(mode)).await
    }

    pub async fn set_blower_speed(&self, speed: f64) -> Result<()> {
        self.send(EngineCommand::SetBlowerSpeed(speed)).await
    }

    pub async fn toggle_equipment(&self, unit: EquipmentId) -> Result<()> {
        self.send(EngineCommand::ToggleEquipment(unit)).await
    }

    pub async fn set_dosing_pump_speed(&self, speed: f64) -> Result<()> {
        self.send(EngineCommand::SetDosingPumpSpeed(speed)).await
    }

    pub async fn set_bypass_valve_position(&self, position: f64) -> Result<()> {
        self.send(EngineCommand::SetBypassValvePosition(position))
            .await
    }

    /// Returns false for an unknown alarm id.
    pub async fn acknowledge_alarm(&self, id: u64) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::AcknowledgeAlarm { id, reply })
            .await?;
        rx.await.context("Response channel closed")
    }

    pub async fn toggle_ai(&self) -> Result<()> {
        self.send(EngineCommand::ToggleAi).await
    }

    pub async fn accept_ai_recommendation(&self) -> Result<()> {
        self.send(EngineCommand::AcceptAiRecommendation).await
    }

    pub async fn start_scenario(&self, id: &str) -> Result<std::result::Result<(), ScenarioError>> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::StartScenario {
            id: id.to_string(),
            reply,
        })
        .await?;
        rx.await.context("Response channel closed")
    }

    pub async fn update_objective(&self, id: &str, current: f64) -> Result<()> {
        self.send(EngineCommand::UpdateObjective {
            id: id.to_string(),
            current,
        })
        .await
    }

    pub async fn complete_step(&self, id: &str) -> Result<()> {
        self.send(EngineCommand::CompleteStep { id: id.to_string() })
            .await
    }

    pub async fn pause_scenario(&self) -> Result<()> {
        self.send(EngineCommand::PauseScenario).await
    }

    pub async fn resume_scenario(&self) -> Result<()> {
        self.send(EngineCommand::ResumeScenario).await
    }

    /// End the active scenario immediately and return its final score.
    pub async fn end_scenario(&self) -> Result<ScenarioScore> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::EndScenario { reply }).await?;
        rx.await.context("Response channel closed")
    }

    /// Full, consistent process snapshot.
    pub async fn snapshot(&self) -> Result<PlantState> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::GetSnapshot { reply }).await?;
        rx.await.context("Response channel closed")
    }

    pub async fn scenario_state(&self) -> Result<Option<ScenarioState>> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::GetScenario { reply }).await?;
        rx.await.context("Response channel closed")
    }

    pub async fn progress(&self) -> Result<ProgressMap> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::GetProgress { reply }).await?;
        rx.await.context("Response channel closed")
    }

    pub async fn export_csv(&self) -> Result<String> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::GetCsvExport { reply }).await?;
        rx.await.context("Response channel closed")
    }

    /// Stop the engine task. Idempotent: repeated calls are no-ops.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ============================================================================
// Engine
// ============================================================================

/// The engine task. Build with [`PlantEngine::new`], then `tokio::spawn`
/// its [`run`](PlantEngine::run) future.
pub struct PlantEngine {
    sim: PlantSim,
    scenario: ScenarioEngine,
    rx: mpsc::Receiver<EngineCommand>,
    cancel: CancellationToken,
    tick_period: std::time::Duration,
}

impl PlantEngine {
    pub fn new(
        options: SimOptions,
        store: Box<dyn ProgressStore>,
        tick_period: std::time::Duration,
        cancel: CancellationToken,
    ) -> (Self, EngineHandle) {
        let (tx, rx) = mpsc::channel(100);

        let engine = Self {
            sim: PlantSim::new(options),
            scenario: ScenarioEngine::new(store),
            rx,
            cancel: cancel.clone(),
            tick_period,
        };

        let handle = EngineHandle { tx, cancel };

        (engine, handle)
    }

    /// Run until cancellation or until every handle is dropped.
    pub async fn run(mut self) {
        info!(tick_period_ms = self.tick_period.as_millis() as u64, "PlantEngine starting");

        let mut interval = tokio::time::interval(self.tick_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("PlantEngine shutdown signal received");
                    break;
                }
                _ = interval.tick() => {
                    self.handle_tick();
                }
                cmd = self.rx.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd),
                        None => {
                            info!("All engine handles dropped — stopping");
                            break;
                        }
                    }
                }
            }
        }

        info!("PlantEngine stopped");
    }

    /// One shared tick: process first, then the scenario observes the fresh
    /// snapshot. Pausing a scenario never pauses the process itself.
    fn handle_tick(&mut self) {
        let now = Utc::now();
        self.sim.tick(now);

        if self.scenario.is_active() {
            let snapshot = self.sim.snapshot();
            let outcome = self.scenario.tick(now, &snapshot);

            for event in outcome.fired_events {
                self.sim
                    .log_event(event_kind_for(event.kind), event.description, now);
            }
            if let Some(score) = outcome.final_score {
                self.sim.log_event(
                    EventKind::Info,
                    format!("Scenario completed: {:.0}/100", score.total),
                    now,
                );
            }
        }
    }

    fn handle_command(&mut self, cmd: EngineCommand) {
        let now = Utc::now();
        match cmd {
            EngineCommand::StartSimulation => self.sim.start(now),
            EngineCommand::StopSimulation => self.sim.stop(now),
            EngineCommand::SetDoSetpoint(value) => self.sim.set_do_setpoint(value, now),
            EngineCommand::SetDoMode(mode) => self.sim.set_do_mode(mode, now),
            EngineCommand::SetBlowerSpeed(speed) => self.sim.set_blower_speed(speed, now),
            EngineCommand::ToggleEquipment(unit) => self.sim.toggle_equipment(unit, now),
            EngineCommand::SetDosingPumpSpeed(speed) => self.sim.set_dosing_pump_speed(speed),
            EngineCommand::SetBypassValvePosition(position) => {
                self.sim.set_bypass_valve_position(position);
            }
            EngineCommand::AcknowledgeAlarm { id, reply } => {
                let _ = reply.send(self.sim.acknowledge_alarm(id));
            }
            EngineCommand::ToggleAi => self.sim.toggle_ai(now),
            EngineCommand::AcceptAiRecommendation => self.sim.accept_ai_recommendation(now),

            EngineCommand::StartScenario { id, reply } => {
                let result = self.scenario.start(&id, now);
                if result.is_ok() {
                    self.sim
                        .log_event(EventKind::Info, format!("Scenario started: {id}"), now);
                }
                let _ = reply.send(result);
            }
            EngineCommand::UpdateObjective { id, current } => {
                self.scenario.update_objective(&id, current);
            }
            EngineCommand::CompleteStep { id } => self.scenario.complete_step(&id),
            EngineCommand::PauseScenario => self.scenario.pause(now),
            EngineCommand::ResumeScenario => self.scenario.resume(now),
            EngineCommand::EndScenario { reply } => {
                let snapshot = self.sim.snapshot();
                let _ = reply.send(self.scenario.end(now, &snapshot));
            }

            EngineCommand::GetSnapshot { reply } => {
                let _ = reply.send(self.sim.snapshot());
            }
            EngineCommand::GetScenario { reply } => {
                let _ = reply.send(self.scenario.state());
            }
            EngineCommand::GetProgress { reply } => {
                let _ = reply.send(self.scenario.progress());
            }
            EngineCommand::GetCsvExport { reply } => {
                let _ = reply.send(export::snapshot_csv(&self.sim.snapshot()));
            }
        }
    }
}

/// Event-log category for a scripted scenario event.
fn event_kind_for(kind: TimedEventKind) -> EventKind {
    match kind {
        TimedEventKind::Inject => EventKind::Warning,
        TimedEventKind::Message | TimedEventKind::Check => EventKind::Info,
        TimedEventKind::Alarm => EventKind::Alarm,
    }
}
