//! Scenario Engine
//!
//! Independent state machine layered on the live process: `idle → active →
//! (paused ⇄ active) → completed`. It observes process snapshots without
//! owning them, drives timed narrative events, latches objective/step
//! completion, and persists per-scenario progress through the
//! [`ProgressStore`] port.
//!
//! Timing decision: effective elapsed time excludes paused intervals. The
//! engine accumulates paused duration and subtracts it from wall-clock
//! elapsed, so pausing never burns scenario time.

mod catalog;
mod progress;

pub use catalog::{ObjectiveDef, ScenarioDefinition, ScenarioKind, StepDef};
pub use progress::{FileProgress, InMemoryProgress, ProgressError, ProgressStore};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::types::{
    PlantState, ProgressMap, ScenarioObjective, ScenarioScore, ScenarioState, ScenarioStep,
    TimedEvent,
};

/// Scenario engine failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("scenario not found: {0}")]
    NotFound(String),
}

/// Everything fired or decided by one scenario tick.
#[derive(Debug, Default)]
pub struct ScenarioTickOutcome {
    /// Narrative events whose offset was crossed this tick
    pub fired_events: Vec<TimedEvent>,
    /// Final score if the time limit ended the run
    pub final_score: Option<ScenarioScore>,
}

/// Bookkeeping the snapshot type doesn't carry.
struct ActiveRun {
    kind: ScenarioKind,
    state: ScenarioState,
    paused_at: Option<DateTime<Utc>>,
    paused_total: Duration,
    /// Index into `state.events` of the next unfired timed event
    next_event: usize,
}

/// The scenario state machine.
pub struct ScenarioEngine {
    active: Option<ActiveRun>,
    progress: ProgressMap,
    store: Box<dyn ProgressStore>,
}

impl ScenarioEngine {
    /// Build the engine, loading persisted progress. A failed load starts
    /// from an empty map rather than refusing to run.
    pub fn new(store: Box<dyn ProgressStore>) -> Self {
        let progress = match store.load() {
            Ok(map) => map,
            Err(e) => {
                warn!(backend = store.backend_name(), error = %e, "Failed to load scenario progress — starting fresh");
                ProgressMap::new()
            }
        };

        Self {
            active: None,
            progress,
            store,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start a scenario from its static definition, replacing any active
    /// run. Unknown ids mutate nothing.
    pub fn start(&mut self, id: &str, now: DateTime<Utc>) -> Result<(), ScenarioError> {
        let kind =
            ScenarioKind::from_id(id).ok_or_else(|| ScenarioError::NotFound(id.to_string()))?;
        let def = kind.definition();

        let state = ScenarioState {
            id: kind.id().to_string(),
            title: def.title.to_string(),
            active: true,
            start_time: now,
            elapsed_secs: 0,
            time_limit_secs: def.duration_minutes * 60,
            objectives: def
                .objectives
                .iter()
                .map(|o| ScenarioObjective {
                    id: o.id.to_string(),
                    description: o.description.to_string(),
                    target: o.target,
                    current: 0.0,
                    unit: o.unit.to_string(),
                    completed: false,
                })
                .collect(),
            steps: def
                .steps
                .iter()
                .map(|s| ScenarioStep {
                    id: s.id.to_string(),
                    title: s.title.to_string(),
                    description: s.description.to_string(),
                    highlight: s.highlight.map(String::from),
                    completed: false,
                })
                .collect(),
            events: def.events,
            score: ScenarioScore::zero(),
            completed: false,
            paused: false,
        };

        self.active = Some(ActiveRun {
            kind,
            state,
            paused_at: None,
            paused_total: Duration::zero(),
            next_event: 0,
        });

        // Attempt counter bumps on every start, including replays
        let entry = self.progress.entry(kind.id().to_string()).or_default();
        entry.attempts += 1;
        entry.last_played = Some(now);
        self.persist();

        info!(scenario = kind.id(), "Scenario started");
        Ok(())
    }

    /// Advance scenario time. Inert while paused or completed. Fires due
    /// narrative events and ends the run at the time limit.
    pub fn tick(&mut self, now: DateTime<Utc>, plant: &PlantState) -> ScenarioTickOutcome {
        let mut outcome = ScenarioTickOutcome::default();

        let Some(run) = self.active.as_mut() else {
            return outcome;
        };
        if run.state.paused || run.state.completed {
            return outcome;
        }

        let effective = now - run.state.start_time - run.paused_total;
        run.state.elapsed_secs = effective.num_seconds().max(0) as u64;

        while run.next_event < run.state.events.len()
            && run.state.events[run.next_event].offset_secs <= run.state.elapsed_secs
        {
            outcome.fired_events.push(run.state.events[run.next_event].clone());
            run.next_event += 1;
        }

        if run.state.elapsed_secs >= run.state.time_limit_secs {
            outcome.final_score = Some(self.end(now, plant));
        }

        outcome
    }

    /// Finish the active run: compute its score and fold the result into
    /// persisted progress. No-op (zero score) without an active run.
    pub fn end(&mut self, now: DateTime<Utc>, plant: &PlantState) -> ScenarioScore {
        let Some(run) = self.active.as_mut() else {
            return ScenarioScore::zero();
        };

        let score = run.kind.score(&run.state, plant);
        run.state.score = score;
        run.state.completed = true;
        run.state.active = false;

        let entry = self.progress.entry(run.kind.id().to_string()).or_default();
        entry.completed = true;
        entry.best_score = entry.best_score.max(score.total);
        entry.last_played = Some(now);

        info!(
            scenario = run.kind.id(),
            total = score.total,
            stars = score.stars,
            "Scenario completed"
        );

        self.persist();
        score
    }

    // ------------------------------------------------------------------
    // Objectives & Steps
    // ------------------------------------------------------------------

    /// Update an objective's measured value. Completion latches: once an
    /// objective is complete a smaller later value cannot revert it.
    pub fn update_objective(&mut self, id: &str, current: f64) {
        let Some(run) = self.active.as_mut() else {
            return;
        };
        if let Some(obj) = run.state.objectives.iter_mut().find(|o| o.id == id) {
            obj.current = current;
            if !obj.completed && current >= obj.target {
                obj.completed = true;
                info!(scenario = run.kind.id(), objective = id, "Objective completed");
            }
        }
    }

    /// Mark a guided step complete. Steps never revert.
    pub fn complete_step(&mut self, id: &str) {
        let Some(run) = self.active.as_mut() else {
            return;
        };
        if let Some(step) = run.state.steps.iter_mut().find(|s| s.id == id) {
            if !step.completed {
                step.completed = true;
                info!(scenario = run.kind.id(), step = id, "Step completed");
            }
        }
    }

    // ------------------------------------------------------------------
    // Pause / Resume
    // ------------------------------------------------------------------

    /// Freeze scenario time. The process simulation keeps running.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        let Some(run) = self.active.as_mut() else {
            return;
        };
        if !run.state.paused && !run.state.completed {
            run.state.paused = true;
            run.paused_at = Some(now);
        }
    }

    /// Resume scenario time, crediting the paused interval.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        let Some(run) = self.active.as_mut() else {
            return;
        };
        if run.state.paused {
            run.state.paused = false;
            if let Some(paused_at) = run.paused_at.take() {
                run.paused_total = run.paused_total + (now - paused_at);
            }
        }
    }

    // ------------------------------------------------------------------
    // Read Surface
    // ------------------------------------------------------------------

    /// Snapshot of the active run, if any.
    pub fn state(&self) -> Option<ScenarioState> {
        self.active.as_ref().map(|run| run.state.clone())
    }

    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|run| !run.state.completed)
    }

    /// Persisted per-scenario progress records.
    pub fn progress(&self) -> ProgressMap {
        self.progress.clone()
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.progress) {
            warn!(backend = self.store.backend_name(), error = %e, "Failed to persist scenario progress");
        }
    }
}
