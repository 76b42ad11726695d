//! Scenario system types: objectives, steps, timed events, scoring, progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Objectives & Steps
// ============================================================================

/// One measurable scenario goal.
///
/// `completed` is monotonic within a run: once latched true it never
/// reverts, even if `current` later drops below `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioObjective {
    pub id: String,
    pub description: String,
    pub target: f64,
    pub current: f64,
    pub unit: String,
    pub completed: bool,
}

/// One guided step. Steps gate tutorial flow and are independent of
/// objectives. `highlight` is presentation metadata (a UI selector) the
/// engine carries but never interprets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    pub completed: bool,
}

// ============================================================================
// Timed Narrative Events
// ============================================================================

/// Category of a scripted scenario event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimedEventKind {
    /// A disturbance is injected into the story
    Inject,
    /// Operator guidance
    Message,
    /// A scripted alarm
    Alarm,
    /// A mid-run checkpoint prompt
    Check,
}

/// A scripted event fired once when scenario time passes `offset_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Seconds into the scenario
    pub offset_secs: u64,
    #[serde(rename = "type")]
    pub kind: TimedEventKind,
    pub description: String,
}

// ============================================================================
// Scoring
// ============================================================================

/// Final score breakdown. Components are clamped to their documented caps
/// at assembly; `total` follows each scenario's own rule and is not
/// necessarily the component sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioScore {
    /// 0-50
    pub performance: f64,
    /// 0-30
    pub efficiency: f64,
    /// 0-20
    pub speed: f64,
    /// 0-100
    pub total: f64,
    /// 1-3 (0 while the run is in progress)
    pub stars: u8,
}

impl ScenarioScore {
    /// Assemble a score, clamping every component to its cap.
    pub fn assemble(performance: f64, efficiency: f64, speed: f64, total: f64, stars: u8) -> Self {
        Self {
            performance: performance.clamp(0.0, 50.0),
            efficiency: efficiency.clamp(0.0, 30.0),
            speed: speed.clamp(0.0, 20.0),
            total: total.clamp(0.0, 100.0),
            stars: stars.clamp(1, 3),
        }
    }

    /// Zero score for a run still in progress.
    pub const fn zero() -> Self {
        Self {
            performance: 0.0,
            efficiency: 0.0,
            speed: 0.0,
            total: 0.0,
            stars: 0,
        }
    }
}

// ============================================================================
// Scenario State
// ============================================================================

/// Live state of the active scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioState {
    pub id: String,
    pub title: String,
    pub active: bool,
    pub start_time: DateTime<Utc>,
    /// Effective seconds elapsed (paused intervals excluded)
    pub elapsed_secs: u64,
    /// Run duration limit in seconds
    pub time_limit_secs: u64,
    pub objectives: Vec<ScenarioObjective>,
    pub steps: Vec<ScenarioStep>,
    pub events: Vec<TimedEvent>,
    pub score: ScenarioScore,
    pub completed: bool,
    pub paused: bool,
}

// ============================================================================
// Persisted Progress
// ============================================================================

/// Per-scenario record persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioProgress {
    pub completed: bool,
    pub best_score: f64,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_played: Option<DateTime<Utc>>,
}

/// Progress records keyed by scenario id.
pub type ProgressMap = HashMap<String, ScenarioProgress>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_assemble_clamps_components() {
        let s = ScenarioScore::assemble(60.0, 35.0, 25.0, 120.0, 5);
        assert!((s.performance - 50.0).abs() < f64::EPSILON);
        assert!((s.efficiency - 30.0).abs() < f64::EPSILON);
        assert!((s.speed - 20.0).abs() < f64::EPSILON);
        assert!((s.total - 100.0).abs() < f64::EPSILON);
        assert_eq!(s.stars, 3);
    }

    #[test]
    fn test_score_assemble_floors_at_zero() {
        let s = ScenarioScore::assemble(-5.0, -1.0, -0.5, -10.0, 0);
        assert!(s.performance.abs() < f64::EPSILON);
        assert!(s.total.abs() < f64::EPSILON);
        assert_eq!(s.stars, 1);
    }

    #[test]
    fn test_progress_default() {
        let p = ScenarioProgress::default();
        assert!(!p.completed);
        assert_eq!(p.attempts, 0);
        assert!(p.best_score.abs() < f64::EPSILON);
    }
}
