//! Static scenario catalog and scoring dispatch.
//!
//! Every scenario is a variant of [`ScenarioKind`]; definitions and scoring
//! formulas dispatch through `match`, so the full set is statically
//! enumerable and each formula is testable in isolation. Scoring is
//! deliberately *not* uniform: each scenario keeps its own rule for
//! combining component scores into a total and a star rating.

use crate::types::{
    PlantState, ScenarioScore, ScenarioState, TimedEvent, TimedEventKind,
};

// ============================================================================
// Kinds
// ============================================================================

/// The playable scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    Tutorial,
    LoadSurge,
    SensorFailure,
    EnergyOptimization,
    EmergencyShutdown,
    MultiFault,
}

impl ScenarioKind {
    /// All scenarios, in catalog order.
    pub const ALL: [ScenarioKind; 6] = [
        ScenarioKind::Tutorial,
        ScenarioKind::LoadSurge,
        ScenarioKind::SensorFailure,
        ScenarioKind::EnergyOptimization,
        ScenarioKind::EmergencyShutdown,
        ScenarioKind::MultiFault,
    ];

    /// Stable string id used in persisted progress and the API.
    pub fn id(self) -> &'static str {
        match self {
            ScenarioKind::Tutorial => "tutorial",
            ScenarioKind::LoadSurge => "load-surge",
            ScenarioKind::SensorFailure => "sensor-failure",
            ScenarioKind::EnergyOptimization => "energy-optimization",
            ScenarioKind::EmergencyShutdown => "emergency-shutdown",
            ScenarioKind::MultiFault => "multi-fault",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    /// Build this scenario's static definition.
    pub fn definition(self) -> ScenarioDefinition {
        match self {
            ScenarioKind::Tutorial => tutorial(),
            ScenarioKind::LoadSurge => load_surge(),
            ScenarioKind::SensorFailure => sensor_failure(),
            ScenarioKind::EnergyOptimization => energy_optimization(),
            ScenarioKind::EmergencyShutdown => emergency_shutdown(),
            ScenarioKind::MultiFault => multi_fault(),
        }
    }

    /// Score a run. Pure: reads the scenario and process state, mutates
    /// nothing.
    pub fn score(self, scenario: &ScenarioState, plant: &PlantState) -> ScenarioScore {
        match self {
            ScenarioKind::Tutorial => score_tutorial(scenario),
            ScenarioKind::LoadSurge => score_load_surge(scenario),
            ScenarioKind::SensorFailure => score_objective_fraction(scenario, 2),
            ScenarioKind::EnergyOptimization => score_energy_optimization(plant),
            ScenarioKind::EmergencyShutdown => score_emergency_shutdown(scenario),
            ScenarioKind::MultiFault => score_multi_fault(scenario),
        }
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// One measurable goal as declared in the catalog.
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveDef {
    pub id: &'static str,
    pub description: &'static str,
    pub target: f64,
    pub unit: &'static str,
}

/// One guided step as declared in the catalog.
#[derive(Debug, Clone, Copy)]
pub struct StepDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Presentation-layer selector; opaque to the engine
    pub highlight: Option<&'static str>,
}

/// A complete static scenario definition.
#[derive(Debug, Clone)]
pub struct ScenarioDefinition {
    pub kind: ScenarioKind,
    pub title: &'static str,
    pub description: &'static str,
    /// 1 (easy) to 5 (hard)
    pub difficulty: u8,
    pub duration_minutes: u64,
    pub objective_summary: &'static str,
    pub objectives: Vec<ObjectiveDef>,
    pub steps: Vec<StepDef>,
    pub events: Vec<TimedEvent>,
}

fn timed(offset_secs: u64, kind: TimedEventKind, description: &str) -> TimedEvent {
    TimedEvent {
        offset_secs,
        kind,
        description: description.to_string(),
    }
}

fn tutorial() -> ScenarioDefinition {
    ScenarioDefinition {
        kind: ScenarioKind::Tutorial,
        title: "Tutorial: Normal Operation",
        description: "Learn the basics of plant operation in a guided walkthrough",
        difficulty: 1,
        duration_minutes: 10,
        objective_summary: "Complete all tutorial steps",
        objectives: vec![
            ObjectiveDef {
                id: "start",
                description: "Start the simulation",
                target: 1.0,
                unit: "task",
            },
            ObjectiveDef {
                id: "observe",
                description: "Observe DO level for 30 seconds",
                target: 30.0,
                unit: "sec",
            },
            ObjectiveDef {
                id: "setpoint",
                description: "Change DO setpoint to 5.0",
                target: 5.0,
                unit: "mg/L",
            },
            ObjectiveDef {
                id: "stabilize",
                description: "Wait for DO to stabilize",
                target: 1.0,
                unit: "task",
            },
            ObjectiveDef {
                id: "ai",
                description: "Accept AI recommendation",
                target: 1.0,
                unit: "task",
            },
            ObjectiveDef {
                id: "alarm",
                description: "Acknowledge an alarm",
                target: 1.0,
                unit: "task",
            },
        ],
        steps: vec![
            StepDef {
                id: "start-sim",
                title: "Start Simulation",
                description: "Start the simulation to begin the exercise.",
                highlight: Some("[data-action=\"start-simulation\"]"),
            },
            StepDef {
                id: "observe-sensors",
                title: "Observe Sensors",
                description: "Watch the DO sensor for 30 seconds and note how the value moves.",
                highlight: None,
            },
            StepDef {
                id: "change-setpoint",
                title: "Adjust DO Setpoint",
                description: "Change the DO setpoint to 5.0 mg/L and watch the PID respond.",
                highlight: Some("[data-control=\"do-setpoint\"]"),
            },
            StepDef {
                id: "watch-stabilize",
                title: "Watch Stabilization",
                description: "Observe the blower speed adjust as DO approaches the new setpoint.",
                highlight: None,
            },
            StepDef {
                id: "use-ai",
                title: "Use AI Optimizer",
                description: "Accept the AI recommendation to apply its suggested setpoint.",
                highlight: Some("[data-action=\"accept-ai\"]"),
            },
            StepDef {
                id: "handle-alarm",
                title: "Handle Alarms",
                description: "When an alarm appears, acknowledge it to silence it.",
                highlight: None,
            },
        ],
        events: vec![],
    }
}

fn load_surge() -> ScenarioDefinition {
    ScenarioDefinition {
        kind: ScenarioKind::LoadSurge,
        title: "Challenge 1: Load Surge",
        description: "Handle a sudden 50% increase in influent BOD from factory discharge",
        difficulty: 2,
        duration_minutes: 15,
        objective_summary: "Maintain outlet BOD < 30mg/L for 10 minutes",
        objectives: vec![
            ObjectiveDef {
                id: "bod-compliance",
                description: "Keep outlet BOD < 30 mg/L",
                target: 30.0,
                unit: "mg/L",
            },
            ObjectiveDef {
                id: "time-duration",
                description: "Maintain for 10 minutes",
                target: 600.0,
                unit: "sec",
            },
            ObjectiveDef {
                id: "energy-efficiency",
                description: "Energy < 2.5 kWh/m³",
                target: 2.5,
                unit: "kWh/m³",
            },
        ],
        steps: vec![],
        events: vec![
            timed(
                60,
                TimedEventKind::Inject,
                "Factory discharge detected! Influent BOD increasing to 950 mg/L",
            ),
            timed(
                120,
                TimedEventKind::Message,
                "AI recommends increasing DO setpoint to 5.2 mg/L",
            ),
            timed(
                300,
                TimedEventKind::Check,
                "Midpoint check: Are you maintaining compliance?",
            ),
        ],
    }
}

fn sensor_failure() -> ScenarioDefinition {
    ScenarioDefinition {
        kind: ScenarioKind::SensorFailure,
        title: "Challenge 2: Sensor Failure Recovery",
        description: "Continue operations when the DO sensor fails unexpectedly",
        difficulty: 3,
        duration_minutes: 20,
        objective_summary: "Maintain treatment quality without DO sensor",
        objectives: vec![
            ObjectiveDef {
                id: "detect-failure",
                description: "Recognize sensor failure",
                target: 1.0,
                unit: "task",
            },
            ObjectiveDef {
                id: "switch-manual",
                description: "Switch to manual control",
                target: 1.0,
                unit: "task",
            },
            ObjectiveDef {
                id: "maintain-quality",
                description: "Keep BOD < 50 mg/L",
                target: 50.0,
                unit: "mg/L",
            },
        ],
        steps: vec![],
        events: vec![
            timed(
                120,
                TimedEventKind::Inject,
                "DO sensor failed! Showing \"--\" value",
            ),
            timed(
                180,
                TimedEventKind::Message,
                "Hint: Use pH and BOD trends to estimate DO needs",
            ),
        ],
    }
}

fn energy_optimization() -> ScenarioDefinition {
    ScenarioDefinition {
        kind: ScenarioKind::EnergyOptimization,
        title: "Challenge 3: Energy Optimization",
        description: "Minimize energy consumption while maintaining treatment standards",
        difficulty: 2,
        duration_minutes: 30,
        objective_summary: "Achieve < 1.5 kWh/m³ with BOD < 20mg/L",
        objectives: vec![
            ObjectiveDef {
                id: "energy",
                description: "Energy < 1.5 kWh/m³",
                target: 1.5,
                unit: "kWh/m³",
            },
            ObjectiveDef {
                id: "bod",
                description: "BOD < 20 mg/L",
                target: 20.0,
                unit: "mg/L",
            },
            ObjectiveDef {
                id: "duration",
                description: "Maintain for 20 minutes",
                target: 1200.0,
                unit: "sec",
            },
        ],
        steps: vec![],
        events: vec![],
    }
}

fn emergency_shutdown() -> ScenarioDefinition {
    ScenarioDefinition {
        kind: ScenarioKind::EmergencyShutdown,
        title: "Challenge 4: Emergency Shutdown",
        description: "Execute safe shutdown procedure after pump trip",
        difficulty: 3,
        duration_minutes: 10,
        objective_summary: "Complete all shutdown steps correctly",
        objectives: vec![
            ObjectiveDef {
                id: "stop-feed",
                description: "Stop feed pump",
                target: 1.0,
                unit: "task",
            },
            ObjectiveDef {
                id: "maintain-aeration",
                description: "Maintain aeration",
                target: 1.0,
                unit: "task",
            },
            ObjectiveDef {
                id: "activate-bypass",
                description: "Activate bypass valve",
                target: 1.0,
                unit: "task",
            },
        ],
        steps: vec![],
        events: vec![timed(
            10,
            TimedEventKind::Alarm,
            "ALARM: Recirculation pump tripped!",
        )],
    }
}

fn multi_fault() -> ScenarioDefinition {
    ScenarioDefinition {
        kind: ScenarioKind::MultiFault,
        title: "Challenge 5: Multi-fault Chaos",
        description: "Handle multiple simultaneous failures in hard mode",
        difficulty: 5,
        duration_minutes: 45,
        objective_summary: "Survive all failures and restore normal operation",
        objectives: vec![
            ObjectiveDef {
                id: "handle-sensor",
                description: "Handle sensor failure",
                target: 1.0,
                unit: "task",
            },
            ObjectiveDef {
                id: "handle-pump",
                description: "Handle pump trip",
                target: 1.0,
                unit: "task",
            },
            ObjectiveDef {
                id: "handle-surge",
                description: "Handle load surge",
                target: 1.0,
                unit: "task",
            },
            ObjectiveDef {
                id: "restore",
                description: "Restore normal operation",
                target: 1.0,
                unit: "task",
            },
        ],
        steps: vec![],
        events: vec![
            timed(60, TimedEventKind::Inject, "DO sensor failure!"),
            timed(180, TimedEventKind::Inject, "Dosing pump trip!"),
            timed(300, TimedEventKind::Inject, "Massive load surge!"),
        ],
    }
}

// ============================================================================
// Scoring
// ============================================================================

fn completed_objectives(scenario: &ScenarioState) -> usize {
    scenario.objectives.iter().filter(|o| o.completed).count()
}

/// Tutorial: performance tracks completed steps; efficiency and speed are
/// full marks. Total = performance + 50.
fn score_tutorial(scenario: &ScenarioState) -> ScenarioScore {
    let total_steps = scenario.steps.len().max(1);
    let completed = scenario.steps.iter().filter(|s| s.completed).count();
    let performance = completed as f64 / total_steps as f64 * 50.0;

    let stars = if performance > 45.0 {
        3
    } else if performance > 35.0 {
        2
    } else {
        1
    };

    ScenarioScore::assemble(performance, 30.0, 20.0, performance + 50.0, stars)
}

/// Load surge: weighted objective credit plus a speed bonus decaying with
/// elapsed time.
fn score_load_surge(scenario: &ScenarioState) -> ScenarioScore {
    let obj_done = |i: usize| scenario.objectives.get(i).is_some_and(|o| o.completed);

    let bod_compliance = if obj_done(0) { 40.0 } else { 0.0 };
    let time_compliance = if obj_done(1) { 10.0 } else { 0.0 };
    let energy_score = if obj_done(2) { 30.0 } else { 15.0 };
    let speed_bonus = (20.0 - scenario.elapsed_secs as f64 / 30.0).max(0.0);

    let performance = bod_compliance + time_compliance;
    let total = performance + energy_score + speed_bonus;

    let stars = if total >= 90.0 {
        3
    } else if total >= 70.0 {
        2
    } else {
        1
    };

    ScenarioScore::assemble(performance, energy_score, speed_bonus, total, stars)
}

/// Completed-objective fraction with fixed efficiency/speed marks; total is
/// the raw completion percentage. `two_star_min` is the completed count
/// needed for two stars.
fn score_objective_fraction(scenario: &ScenarioState, two_star_min: usize) -> ScenarioScore {
    let total_objectives = scenario.objectives.len().max(1);
    let completed = completed_objectives(scenario);
    let fraction = completed as f64 / total_objectives as f64;

    let stars = if completed == total_objectives {
        3
    } else if completed >= two_star_min {
        2
    } else {
        1
    };

    ScenarioScore::assemble(fraction * 50.0, 30.0, 20.0, fraction * 100.0, stars)
}

/// Energy optimization: efficiency credit from the energy margin, process
/// credit from the treated effluent quality at scoring time.
fn score_energy_optimization(plant: &PlantState) -> ScenarioScore {
    let energy_saved: f64 = ((1.8 - 1.5) / 1.8 * 50.0_f64).max(0.0);
    let bod_compliance = if plant.stages.treated.bod < 20.0 {
        30.0
    } else {
        0.0
    };

    let combined = energy_saved + bod_compliance;
    let stars = if combined > 70.0 {
        3
    } else if combined > 50.0 {
        2
    } else {
        1
    };

    ScenarioScore::assemble(
        bod_compliance,
        energy_saved,
        20.0,
        combined + 20.0,
        stars,
    )
}

/// Emergency shutdown: all-or-nothing total — a perfect run scores 100,
/// anything less scores 30 per correct step.
fn score_emergency_shutdown(scenario: &ScenarioState) -> ScenarioScore {
    let correct = completed_objectives(scenario);
    let all_done = correct == scenario.objectives.len() && !scenario.objectives.is_empty();
    let total = if all_done { 100.0 } else { correct as f64 * 30.0 };

    let stars = if (total - 100.0).abs() < f64::EPSILON {
        3
    } else if total >= 60.0 {
        2
    } else {
        1
    };

    ScenarioScore::assemble(
        correct as f64 * 20.0,
        30.0,
        if all_done { 20.0 } else { 0.0 },
        total,
        stars,
    )
}

/// Multi-fault: completion fraction over four faults with tight star bands.
fn score_multi_fault(scenario: &ScenarioState) -> ScenarioScore {
    let total_objectives = scenario.objectives.len().max(1);
    let fraction = completed_objectives(scenario) as f64 / total_objectives as f64;
    let total = fraction * 100.0;

    let stars = if total >= 95.0 {
        3
    } else if total >= 75.0 {
        2
    } else {
        1
    };

    ScenarioScore::assemble(fraction * 50.0, 30.0, 20.0, total, stars)
}
