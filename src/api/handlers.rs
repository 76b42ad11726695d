//! API route handlers.
//!
//! Thin adapters from HTTP requests to [`EngineHandle`] calls. Handlers own
//! no state of their own: every read returns the engine's snapshot and
//! every mutation is one command into the engine task. A closed engine
//! channel surfaces as 500 INTERNAL_ERROR.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::engine::EngineHandle;
use crate::scenario::{ScenarioError, ScenarioKind};
use crate::types::{ControlMode, EquipmentId};

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub engine: EngineHandle,
    pub plant_name: String,
}

fn engine_error(e: anyhow::Error) -> Response {
    ApiErrorResponse::internal(format!("engine unavailable: {e}"))
}

// ============================================================================
// Read Surface
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub plant: String,
    pub running: bool,
    pub tick_count: u64,
    pub active_alarms: usize,
    pub scenario_active: bool,
}

/// GET /api/v1/status: liveness plus a one-line summary.
pub async fn get_status(State(state): State<ApiState>) -> Response {
    let snapshot = match state.engine.snapshot().await {
        Ok(s) => s,
        Err(e) => return engine_error(e),
    };
    let scenario = match state.engine.scenario_state().await {
        Ok(s) => s,
        Err(e) => return engine_error(e),
    };

    ApiResponse::ok(StatusBody {
        plant: state.plant_name.clone(),
        running: snapshot.running,
        tick_count: snapshot.tick_count,
        active_alarms: snapshot.alarms.iter().filter(|a| !a.cleared).count(),
        scenario_active: scenario.is_some_and(|s| s.active),
    })
}

/// GET /api/v1/snapshot: the full process state.
pub async fn get_snapshot(State(state): State<ApiState>) -> Response {
    match state.engine.snapshot().await {
        Ok(snapshot) => ApiResponse::ok(snapshot),
        Err(e) => engine_error(e),
    }
}

/// GET /api/v1/alarms: full alarm list, cleared included.
pub async fn get_alarms(State(state): State<ApiState>) -> Response {
    match state.engine.snapshot().await {
        Ok(snapshot) => ApiResponse::ok(snapshot.alarms),
        Err(e) => engine_error(e),
    }
}

/// GET /api/v1/events: the bounded event journal.
pub async fn get_events(State(state): State<ApiState>) -> Response {
    match state.engine.snapshot().await {
        Ok(snapshot) => ApiResponse::ok(snapshot.events),
        Err(e) => engine_error(e),
    }
}

/// GET /api/v1/scenario: active scenario state (`null` when idle).
pub async fn get_scenario(State(state): State<ApiState>) -> Response {
    match state.engine.scenario_state().await {
        Ok(scenario) => ApiResponse::ok(scenario),
        Err(e) => engine_error(e),
    }
}

/// GET /api/v1/scenario/progress: persisted per-scenario records.
pub async fn get_progress(State(state): State<ApiState>) -> Response {
    match state.engine.progress().await {
        Ok(progress) => ApiResponse::ok(progress),
        Err(e) => engine_error(e),
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub difficulty: u8,
    pub duration_minutes: u64,
    pub objective: &'static str,
}

/// GET /api/v1/scenario/catalog: the static scenario definitions.
pub async fn get_catalog() -> Response {
    let entries: Vec<CatalogEntry> = ScenarioKind::ALL
        .into_iter()
        .map(|kind| {
            let def = kind.definition();
            CatalogEntry {
                id: kind.id(),
                title: def.title,
                description: def.description,
                difficulty: def.difficulty,
                duration_minutes: def.duration_minutes,
                objective: def.objective_summary,
            }
        })
        .collect();
    ApiResponse::ok(entries)
}

/// GET /api/v1/export/csv: current values as a two-line CSV report.
pub async fn export_csv(State(state): State<ApiState>) -> Response {
    match state.engine.export_csv().await {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv")],
            csv,
        )
            .into_response(),
        Err(e) => engine_error(e),
    }
}

// ============================================================================
// Process Mutators
// ============================================================================

/// POST /api/v1/simulation/start
pub async fn start_simulation(State(state): State<ApiState>) -> Response {
    match state.engine.start_simulation().await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"running": true})),
        Err(e) => engine_error(e),
    }
}

/// POST /api/v1/simulation/stop
pub async fn stop_simulation(State(state): State<ApiState>) -> Response {
    match state.engine.stop_simulation().await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"running": false})),
        Err(e) => engine_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ValueBody {
    pub value: f64,
}

/// POST /api/v1/control/setpoint: DO setpoint (clamped to [1, 8] mg/L).
pub async fn set_setpoint(State(state): State<ApiState>, Json(body): Json<ValueBody>) -> Response {
    match state.engine.set_do_setpoint(body.value).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"accepted": true})),
        Err(e) => engine_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ModeBody {
    pub mode: ControlMode,
}

/// POST /api/v1/control/mode: auto or manual DO control.
pub async fn set_mode(State(state): State<ApiState>, Json(body): Json<ModeBody>) -> Response {
    match state.engine.set_do_mode(body.mode).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"accepted": true})),
        Err(e) => engine_error(e),
    }
}

/// POST /api/v1/control/blower: blower speed % (effective in manual mode).
pub async fn set_blower(State(state): State<ApiState>, Json(body): Json<ValueBody>) -> Response {
    match state.engine.set_blower_speed(body.value).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"accepted": true})),
        Err(e) => engine_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct EquipmentBody {
    pub unit: EquipmentId,
}

/// POST /api/v1/equipment/toggle
pub async fn toggle_equipment(
    State(state): State<ApiState>,
    Json(body): Json<EquipmentBody>,
) -> Response {
    match state.engine.toggle_equipment(body.unit).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"accepted": true})),
        Err(e) => engine_error(e),
    }
}

/// POST /api/v1/equipment/dosing: dosing pump speed %.
pub async fn set_dosing(State(state): State<ApiState>, Json(body): Json<ValueBody>) -> Response {
    match state.engine.set_dosing_pump_speed(body.value).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"accepted": true})),
        Err(e) => engine_error(e),
    }
}

/// POST /api/v1/equipment/bypass: bypass valve position %.
pub async fn set_bypass(State(state): State<ApiState>, Json(body): Json<ValueBody>) -> Response {
    match state.engine.set_bypass_valve_position(body.value).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"accepted": true})),
        Err(e) => engine_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AlarmAckBody {
    pub id: u64,
}

/// POST /api/v1/alarms/acknowledge: 404 for unknown ids.
pub async fn acknowledge_alarm(
    State(state): State<ApiState>,
    Json(body): Json<AlarmAckBody>,
) -> Response {
    match state.engine.acknowledge_alarm(body.id).await {
        Ok(true) => ApiResponse::ok(serde_json::json!({"acknowledged": body.id})),
        Ok(false) => ApiErrorResponse::not_found(format!("alarm {} not found", body.id)),
        Err(e) => engine_error(e),
    }
}

/// POST /api/v1/ai/toggle
pub async fn toggle_ai(State(state): State<ApiState>) -> Response {
    match state.engine.toggle_ai().await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"accepted": true})),
        Err(e) => engine_error(e),
    }
}

/// POST /api/v1/ai/accept: copy the recommendation into the setpoint.
pub async fn accept_ai(State(state): State<ApiState>) -> Response {
    match state.engine.accept_ai_recommendation().await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"accepted": true})),
        Err(e) => engine_error(e),
    }
}

// ============================================================================
// Scenario Mutators
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ScenarioStartBody {
    pub id: String,
}

/// POST /api/v1/scenario/start: 404 for unknown scenario ids.
pub async fn start_scenario(
    State(state): State<ApiState>,
    Json(body): Json<ScenarioStartBody>,
) -> Response {
    match state.engine.start_scenario(&body.id).await {
        Ok(Ok(())) => ApiResponse::ok(serde_json::json!({"started": body.id})),
        Ok(Err(ScenarioError::NotFound(id))) => {
            ApiErrorResponse::not_found(format!("scenario not found: {id}"))
        }
        Err(e) => engine_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ObjectiveBody {
    pub id: String,
    pub current: f64,
}

/// POST /api/v1/scenario/objective
pub async fn update_objective(
    State(state): State<ApiState>,
    Json(body): Json<ObjectiveBody>,
) -> Response {
    match state.engine.update_objective(&body.id, body.current).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"accepted": true})),
        Err(e) => engine_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct StepBody {
    pub id: String,
}

/// POST /api/v1/scenario/step
pub async fn complete_step(
    State(state): State<ApiState>,
    Json(body): Json<StepBody>,
) -> Response {
    match state.engine.complete_step(&body.id).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"accepted": true})),
        Err(e) => engine_error(e),
    }
}

/// POST /api/v1/scenario/pause
pub async fn pause_scenario(State(state): State<ApiState>) -> Response {
    match state.engine.pause_scenario().await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"paused": true})),
        Err(e) => engine_error(e),
    }
}

/// POST /api/v1/scenario/resume
pub async fn resume_scenario(State(state): State<ApiState>) -> Response {
    match state.engine.resume_scenario().await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"paused": false})),
        Err(e) => engine_error(e),
    }
}

/// POST /api/v1/scenario/end: score the active run immediately.
pub async fn end_scenario(State(state): State<ApiState>) -> Response {
    match state.engine.end_scenario().await {
        Ok(score) => ApiResponse::ok(score),
        Err(e) => engine_error(e),
    }
}
