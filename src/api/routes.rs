//! API route definitions
//!
//! Organizes endpoints for the plant dashboard:
//! - /api/v1/status - engine liveness and summary counts
//! - /api/v1/snapshot - full process state
//! - /api/v1/scenario - scenario state, progress, and mutators
//! - /api/v1/control | equipment | alarms | ai - operator mutators
//! - /api/v1/export/csv - report export

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

/// Create all API routes for the dashboard.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        // Read surface
        .route("/status", get(handlers::get_status))
        .route("/snapshot", get(handlers::get_snapshot))
        .route("/alarms", get(handlers::get_alarms))
        .route("/events", get(handlers::get_events))
        .route("/scenario", get(handlers::get_scenario))
        .route("/scenario/catalog", get(handlers::get_catalog))
        .route("/scenario/progress", get(handlers::get_progress))
        .route("/export/csv", get(handlers::export_csv))
        // Simulation lifecycle
        .route("/simulation/start", post(handlers::start_simulation))
        .route("/simulation/stop", post(handlers::stop_simulation))
        // DO control loop
        .route("/control/setpoint", post(handlers::set_setpoint))
        .route("/control/mode", post(handlers::set_mode))
        .route("/control/blower", post(handlers::set_blower))
        // Equipment
        .route("/equipment/toggle", post(handlers::toggle_equipment))
        .route("/equipment/dosing", post(handlers::set_dosing))
        .route("/equipment/bypass", post(handlers::set_bypass))
        // Alarms
        .route("/alarms/acknowledge", post(handlers::acknowledge_alarm))
        // AI optimizer
        .route("/ai/toggle", post(handlers::toggle_ai))
        .route("/ai/accept", post(handlers::accept_ai))
        // Scenario lifecycle
        .route("/scenario/start", post(handlers::start_scenario))
        .route("/scenario/objective", post(handlers::update_objective))
        .route("/scenario/step", post(handlers::complete_step))
        .route("/scenario/pause", post(handlers::pause_scenario))
        .route("/scenario/resume", post(handlers::resume_scenario))
        .route("/scenario/end", post(handlers::end_scenario))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PlantEngine, SimOptions};
    use crate::scenario::InMemoryProgress;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn create_test_state() -> ApiState {
        let (engine, handle) = PlantEngine::new(
            SimOptions {
                seed: Some(1),
                ..SimOptions::default()
            },
            Box::new(InMemoryProgress::new()),
            std::time::Duration::from_millis(10),
            CancellationToken::new(),
        );
        tokio::spawn(engine.run());
        ApiState {
            engine: handle,
            plant_name: "TEST-PLANT".to_string(),
        }
    }

    async fn get_ok(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_api_routes_status() {
        let app = api_routes(create_test_state());
        assert_eq!(get_ok(app, "/status").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_snapshot() {
        let app = api_routes(create_test_state());
        assert_eq!(get_ok(app, "/snapshot").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_catalog_lists_six_scenarios() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/scenario/catalog")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["data"].as_array().map(Vec::len), Some(6));
        assert_eq!(v["data"][0]["id"], "tutorial");
    }

    #[tokio::test]
    async fn test_api_routes_scenario_null_when_idle() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/scenario")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(v["data"].is_null());
    }

    #[tokio::test]
    async fn test_api_routes_export_csv() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/export/csv")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("Timestamp,BOD_Raw,BOD_Treated,TSS_Raw,TSS_Treated,DO,pH,Flow"));
    }

    #[tokio::test]
    async fn test_api_routes_setpoint_mutation() {
        let state = create_test_state();
        let app = api_routes(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/control/setpoint")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"value": 5.5}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let snapshot = state.engine.snapshot().await.unwrap();
        assert!((snapshot.control.setpoint - 5.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_api_routes_unknown_scenario_404() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/scenario/start")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"id": "no-such-scenario"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_routes_unknown_alarm_404() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/alarms/acknowledge")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"id": 12345}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
