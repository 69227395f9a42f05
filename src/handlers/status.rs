// src/handlers/status.rs
use axum::{extract::Extension, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppState;

pub fn status_routes() -> Router {
    Router::new().route("/api/status", get(api_status))
}

// API Status endpoint; reports the renderer probe taken at startup
async fn api_status(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let orchestrator = &state.orchestrator;

    let renderer_name = orchestrator.renderer().name();
    let renderer_status = match &state.renderer_probe {
        Ok(version) => json!({ "name": renderer_name, "status": "available", "version": version }),
        Err(e) => json!({ "name": renderer_name, "status": "unavailable", "error": e }),
    };
    let limits = orchestrator.limits();

    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "script_writer": {
                "name": orchestrator.script_writer().name(),
                "status": "configured"
            },
            "renderer": renderer_status
        },
        "limits": {
            "max_duration_secs": limits.max_duration_secs,
            "max_concurrent_renders": limits.max_concurrent_renders
        }
    }))
}
