//! General-purpose handlers: root banner and service health.

use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "voxtutor server is running."
}

/// The handler for the health check (`/health`) endpoint.
///
/// Reports the service status along with a live database probe.
pub async fn health_check(State(app_state): State<AppState>) -> Json<Value> {
    let db_status = match probe_database(&app_state).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!("Health check database probe failed: {}", e);
            "disconnected"
        }
    };
    Json(json!({
        "status": "ok",
        "service": "voxtutor",
        "ai_model": app_state.model_name,
        "database": { "status": db_status },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn probe_database(app_state: &AppState) -> Result<(), voxtutor::StorageError> {
    let conn = app_state.sqlite_provider.db.connect()?;
    conn.query("SELECT 1;", ()).await?;
    Ok(())
}
