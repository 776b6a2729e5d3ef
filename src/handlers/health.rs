use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::utils::logging::*;
use crate::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    log_health_check();

    Json(json!({
        "status": "healthy",
        "service": "email-triage-middleware",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "ai": {
            "initialized": state.processor.is_initialized(),
            "provider": state.settings.ai.provider,
            "model": state.settings.model_name(),
            "max_attempts": state.processor.retry_policy().max_attempts
        }
    }))
}

/// Pronto apenas quando o cliente de IA foi inicializado
pub async fn ready_check(State(state): State<Arc<AppState>>) -> Result<Json<Value>, StatusCode> {
    log_health_check();

    let ready = state.processor.is_initialized();

    if ready {
        Ok(Json(json!({
            "ready": true,
            "service": "email-triage-middleware",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "dependencies": {
                "ai": {
                    "status": "configured",
                    "provider": state.settings.ai.provider
                }
            }
        })))
    } else {
        log_warning(&format!(
            "Ready check falhou: {} ausente",
            state.settings.ai.provider.credential_env()
        ));
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
