// Biblioteca do middleware de triagem de emails
// Expõe módulos para uso em testes e binários

pub mod config;
pub mod handlers;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use ia_service::{build_backend, EmailProcessor, PromptConfig};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use utils::logging::*;
use utils::{AppError, AppResult};

// AppState é definido aqui para ser compartilhado
#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub processor: EmailProcessor,
}

impl AppState {
    pub fn new(settings: config::Settings) -> AppResult<Self> {
        let processor = build_processor(&settings)?;
        Ok(Self { settings, processor })
    }
}

/// Monta o processador a partir das settings
///
/// Sem credencial o servidor sobe mesmo assim; as classificações
/// respondem com erro de inicialização.
pub fn build_processor(settings: &config::Settings) -> AppResult<EmailProcessor> {
    let credential_env = settings.ai.provider.credential_env();

    let backend = match settings.ia_config() {
        Some(ia_config) => match build_backend(&ia_config) {
            Ok(backend) => Some(backend),
            Err(e) => {
                log_warning(&format!("⚠️ Falha ao inicializar cliente de IA: {}. Serviço desabilitado.", e));
                None
            }
        },
        None => {
            log_warning(&format!("⚠️ {} não configurada. Cliente de IA desabilitado.", credential_env));
            None
        }
    };

    let prompt = match &settings.ai.prompt_file {
        Some(path) => {
            let prompt = PromptConfig::from_file(path).map_err(|e| {
                AppError::ConfigError(format!("Failed to load prompt file '{}': {}", path, e))
            })?;
            log_info(&format!("📝 Prompt carregado de {}", path));
            prompt
        }
        None => PromptConfig::default(),
    };

    Ok(EmailProcessor::new(backend)
        .with_prompt(prompt)
        .with_retry_policy(settings.retry_policy())
        .with_credential_name(credential_env))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.settings.upload.max_bytes;

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::ready_check))
        .route("/api/processar", post(handlers::processar_email))
        .route("/api/processar/upload", post(handlers::processar_upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
