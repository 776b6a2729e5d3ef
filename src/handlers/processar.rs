use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    response::Json,
};
use ia_service::{extract_text, ClassificationResult};
use serde::Deserialize;
use std::sync::Arc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use crate::AppState;

const NO_CONTENT: &str = "Nenhum conteúdo de email fornecido para processamento.";
const NO_CONTENT_OR_FILE: &str =
    "Nenhum conteúdo de email ou arquivo fornecido para processamento.";

#[derive(Debug, Deserialize)]
pub struct EmailData {
    #[serde(default)]
    pub email_content: Option<String>,
}

/// Arquivo recebido no multipart
struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

/// POST /api/processar: classifica o texto enviado em JSON
pub async fn processar_email(
    State(state): State<Arc<AppState>>,
    Json(data): Json<EmailData>,
) -> AppResult<Json<ClassificationResult>> {
    let start_time = Instant::now();
    log_request_received("/api/processar", "POST");

    let email_text = data
        .email_content
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            log_validation_error("email_content", NO_CONTENT);
            AppError::ValidationError(NO_CONTENT.to_string())
        })?;

    let result = classify(&state, &email_text).await?;

    log_request_processed("/api/processar", 200, start_time.elapsed().as_millis() as u64);
    Ok(Json(result))
}

/// POST /api/processar/upload: texto no campo `email_content` ou arquivo .txt/.pdf no campo `file`
///
/// O texto tem precedência sobre o arquivo.
pub async fn processar_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<ClassificationResult>> {
    let start_time = Instant::now();
    log_request_received("/api/processar/upload", "POST");

    let mut email_content: Option<String> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Invalid multipart body", e))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("email_content") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| upload_error("Invalid email_content", e))?;
                email_content = Some(text);
            }
            Some("file") => {
                // Navegadores enviam a parte vazia (sem nome) quando nenhum arquivo é escolhido
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| upload_error("Failed to read file", e))?;
                if !name.is_empty() {
                    log_file_received(&name, bytes.len());
                    file = Some(UploadedFile {
                        name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            other => log_warning(&format!("Campo multipart ignorado: {:?}", other)),
        }
    }

    let email_text = match (email_content.filter(|t| !t.trim().is_empty()), file) {
        (Some(text), _) => text,
        (None, Some(file)) => extract_text(&file.name, &file.bytes)?.text,
        (None, None) => String::new(),
    };

    if email_text.trim().is_empty() {
        log_validation_error("email_content/file", NO_CONTENT_OR_FILE);
        return Err(AppError::ValidationError(NO_CONTENT_OR_FILE.to_string()));
    }

    let result = classify(&state, &email_text).await?;

    log_request_processed("/api/processar/upload", 200, start_time.elapsed().as_millis() as u64);
    Ok(Json(result))
}

/// Mantém o status do erro multipart (413 quando o corpo passa do limite)
fn upload_error(context: &str, err: MultipartError) -> AppError {
    let status = err.status();
    log_validation_error("multipart", &format!("{} ({}): {}", context, status, err.body_text()));
    AppError::Upload(status, format!("{}: {}", context, err.body_text()))
}

async fn classify(state: &AppState, email_text: &str) -> AppResult<ClassificationResult> {
    let request_id = Uuid::new_v4().to_string();
    let start_time = Instant::now();

    log_info(&format!(
        "📧 [{}] Email recebido: \"{}\"",
        request_id,
        email_preview(email_text, 80)
    ));

    match state.processor.classify(email_text).await {
        Ok(result) => {
            log_classification_result(
                &request_id,
                result.category.label(),
                start_time.elapsed().as_millis() as u64,
            );
            Ok(result)
        }
        Err(e) => {
            log_classification_error(&request_id, &e.to_string());
            Err(AppError::Classification(e))
        }
    }
}
