use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ia_service::{ClassificationError, ClassificationResult};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    ConfigError(String),
    ValidationError(String),
    /// Corpo multipart inválido ou acima do limite; carrega o status do próprio erro
    Upload(StatusCode, String),
    Classification(ClassificationError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::Classification(err) => write!(f, "Classification error: {}", err),
            AppError::Upload(status, msg) => write!(f, "Upload error ({}): {}", status, msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ClassificationError> for AppError {
    fn from(err: ClassificationError) -> Self {
        AppError::Classification(err)
    }
}

/// Status HTTP de cada falha de classificação
pub fn classification_status(err: &ClassificationError) -> StatusCode {
    match err {
        ClassificationError::EmptyInput
        | ClassificationError::UnsupportedFormat(_)
        | ClassificationError::Extraction(_) => StatusCode::BAD_REQUEST,
        ClassificationError::Uninitialized(_) => StatusCode::SERVICE_UNAVAILABLE,
        ClassificationError::Api(_)
        | ClassificationError::InvalidOutput(_)
        | ClassificationError::RetriesExhausted { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Falhas de classificação respondem no formato do resultado, com categoria de erro
        if let AppError::Classification(err) = &self {
            let status = classification_status(err);
            let result = ClassificationResult::from_error(err);
            let body = json!({
                "categoria": result.category,
                "resposta_sugerida": result.suggested_reply,
                "status": status.as_u16()
            });
            return (status, axum::Json(body)).into_response();
        }

        let (status, error_message) = match self {
            AppError::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upload(status, msg) => (status, msg),
            AppError::Classification(err) => (classification_status(&err), err.to_string()),
        };

        let body = json!({
            "error": error_message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ia_service::{BackendError, FailureCause};

    #[test]
    fn test_classification_status_mapping() {
        assert_eq!(
            classification_status(&ClassificationError::EmptyInput),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            classification_status(&ClassificationError::UnsupportedFormat(".docx".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            classification_status(&ClassificationError::Uninitialized("GEMINI_API_KEY".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            classification_status(&ClassificationError::Api(BackendError::EmptyResponse)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            classification_status(&ClassificationError::RetriesExhausted {
                attempts: 3,
                cause: FailureCause::InvalidOutput,
                last_error: "json".into(),
            }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_validation_error_response() {
        let response = AppError::ValidationError("campo ausente".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upload_error_keeps_status() {
        let response =
            AppError::Upload(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".into())
                .into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
