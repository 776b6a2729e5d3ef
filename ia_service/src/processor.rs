use std::sync::Arc;

use crate::backend::GenerationBackend;
use crate::error::{ClassificationError, IaResult};
use crate::prompt::PromptConfig;
use crate::retry::{RetryPolicy, RetryState};
use crate::types::{ClassificationResult, ModelOutput};

/// Processador de emails: prompt, chamada à IA, validação e retry
///
/// O cliente de IA é compartilhado somente leitura entre requisições.
/// `None` indica que a credencial não foi configurada.
#[derive(Clone)]
pub struct EmailProcessor {
    backend: Option<Arc<dyn GenerationBackend>>,
    prompt: PromptConfig,
    policy: RetryPolicy,
    credential_name: String,
}

impl EmailProcessor {
    pub fn new(backend: Option<Arc<dyn GenerationBackend>>) -> Self {
        Self {
            backend,
            prompt: PromptConfig::default(),
            policy: RetryPolicy::default(),
            credential_name: "GEMINI_API_KEY".to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: PromptConfig) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_credential_name(mut self, name: impl Into<String>) -> Self {
        self.credential_name = name.into();
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Classifica o email em Produtivo/Improdutivo e sugere uma resposta
    pub async fn classify(&self, email_text: &str) -> IaResult<ClassificationResult> {
        if email_text.trim().is_empty() {
            return Err(ClassificationError::EmptyInput);
        }

        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| ClassificationError::Uninitialized(self.credential_name.clone()))?;

        let prompt = self.prompt.render(email_text);

        tracing::info!(
            "🔍 Classificando email ({} caracteres) com {} ({})",
            email_text.chars().count(),
            backend.name(),
            backend.model()
        );

        let mut state = RetryState {
            attempt: 1,
            ..RetryState::default()
        };

        loop {
            let err = match Self::attempt(backend.as_ref(), &prompt).await {
                Ok(result) => {
                    tracing::info!(
                        "✅ Classificação: {} (tentativa {}/{})",
                        result.category.label(),
                        state.attempt,
                        self.policy.max_attempts
                    );
                    return Ok(result);
                }
                Err(err) if err.is_transient() => err,
                Err(err) => return Err(err),
            };

            match state.next(&self.policy) {
                Some(next) => {
                    tracing::warn!(
                        "⚠️ Tentativa {}/{} falhou: {}. Tentando novamente em {:?}...",
                        state.attempt,
                        self.policy.max_attempts,
                        err,
                        next.delay
                    );
                    tokio::time::sleep(next.delay).await;
                    state = next;
                }
                None => {
                    tracing::error!(
                        "❌ Todas as {} tentativas de classificação falharam: {}",
                        state.attempt,
                        err
                    );
                    return Err(ClassificationError::RetriesExhausted {
                        attempts: state.attempt,
                        cause: err.failure_cause(),
                        last_error: err.to_string(),
                    });
                }
            }
        }
    }

    async fn attempt(
        backend: &dyn GenerationBackend,
        prompt: &str,
    ) -> IaResult<ClassificationResult> {
        let raw = backend.generate(prompt).await?;
        tracing::debug!("📋 Response JSON: {}", raw);
        ModelOutput::parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, FailureCause};
    use crate::types::Category;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    const VALID: &str = r#"{"category": "Produtivo", "suggested_reply": "Recebemos sua solicitação e ela está em andamento."}"#;

    /// Backend com respostas roteirizadas; registra o instante de cada chamada
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<String, BackendError>>>,
        fallback: Option<String>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String, BackendError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                fallback: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn always(text: &str) -> Self {
            Self {
                fallback: Some(text.to_string()),
                ..Self::new(vec![])
            }
        }

        fn calls(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
            self.calls.lock().unwrap().push(Instant::now());
            match self.responses.lock().unwrap().pop_front() {
                Some(response) => response,
                None => self
                    .fallback
                    .clone()
                    .ok_or(BackendError::Provider("script esgotado".to_string())),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    fn processor(backend: &Arc<ScriptedBackend>) -> EmailProcessor {
        let backend: Arc<dyn GenerationBackend> = backend.clone();
        EmailProcessor::new(Some(backend))
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_call() {
        let backend = Arc::new(ScriptedBackend::always(VALID));
        let processor = processor(&backend);

        for text in ["", "   \n\t "] {
            let err = processor.classify(text).await.unwrap_err();
            assert!(matches!(err, ClassificationError::EmptyInput));
        }
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_wins_over_uninitialized() {
        let err = EmailProcessor::new(None).classify("").await.unwrap_err();
        assert!(matches!(err, ClassificationError::EmptyInput));
    }

    #[tokio::test]
    async fn test_uninitialized_client_short_circuits() {
        let processor = EmailProcessor::new(None).with_credential_name("OPENAI_API_KEY");

        let err = processor.classify("Preciso de suporte").await.unwrap_err();

        assert!(!processor.is_initialized());
        match err {
            ClassificationError::Uninitialized(name) => assert_eq!(name, "OPENAI_API_KEY"),
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_valid_text_yields_result() {
        let backend = Arc::new(ScriptedBackend::always(VALID));

        let result = processor(&backend)
            .classify("Qual o status do meu chamado?")
            .await
            .unwrap();

        assert_eq!(result.category, Category::Produtivo);
        assert!(!result.suggested_reply.is_empty());
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_then_success_backs_off() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
            Err(BackendError::Transport("connection reset".to_string())),
            Ok(VALID.to_string()),
        ]));

        let result = processor(&backend).classify("Erro no login").await.unwrap();
        assert_eq!(result.category, Category::Produtivo);

        let calls = backend.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1] - calls[0], Duration::from_secs(1));
        assert_eq!(calls[2] - calls[1], Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanently_invalid_output_is_terminal() {
        let backend = Arc::new(ScriptedBackend::always("isto não é json"));

        let err = processor(&backend).classify("Bom dia").await.unwrap_err();

        match err {
            ClassificationError::RetriesExhausted { attempts, cause, .. } => {
                assert_eq!(attempts, 3);
                assert_eq!(cause, FailureCause::InvalidOutput);
            }
            other => panic!("erro inesperado: {:?}", other),
        }
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_api_failures_exhaust_with_api_cause() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let start = Instant::now();

        let err = processor(&backend).classify("Bom dia").await.unwrap_err();

        assert!(matches!(
            err,
            ClassificationError::RetriesExhausted {
                cause: FailureCause::ApiCommunication,
                ..
            }
        ));
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_credential_is_not_retried() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendError::Status {
                status: 401,
                body: "API key not valid".to_string(),
            }),
            Ok(VALID.to_string()),
        ]));
        let start = Instant::now();

        let err = processor(&backend).classify("Bom dia").await.unwrap_err();

        assert!(matches!(
            err,
            ClassificationError::Api(BackendError::Status { status: 401, .. })
        ));
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_is_retried() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendError::Status {
                status: 429,
                body: "quota".to_string(),
            }),
            Ok(VALID.to_string()),
        ]));

        let result = processor(&backend).classify("Bom dia").await.unwrap();

        assert_eq!(result.category, Category::Produtivo);
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_field_is_retried() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(r#"{"category": "Improdutivo"}"#.to_string()),
            Ok(r#"{"category": "Improdutivo", "suggested_reply": "Obrigado pelo contato!"}"#.to_string()),
        ]));

        let result = processor(&backend).classify("Feliz aniversário!").await.unwrap();

        assert_eq!(result.category, Category::Improdutivo);
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_custom_policy_single_attempt() {
        let backend = Arc::new(ScriptedBackend::always("{}"));
        let processor = processor(&backend)
            .with_retry_policy(RetryPolicy::new(1, Duration::from_secs(1)));

        let err = processor.classify("texto").await.unwrap_err();

        assert!(matches!(err, ClassificationError::RetriesExhausted { attempts: 1, .. }));
        assert_eq!(backend.calls().len(), 1);
    }
}
