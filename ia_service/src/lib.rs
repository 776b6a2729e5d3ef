//! Serviço de IA para triagem de emails
//!
//! Este crate concentra tudo o que conversa com o modelo de linguagem:
//! - Classificação de emails em Produtivo/Improdutivo com resposta sugerida
//! - Retry com backoff exponencial em falhas transitórias
//! - Provedores Gemini (REST) e OpenAI (async-openai) com saída JSON restrita
//! - Extração de texto de arquivos .txt e .pdf (lopdf)

pub mod backend;
pub mod document;
pub mod error;
pub mod gemini;
pub mod openai;
pub mod processor;
pub mod prompt;
pub mod retry;
pub mod types;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub use backend::GenerationBackend;
pub use document::{extract_text, DocumentFormat, ExtractedDocument};
pub use error::{BackendError, ClassificationError, FailureCause, IaResult};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use processor::EmailProcessor;
pub use prompt::{PromptConfig, PromptLoadError};
pub use retry::{RetryPolicy, RetryState};
pub use types::{Category, ClassificationResult, ErrorKind};

/// Provedor de IA usado na classificação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Gemini,
    OpenAi,
}

impl AiProvider {
    /// Variável de ambiente com a credencial do provedor
    pub fn credential_env(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "GEMINI_API_KEY",
            AiProvider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini-2.5-flash",
            AiProvider::OpenAi => "gpt-4o-mini",
        }
    }
}

/// Configuração do cliente de IA
#[derive(Clone)]
pub struct IaServiceConfig {
    pub provider: AiProvider,
    /// Chave de API do provedor
    pub api_key: String,
    /// Modelo (padrão: gemini-2.5-flash / gpt-4o-mini)
    pub model: String,
    /// URL base alternativa (testes, proxies)
    pub base_url: Option<String>,
    /// Temperatura (padrão: 0.2)
    pub temperature: f32,
    /// Max tokens da resposta (padrão: 500)
    pub max_tokens: u32,
    /// Timeout de cada chamada (padrão: 30s)
    pub request_timeout: Duration,
}

impl IaServiceConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            provider: AiProvider::Gemini,
            api_key,
            model: AiProvider::Gemini.default_model().to_string(),
            base_url: None,
            temperature: 0.2,
            max_tokens: 500,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Troca o provedor e ajusta o modelo para o padrão dele
    pub fn with_provider(mut self, provider: AiProvider) -> Self {
        self.provider = provider;
        self.model = provider.default_model().to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for IaServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IaServiceConfig")
            .field("provider", &self.provider)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Cria o cliente do provedor configurado
pub fn build_backend(config: &IaServiceConfig) -> Result<Arc<dyn GenerationBackend>, BackendError> {
    let backend: Arc<dyn GenerationBackend> = match config.provider {
        AiProvider::Gemini => Arc::new(GeminiClient::new(config)?),
        AiProvider::OpenAi => Arc::new(OpenAiClient::new(config)),
    };

    tracing::info!(
        "✅ Cliente de IA inicializado: {} ({})",
        backend.name(),
        backend.model()
    );

    Ok(backend)
}
