use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use ia_service::{AiProvider, IaServiceConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub ai: AiSettings,
    pub upload: UploadSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AiSettings {
    pub provider: AiProvider,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Lido de GEMINI_API_KEY / OPENAI_API_KEY quando ausente na configuração
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub prompt_file: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UploadSettings {
    pub max_bytes: usize,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Self::defaults()?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // EMAIL_TRIAGE__AI__PROVIDER=openai, etc.
            .add_source(Environment::with_prefix("EMAIL_TRIAGE").separator("__"));

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        // Credencial do provedor vem do ambiente do processo
        if settings.ai.api_key.as_deref().map_or(true, str::is_empty) {
            settings.ai.api_key = std::env::var(settings.ai.provider.credential_env())
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        Ok(settings)
    }

    /// Valores padrão; `ai.model` fica sem padrão para seguir o provedor escolhido
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("ai.provider", "gemini")?
            .set_default("ai.temperature", 0.2)?
            .set_default("ai.max_tokens", 500)?
            .set_default("ai.timeout_seconds", 30)?
            .set_default("ai.max_attempts", 3)?
            .set_default("ai.initial_backoff_ms", 1000)?
            .set_default("upload.max_bytes", 10 * 1024 * 1024)
    }

    /// Configuração do cliente de IA; `None` quando a credencial não existe
    pub fn ia_config(&self) -> Option<IaServiceConfig> {
        let api_key = self.ai.api_key.clone()?;

        let mut config = IaServiceConfig::new(api_key)
            .with_provider(self.ai.provider)
            .with_temperature(self.ai.temperature)
            .with_max_tokens(self.ai.max_tokens)
            .with_request_timeout(Duration::from_secs(self.ai.timeout_seconds));

        if let Some(model) = &self.ai.model {
            config = config.with_model(model.clone());
        }
        if let Some(base_url) = &self.ai.base_url {
            config = config.with_base_url(base_url.clone());
        }

        Some(config)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.ai.max_attempts,
            Duration::from_millis(self.ai.initial_backoff_ms),
        )
    }

    pub fn model_name(&self) -> String {
        self.ai
            .model
            .clone()
            .unwrap_or_else(|| self.ai.provider.default_model().to_string())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            ai: AiSettings {
                provider: AiProvider::Gemini,
                model: None,
                base_url: None,
                api_key: None,
                temperature: 0.2,
                max_tokens: 500,
                timeout_seconds: 30,
                max_attempts: 3,
                initial_backoff_ms: 1000,
                prompt_file: None,
            },
            upload: UploadSettings {
                max_bytes: 10 * 1024 * 1024,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    /// Settings a partir do config/default.toml versionado, com overrides
    fn shipped_settings(overrides: &[(&str, &str)]) -> Settings {
        let mut builder = Settings::defaults().unwrap().add_source(File::from_str(
            include_str!("../../config/default.toml"),
            FileFormat::Toml,
        ));
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value).unwrap();
        }
        builder.build().unwrap().try_deserialize().unwrap()
    }

    #[test]
    fn test_shipped_config_uses_gemini_default_model() {
        let settings = shipped_settings(&[("ai.api_key", "test-key")]);
        let config = settings.ia_config().unwrap();

        assert_eq!(config.provider, AiProvider::Gemini);
        assert_eq!(config.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_switching_provider_switches_default_model() {
        let settings = shipped_settings(&[("ai.provider", "openai"), ("ai.api_key", "sk-test")]);
        let config = settings.ia_config().unwrap();

        assert_eq!(config.provider, AiProvider::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(settings.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_ia_config_requires_key() {
        let settings = Settings::default();
        assert!(settings.ia_config().is_none());
    }

    #[test]
    fn test_ia_config_from_settings() {
        let mut settings = Settings::default();
        settings.ai.api_key = Some("key".to_string());
        settings.ai.provider = AiProvider::OpenAi;
        settings.ai.model = Some("gpt-4o".to_string());

        let config = settings.ia_config().unwrap();

        assert_eq!(config.provider, AiProvider::OpenAi);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_retry_policy_from_settings() {
        let policy = Settings::default().retry_policy();

        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
    }

    #[test]
    fn test_model_name_defaults_per_provider() {
        let mut settings = Settings::default();
        assert_eq!(settings.model_name(), "gemini-2.5-flash");

        settings.ai.provider = AiProvider::OpenAi;
        assert_eq!(settings.model_name(), "gpt-4o-mini");
    }
}
