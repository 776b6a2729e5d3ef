use async_trait::async_trait;

use crate::error::BackendError;

/// Provedor de geração de texto com resposta JSON
///
/// Cada chamada corresponde a uma tentativa; o retry fica no processador.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Envia o prompt e devolve o texto JSON gerado pelo modelo
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;

    /// Nome do provedor para logs
    fn name(&self) -> &str;

    /// Modelo configurado
    fn model(&self) -> &str;
}
