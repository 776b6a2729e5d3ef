use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::types::ErrorKind;

/// Motivo da falha terminal após esgotar as tentativas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// A última tentativa falhou na comunicação com a API
    ApiCommunication,
    /// A API respondeu, mas com JSON fora do contrato
    InvalidOutput,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::ApiCommunication => write!(f, "falha de comunicação com a IA"),
            FailureCause::InvalidOutput => write!(f, "resposta inválida da IA"),
        }
    }
}

/// Erros de um provedor de geração (Gemini, OpenAI)
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("falha de transporte: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("resposta sem conteúdo gerado")]
    EmptyResponse,

    #[error("{0}")]
    Provider(String),
}

impl BackendError {
    /// Respostas 4xx indicam requisição ou credencial inválida, exceto 408 e 429
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Status { status, .. } => {
                !(400..500).contains(status) || *status == 408 || *status == 429
            }
            _ => true,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Transport(err.to_string())
    }
}

/// Erros do fluxo de classificação de emails
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("O texto do email está vazio.")]
    EmptyInput,

    #[error("O cliente de IA não foi inicializado. Verifique a chave de API ({0}).")]
    Uninitialized(String),

    #[error("Formato de arquivo não suportado: {0}")]
    UnsupportedFormat(String),

    #[error("Não foi possível extrair o texto do arquivo: {0}")]
    Extraction(String),

    #[error("Ocorreu um erro na comunicação com a IA: {0}")]
    Api(#[from] BackendError),

    #[error("A IA retornou uma resposta inválida: {0}")]
    InvalidOutput(String),

    #[error("Falha após {attempts} tentativas ({cause}): {last_error}")]
    RetriesExhausted {
        attempts: u32,
        cause: FailureCause,
        last_error: String,
    },
}

impl ClassificationError {
    /// Falhas que o processador tenta novamente
    pub fn is_transient(&self) -> bool {
        match self {
            ClassificationError::Api(err) => err.is_transient(),
            ClassificationError::InvalidOutput(_) => true,
            _ => false,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassificationError::EmptyInput => ErrorKind::EmptyInput,
            ClassificationError::Uninitialized(_) => ErrorKind::Uninitialized,
            ClassificationError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ClassificationError::Extraction(_) => ErrorKind::Extraction,
            ClassificationError::Api(_) => ErrorKind::ApiFailure,
            ClassificationError::InvalidOutput(_) => ErrorKind::InvalidOutput,
            ClassificationError::RetriesExhausted { cause, .. } => match cause {
                FailureCause::ApiCommunication => ErrorKind::ApiFailure,
                FailureCause::InvalidOutput => ErrorKind::InvalidOutput,
            },
        }
    }

    /// Causa terminal correspondente a uma falha transitória
    pub(crate) fn failure_cause(&self) -> FailureCause {
        match self {
            ClassificationError::InvalidOutput(_) => FailureCause::InvalidOutput,
            _ => FailureCause::ApiCommunication,
        }
    }
}

pub type IaResult<T> = Result<T, ClassificationError>;
