use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ClassificationError;

/// Tipo de erro exposto como categoria no resultado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyInput,
    Uninitialized,
    UnsupportedFormat,
    Extraction,
    ApiFailure,
    InvalidOutput,
}

impl ErrorKind {
    const ALL: [ErrorKind; 6] = [
        ErrorKind::EmptyInput,
        ErrorKind::Uninitialized,
        ErrorKind::UnsupportedFormat,
        ErrorKind::Extraction,
        ErrorKind::ApiFailure,
        ErrorKind::InvalidOutput,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => "Erro",
            ErrorKind::Uninitialized => "Erro de Inicialização",
            ErrorKind::UnsupportedFormat => "Formato Não Suportado",
            ErrorKind::Extraction => "Erro de Extração",
            ErrorKind::ApiFailure => "Erro de API",
            ErrorKind::InvalidOutput => "Erro de AI",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

/// Categoria do email: veredito da IA ou erro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Produtivo,
    Improdutivo,
    Error(ErrorKind),
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Produtivo => "Produtivo",
            Category::Improdutivo => "Improdutivo",
            Category::Error(kind) => kind.label(),
        }
    }

    /// Interpreta o veredito retornado pelo modelo (sem diferenciar maiúsculas)
    pub fn parse_verdict(raw: &str) -> Option<Self> {
        let normalized = raw.trim().trim_matches(|c| c == '\'' || c == '"');
        if normalized.eq_ignore_ascii_case("produtivo") {
            Some(Category::Produtivo)
        } else if normalized.eq_ignore_ascii_case("improdutivo") {
            Some(Category::Improdutivo)
        } else {
            None
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Category::parse_verdict(&raw)
            .or_else(|| ErrorKind::from_label(&raw).map(Category::Error))
            .ok_or_else(|| serde::de::Error::custom(format!("categoria desconhecida: {}", raw)))
    }
}

/// Resultado da classificação devolvido ao cliente HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "categoria")]
    pub category: Category,
    #[serde(rename = "resposta_sugerida")]
    pub suggested_reply: String,
}

impl ClassificationResult {
    /// Converte um erro em resultado com categoria de erro
    pub fn from_error(err: &ClassificationError) -> Self {
        Self {
            category: Category::Error(err.kind()),
            suggested_reply: err.to_string(),
        }
    }
}

/// JSON bruto produzido pelo modelo, antes da validação
#[derive(Debug, Default, Deserialize)]
pub struct ModelOutput {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub suggested_reply: Option<String>,
}

impl ModelOutput {
    /// Faz o parse do texto gerado e valida os dois campos obrigatórios
    pub fn parse(text: &str) -> Result<ClassificationResult, ClassificationError> {
        let body = strip_code_fence(text);
        let output: ModelOutput = serde_json::from_str(body).map_err(|e| {
            ClassificationError::InvalidOutput(format!("JSON inválido ({}): {}", e, body))
        })?;
        output.validate()
    }

    fn validate(self) -> Result<ClassificationResult, ClassificationError> {
        let category_raw = self
            .category
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ClassificationError::InvalidOutput("campo 'category' ausente".to_string()))?;

        let suggested_reply = self
            .suggested_reply
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                ClassificationError::InvalidOutput("campo 'suggested_reply' ausente".to_string())
            })?;

        let category = Category::parse_verdict(&category_raw).ok_or_else(|| {
            ClassificationError::InvalidOutput(format!("categoria fora do contrato: {}", category_raw))
        })?;

        Ok(ClassificationResult {
            category,
            suggested_reply,
        })
    }
}

/// Remove cercas de markdown (```json ... ```) que alguns modelos adicionam
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_output() {
        let json = r#"{"category": "Produtivo", "suggested_reply": "Recebemos sua solicitação."}"#;
        let result = ModelOutput::parse(json).unwrap();

        assert_eq!(result.category, Category::Produtivo);
        assert_eq!(result.suggested_reply, "Recebemos sua solicitação.");
    }

    #[test]
    fn test_parse_fenced_output() {
        let text = "```json\n{\"category\": \"improdutivo\", \"suggested_reply\": \"Obrigado!\"}\n```";
        let result = ModelOutput::parse(text).unwrap();

        assert_eq!(result.category, Category::Improdutivo);
    }

    #[test]
    fn test_missing_or_empty_fields_are_invalid() {
        for json in [
            r#"{"category": "Produtivo"}"#,
            r#"{"suggested_reply": "Olá"}"#,
            r#"{"category": "", "suggested_reply": "Olá"}"#,
            r#"{"category": "Produtivo", "suggested_reply": "   "}"#,
            r#"{"category": "Spam", "suggested_reply": "Olá"}"#,
            "não é json",
        ] {
            let err = ModelOutput::parse(json).unwrap_err();
            assert!(
                matches!(err, ClassificationError::InvalidOutput(_)),
                "esperava InvalidOutput para {}",
                json
            );
        }
    }

    #[test]
    fn test_result_serializes_with_frontend_keys() {
        let result = ClassificationResult {
            category: Category::Improdutivo,
            suggested_reply: "Agradecemos a mensagem.".to_string(),
        };
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["categoria"], "Improdutivo");
        assert_eq!(value["resposta_sugerida"], "Agradecemos a mensagem.");
    }

    #[test]
    fn test_error_result_round_trips_label() {
        let result = ClassificationResult::from_error(&ClassificationError::Uninitialized(
            "GEMINI_API_KEY".to_string(),
        ));
        let json = serde_json::to_string(&result).unwrap();
        let back: ClassificationResult = serde_json::from_str(&json).unwrap();

        assert_eq!(back.category, Category::Error(ErrorKind::Uninitialized));
        assert!(json.contains("Erro de Inicialização"));
    }
}
