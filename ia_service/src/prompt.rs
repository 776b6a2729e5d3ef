use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptLoadError {
    #[error("Failed to read prompt file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Exemplo few-shot incluído no prompt
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FewShotExample {
    pub email: String,
    pub category: String,
    pub suggested_reply: String,
}

/// Prompt de triagem de emails
///
/// Pode ser sobrescrito por um arquivo YAML com os mesmos campos.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PromptConfig {
    pub system_role: String,
    pub task_description: String,
    pub productive_definition: String,
    pub unproductive_definition: String,
    pub reply_rules: Vec<String>,
    #[serde(default)]
    pub examples: Vec<FewShotExample>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_role: "Você é um assistente de triagem de emails para um grande setor financeiro."
                .to_string(),
            task_description: "Sua tarefa é analisar o EMAIL abaixo e classificá-lo estritamente em uma das duas categorias:"
                .to_string(),
            productive_definition:
                "'Produtivo' (requer ação, suporte técnico, ou atualização de caso)".to_string(),
            unproductive_definition:
                "'Improdutivo' (agradecimento, felicitações, mensagem social ou pergunta não relevante)"
                    .to_string(),
            reply_rules: vec![
                "Se 'Produtivo': a resposta deve confirmar o recebimento e informar que a solicitação está sendo processada e será tratada pela equipe.".to_string(),
                "Se 'Improdutivo': a resposta deve ser um agradecimento cordial e encerrar a conversa.".to_string(),
            ],
            examples: vec![
                FewShotExample {
                    email: "Bom dia, gostaria de saber o status do chamado 4821 aberto na semana passada sobre o bloqueio do meu cartão.".to_string(),
                    category: "Produtivo".to_string(),
                    suggested_reply: "Olá! Recebemos sua mensagem sobre o chamado 4821. Sua solicitação está sendo processada e nossa equipe retornará em breve com uma atualização.".to_string(),
                },
                FewShotExample {
                    email: "Não consigo acessar o sistema desde ontem, aparece erro 500 ao fazer login. Podem verificar?".to_string(),
                    category: "Produtivo".to_string(),
                    suggested_reply: "Olá! Confirmamos o recebimento do seu relato de erro de acesso. Nossa equipe de suporte técnico já está analisando e entrará em contato assim que possível.".to_string(),
                },
                FewShotExample {
                    email: "Muito obrigado pelo atendimento de ontem, vocês foram excelentes! Feliz Natal a toda a equipe.".to_string(),
                    category: "Improdutivo".to_string(),
                    suggested_reply: "Muito obrigado pela mensagem e pelas felicitações! Desejamos boas festas para você também.".to_string(),
                },
            ],
        }
    }
}

impl PromptConfig {
    /// Carrega a configuração do prompt de um arquivo YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PromptLoadError> {
        let contents = fs::read_to_string(path)?;
        let config: PromptConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Gera o prompt completo para o email informado
    pub fn render(&self, email_text: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str(&self.system_role);
        prompt.push('\n');
        prompt.push_str(&self.task_description);
        prompt.push('\n');
        prompt.push_str(&format!("- {}\n", self.productive_definition));
        prompt.push_str(&format!("- {}\n\n", self.unproductive_definition));

        prompt.push_str("Após classificar, gere uma resposta sugerida concisa e profissional baseada na categoria:\n");
        for rule in &self.reply_rules {
            prompt.push_str(&format!("- {}\n", rule));
        }

        if !self.examples.is_empty() {
            prompt.push_str("\nEXEMPLOS:\n");
            for example in &self.examples {
                let expected = json!({
                    "category": example.category,
                    "suggested_reply": example.suggested_reply,
                });
                prompt.push_str(&format!("EMAIL: {}\nRESPOSTA: {}\n\n", example.email, expected));
            }
        }

        prompt.push_str("Responda APENAS com JSON contendo os campos \"category\" e \"suggested_reply\".\n");
        prompt.push_str("\n---\nEMAIL:\n");
        prompt.push_str(email_text.trim());
        prompt.push_str("\n---\n");

        prompt
    }
}

/// Schema fixo da resposta: dois campos string obrigatórios
///
/// Formato OpenAPI aceito pelo `responseSchema` do Gemini.
pub fn gemini_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": {
                "type": "STRING",
                "description": "Classificação: 'Produtivo' ou 'Improdutivo'."
            },
            "suggested_reply": {
                "type": "STRING",
                "description": "A resposta concisa e profissional baseada na classificação."
            }
        },
        "required": ["category", "suggested_reply"]
    })
}

/// O mesmo schema em JSON Schema estrito, para o modo `json_schema` da OpenAI
pub fn json_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "category": {
                "type": "string",
                "enum": ["Produtivo", "Improdutivo"],
                "description": "Classificação: 'Produtivo' ou 'Improdutivo'."
            },
            "suggested_reply": {
                "type": "string",
                "description": "A resposta concisa e profissional baseada na classificação."
            }
        },
        "required": ["category", "suggested_reply"],
        "additionalProperties": false
    })
}
