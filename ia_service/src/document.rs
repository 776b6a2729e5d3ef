//! Extração de texto de arquivos enviados (.txt e .pdf)

use lopdf::Document;
use serde::Serialize;

use crate::error::{ClassificationError, IaResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Txt,
    Pdf,
}

impl DocumentFormat {
    /// Detecta o formato pela extensão do nome do arquivo
    pub fn from_file_name(file_name: &str) -> IaResult<Self> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" => Ok(DocumentFormat::Txt),
            "pdf" => Ok(DocumentFormat::Pdf),
            "" => Err(ClassificationError::UnsupportedFormat(format!(
                "arquivo sem extensão: {}",
                file_name
            ))),
            other => Err(ClassificationError::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub file_name: String,
    pub format: DocumentFormat,
    pub text: String,
}

/// Extrai o texto puro de um arquivo enviado
///
/// Formatos não suportados são rejeitados antes de qualquer leitura do conteúdo.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> IaResult<ExtractedDocument> {
    let format = DocumentFormat::from_file_name(file_name)?;

    let text = match format {
        DocumentFormat::Txt => decode_txt(bytes)?,
        DocumentFormat::Pdf => extract_pdf_text(bytes)?,
    };

    tracing::info!(
        "📄 Texto extraído de '{}' ({:?}): {} caracteres",
        file_name,
        format,
        text.chars().count()
    );

    Ok(ExtractedDocument {
        file_name: file_name.to_string(),
        format,
        text,
    })
}

fn decode_txt(bytes: &[u8]) -> IaResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ClassificationError::Extraction(format!("arquivo .txt não está em UTF-8: {}", e)))
}

/// Extrai o texto página a página, na ordem das páginas
fn extract_pdf_text(bytes: &[u8]) -> IaResult<String> {
    let document = Document::load_mem(bytes)
        .map_err(|e| ClassificationError::Extraction(format!("falha ao carregar PDF: {}", e)))?;

    let mut pages_text = Vec::new();
    for page_num in document.get_pages().keys() {
        match document.extract_text(&[*page_num]) {
            Ok(text) if !text.trim().is_empty() => pages_text.push(text.trim().to_string()),
            Ok(_) => {}
            Err(e) => tracing::warn!("⚠️ Página {} do PDF sem texto extraível: {}", page_num, e),
        }
    }

    if pages_text.is_empty() {
        tracing::warn!("⚠️ Nenhum texto extraído do PDF (pode ser PDF de imagens/escaneado)");
    }

    Ok(pages_text.join("\n\n"))
}
