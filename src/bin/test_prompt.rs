/// Ferramenta standalone para visualizar o prompt enviado à LLM
/// Execute com: cargo run --bin test_prompt -- [arquivo.txt|arquivo.pdf]
///
/// Sem argumento usa um email de exemplo. Com a credencial do provedor
/// configurada, também classifica o email.

use email_triage_middleware::{build_processor, config::Settings};
use ia_service::{extract_text, PromptConfig};

const SAMPLE_EMAIL: &str = "Olá, gostaria de saber o status da minha solicitação de reembolso \
enviada na semana passada. O protocolo é 2024-0912. Obrigado.";

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    println!("\n{}", "=".repeat(80));
    println!("TESTE: Visualização do Prompt Enviado à LLM");
    println!("{}\n", "=".repeat(80));

    // 1. Carregar o email (arquivo ou exemplo)
    let email_text = match std::env::args().nth(1) {
        Some(path) => {
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("❌ Erro ao ler {}: {}", path, e);
                    return;
                }
            };
            match extract_text(&path, &bytes) {
                Ok(doc) => {
                    println!("✅ Texto extraído de {} ({:?})\n", doc.file_name, doc.format);
                    doc.text
                }
                Err(e) => {
                    eprintln!("❌ Erro ao extrair texto: {}", e);
                    return;
                }
            }
        }
        None => SAMPLE_EMAIL.to_string(),
    };

    // 2. Carregar configurações e prompt
    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Erro ao carregar configuração: {}", e);
            return;
        }
    };

    let prompt = match &settings.ai.prompt_file {
        Some(path) => match PromptConfig::from_file(path) {
            Ok(prompt) => prompt,
            Err(e) => {
                eprintln!("❌ Erro ao carregar prompt {}: {}", path, e);
                return;
            }
        },
        None => PromptConfig::default(),
    };

    // 3. Montar o prompt completo
    let prompt_completo = prompt.render(&email_text);

    println!("🤖 PROMPT COMPLETO ENVIADO À LLM:");
    println!("{}", "=".repeat(80));
    println!("{}", prompt_completo);
    println!("{}\n", "=".repeat(80));

    // 4. Estatísticas do prompt
    let num_palavras = prompt_completo.split_whitespace().count();

    println!("📊 ESTATÍSTICAS DO PROMPT:");
    println!("  • Linhas: {}", prompt_completo.lines().count());
    println!("  • Caracteres: {}", prompt_completo.chars().count());
    println!("  • Palavras: {}", num_palavras);
    println!("  • Exemplos few-shot: {}", prompt.examples.len());
    println!("  • Tamanho estimado (tokens): ~{}", num_palavras * 4 / 3);
    println!();

    // 5. Classificar, se houver credencial
    let processor = match build_processor(&settings) {
        Ok(processor) => processor,
        Err(e) => {
            eprintln!("❌ Erro ao montar processador: {}", e);
            return;
        }
    };

    if !processor.is_initialized() {
        println!(
            "ℹ️  {} não configurada: classificação ignorada.",
            settings.ai.provider.credential_env()
        );
        return;
    }

    println!("🔍 Classificando com {} ({:?})...", settings.model_name(), settings.ai.provider);
    match processor.classify(&email_text).await {
        Ok(result) => {
            println!("  • Categoria: {}", result.category.label());
            println!("  • Resposta sugerida: {}", result.suggested_reply);
        }
        Err(e) => eprintln!("❌ Falha na classificação: {}", e),
    }
    println!();
}
