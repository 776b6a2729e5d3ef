use tracing::{debug, error, info, warn};

pub fn log_request_received(endpoint: &str, method: &str) {
    info!("Request received: {} {}", method, endpoint);
}

pub fn log_request_processed(endpoint: &str, status: u16, duration_ms: u64) {
    info!("Request processed: {} - Status: {} - Duration: {}ms",
          endpoint, status, duration_ms);
}

pub fn log_file_received(file_name: &str, size: usize) {
    info!("📎 File received: {} ({} bytes)", file_name, size);
}

pub fn log_classification_result(request_id: &str, category: &str, duration_ms: u64) {
    info!("Email classified: {} - Category: {} - Duration: {}ms",
          request_id, category, duration_ms);
}

pub fn log_classification_error(request_id: &str, error: &str) {
    error!("Classification failed: {} - Error: {}", request_id, error);
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_server_startup(port: u16) {
    info!("🚀 Email triage middleware server starting on port {}", port);
}

pub fn log_server_ready(port: u16) {
    info!("✅ Server ready and listening on http://0.0.0.0:{}", port);
}

pub fn log_health_check() {
    debug!("Health check requested");
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

/// Prévia curta do email para logs, sem cortar caracteres UTF-8
pub fn email_preview(text: &str, max_chars: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    let truncated: String = single_line.chars().take(max_chars).collect();
    format!("{}...", truncated)
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_preview_truncates_on_char_boundary() {
        assert_eq!(email_preview("Olá,\n  mundo!", 20), "Olá, mundo!");
        assert_eq!(email_preview("ação ação ação", 4), "ação...");
    }
}
