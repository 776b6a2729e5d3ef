//! Política de retry com backoff exponencial para chamadas à IA
//!
//! O atraso é calculado a partir do índice da tentativa, sem estado mutável
//! entre iterações: `initial_backoff * 2^(tentativa - 1)`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total de tentativas, incluindo a primeira
    pub max_attempts: u32,
    /// Espera antes da segunda tentativa; dobra a cada falha
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Espera após a falha da tentativa `attempt` (1-indexada)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        self.initial_backoff.saturating_mul(factor)
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Estado efêmero de uma invocação do processador
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryState {
    pub attempt: u32,
    pub delay: Duration,
}

impl RetryState {
    /// Avança para a próxima tentativa; `None` quando a política se esgotou
    pub fn next(self, policy: &RetryPolicy) -> Option<Self> {
        if self.attempt > 0 && !policy.should_retry(self.attempt) {
            return None;
        }
        Some(Self {
            attempt: self.attempt + 1,
            delay: policy.delay_for(self.attempt),
        })
    }
}
