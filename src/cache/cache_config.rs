//! Configuración del cliente Redis que respalda el índice geográfico.

use std::env;

/// Parámetros de conexión a Redis
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub redis_url: String,
    /// Reintentos de reconexión del `ConnectionManager` antes de rendirse
    pub reconnect_retries: usize,
}

impl CacheConfig {
    /// Leer la configuración desde variables de entorno
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            reconnect_retries: env::var("REDIS_RECONNECT_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            reconnect_retries: 6,
        }
    }
}
