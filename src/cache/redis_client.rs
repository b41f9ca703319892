use anyhow::Result;
use redis::aio::ConnectionManager;
use tracing::info;

use super::CacheConfig;

/// Cliente Redis con reconexión automática y operaciones async
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
}

impl RedisClient {
    /// Crear nuevo cliente Redis
    pub async fn new(config: CacheConfig) -> Result<Self> {
        info!("🔗 Conectando a Redis: {}", config.redis_url);

        let client = redis::Client::open(config.redis_url.clone())?;
        // Reconexión con backoff exponencial a partir de 100 ms
        let manager =
            ConnectionManager::new_with_backoff(client, 2, 100, config.reconnect_retries).await?;

        // Test de conexión usando un comando simple
        let mut conn = manager.clone();
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;

        info!("✅ Redis conectado exitosamente");

        Ok(Self { manager })
    }

    /// Clonar el manager para ejecutar comandos
    pub fn manager(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Verificar si Redis está conectado
    pub async fn is_connected(&self) -> bool {
        let mut conn = self.manager.clone();
        match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
            Ok(response) => response == "PONG",
            Err(_) => false,
        }
    }
}
