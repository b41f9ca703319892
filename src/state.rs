//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::geo_index::GeoIndex;
use crate::cache::redis_client::RedisClient;
use crate::config::environment::EnvironmentConfig;
use crate::services::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub redis: RedisClient,
    pub geo_index: GeoIndex,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: EnvironmentConfig,
        redis: RedisClient,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let geo_index = GeoIndex::new(redis.clone());
        Self {
            pool,
            config,
            redis,
            geo_index,
            mailer,
        }
    }
}
