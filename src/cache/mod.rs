//! Cache
//!
//! Este módulo contiene el cliente Redis y el índice geográfico de coches.

pub mod cache_config;
pub mod geo_index;
pub mod redis_client;

pub use cache_config::CacheConfig;
pub use geo_index::GeoIndex;
