//! Índice geográfico de coches
//!
//! Mantiene en Redis la última posición conocida de cada coche y resuelve
//! búsquedas por cercanía. La disponibilidad real se filtra después contra
//! PostgreSQL; este índice solo ordena candidatos por distancia.

use tracing::debug;
use uuid::Uuid;

use crate::utils::errors::{validation_error, AppResult};

use super::redis_client::RedisClient;

/// Set geoespacial con la posición de cada coche, indexado por id
const CAR_LOCATIONS_KEY: &str = "cars:locations";

/// Índice de disponibilidad geográfica sobre Redis
#[derive(Clone)]
pub struct GeoIndex {
    client: RedisClient,
}

impl GeoIndex {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Registrar o actualizar la posición de un coche (GEOADD es upsert)
    pub async fn index_car_location(
        &self,
        car_id: Uuid,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<()> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(validation_error(
                "coordinates",
                "latitude and longitude must be finite numbers",
            ));
        }

        let mut conn = self.client.manager();
        let _: () = redis::cmd("GEOADD")
            .arg(CAR_LOCATIONS_KEY)
            .arg(longitude)
            .arg(latitude)
            .arg(car_id.to_string())
            .query_async(&mut conn)
            .await?;

        debug!("📍 Posición indexada para coche {}: ({}, {})", car_id, latitude, longitude);
        Ok(())
    }

    /// Buscar coches dentro del radio, ordenados por distancia ascendente.
    /// Devuelve pares (car_id, distancia_km); clave vacía produce lista vacía.
    pub async fn find_nearest(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> AppResult<Vec<(String, f64)>> {
        let mut conn = self.client.manager();
        let results: Vec<(String, f64)> = redis::cmd("GEORADIUS")
            .arg(CAR_LOCATIONS_KEY)
            .arg(longitude)
            .arg(latitude)
            .arg(radius_km)
            .arg("km")
            .arg("WITHDIST")
            .arg("ASC")
            .query_async(&mut conn)
            .await?;

        debug!(
            "🔍 Búsqueda geográfica en ({}, {}) radio {}km: {} candidatos",
            latitude,
            longitude,
            radius_km,
            results.len()
        );
        Ok(results)
    }

    /// Retirar un coche del índice cuando se elimina del catálogo
    pub async fn remove_car(&self, car_id: Uuid) -> AppResult<()> {
        let mut conn = self.client.manager();
        let removed: i64 = redis::cmd("ZREM")
            .arg(CAR_LOCATIONS_KEY)
            .arg(car_id.to_string())
            .query_async(&mut conn)
            .await?;

        debug!("🗑️ Coche {} retirado del índice geográfico ({} entradas)", car_id, removed);
        Ok(())
    }
}
