//! Controlador del catálogo de coches
//!
//! Alta, edición y baja de coches junto con la búsqueda por cercanía.
//! Cada mutación de posición se refleja en el índice geográfico de Redis;
//! Postgres sigue siendo la fuente de verdad sobre disponibilidad.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::cache::geo_index::GeoIndex;
use crate::dto::booking_dto::BookingResponse;
use crate::dto::car_dto::{
    CarResponse, CreateCarRequest, NearbyCarResponse, NearbyQuery, UpdateCarRequest,
    UpdateCarStatusRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::identity::RequesterIdentity;
use crate::models::car::{Car, CarStatus, FuelType};
use crate::repositories::{BookingRepository, CarRepository, UserRepository};
use crate::utils::errors::{conflict_error, validation_error, AppError};
use crate::utils::validation::{validate_chassis_number, validate_coordinates};

pub struct CarController {
    cars: CarRepository,
    bookings: BookingRepository,
    users: UserRepository,
    geo: GeoIndex,
}

impl CarController {
    pub fn new(pool: PgPool, geo: GeoIndex) -> Self {
        Self {
            cars: CarRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool.clone()),
            users: UserRepository::new(pool),
            geo,
        }
    }

    pub async fn create(
        &self,
        identity: &RequesterIdentity,
        request: CreateCarRequest,
    ) -> Result<ApiResponse<CarResponse>, AppError> {
        // Validar campos
        request.validate()?;
        validate_coordinates(request.latitude, request.longitude)
            .map_err(|_| validation_error("coordinates", "latitude or longitude out of range"))?;
        validate_chassis_number(&request.chassis_number).map_err(|_| {
            validation_error("chassis_number", "chassis number must have 5 to 30 characters")
        })?;

        let fuel_type = FuelType::parse(&request.fuel_type).ok_or_else(|| {
            validation_error("fuel_type", "fuel type must be one of cng, diesel or petrol")
        })?;

        let status = match request.status.as_deref() {
            Some(raw) => CarStatus::parse(raw).ok_or_else(|| {
                validation_error(
                    "status",
                    "status must be one of available, unavailable or booked",
                )
            })?,
            None => CarStatus::Available,
        };

        // Revisión previa para un mensaje claro; la restricción única
        // sobre chassis_number cierra la carrera en el INSERT
        if self
            .cars
            .chassis_number_exists(&request.chassis_number)
            .await?
        {
            return Err(conflict_error(
                "Car",
                "chassis_number",
                &request.chassis_number,
            ));
        }

        let owner = self
            .users
            .ensure_from_identity(identity.user_id, &identity.email)
            .await?;

        let car = self
            .cars
            .create(
                owner.id,
                request.model,
                request.year,
                fuel_type,
                request.city,
                request.latitude,
                request.longitude,
                request.price_per_km,
                request.price_per_hr,
                status,
                request.chassis_number,
            )
            .await?;

        // Un coche fuera del índice sería invisible para la búsqueda por
        // cercanía, así que el fallo de indexado se propaga
        self.geo
            .index_car_location(car.id, car.latitude, car.longitude)
            .await?;

        log::info!("🚗 Car {} registered in {}", car.id, car.city);

        Ok(ApiResponse::success_with_message(
            CarResponse::from(car),
            "Car created successfully".to_string(),
        ))
    }

    pub async fn fetch_by_id(&self, id: Uuid) -> Result<CarResponse, AppError> {
        let car = self
            .cars
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        Ok(CarResponse::from(car))
    }

    /// Búsqueda por cercanía: Redis propone candidatos ordenados por
    /// distancia y Postgres decide cuáles siguen `available`
    pub async fn find_nearest(
        &self,
        query: NearbyQuery,
    ) -> Result<ApiResponse<Vec<NearbyCarResponse>>, AppError> {
        validate_coordinates(query.latitude, query.longitude)
            .map_err(|_| validation_error("coordinates", "latitude or longitude out of range"))?;

        let radius = query.radius_km();
        if !radius.is_finite() || radius <= 0.0 {
            return Err(validation_error("radius", "radius must be a positive number"));
        }

        let hits = self
            .geo
            .find_nearest(query.latitude, query.longitude, radius)
            .await?;

        // Entradas del índice que no parsean como UUID se ignoran
        let hits: Vec<(Uuid, f64)> = hits
            .into_iter()
            .filter_map(|(raw, distance)| Uuid::parse_str(&raw).ok().map(|id| (id, distance)))
            .collect();

        let ids: Vec<Uuid> = hits.iter().map(|(id, _)| *id).collect();
        let available = self.cars.find_available_by_ids(&ids).await?;

        let results = join_available_hits(hits, available)
            .into_iter()
            .map(|(car, distance_km)| NearbyCarResponse {
                car: CarResponse::from(car),
                distance_km,
            })
            .collect();

        Ok(ApiResponse::success(results))
    }

    pub async fn update(
        &self,
        id: Uuid,
        identity: &RequesterIdentity,
        request: UpdateCarRequest,
    ) -> Result<ApiResponse<CarResponse>, AppError> {
        request.validate()?;

        let fuel_type = match request.fuel_type.as_deref() {
            Some(raw) => Some(FuelType::parse(raw).ok_or_else(|| {
                validation_error("fuel_type", "fuel type must be one of cng, diesel or petrol")
            })?),
            None => None,
        };

        // La validación conjunta no aplica cuando el patch trae un solo eje
        if let Some(latitude) = request.latitude {
            if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
                return Err(validation_error(
                    "latitude",
                    "latitude must be between -90 and 90",
                ));
            }
        }
        if let Some(longitude) = request.longitude {
            if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
                return Err(validation_error(
                    "longitude",
                    "longitude must be between -180 and 180",
                ));
            }
        }

        let moved = request.latitude.is_some() || request.longitude.is_some();

        let car = self
            .cars
            .update(
                id,
                identity.user_id,
                identity.is_manager(),
                request.model,
                request.year,
                fuel_type,
                request.city,
                request.latitude,
                request.longitude,
                request.price_per_km,
                request.price_per_hr,
            )
            .await?;

        if moved {
            self.geo
                .index_car_location(car.id, car.latitude, car.longitude)
                .await?;
        }

        Ok(ApiResponse::success_with_message(
            CarResponse::from(car),
            "Car updated successfully".to_string(),
        ))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        identity: &RequesterIdentity,
        request: UpdateCarStatusRequest,
    ) -> Result<ApiResponse<CarResponse>, AppError> {
        let status = CarStatus::parse(&request.status).ok_or_else(|| {
            validation_error(
                "status",
                "status must be one of available, unavailable or booked",
            )
        })?;

        let car = self
            .cars
            .update_status(id, identity.user_id, identity.is_manager(), status)
            .await?;

        log::info!("🔄 Car {} status set to {}", car.id, car.status);

        Ok(ApiResponse::success_with_message(
            CarResponse::from(car),
            "Car status updated successfully".to_string(),
        ))
    }

    pub async fn remove(
        &self,
        id: Uuid,
        identity: &RequesterIdentity,
    ) -> Result<ApiResponse<()>, AppError> {
        self.cars
            .delete(id, identity.user_id, identity.is_manager())
            .await?;
        self.geo.remove_car(id).await?;

        log::info!("🗑️ Car deleted: {}", id);

        Ok(ApiResponse::success_with_message(
            (),
            "Car deleted successfully".to_string(),
        ))
    }

    /// Historial de reservas de un coche, reservado al propietario
    pub async fn bookings_for_car(
        &self,
        car_id: Uuid,
        identity: &RequesterIdentity,
    ) -> Result<ApiResponse<Vec<BookingResponse>>, AppError> {
        let car = self
            .cars
            .find_by_id(car_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        if !car.is_owned_by(identity.user_id) && !identity.is_manager() {
            return Err(AppError::Forbidden(
                "Only the car owner can see its bookings".to_string(),
            ));
        }

        let bookings = self.bookings.list_for_car(car_id).await?;
        if bookings.is_empty() {
            return Err(AppError::NotFound(
                "No bookings found for this car".to_string(),
            ));
        }

        Ok(ApiResponse::success(
            bookings.into_iter().map(BookingResponse::from).collect(),
        ))
    }
}

/// Cruza los aciertos del índice (ya ordenados por distancia ascendente)
/// con los coches que Postgres confirma disponibles, conservando el orden
fn join_available_hits(hits: Vec<(Uuid, f64)>, available: Vec<Car>) -> Vec<(Car, f64)> {
    let mut by_id: HashMap<Uuid, Car> = available.into_iter().map(|car| (car.id, car)).collect();

    hits.into_iter()
        .filter_map(|(id, distance)| by_id.remove(&id).map(|car| (car, distance)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn car_with_id(id: Uuid) -> Car {
        Car {
            id,
            user_id: Uuid::new_v4(),
            model: "Swift".to_string(),
            year: 2021,
            fuel_type: FuelType::Petrol,
            city: "Pune".to_string(),
            latitude: 18.52,
            longitude: 73.85,
            price_per_km: Decimal::new(10, 0),
            price_per_hr: Decimal::new(20, 0),
            status: CarStatus::Available,
            chassis_number: format!("CH-{}", id.simple()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_join_keeps_index_order_and_drops_missing() {
        let near = Uuid::new_v4();
        let far = Uuid::new_v4();
        let gone = Uuid::new_v4();

        let hits = vec![(near, 0.8), (gone, 1.5), (far, 4.2)];
        let available = vec![car_with_id(far), car_with_id(near)];

        let joined = join_available_hits(hits, available);

        let ids: Vec<Uuid> = joined.iter().map(|(car, _)| car.id).collect();
        assert_eq!(ids, vec![near, far]);
        assert_eq!(joined[0].1, 0.8);
        assert_eq!(joined[1].1, 4.2);
    }

    #[test]
    fn test_join_with_no_available_cars_is_empty() {
        let hits = vec![(Uuid::new_v4(), 2.0)];
        assert!(join_available_hits(hits, Vec::new()).is_empty());
    }
}
