use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Car, CarStatus, FuelType};

// Request para publicar un coche en el marketplace
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCarRequest {
    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(range(min = 1886, max = 2100))]
    pub year: i32,

    pub fuel_type: String,

    #[validate(length(min = 1, max = 100))]
    pub city: String,

    pub latitude: f64,
    pub longitude: f64,

    pub price_per_km: Decimal,
    pub price_per_hr: Decimal,

    pub status: Option<String>,

    #[validate(length(min = 5, max = 30))]
    pub chassis_number: String,
}

// Request para editar un coche existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCarRequest {
    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1886, max = 2100))]
    pub year: Option<i32>,

    pub fuel_type: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub price_per_km: Option<Decimal>,
    pub price_per_hr: Option<Decimal>,
}

// Request para cambiar solo el estado del coche
#[derive(Debug, Deserialize)]
pub struct UpdateCarStatusRequest {
    pub status: String,
}

// Query de búsqueda por cercanía
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: Option<f64>,
}

impl NearbyQuery {
    pub fn radius_km(&self) -> f64 {
        self.radius.unwrap_or(10.0)
    }
}

// Response completa de coche
#[derive(Debug, Serialize)]
pub struct CarResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub model: String,
    pub year: i32,
    pub fuel_type: FuelType,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_km: Decimal,
    pub price_per_hr: Decimal,
    pub status: CarStatus,
    pub chassis_number: String,
    pub created_at: DateTime<Utc>,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            id: car.id,
            user_id: car.user_id,
            model: car.model,
            year: car.year,
            fuel_type: car.fuel_type,
            city: car.city,
            latitude: car.latitude,
            longitude: car.longitude,
            price_per_km: car.price_per_km,
            price_per_hr: car.price_per_hr,
            status: car.status,
            chassis_number: car.chassis_number,
            created_at: car.created_at,
        }
    }
}

// Coche con la distancia devuelta por la búsqueda geográfica
#[derive(Debug, Serialize)]
pub struct NearbyCarResponse {
    #[serde(flatten)]
    pub car: CarResponse,
    pub distance_km: f64,
}

// Resumen de coche anidado en respuestas de reservas
#[derive(Debug, Serialize)]
pub struct CarSummary {
    pub id: Uuid,
    pub model: String,
    pub city: String,
    pub fuel_type: FuelType,
    pub status: CarStatus,
}

impl From<&Car> for CarSummary {
    fn from(car: &Car) -> Self {
        Self {
            id: car.id,
            model: car.model.clone(),
            city: car.city.clone(),
            fuel_type: car.fuel_type,
            status: car.status,
        }
    }
}
