//! Modelo de Car
//!
//! Este módulo contiene el struct Car y sus enums de estado y combustible.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del coche - mapea al ENUM car_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "car_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    Available,
    Unavailable,
    Booked,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "available",
            CarStatus::Unavailable => "unavailable",
            CarStatus::Booked => "booked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(CarStatus::Available),
            "unavailable" => Some(CarStatus::Unavailable),
            "booked" => Some(CarStatus::Booked),
            _ => None,
        }
    }
}

impl std::fmt::Display for CarStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combustible del coche - mapea al ENUM fuel_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "fuel_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Cng,
    Diesel,
    Petrol,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Cng => "cng",
            FuelType::Diesel => "diesel",
            FuelType::Petrol => "petrol",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cng" => Some(FuelType::Cng),
            "diesel" => Some(FuelType::Diesel),
            "petrol" => Some(FuelType::Petrol),
            _ => None,
        }
    }
}

/// Car principal - mapea exactamente a la tabla cars
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Car {
    pub id: Uuid,
    /// Propietario que publica el coche en el marketplace
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
    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// Solo los coches explícitamente retirados rechazan reservas nuevas
    pub fn accepts_bookings(&self) -> bool {
        self.status != CarStatus::Unavailable
    }

    /// El propietario es el único que puede editar o retirar el coche
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_car(status: CarStatus) -> Car {
        Car {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            model: "Swift".to_string(),
            year: 2021,
            fuel_type: FuelType::Petrol,
            city: "Bangalore".to_string(),
            latitude: 12.9716,
            longitude: 77.5946,
            price_per_km: Decimal::new(12, 0),
            price_per_hr: Decimal::new(60, 0),
            status,
            chassis_number: "MA3EYD32S00C1234".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_unavailable_car_rejects_bookings() {
        assert!(sample_car(CarStatus::Available).accepts_bookings());
        assert!(sample_car(CarStatus::Booked).accepts_bookings());
        assert!(!sample_car(CarStatus::Unavailable).accepts_bookings());
    }

    #[test]
    fn test_car_status_parse_round_trip() {
        for status in [CarStatus::Available, CarStatus::Unavailable, CarStatus::Booked] {
            assert_eq!(CarStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CarStatus::parse("retired"), None);
    }

    #[test]
    fn test_fuel_type_parse() {
        assert_eq!(FuelType::parse("diesel"), Some(FuelType::Diesel));
        assert_eq!(FuelType::parse("electric"), None);
    }

    #[test]
    fn test_ownership_check() {
        let car = sample_car(CarStatus::Available);
        assert!(car.is_owned_by(car.user_id));
        assert!(!car.is_owned_by(Uuid::new_v4()));
    }
}
