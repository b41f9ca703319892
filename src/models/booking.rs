//! Modelo de Booking
//!
//! Este módulo contiene el struct Booking y su máquina de estados.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.
//!
//! Estados: Pending -> Confirmed -> Late, y cualquiera de los tres
//! puede pasar a Cancelled. Cancelled es terminal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la reserva - mapea al ENUM booking_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "booking_status")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Late,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Late => "Late",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking principal - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Hora real de devolución, si el conductor la registró
    pub drop_off_time: Option<DateTime<Utc>>,
    pub status: BookingStatus,
    pub fare: Decimal,
    pub feedback: Option<String>,
    pub estimated_distance: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Una reserva ya cancelada es lo único que no se puede cancelar
    pub fn can_cancel(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }

    /// Mientras una reserva esté en estos estados, el coche le pertenece
    pub fn holds_car(&self) -> bool {
        matches!(self.status, BookingStatus::Confirmed | BookingStatus::Late)
    }

    /// El feedback se escribe una sola vez
    pub fn accepts_feedback(&self) -> bool {
        self.feedback.is_none()
    }

    /// Estados que bloquean una nueva reserva del mismo coche por el mismo usuario
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Late
        )
    }
}
