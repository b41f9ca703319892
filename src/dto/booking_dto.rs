use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Booking, BookingStatus, CarStatus, FuelType};

use super::car_dto::CarSummary;
use super::transaction_dto::TransactionResponse;

// Request para crear una reserva; la identidad del usuario llega por headers
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub car_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    #[validate(range(min = 0))]
    pub estimated_distance: i32,
}

// Request de actualización parcial; al menos un campo debe venir
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookingRequest {
    pub car_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub drop_off_time: Option<DateTime<Utc>>,

    #[validate(range(min = 0))]
    pub estimated_distance: Option<i32>,
}

impl UpdateBookingRequest {
    pub fn is_empty(&self) -> bool {
        self.car_id.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.drop_off_time.is_none()
            && self.estimated_distance.is_none()
    }
}

// Request de feedback, se acepta una sola vez por reserva
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitFeedbackRequest {
    #[validate(length(min = 1, max = 1000))]
    pub feedback: String,
}

// Query del resumen mensual de ingresos
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub year: Option<i32>,
}

// Query de reporte y export mensual
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

// Response completa de reserva
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub drop_off_time: Option<DateTime<Utc>>,
    pub status: BookingStatus,
    pub fare: Decimal,
    pub feedback: Option<String>,
    pub estimated_distance: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            user_id: booking.user_id,
            car_id: booking.car_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            drop_off_time: booking.drop_off_time,
            status: booking.status,
            fare: booking.fare,
            feedback: booking.feedback,
            estimated_distance: booking.estimated_distance,
            created_at: booking.created_at,
        }
    }
}

// La reserva recién creada viaja junto a su transacción de pago
#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub booking: BookingResponse,
    pub transaction: TransactionResponse,
}

// Fila plana del join reserva + coche para los listados de usuario
#[derive(Debug, FromRow)]
pub struct BookingWithCarRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub drop_off_time: Option<DateTime<Utc>>,
    pub status: BookingStatus,
    pub fare: Decimal,
    pub feedback: Option<String>,
    pub estimated_distance: i32,
    pub created_at: DateTime<Utc>,
    pub car_model: String,
    pub car_city: String,
    pub car_fuel_type: FuelType,
    pub car_status: CarStatus,
}

// Reserva con el resumen del coche anidado
#[derive(Debug, Serialize)]
pub struct BookingWithCarResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub drop_off_time: Option<DateTime<Utc>>,
    pub status: BookingStatus,
    pub fare: Decimal,
    pub feedback: Option<String>,
    pub estimated_distance: i32,
    pub created_at: DateTime<Utc>,
    pub car: CarSummary,
}

impl From<BookingWithCarRow> for BookingWithCarResponse {
    fn from(row: BookingWithCarRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            car_id: row.car_id,
            start_date: row.start_date,
            end_date: row.end_date,
            drop_off_time: row.drop_off_time,
            status: row.status,
            fare: row.fare,
            feedback: row.feedback,
            estimated_distance: row.estimated_distance,
            created_at: row.created_at,
            car: CarSummary {
                id: row.car_id,
                model: row.car_model,
                city: row.car_city,
                fuel_type: row.car_fuel_type,
                status: row.car_status,
            },
        }
    }
}

// Resumen de usuario anidado en el reporte administrativo
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

// Fila plana del join reserva + coche + usuario para el reporte
#[derive(Debug, FromRow)]
pub struct BookingReportRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub fare: Decimal,
    pub feedback: Option<String>,
    pub estimated_distance: i32,
    pub created_at: DateTime<Utc>,
    pub car_model: String,
    pub car_city: String,
    pub car_fuel_type: FuelType,
    pub car_status: CarStatus,
    pub user_name: String,
    pub user_email: String,
}

// Entrada del reporte con coche y usuario anidados
#[derive(Debug, Serialize)]
pub struct BookingReportEntry {
    pub id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub fare: Decimal,
    pub feedback: Option<String>,
    pub estimated_distance: i32,
    pub created_at: DateTime<Utc>,
    pub car: CarSummary,
    pub user: UserSummary,
}

impl From<BookingReportRow> for BookingReportEntry {
    fn from(row: BookingReportRow) -> Self {
        Self {
            id: row.id,
            start_date: row.start_date,
            end_date: row.end_date,
            status: row.status,
            fare: row.fare,
            feedback: row.feedback,
            estimated_distance: row.estimated_distance,
            created_at: row.created_at,
            car: CarSummary {
                id: row.car_id,
                model: row.car_model,
                city: row.car_city,
                fuel_type: row.car_fuel_type,
                status: row.car_status,
            },
            user: UserSummary {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
            },
        }
    }
}

// Fila del resumen mensual de ingresos
#[derive(Debug, Serialize, FromRow)]
pub struct MonthlySummaryRow {
    pub month: i32,
    pub total_revenue: Decimal,
    pub total_bookings: i64,
}
