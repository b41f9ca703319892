//! DTOs de la API
//!
//! Requests y responses que viajan por HTTP, separados de los modelos
//! de base de datos.

pub mod booking_dto;
pub mod car_dto;
pub mod common;
pub mod transaction_dto;

pub use booking_dto::{BookingReportRow, BookingWithCarRow, MonthlySummaryRow};
pub use common::{ApiResponse, PaginatedResponse, PaginationParams};
