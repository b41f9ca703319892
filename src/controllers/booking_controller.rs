//! Controlador de reservas
//!
//! Orquesta el ciclo de vida completo: alta con tarifa calculada y
//! liquidación inmediata, modificación, anulación, feedback y los
//! reportes administrativos (resumen mensual, listado y volcado CSV).

use std::sync::Arc;

use chrono::{Datelike, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::{
    BookingReportEntry, BookingResponse, BookingWithCarResponse, CreateBookingRequest,
    CreateBookingResponse, MonthlySummaryRow, ReportQuery, SubmitFeedbackRequest, SummaryQuery,
    UpdateBookingRequest,
};
use crate::dto::transaction_dto::TransactionResponse;
use crate::dto::{ApiResponse, PaginatedResponse, PaginationParams};
use crate::middleware::identity::RequesterIdentity;
use crate::repositories::{BookingRepository, CarRepository, TransactionRepository, UserRepository};
use crate::services::{bookings_to_csv, calculate_booking_fare, Mailer};
use crate::utils::errors::{bad_request_error, validation_error, AppError};
use crate::utils::validation::{validate_month, validate_trip_window, validate_year};

use super::transaction_controller::send_confirmation;

pub struct BookingController {
    bookings: BookingRepository,
    cars: CarRepository,
    users: UserRepository,
    transactions: TransactionRepository,
    mailer: Arc<dyn Mailer>,
}

impl BookingController {
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            bookings: BookingRepository::new(pool.clone()),
            cars: CarRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool),
            mailer,
        }
    }

    /// Alta de reserva. La fila nace `Pending` y se liquida de inmediato;
    /// la respuesta lleva la reserva ya confirmada junto con su transacción.
    pub async fn create(
        &self,
        identity: &RequesterIdentity,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<CreateBookingResponse>, AppError> {
        // Validar campos
        request.validate()?;
        validate_trip_window(request.start_date, request.end_date)
            .map_err(|_| validation_error("start_date", "start date must be before end date"))?;

        // El gateway ya autenticó; aquí solo materializamos la fila local
        let user = self
            .users
            .ensure_from_identity(identity.user_id, &identity.email)
            .await?;

        let car = self
            .cars
            .find_by_id(request.car_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        if !car.accepts_bookings() {
            return Err(bad_request_error("Car is not available for rent"));
        }

        let fare = calculate_booking_fare(
            &car,
            request.estimated_distance,
            request.start_date,
            request.end_date,
        );

        let booking = self
            .bookings
            .create(
                user.id,
                car.id,
                request.start_date,
                request.end_date,
                request.estimated_distance,
                fare,
            )
            .await?;

        log::info!("📝 Booking {} created with fare {}", booking.id, booking.fare);

        // Liquidación inmediata: impuestos, cobro, confirmación y ocupación
        // del coche en una sola unidad atómica
        let outcome = self.transactions.create(booking.id, user.id).await?;

        send_confirmation(&self.mailer, &outcome).await;

        Ok(ApiResponse::success_with_message(
            CreateBookingResponse {
                booking: BookingResponse::from(outcome.booking),
                transaction: TransactionResponse::from(outcome.transaction),
            },
            "Booking created successfully".to_string(),
        ))
    }

    pub async fn fetch_by_id(&self, id: Uuid) -> Result<BookingResponse, AppError> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        Ok(BookingResponse::from(booking))
    }

    pub async fn list_for_user(
        &self,
        identity: &RequesterIdentity,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<BookingWithCarResponse>, AppError> {
        let (rows, total) = self
            .bookings
            .list_for_user(identity.user_id, params.limit(), params.offset())
            .await?;

        let items = rows.into_iter().map(BookingWithCarResponse::from).collect();

        Ok(PaginatedResponse::new(items, total, &params))
    }

    pub async fn update(
        &self,
        id: Uuid,
        identity: &RequesterIdentity,
        request: UpdateBookingRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        request.validate()?;

        if request.is_empty() {
            return Err(bad_request_error("No fields provided for update"));
        }

        // Solo se valida la ventana cuando el patch trae ambos extremos;
        // mover un solo extremo se coteja contra el registro en el repositorio
        if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
            validate_trip_window(start, end).map_err(|_| {
                validation_error("start_date", "start date must be before end date")
            })?;
        }

        let booking = self
            .bookings
            .update(
                id,
                identity.user_id,
                identity.is_manager(),
                request.car_id,
                request.start_date,
                request.end_date,
                request.drop_off_time,
                request.estimated_distance,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Booking updated successfully".to_string(),
        ))
    }

    pub async fn cancel(
        &self,
        id: Uuid,
        identity: &RequesterIdentity,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self
            .bookings
            .cancel(id, identity.user_id, identity.is_manager())
            .await?;

        log::info!("✅ Booking cancelled: {}", id);

        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Booking cancelled successfully".to_string(),
        ))
    }

    pub async fn submit_feedback(
        &self,
        id: Uuid,
        identity: &RequesterIdentity,
        request: SubmitFeedbackRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        request.validate()?;

        let booking = self
            .bookings
            .submit_feedback(id, identity.user_id, &request.feedback)
            .await?;

        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Feedback submitted successfully".to_string(),
        ))
    }

    /// Resumen mensual de ingresos; sin año explícito se usa el año en curso
    pub async fn monthly_summary(
        &self,
        query: SummaryQuery,
    ) -> Result<ApiResponse<Vec<MonthlySummaryRow>>, AppError> {
        let year = query.year.unwrap_or_else(|| Utc::now().year());
        validate_year(year)
            .map_err(|_| validation_error("year", "year must be between 2000 and 2100"))?;

        let rows = self.bookings.monthly_summary(year).await?;

        Ok(ApiResponse::success(rows))
    }

    /// Listado administrativo con coche y usuario anidados, filtrado por
    /// mes/año de inicio del viaje
    pub async fn report(
        &self,
        query: ReportQuery,
    ) -> Result<ApiResponse<Vec<BookingReportEntry>>, AppError> {
        if let Some(month) = query.month {
            validate_month(month)
                .map_err(|_| bad_request_error("Month must be between 1 and 12"))?;
        }
        if let Some(year) = query.year {
            validate_year(year)
                .map_err(|_| validation_error("year", "year must be between 2000 and 2100"))?;
        }

        let rows = self
            .bookings
            .report_rows(query.month.map(|m| m as i32), query.year)
            .await?;

        let entries = rows.into_iter().map(BookingReportEntry::from).collect();

        Ok(ApiResponse::success(entries))
    }

    /// Volcado CSV filtrado por mes/año de alta de la reserva
    pub async fn export(&self, query: ReportQuery) -> Result<String, AppError> {
        if let Some(month) = query.month {
            validate_month(month)
                .map_err(|_| bad_request_error("Month must be between 1 and 12"))?;
        }
        if let Some(year) = query.year {
            validate_year(year)
                .map_err(|_| validation_error("year", "year must be between 2000 and 2100"))?;
        }

        let rows = self
            .bookings
            .export_rows(query.month.map(|m| m as i32), query.year)
            .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound(
                "No bookings found for the specified criteria".to_string(),
            ));
        }

        log::info!("💾 Exporting {} bookings to CSV", rows.len());

        Ok(bookings_to_csv(&rows))
    }
}
