use crate::dto::{BookingReportRow, BookingWithCarRow, MonthlySummaryRow};
use crate::models::{Booking, BookingStatus, CarStatus};
use crate::repositories::car_repository::CarRepository;
use crate::utils::errors::{bad_request_error, AppError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

// Fila del barrido de recordatorios: reserva confirmada más contacto del usuario
#[derive(Debug, sqlx::FromRow)]
pub struct BookingSweepRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub user_email: String,
    pub user_name: String,
}

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        car_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        estimated_distance: i32,
        fare: Decimal,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        // Revisión previa para dar un mensaje claro; el índice parcial
        // uniq_active_booking_per_user_car cierra la carrera en el INSERT
        let active: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE user_id = $1 AND car_id = $2 AND status IN ('Pending', 'Confirmed', 'Late')
            )
            "#,
        )
        .bind(user_id)
        .bind(car_id)
        .fetch_one(&mut *tx)
        .await?;

        if active.0 {
            tx.rollback().await?;
            return Err(bad_request_error(
                "You already have an active booking for this car.",
            ));
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (user_id, car_id, start_date, end_date, estimated_distance, fare, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'Pending')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(car_id)
        .bind(start_date)
        .bind(end_date)
        .bind(estimated_distance)
        .bind(fare)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                bad_request_error("You already have an active booking for this car.")
            }
            other => AppError::from(other),
        })?;

        tx.commit().await?;
        Ok(booking)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        is_manager: bool,
        car_id: Option<Uuid>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        drop_off_time: Option<DateTime<Utc>>,
        estimated_distance: Option<i32>,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let current = match current {
            Some(booking) => booking,
            None => {
                tx.rollback().await?;
                return Err(AppError::NotFound("Booking not found".to_string()));
            }
        };

        if current.user_id != user_id && !is_manager {
            tx.rollback().await?;
            return Err(AppError::Forbidden(
                "You are not allowed to modify this booking".to_string(),
            ));
        }

        // Si cambia el coche, el destino tiene que existir
        if let Some(new_car_id) = car_id {
            let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM cars WHERE id = $1)")
                .bind(new_car_id)
                .fetch_one(&mut *tx)
                .await?;

            if !exists.0 {
                tx.rollback().await?;
                return Err(AppError::NotFound("Car not found".to_string()));
            }
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET car_id = $2, start_date = $3, end_date = $4, drop_off_time = $5, estimated_distance = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(car_id.unwrap_or(current.car_id))
        .bind(start_date.unwrap_or(current.start_date))
        .bind(end_date.unwrap_or(current.end_date))
        .bind(drop_off_time.or(current.drop_off_time))
        .bind(estimated_distance.unwrap_or(current.estimated_distance))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(booking)
    }

    pub async fn cancel(
        &self,
        id: Uuid,
        user_id: Uuid,
        is_manager: bool,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let current = match current {
            Some(booking) => booking,
            None => {
                tx.rollback().await?;
                return Err(AppError::NotFound("Booking not found".to_string()));
            }
        };

        if current.user_id != user_id && !is_manager {
            tx.rollback().await?;
            return Err(AppError::Forbidden(
                "You are not allowed to cancel this booking".to_string(),
            ));
        }

        if !current.can_cancel() {
            tx.rollback().await?;
            return Err(bad_request_error(
                "This booking has already been cancelled.",
            ));
        }

        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'Cancelled', updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        // Una reserva cobrada tenía el coche ocupado; al cancelarla vuelve al parque
        if current.holds_car() {
            CarRepository::set_status_in_tx(&mut *tx, current.car_id, CarStatus::Available).await?;
        }

        tx.commit().await?;
        Ok(booking)
    }

    pub async fn submit_feedback(
        &self,
        id: Uuid,
        user_id: Uuid,
        feedback: &str,
    ) -> Result<Booking, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if current.user_id != user_id {
            return Err(AppError::Forbidden(
                "You can only leave feedback on your own bookings".to_string(),
            ));
        }

        if !current.accepts_feedback() {
            return Err(bad_request_error(
                "Feedback already submitted for this booking",
            ));
        }

        // Escritura condicionada: dos envíos simultáneos no pueden pasar ambos
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET feedback = $2, updated_at = NOW() WHERE id = $1 AND feedback IS NULL RETURNING *",
        )
        .bind(id)
        .bind(feedback)
        .fetch_optional(&self.pool)
        .await?;

        booking.ok_or_else(|| bad_request_error("Feedback already submitted for this booking"))
    }

    pub async fn monthly_summary(&self, year: i32) -> Result<Vec<MonthlySummaryRow>, AppError> {
        let rows = sqlx::query_as::<_, MonthlySummaryRow>(
            r#"
            SELECT CAST(EXTRACT(MONTH FROM start_date) AS INT4) AS month,
                   SUM(fare) AS total_revenue,
                   COUNT(*) AS total_bookings
            FROM bookings
            WHERE EXTRACT(YEAR FROM start_date) = $1
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn report_rows(
        &self,
        month: Option<i32>,
        year: Option<i32>,
    ) -> Result<Vec<BookingReportRow>, AppError> {
        let rows = sqlx::query_as::<_, BookingReportRow>(
            r#"
            SELECT b.*,
                   c.model AS car_model, c.city AS car_city,
                   c.fuel_type AS car_fuel_type, c.status AS car_status,
                   u.name AS user_name, u.email AS user_email
            FROM bookings b
            JOIN cars c ON c.id = b.car_id
            JOIN users u ON u.id = b.user_id
            WHERE ($1::INT4 IS NULL OR EXTRACT(MONTH FROM b.start_date) = $1)
              AND ($2::INT4 IS NULL OR EXTRACT(YEAR FROM b.start_date) = $2)
            ORDER BY b.start_date DESC
            "#,
        )
        .bind(month)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Filas del volcado CSV; aquí el corte es por fecha de alta de la
    /// reserva, no por la ventana del viaje.
    pub async fn export_rows(
        &self,
        month: Option<i32>,
        year: Option<i32>,
    ) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE ($1::INT4 IS NULL OR EXTRACT(MONTH FROM created_at) = $1)
              AND ($2::INT4 IS NULL OR EXTRACT(YEAR FROM created_at) = $2)
            ORDER BY created_at
            "#,
        )
        .bind(month)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BookingWithCarRow>, i64), AppError> {
        let rows = sqlx::query_as::<_, BookingWithCarRow>(
            r#"
            SELECT b.*,
                   c.model AS car_model, c.city AS car_city,
                   c.fuel_type AS car_fuel_type, c.status AS car_status
            FROM bookings b
            JOIN cars c ON c.id = b.car_id
            WHERE b.user_id = $1
            ORDER BY b.start_date DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total.0))
    }

    pub async fn list_for_car(&self, car_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE car_id = $1 ORDER BY created_at DESC",
        )
        .bind(car_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_confirmed_with_users(&self) -> Result<Vec<BookingSweepRow>, AppError> {
        let rows = sqlx::query_as::<_, BookingSweepRow>(
            r#"
            SELECT b.id, b.user_id, b.start_date, b.end_date,
                   u.email AS user_email, u.name AS user_name
            FROM bookings b
            JOIN users u ON u.id = b.user_id
            WHERE b.status = 'Confirmed'
            ORDER BY b.start_date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Marca tardía solo si la reserva sigue confirmada; un barrido que pisa
    /// una cancelación concurrente no debe resucitarla.
    pub async fn mark_late(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'Late', updated_at = NOW() WHERE id = $1 AND status = 'Confirmed'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn set_status_in_tx(
        conn: &mut PgConnection,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(conn)
        .await
    }
}
