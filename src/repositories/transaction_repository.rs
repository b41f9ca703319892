use crate::models::{
    Booking, BookingStatus, Car, CarStatus, TaxBreakdown, Transaction, TransactionStatus, User,
};
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::car_repository::CarRepository;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::{bad_request_error, AppError};
use sqlx::PgPool;
use uuid::Uuid;

// Resultado del cobro con todo lo que necesita el correo de confirmación
#[derive(Debug)]
pub struct TransactionOutcome {
    pub transaction: Transaction,
    pub booking: Booking,
    pub car: Car,
    pub user: User,
}

pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Liquida una reserva en una sola unidad atómica: registro del cobro,
    /// confirmación de la reserva y ocupación del coche, o nada.
    pub async fn create(
        &self,
        booking_id: Uuid,
        requester_user_id: Uuid,
    ) -> Result<TransactionOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        // Los bloqueos ordenan el cobro frente a cancelaciones concurrentes
        let booking = BookingRepository::find_by_id_for_update(&mut *tx, booking_id).await?;
        let booking = match booking {
            Some(booking) => booking,
            None => {
                tx.rollback().await?;
                return Err(AppError::NotFound("Booking not found".to_string()));
            }
        };

        let car = CarRepository::find_by_id_for_update(&mut *tx, booking.car_id).await?;
        let car = match car {
            Some(car) => car,
            None => {
                tx.rollback().await?;
                return Err(AppError::NotFound("Car not found".to_string()));
            }
        };

        let user = UserRepository::find_by_id_in_tx(&mut *tx, booking.user_id).await?;
        let user = match user {
            Some(user) => user,
            None => {
                tx.rollback().await?;
                return Err(AppError::NotFound(
                    "User not found for this booking".to_string(),
                ));
            }
        };

        if car.status == CarStatus::Unavailable {
            tx.rollback().await?;
            return Err(bad_request_error("Car is not available for rent"));
        }

        let taxes = TaxBreakdown::from_fare(booking.fare);
        let amount = taxes.amount_due(booking.fare);

        // El registro nace Pending y se liquida dentro de la misma unidad
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (booking_id, user_id, gst, cgst, igst, sgst, amount, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'Pending')
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(requester_user_id)
        .bind(taxes.gst)
        .bind(taxes.cgst)
        .bind(taxes.igst)
        .bind(taxes.sgst)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        let transaction = sqlx::query_as::<_, Transaction>(
            "UPDATE transactions SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(transaction.id)
        .bind(TransactionStatus::Success)
        .fetch_one(&mut *tx)
        .await?;

        let booking =
            BookingRepository::set_status_in_tx(&mut *tx, booking.id, BookingStatus::Confirmed)
                .await?;
        let car = CarRepository::set_status_in_tx(&mut *tx, car.id, CarStatus::Booked).await?;

        tx.commit().await?;

        Ok(TransactionOutcome {
            transaction,
            booking,
            car,
            user,
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, AppError> {
        let transaction =
            sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(transaction)
    }

    pub async fn find_all(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Transaction>, i64), AppError> {
        let rows = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total.0))
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Transaction>, i64), AppError> {
        let rows = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((rows, total.0))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FuelType;
    use crate::repositories::{BookingRepository, CarRepository, UserRepository};
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    async fn test_pool() -> Option<PgPool> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                println!("DATABASE_URL no definido, test omitido");
                return None;
            }
        };

        let pool = PgPool::connect(&url).await.ok()?;
        sqlx::migrate!("./migrations").run(&pool).await.ok()?;
        Some(pool)
    }

    async fn seed_pending_booking(pool: &PgPool) -> (Uuid, Uuid, Booking) {
        let user_id = Uuid::new_v4();
        let email = format!("{}@example.com", user_id.simple());
        let user = UserRepository::new(pool.clone())
            .ensure_from_identity(user_id, &email)
            .await
            .unwrap();

        let chassis = format!("CH{}", &Uuid::new_v4().simple().to_string()[..12]);
        let car = CarRepository::new(pool.clone())
            .create(
                user.id,
                "Baleno".to_string(),
                2022,
                FuelType::Petrol,
                "Mumbai".to_string(),
                19.0760,
                72.8777,
                Decimal::new(1000, 2),
                Decimal::new(8000, 2),
                CarStatus::Available,
                chassis,
            )
            .await
            .unwrap();

        let start = Utc::now() + Duration::days(1);
        let booking = BookingRepository::new(pool.clone())
            .create(
                user.id,
                car.id,
                start,
                start + Duration::days(2),
                50,
                Decimal::new(100_000, 2),
            )
            .await
            .unwrap();

        (user.id, car.id, booking)
    }

    #[tokio::test]
    async fn settlement_confirms_booking_and_occupies_car() {
        let pool = match test_pool().await {
            Some(pool) => pool,
            None => return,
        };

        let repo = TransactionRepository::new(pool.clone());
        let (user_id, car_id, booking) = seed_pending_booking(&pool).await;

        let outcome = repo.create(booking.id, user_id).await.unwrap();

        assert_eq!(outcome.transaction.status, TransactionStatus::Success);
        assert_eq!(outcome.booking.status, BookingStatus::Confirmed);
        assert_eq!(outcome.car.status, CarStatus::Booked);
        // 1000.00 de tarifa: 180.00 por componente, 1720.00 en total
        assert_eq!(outcome.transaction.gst, Decimal::new(18_000, 2));
        assert_eq!(outcome.transaction.amount, Decimal::new(172_000, 2));
        assert_eq!(outcome.car.id, car_id);
    }

    #[tokio::test]
    async fn settlement_rejects_unavailable_car_without_writing() {
        let pool = match test_pool().await {
            Some(pool) => pool,
            None => return,
        };

        let repo = TransactionRepository::new(pool.clone());
        let (user_id, car_id, booking) = seed_pending_booking(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        CarRepository::set_status_in_tx(&mut *conn, car_id, CarStatus::Unavailable)
            .await
            .unwrap();
        drop(conn);

        let result = repo.create(booking.id, user_id).await;
        match result {
            Err(AppError::BadRequest(message)) => {
                assert_eq!(message, "Car is not available for rent")
            }
            other => panic!("expected BadRequest, got {:?}", other),
        }

        // La unidad atómica no dejó rastro: ni cobro ni cambio de estado
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE booking_id = $1")
                .bind(booking.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count.0, 0);

        let unchanged = BookingRepository::new(pool.clone())
            .find_by_id(booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.status, BookingStatus::Pending);
    }
}
