use crate::models::{Car, CarStatus, FuelType};
use crate::utils::errors::{bad_request_error, conflict_error, AppError};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct CarRepository {
    pool: PgPool,
}

impl CarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        model: String,
        year: i32,
        fuel_type: FuelType,
        city: String,
        latitude: f64,
        longitude: f64,
        price_per_km: Decimal,
        price_per_hr: Decimal,
        status: CarStatus,
        chassis_number: String,
    ) -> Result<Car, AppError> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (user_id, model, year, fuel_type, city, latitude, longitude, price_per_km, price_per_hr, status, chassis_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(model)
        .bind(year)
        .bind(fuel_type)
        .bind(city)
        .bind(latitude)
        .bind(longitude)
        .bind(price_per_km)
        .bind(price_per_hr)
        .bind(status)
        .bind(&chassis_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                conflict_error("Car", "chassis_number", &chassis_number)
            }
            other => AppError::from(other),
        })?;

        Ok(car)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Car>, AppError> {
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(car)
    }

    /// Resuelve los ids que devuelve el índice geográfico contra el estado
    /// real del parque; solo pasan los coches en `available`.
    pub async fn find_available_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Car>, AppError> {
        let cars = sqlx::query_as::<_, Car>(
            "SELECT * FROM cars WHERE id = ANY($1) AND status = 'available'",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(cars)
    }

    pub async fn chassis_number_exists(&self, chassis_number: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM cars WHERE chassis_number = $1)")
                .bind(chassis_number)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        is_manager: bool,
        model: Option<String>,
        year: Option<i32>,
        fuel_type: Option<FuelType>,
        city: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        price_per_km: Option<Decimal>,
        price_per_hr: Option<Decimal>,
    ) -> Result<Car, AppError> {
        // Obtener el registro actual
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        // Solo el propietario o un administrador pueden modificarlo
        if !current.is_owned_by(user_id) && !is_manager {
            return Err(AppError::Forbidden(
                "You are not allowed to modify this car".to_string(),
            ));
        }

        let car = sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET model = $2, year = $3, fuel_type = $4, city = $5, latitude = $6, longitude = $7, price_per_km = $8, price_per_hr = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(model.unwrap_or(current.model))
        .bind(year.unwrap_or(current.year))
        .bind(fuel_type.unwrap_or(current.fuel_type))
        .bind(city.unwrap_or(current.city))
        .bind(latitude.unwrap_or(current.latitude))
        .bind(longitude.unwrap_or(current.longitude))
        .bind(price_per_km.unwrap_or(current.price_per_km))
        .bind(price_per_hr.unwrap_or(current.price_per_hr))
        .fetch_one(&self.pool)
        .await?;

        Ok(car)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        is_manager: bool,
        status: CarStatus,
    ) -> Result<Car, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        if !current.is_owned_by(user_id) && !is_manager {
            return Err(AppError::Forbidden(
                "You are not allowed to modify this car".to_string(),
            ));
        }

        let car = sqlx::query_as::<_, Car>(
            "UPDATE cars SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(car)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid, is_manager: bool) -> Result<(), AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        if !current.is_owned_by(user_id) && !is_manager {
            return Err(AppError::Forbidden(
                "You are not allowed to delete this car".to_string(),
            ));
        }

        sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    bad_request_error("Cannot delete a car with existing bookings")
                }
                other => AppError::from(other),
            })?;

        Ok(())
    }

    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Car>, sqlx::Error> {
        sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn set_status_in_tx(
        conn: &mut PgConnection,
        id: Uuid,
        status: CarStatus,
    ) -> Result<Car, sqlx::Error> {
        sqlx::query_as::<_, Car>(
            "UPDATE cars SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(conn)
        .await
    }
}
