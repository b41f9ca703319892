use crate::models::User;
use crate::utils::errors::{conflict_error, AppError};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Alta/refresco del usuario a partir de la identidad que envía la pasarela.
    pub async fn ensure_from_identity(&self, id: Uuid, email: &str) -> Result<User, AppError> {
        // El nombre visible se completa con la parte local del correo hasta
        // que el perfil se actualice desde el servicio de cuentas
        let name = email.split('@').next().unwrap_or(email);

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                conflict_error("User", "email", email)
            }
            other => AppError::from(other),
        })?;

        Ok(user)
    }

    pub async fn find_by_id_in_tx(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }
}
