//! Identidad del solicitante
//!
//! La autenticación vive en el gateway; este módulo solo extrae la
//! identidad ya verificada que llega en los headers `X-User-*`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use uuid::Uuid;

use crate::utils::errors::AppError;
use crate::utils::validation::validate_email;

/// Identidad propagada por el gateway en cada request
#[derive(Debug, Clone)]
pub struct RequesterIdentity {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
}

impl RequesterIdentity {
    /// Los reportes administrativos y la anulación de reservas ajenas
    /// requieren el rol `Admin`
    pub fn is_manager(&self) -> bool {
        self.roles.iter().any(|role| role == "Admin")
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequesterIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing X-User-Id header".to_string()))?;

        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| AppError::Unauthorized("Invalid X-User-Id header".to_string()))?;

        let email = parts
            .headers
            .get("x-user-email")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing X-User-Email header".to_string()))?
            .to_string();

        validate_email(&email)
            .map_err(|_| AppError::Unauthorized("Invalid X-User-Email header".to_string()))?;

        let roles = parts
            .headers
            .get("x-user-roles")
            .and_then(|value| value.to_str().ok())
            .map(|raw| {
                raw.split(',')
                    .map(|role| role.trim().to_string())
                    .filter(|role| !role.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(RequesterIdentity {
            user_id,
            email,
            roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_extracts_identity_from_headers() {
        let mut parts = parts_with_headers(&[
            ("x-user-id", "550e8400-e29b-41d4-a716-446655440000"),
            ("x-user-email", "driver@example.com"),
            ("x-user-roles", "Admin, Owner"),
        ]);

        let identity = RequesterIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(identity.email, "driver@example.com");
        assert_eq!(identity.roles, vec!["Admin", "Owner"]);
        assert!(identity.is_manager());
    }

    #[tokio::test]
    async fn test_rejects_missing_user_id() {
        let mut parts = parts_with_headers(&[("x-user-email", "driver@example.com")]);

        let result = RequesterIdentity::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_rejects_malformed_uuid() {
        let mut parts = parts_with_headers(&[
            ("x-user-id", "not-a-uuid"),
            ("x-user-email", "driver@example.com"),
        ]);

        let result = RequesterIdentity::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_regular_user_is_not_manager() {
        let mut parts = parts_with_headers(&[
            ("x-user-id", "550e8400-e29b-41d4-a716-446655440000"),
            ("x-user-email", "driver@example.com"),
        ]);

        let identity = RequesterIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert!(identity.roles.is_empty());
        assert!(!identity.is_manager());
    }
}
