//! Controlador de transacciones
//!
//! Liquida reservas pendientes (impuestos, cobro y confirmación en una
//! sola unidad atómica) y expone las consultas sobre el historial.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::transaction_dto::{CreateTransactionRequest, TransactionResponse};
use crate::dto::{ApiResponse, PaginatedResponse, PaginationParams};
use crate::middleware::identity::RequesterIdentity;
use crate::repositories::{TransactionOutcome, TransactionRepository};
use crate::services::{Mailer, TransactionEmail};
use crate::utils::errors::AppError;

pub struct TransactionController {
    transactions: TransactionRepository,
    mailer: Arc<dyn Mailer>,
}

impl TransactionController {
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            transactions: TransactionRepository::new(pool),
            mailer,
        }
    }

    /// Liquida la reserva indicada. El correo sale después del commit y
    /// nunca revierte el cobro.
    pub async fn create(
        &self,
        identity: &RequesterIdentity,
        request: CreateTransactionRequest,
    ) -> Result<ApiResponse<TransactionResponse>, AppError> {
        let outcome = self
            .transactions
            .create(request.booking_id, identity.user_id)
            .await?;

        log::info!(
            "💳 Transaction {} settled booking {}",
            outcome.transaction.id,
            outcome.booking.id
        );

        send_confirmation(&self.mailer, &outcome).await;

        Ok(ApiResponse::success_with_message(
            TransactionResponse::from(outcome.transaction),
            "Transaction completed successfully".to_string(),
        ))
    }

    pub async fn fetch_all(
        &self,
        identity: &RequesterIdentity,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<TransactionResponse>, AppError> {
        if !identity.is_manager() {
            return Err(AppError::Forbidden(
                "Only administrators can list all transactions".to_string(),
            ));
        }

        let (transactions, total) = self
            .transactions
            .find_all(params.limit(), params.offset())
            .await?;

        let items = transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, total, &params))
    }

    pub async fn fetch_by_id(
        &self,
        id: Uuid,
        identity: &RequesterIdentity,
    ) -> Result<TransactionResponse, AppError> {
        let transaction = self
            .transactions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

        // Solo el pagador o un administrador pueden consultarla
        if transaction.user_id != identity.user_id && !identity.is_manager() {
            return Err(AppError::Forbidden(
                "You are not allowed to view this transaction".to_string(),
            ));
        }

        Ok(TransactionResponse::from(transaction))
    }

    pub async fn list_mine(
        &self,
        identity: &RequesterIdentity,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<TransactionResponse>, AppError> {
        let (transactions, total) = self
            .transactions
            .list_for_user(identity.user_id, params.limit(), params.offset())
            .await?;

        let items = transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, total, &params))
    }

    pub async fn remove(
        &self,
        id: Uuid,
        identity: &RequesterIdentity,
    ) -> Result<ApiResponse<()>, AppError> {
        if !identity.is_manager() {
            return Err(AppError::Forbidden(
                "Only administrators can delete transactions".to_string(),
            ));
        }

        let deleted = self.transactions.delete(id).await?;
        if !deleted {
            return Err(AppError::NotFound("Transaction not found".to_string()));
        }

        log::info!("🗑️ Transaction deleted: {}", id);

        Ok(ApiResponse::success_with_message(
            (),
            "Transaction deleted successfully".to_string(),
        ))
    }
}

/// Correo de confirmación armado desde el resultado de la liquidación
pub(crate) fn confirmation_email(outcome: &TransactionOutcome) -> TransactionEmail {
    TransactionEmail {
        to: outcome.user.email.clone(),
        subject: "Transaction Completed".to_string(),
        description: "Your booking transaction was successful.".to_string(),
        car_name: outcome.car.model.clone(),
        booking_date: outcome.booking.created_at,
        start_date: outcome.booking.start_date,
        end_date: outcome.booking.end_date,
        total_amount: outcome.booking.fare,
        total_gst: outcome.transaction.total_tax(),
        amount_paid: outcome.transaction.amount,
        booking_status: outcome.booking.status.as_str().to_string(),
    }
}

/// Un correo caído queda en el log; la liquidación ya está comprometida
pub(crate) async fn send_confirmation(mailer: &Arc<dyn Mailer>, outcome: &TransactionOutcome) {
    let email = confirmation_email(outcome);
    if let Err(e) = mailer.send_transaction_email(&email).await {
        log::warn!(
            "⚠️ Transaction email for booking {} failed: {}",
            outcome.booking.id,
            e
        );
    }
}
