use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Transaction, TransactionStatus};

// Request del motor de transacciones; el pago se simula siempre como exitoso
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub booking_id: Uuid,
}

// Response completa de transacción con el desglose de impuestos
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub status: TransactionStatus,
    pub gst: Decimal,
    pub cgst: Decimal,
    pub igst: Decimal,
    pub sgst: Decimal,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            booking_id: transaction.booking_id,
            user_id: transaction.user_id,
            status: transaction.status,
            gst: transaction.gst,
            cgst: transaction.cgst,
            igst: transaction.igst,
            sgst: transaction.sgst,
            amount: transaction.amount,
            created_at: transaction.created_at,
        }
    }
}
