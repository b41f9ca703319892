//! Modelo de Transaction
//!
//! Este módulo contiene el struct Transaction y el desglose de impuestos.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la transacción - mapea al ENUM transaction_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "transaction_status")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Success => "Success",
            TransactionStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction principal - mapea exactamente a la tabla transactions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub status: TransactionStatus,
    pub gst: Decimal,
    pub cgst: Decimal,
    pub igst: Decimal,
    pub sgst: Decimal,
    /// Tarifa más la suma de los cuatro impuestos
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn total_tax(&self) -> Decimal {
        self.gst + self.cgst + self.igst + self.sgst
    }
}

/// Desglose de impuestos sobre la tarifa de una reserva.
///
/// Los cuatro componentes se calculan por separado al 18% sobre la tarifa
/// completa y el importe final es tarifa + los cuatro. La facturación
/// histórica sigue este cálculo exacto; no consolidar los componentes.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxBreakdown {
    pub gst: Decimal,
    pub cgst: Decimal,
    pub igst: Decimal,
    pub sgst: Decimal,
}

impl TaxBreakdown {
    /// Calcular los cuatro componentes de forma independiente
    pub fn from_fare(fare: Decimal) -> Self {
        let rate = Decimal::new(18, 2);
        Self {
            gst: fare * rate,
            cgst: fare * rate,
            igst: fare * rate,
            sgst: fare * rate,
        }
    }

    /// Suma de los cuatro componentes
    pub fn total(&self) -> Decimal {
        self.gst + self.cgst + self.igst + self.sgst
    }

    /// Importe final a cobrar
    pub fn amount_due(&self, fare: Decimal) -> Decimal {
        fare + self.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_component_is_18_percent() {
        let taxes = TaxBreakdown::from_fare(Decimal::new(1000, 0));
        let expected = Decimal::new(180, 0);

        assert_eq!(taxes.gst, expected);
        assert_eq!(taxes.cgst, expected);
        assert_eq!(taxes.igst, expected);
        assert_eq!(taxes.sgst, expected);
    }

    #[test]
    fn test_amount_due_is_fare_plus_all_four() {
        let fare = Decimal::new(1000, 0);
        let taxes = TaxBreakdown::from_fare(fare);

        assert_eq!(taxes.total(), Decimal::new(720, 0));
        assert_eq!(taxes.amount_due(fare), Decimal::new(1720, 0));
    }

    #[test]
    fn test_fractional_fare_keeps_exact_decimals() {
        let fare = Decimal::new(1080, 0);
        let taxes = TaxBreakdown::from_fare(fare);

        assert_eq!(taxes.gst, Decimal::new(19440, 2)); // 194.40
        assert_eq!(taxes.amount_due(fare), Decimal::new(185760, 2)); // 1857.60
    }

    #[test]
    fn test_zero_fare_produces_zero_taxes() {
        let taxes = TaxBreakdown::from_fare(Decimal::ZERO);
        assert_eq!(taxes.total(), Decimal::ZERO);
        assert_eq!(taxes.amount_due(Decimal::ZERO), Decimal::ZERO);
    }
}
