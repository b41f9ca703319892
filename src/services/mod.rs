//! Services module
//!
//! Este módulo contiene la lógica de negocio que no es acceso a datos:
//! cálculo de tarifas, serialización del volcado contable y la salida de
//! correo hacia el SMTP configurado.

pub mod email_service;
pub mod export_service;
pub mod fare_service;

pub use email_service::{build_mailer, Mailer, MockMailer, NoopMailer, SmtpMailer, TransactionEmail};
pub use export_service::bookings_to_csv;
pub use fare_service::calculate_booking_fare;
