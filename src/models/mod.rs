//! Modelos de datos
//!
//! Este módulo contiene los structs que mapean a las tablas de PostgreSQL
//! y las máquinas de estado de reservas y transacciones.

pub mod booking;
pub mod car;
pub mod transaction;
pub mod user;

pub use booking::*;
pub use car::*;
pub use transaction::*;
pub use user::*;
