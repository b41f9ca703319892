//! Middleware del sistema
//!
//! Este módulo contiene el middleware para CORS y la identidad
//! del solicitante propagada por el gateway.

pub mod cors;
pub mod identity;

pub use cors::*;
pub use identity::*;
