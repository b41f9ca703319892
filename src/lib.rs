//! Núcleo del marketplace de alquiler de coches: ciclo de vida de
//! reservas, motor de tarifas y transacciones, índice geográfico de
//! disponibilidad y barrido de recordatorios.

pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;
