//! Tareas de fondo del servicio

pub mod booking_scheduler;

pub use booking_scheduler::{spawn, SchedulerHandle};
