//! Acceso a datos sobre Postgres; cada repositorio encapsula sus consultas.

pub mod booking_repository;
pub mod car_repository;
pub mod transaction_repository;
pub mod user_repository;

pub use booking_repository::{BookingRepository, BookingSweepRow};
pub use car_repository::CarRepository;
pub use transaction_repository::{TransactionOutcome, TransactionRepository};
pub use user_repository::UserRepository;
