//! Controladores HTTP; validan la entrada, delegan en los repositorios
//! y arman las respuestas de la API.

pub mod booking_controller;
pub mod car_controller;
pub mod transaction_controller;

pub use booking_controller::BookingController;
pub use car_controller::CarController;
pub use transaction_controller::TransactionController;
