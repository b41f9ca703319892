use axum::Router;

use crate::state::AppState;

pub mod booking_routes;
pub mod car_routes;
pub mod transaction_routes;

/// Router completo de la API bajo `/api`
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/bookings", booking_routes::create_booking_router())
        .nest("/api/cars", car_routes::create_car_router())
        .nest(
            "/api/transactions",
            transaction_routes::create_transaction_router(),
        )
}
