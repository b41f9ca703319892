use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::car_controller::CarController;
use crate::dto::booking_dto::BookingResponse;
use crate::dto::car_dto::{
    CarResponse, CreateCarRequest, NearbyCarResponse, NearbyQuery, UpdateCarRequest,
    UpdateCarStatusRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::identity::RequesterIdentity;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_car_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_car))
        .route("/nearby", get(nearby_cars))
        .route("/:id", get(get_car))
        .route("/:id", patch(update_car))
        .route("/:id", delete(delete_car))
        .route("/:id/status", patch(update_car_status))
        .route("/:id/bookings", get(car_bookings))
}

async fn create_car(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Json(request): Json<CreateCarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone(), state.geo_index.clone());
    let response = controller.create(&identity, request).await?;
    Ok(Json(response))
}

async fn nearby_cars(
    State(state): State<AppState>,
    _identity: RequesterIdentity,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<NearbyCarResponse>>>, AppError> {
    let controller = CarController::new(state.pool.clone(), state.geo_index.clone());
    let response = controller.find_nearest(query).await?;
    Ok(Json(response))
}

async fn get_car(
    State(state): State<AppState>,
    _identity: RequesterIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<CarResponse>, AppError> {
    let controller = CarController::new(state.pool.clone(), state.geo_index.clone());
    let response = controller.fetch_by_id(id).await?;
    Ok(Json(response))
}

async fn update_car(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone(), state.geo_index.clone());
    let response = controller.update(id, &identity, request).await?;
    Ok(Json(response))
}

async fn update_car_status(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCarStatusRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone(), state.geo_index.clone());
    let response = controller.update_status(id, &identity, request).await?;
    Ok(Json(response))
}

async fn delete_car(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = CarController::new(state.pool.clone(), state.geo_index.clone());
    let response = controller.remove(id, &identity).await?;
    Ok(Json(response))
}

async fn car_bookings(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<BookingResponse>>>, AppError> {
    let controller = CarController::new(state.pool.clone(), state.geo_index.clone());
    let response = controller.bookings_for_car(id, &identity).await?;
    Ok(Json(response))
}
