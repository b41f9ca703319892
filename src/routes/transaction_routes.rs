use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::transaction_controller::TransactionController;
use crate::dto::transaction_dto::{CreateTransactionRequest, TransactionResponse};
use crate::dto::{ApiResponse, PaginatedResponse, PaginationParams};
use crate::middleware::identity::RequesterIdentity;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_transaction_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_transaction))
        .route("/", get(list_transactions))
        .route("/mine", get(my_transactions))
        .route("/:id", get(get_transaction))
        .route("/:id", delete(delete_transaction))
}

async fn create_transaction(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<Json<ApiResponse<TransactionResponse>>, AppError> {
    let controller = TransactionController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.create(&identity, request).await?;
    Ok(Json(response))
}

async fn list_transactions(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<TransactionResponse>>, AppError> {
    let controller = TransactionController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.fetch_all(&identity, params).await?;
    Ok(Json(response))
}

async fn my_transactions(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<TransactionResponse>>, AppError> {
    let controller = TransactionController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.list_mine(&identity, params).await?;
    Ok(Json(response))
}

async fn get_transaction(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let controller = TransactionController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.fetch_by_id(id, &identity).await?;
    Ok(Json(response))
}

async fn delete_transaction(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = TransactionController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.remove(id, &identity).await?;
    Ok(Json(response))
}
