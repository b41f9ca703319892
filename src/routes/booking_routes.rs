use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    BookingReportEntry, BookingResponse, BookingWithCarResponse, CreateBookingRequest,
    CreateBookingResponse, MonthlySummaryRow, ReportQuery, SubmitFeedbackRequest, SummaryQuery,
    UpdateBookingRequest,
};
use crate::dto::{ApiResponse, PaginatedResponse, PaginationParams};
use crate::middleware::identity::RequesterIdentity;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/", get(list_my_bookings))
        .route("/summary", get(monthly_summary))
        .route("/report", get(booking_report))
        .route("/export", get(export_bookings))
        .route("/:id", get(get_booking))
        .route("/:id", patch(update_booking))
        .route("/:id/cancel", post(cancel_booking))
        .route("/:id/feedback", post(submit_feedback))
}

async fn create_booking(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<CreateBookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.create(&identity, request).await?;
    Ok(Json(response))
}

async fn list_my_bookings(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<BookingWithCarResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.list_for_user(&identity, params).await?;
    Ok(Json(response))
}

async fn monthly_summary(
    State(state): State<AppState>,
    _identity: RequesterIdentity,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<ApiResponse<Vec<MonthlySummaryRow>>>, AppError> {
    let controller = BookingController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.monthly_summary(query).await?;
    Ok(Json(response))
}

async fn booking_report(
    State(state): State<AppState>,
    _identity: RequesterIdentity,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<Vec<BookingReportEntry>>>, AppError> {
    let controller = BookingController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.report(query).await?;
    Ok(Json(response))
}

async fn export_bookings(
    State(state): State<AppState>,
    _identity: RequesterIdentity,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let controller = BookingController::new(state.pool.clone(), state.mailer.clone());
    let csv = controller.export(query).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bookings.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

async fn get_booking(
    State(state): State<AppState>,
    _identity: RequesterIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let controller = BookingController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.fetch_by_id(id).await?;
    Ok(Json(response))
}

async fn update_booking(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.update(id, &identity, request).await?;
    Ok(Json(response))
}

async fn cancel_booking(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.cancel(id, &identity).await?;
    Ok(Json(response))
}

async fn submit_feedback(
    State(state): State<AppState>,
    identity: RequesterIdentity,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone(), state.mailer.clone());
    let response = controller.submit_feedback(id, &identity, request).await?;
    Ok(Json(response))
}
