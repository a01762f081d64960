// src/handlers/job_orders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::job_order::{JobOrderEntry, JobOrderStatus, JobOrderSummary},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppendStatusPayload {
    pub status: JobOrderStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct JobOrderBoardQuery {
    pub status: Option<JobOrderStatus>,
}

// GET /api/job-orders
// O quadro do laboratório: o status mais recente de cada item de lente.
#[utoipa::path(
    get,
    path = "/api/job-orders",
    tag = "Job Orders",
    params(JobOrderBoardQuery),
    responses(
        (status = 200, description = "Status atual de cada ordem de serviço", body = Vec<JobOrderSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_board(
    State(app_state): State<AppState>,
    Query(query): Query<JobOrderBoardQuery>,
) -> Result<Json<Vec<JobOrderSummary>>, AppError> {
    let board = app_state.job_order_repo.list_current(query.status).await?;
    Ok(Json(board))
}

// GET /api/job-orders/{invoice_item_id}/history
#[utoipa::path(
    get,
    path = "/api/job-orders/{invoice_item_id}/history",
    tag = "Job Orders",
    params(("invoice_item_id" = Uuid, Path, description = "ID do Item da Fatura")),
    responses(
        (status = 200, description = "Trilha completa de status, da mais antiga à mais recente", body = Vec<JobOrderEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_history(
    State(app_state): State<AppState>,
    Path(invoice_item_id): Path<Uuid>,
) -> Result<Json<Vec<JobOrderEntry>>, AppError> {
    let history = app_state.job_order_repo.list_history(invoice_item_id).await?;
    Ok(Json(history))
}

// POST /api/job-orders/{invoice_item_id}
// A trilha é só de acréscimo: cada mudança vira uma linha nova com autor
// e data; nada é editado nem apagado.
#[utoipa::path(
    post,
    path = "/api/job-orders/{invoice_item_id}",
    tag = "Job Orders",
    request_body = AppendStatusPayload,
    params(("invoice_item_id" = Uuid, Path, description = "ID do Item da Fatura")),
    responses(
        (status = 201, description = "Status registrado", body = JobOrderEntry),
        (status = 404, description = "Item da fatura não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn append_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(invoice_item_id): Path<Uuid>,
    Json(payload): Json<AppendStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let author = user.full_name.clone().unwrap_or_else(|| user.email.clone());

    let entry = app_state
        .job_order_repo
        .append_status(
            &app_state.db_pool,
            invoice_item_id,
            payload.status,
            &author,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}
