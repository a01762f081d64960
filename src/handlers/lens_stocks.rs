// src/handlers/lens_stocks.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::lens::{LensStock, LensType},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LensTypePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "CR-39 Antirreflexo")]
    pub name: String,

    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertLevelPayload {
    /// Esférico da célula (o sinal é respeitado como digitado)
    pub sph: Decimal,
    /// Cilíndrico da célula
    pub cyl: Decimal,

    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub quantity: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "O mínimo não pode ser negativo."))]
    pub minimum_stock: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "O ponto de reposição não pode ser negativo."))]
    pub reorder_point: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustQuantityPayload {
    /// Ajuste relativo: positivo repõe, negativo baixa
    pub delta: i32,
}

// GET /api/lens-stocks/types
#[utoipa::path(
    get,
    path = "/api/lens-stocks/types",
    tag = "Lens Stock",
    responses(
        (status = 200, description = "Tipos de lente cadastrados", body = Vec<LensType>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_types(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<LensType>>, AppError> {
    let types = app_state.lens_stock_repo.list_types().await?;
    Ok(Json(types))
}

// POST /api/lens-stocks/types
#[utoipa::path(
    post,
    path = "/api/lens-stocks/types",
    tag = "Lens Stock",
    request_body = LensTypePayload,
    responses(
        (status = 201, description = "Tipo de lente criado", body = LensType),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_type(
    State(app_state): State<AppState>,
    Json(payload): Json<LensTypePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lens_type = app_state
        .lens_stock_repo
        .create_type(&app_state.db_pool, &payload.name, payload.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(lens_type)))
}

// GET /api/lens-stocks/types/{id}/grid
// A grade SPH x CYL de um tipo de lente, ordenada para montar a matriz
// na tela exatamente como sai do banco.
#[utoipa::path(
    get,
    path = "/api/lens-stocks/types/{id}/grid",
    tag = "Lens Stock",
    params(("id" = Uuid, Path, description = "ID do Tipo de Lente")),
    responses(
        (status = 200, description = "Células da grade ordenadas por SPH e CYL", body = Vec<LensStock>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_grid(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LensStock>>, AppError> {
    let grid = app_state.lens_stock_repo.list_grid(id).await?;
    Ok(Json(grid))
}

// PUT /api/lens-stocks/types/{id}/grid
// Grava uma célula da grade. (tipo, SPH, CYL) identifica a célula, então
// a mesma chamada serve para criar e para corrigir.
#[utoipa::path(
    put,
    path = "/api/lens-stocks/types/{id}/grid",
    tag = "Lens Stock",
    request_body = UpsertLevelPayload,
    params(("id" = Uuid, Path, description = "ID do Tipo de Lente")),
    responses(
        (status = 200, description = "Célula criada ou atualizada", body = LensStock)
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_level(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertLevelPayload>,
) -> Result<Json<LensStock>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let level = app_state
        .lens_stock_repo
        .upsert_level(
            &app_state.db_pool,
            id,
            payload.sph,
            payload.cyl,
            payload.quantity,
            payload.minimum_stock,
            payload.reorder_point,
        )
        .await?;

    Ok(Json(level))
}

// POST /api/lens-stocks/{id}/adjust
#[utoipa::path(
    post,
    path = "/api/lens-stocks/{id}/adjust",
    tag = "Lens Stock",
    request_body = AdjustQuantityPayload,
    params(("id" = Uuid, Path, description = "ID da Célula de Estoque")),
    responses(
        (status = 200, description = "Quantidade ajustada", body = LensStock),
        (status = 422, description = "O ajuste deixaria o saldo negativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_quantity(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustQuantityPayload>,
) -> Result<Json<LensStock>, AppError> {
    let level = app_state
        .lens_stock_repo
        .adjust_quantity(&app_state.db_pool, id, payload.delta)
        .await?
        .ok_or_else(|| AppError::InsufficientStock {
            product: format!("Célula de lente {}", id),
            available: 0,
            requested: -payload.delta,
        })?;

    Ok(Json(level))
}

// GET /api/lens-stocks/alerts
#[utoipa::path(
    get,
    path = "/api/lens-stocks/alerts",
    tag = "Lens Stock",
    responses(
        (status = 200, description = "Células abaixo do estoque mínimo", body = Vec<LensStock>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_alerts(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<LensStock>>, AppError> {
    let alerts = app_state.lens_stock_repo.list_below_minimum().await?;
    Ok(Json(alerts))
}
