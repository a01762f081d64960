// src/handlers/products.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::product::Product};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Lensa Essilor Crizal 1.56")]
    pub name: String,

    pub brand: Option<String>,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    #[schema(example = "Lensa")]
    pub category: String,

    pub store_price: Decimal,
    pub online_price: Option<Decimal>,
    pub buy_price: Option<Decimal>,
    pub sell_price: Option<Decimal>,

    #[serde(default)]
    pub stock_qty: i32,

    #[serde(default = "default_track_inventory")]
    pub track_inventory: bool,

    #[serde(default)]
    pub low_stock_alert: i32,

    #[serde(default = "default_metadata")]
    pub metadata: Value,
}

fn default_track_inventory() -> bool {
    true
}

fn default_metadata() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockPayload {
    /// Ajuste relativo: positivo repõe, negativo baixa
    pub delta: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListProductsQuery {
    /// Busca por nome ou marca (ILIKE)
    pub search: Option<String>,
    pub category: Option<String>,
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Catalog",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .product_repo
        .create(
            &app_state.db_pool,
            &payload.name,
            payload.brand.as_deref(),
            &payload.category,
            payload.store_price,
            payload.online_price,
            payload.buy_price,
            payload.sell_price,
            payload.stock_qty,
            payload.track_inventory,
            payload.low_stock_alert,
            &payload.metadata,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Catálogo filtrado", body = Vec<Product>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = app_state
        .product_repo
        .list(query.search.as_deref(), query.category.as_deref())
        .await?;

    Ok(Json(products))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Produto encontrado", body = Product),
        (status = 404, description = "Produto não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    let product = app_state
        .product_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Produto {}", id)))?;

    Ok(Json(product))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Catalog",
    request_body = ProductPayload,
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // stock_qty fica de fora: saldo só muda por venda, cancelamento ou
    // ajuste explícito de estoque.
    let product = app_state
        .product_repo
        .update(
            &app_state.db_pool,
            id,
            &payload.name,
            payload.brand.as_deref(),
            &payload.category,
            payload.store_price,
            payload.online_price,
            payload.buy_price,
            payload.sell_price,
            payload.track_inventory,
            payload.low_stock_alert,
            &payload.metadata,
        )
        .await?;

    Ok(Json(product))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 204, description = "Produto removido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.product_repo.delete(&app_state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/products/{id}/adjust
// Ajuste manual de saldo (entrada de mercadoria, quebra, acerto de
// inventário). Vendas baixam o estoque pela própria fatura.
#[utoipa::path(
    post,
    path = "/api/products/{id}/adjust",
    tag = "Catalog",
    request_body = AdjustStockPayload,
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Saldo ajustado", body = Product),
        (status = 422, description = "O ajuste deixaria o saldo negativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockPayload>,
) -> Result<Json<Product>, AppError> {
    match app_state
        .product_repo
        .adjust_stock(&app_state.db_pool, id, payload.delta)
        .await?
    {
        Some(product) => Ok(Json(product)),
        None => {
            // A guarda recusou o delta. Lê o saldo DEPOIS da recusa para
            // que a mensagem reflita o valor que rejeitou o ajuste.
            let current = app_state
                .product_repo
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::ResourceNotFound(format!("Produto {}", id)))?;

            Err(AppError::InsufficientStock {
                product: current.name,
                available: current.stock_qty,
                requested: -payload.delta,
            })
        }
    }
}

// GET /api/products/low-stock
#[utoipa::path(
    get,
    path = "/api/products/low-stock",
    tag = "Catalog",
    responses(
        (status = 200, description = "Produtos rastreados abaixo do alerta", body = Vec<Product>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_low_stock(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = app_state.product_repo.list_low_stock().await?;
    Ok(Json(products))
}
