// src/handlers/customers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::customer::Customer};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 5, message = "O telefone precisa de pelo menos 5 dígitos."))]
    #[schema(example = "081234567890")]
    pub phone: String,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,

    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListCustomersQuery {
    /// Busca por nome ou telefone (ILIKE)
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackfillPayload {
    /// Dia das faturas de onde importar os clientes
    pub date: NaiveDate,
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    params(ListCustomersQuery),
    responses(
        (status = 200, description = "Clientes filtrados", body = Vec<Customer>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    Query(query): Query<ListCustomersQuery>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let customers = app_state
        .customer_repo
        .list(query.search.as_deref())
        .await?;

    Ok(Json(customers))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do Cliente")),
    responses(
        (status = 200, description = "Cliente encontrado", body = Customer),
        (status = 404, description = "Cliente não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    let customer = app_state
        .customer_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Cliente {}", id)))?;

    Ok(Json(customer))
}

// POST /api/customers
// O telefone identifica: se já existir, os dados são atualizados.
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CustomerPayload,
    responses(
        (status = 200, description = "Cliente criado ou atualizado pelo telefone", body = Customer)
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_customer(
    State(app_state): State<AppState>,
    Json(payload): Json<CustomerPayload>,
) -> Result<Json<Customer>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let customer = app_state
        .customer_repo
        .upsert_by_phone(
            &app_state.db_pool,
            &payload.name,
            &payload.phone,
            payload.email.as_deref(),
            payload.birth_date,
            payload.address.as_deref(),
        )
        .await?;

    Ok(Json(customer))
}

// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Customers",
    request_body = CustomerPayload,
    params(("id" = Uuid, Path, description = "ID do Cliente")),
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 409, description = "Telefone pertence a outro cliente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerPayload>,
) -> Result<Json<Customer>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let customer = app_state
        .customer_repo
        .update(
            &app_state.db_pool,
            id,
            &payload.name,
            &payload.phone,
            payload.email.as_deref(),
            payload.birth_date,
            payload.address.as_deref(),
        )
        .await?;

    Ok(Json(customer))
}

// DELETE /api/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do Cliente")),
    responses(
        (status = 204, description = "Cliente removido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .customer_repo
        .delete(&app_state.db_pool, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/admin/customers/backfill
// Importa para o cadastro os clientes que só existem como snapshot nas
// faturas de um dia. Telefones já cadastrados são ignorados.
#[utoipa::path(
    post,
    path = "/api/admin/customers/backfill",
    tag = "Customers",
    request_body = BackfillPayload,
    responses(
        (status = 200, description = "Quantidade de clientes importados")
    ),
    security(("api_jwt" = []))
)]
pub async fn backfill_customers(
    State(app_state): State<AppState>,
    Json(payload): Json<BackfillPayload>,
) -> Result<impl IntoResponse, AppError> {
    let imported = app_state
        .customer_repo
        .backfill_from_invoices(&app_state.db_pool, payload.date)
        .await?;

    tracing::info!("Backfill de clientes: {} importados de {}", imported, payload.date);

    Ok(Json(json!({ "imported": imported })))
}
