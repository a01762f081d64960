// src/handlers/invoices.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::invoice::{Branch, Invoice, InvoiceDetail, InvoiceStatus, PaymentType},
    services::invoice_service::{CustomerInput, NewInvoice, NewInvoiceItem, Prescription},
};

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative"));
    }
    Ok(())
}

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("not_positive"));
    }
    Ok(())
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCustomerPayload {
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    pub name: String,

    #[validate(length(min = 5, message = "O telefone precisa de pelo menos 5 dígitos."))]
    pub phone: String,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,

    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionPayload {
    pub sph: Option<Decimal>,
    pub cyl: Option<Decimal>,
    pub axis: Option<Decimal>,
    pub add_power: Option<Decimal>,
    pub mpd: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemPayload {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "A quantidade mínima é 1."))]
    pub quantity: i32,

    #[validate(custom(function = non_negative))]
    pub price: Decimal,

    #[serde(default)]
    #[validate(custom(function = non_negative))]
    pub discount: Decimal,

    pub prescription: Option<PrescriptionPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoicePayload {
    pub branch: Branch,

    #[validate(nested)]
    pub customer: InvoiceCustomerPayload,

    #[validate(length(min = 1, message = "A venda precisa de pelo menos um item."), nested)]
    pub items: Vec<InvoiceItemPayload>,

    #[serde(default)]
    #[validate(custom(function = non_negative))]
    pub discount_amount: Decimal,

    #[serde(default)]
    #[validate(custom(function = non_negative))]
    pub down_payment: Decimal,

    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentPayload {
    pub payment_type_id: Option<Uuid>,

    #[validate(custom(function = positive))]
    pub amount: Decimal,

    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTypePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentTypePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListInvoicesQuery {
    pub branch: Option<Branch>,
    pub status: Option<InvoiceStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl CreateInvoicePayload {
    fn into_input(self) -> NewInvoice {
        NewInvoice {
            branch: self.branch,
            customer: CustomerInput {
                name: self.customer.name,
                phone: self.customer.phone,
                email: self.customer.email,
                birth_date: self.customer.birth_date,
                address: self.customer.address,
            },
            items: self
                .items
                .into_iter()
                .map(|i| NewInvoiceItem {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price: i.price,
                    discount: i.discount,
                    prescription: i.prescription.map(|rx| Prescription {
                        sph: rx.sph,
                        cyl: rx.cyl,
                        axis: rx.axis,
                        add_power: rx.add_power,
                        mpd: rx.mpd,
                    }),
                })
                .collect(),
            discount_amount: self.discount_amount,
            down_payment: self.down_payment,
            notes: self.notes,
        }
    }
}

// ---
// Handlers
// ---

// POST /api/invoices
#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Invoices",
    request_body = CreateInvoicePayload,
    responses(
        (status = 201, description = "Venda registrada com numeração sequencial da filial", body = InvoiceDetail),
        (status = 404, description = "Produto não existe"),
        (status = 422, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateInvoicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let author = user.full_name.clone().unwrap_or_else(|| user.email.clone());
    let detail = app_state
        .invoice_service
        .create_invoice(&author, Some(user.id), payload.into_input())
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Invoices",
    params(ListInvoicesQuery),
    responses(
        (status = 200, description = "Faturas filtradas (máx. 200, mais recentes primeiro)", body = Vec<Invoice>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let invoices = app_state
        .invoice_repo
        .list(query.branch, query.status, query.from, query.to)
        .await?;

    Ok(Json(invoices))
}

// GET /api/invoices/{id}
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da Fatura")),
    responses(
        (status = 200, description = "Fatura com itens e pagamentos", body = InvoiceDetail),
        (status = 404, description = "Fatura não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceDetail>, AppError> {
    let detail = app_state.invoice_service.get_detail(id).await?;
    Ok(Json(detail))
}

// POST /api/invoices/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/invoices/{id}/cancel",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da Fatura")),
    responses(
        (status = 200, description = "Fatura cancelada, estoque devolvido", body = InvoiceDetail),
        (status = 409, description = "Já estava cancelada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceDetail>, AppError> {
    let detail = app_state.invoice_service.cancel_invoice(id).await?;
    Ok(Json(detail))
}

// DELETE /api/invoices/{id}
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da Fatura")),
    responses(
        (status = 204, description = "Fatura removida (itens e pagamentos em cascata)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.invoice_service.delete_invoice(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/invoices/{id}/payments
#[utoipa::path(
    post,
    path = "/api/invoices/{id}/payments",
    tag = "Invoices",
    request_body = RecordPaymentPayload,
    params(("id" = Uuid, Path, description = "ID da Fatura")),
    responses(
        (status = 201, description = "Pagamento registrado, saldo atualizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (payment, detail) = app_state
        .invoice_service
        .record_payment(
            id,
            payload.payment_type_id,
            payload.amount,
            payload.notes.as_deref(),
            Some(user.id),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "payment": payment, "invoice": detail })),
    ))
}

// GET /api/invoices/payment-types
#[utoipa::path(
    get,
    path = "/api/invoices/payment-types",
    tag = "Invoices",
    responses(
        (status = 200, description = "Tipos de pagamento ativos", body = Vec<PaymentType>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_payment_types(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<PaymentType>>, AppError> {
    let types = app_state.invoice_repo.list_payment_types().await?;
    Ok(Json(types))
}

// POST /api/invoices/payment-types
#[utoipa::path(
    post,
    path = "/api/invoices/payment-types",
    tag = "Invoices",
    request_body = PaymentTypePayload,
    responses(
        (status = 201, description = "Tipo de pagamento criado", body = PaymentType),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_payment_type(
    State(app_state): State<AppState>,
    Json(payload): Json<PaymentTypePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let payment_type = app_state
        .invoice_repo
        .create_payment_type(&app_state.db_pool, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(payment_type)))
}

// PUT /api/invoices/payment-types/{id}
#[utoipa::path(
    put,
    path = "/api/invoices/payment-types/{id}",
    tag = "Invoices",
    request_body = UpdatePaymentTypePayload,
    params(("id" = Uuid, Path, description = "ID do Tipo de Pagamento")),
    responses(
        (status = 200, description = "Tipo de pagamento atualizado", body = PaymentType),
        (status = 404, description = "Tipo não existe"),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_payment_type(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentTypePayload>,
) -> Result<Json<PaymentType>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let payment_type = app_state
        .invoice_repo
        .update_payment_type(&app_state.db_pool, id, &payload.name, payload.is_active)
        .await?;

    Ok(Json(payment_type))
}
