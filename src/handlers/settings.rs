// src/handlers/settings.rs

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::settings::MessageTemplate};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertTemplatePayload {
    #[validate(length(min = 1, message = "A chave é obrigatória."))]
    #[schema(example = "invoice_whatsapp")]
    pub key_name: String,

    #[validate(length(min = 1, message = "O conteúdo é obrigatório."))]
    #[schema(example = "Olá {nome}, sua fatura {numero} está pronta!")]
    pub content: String,
}

// GET /api/settings/templates
#[utoipa::path(
    get,
    path = "/api/settings/templates",
    tag = "Settings",
    responses(
        (status = 200, description = "Modelos de mensagem cadastrados", body = Vec<MessageTemplate>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<MessageTemplate>>, AppError> {
    let templates = app_state.settings_repo.list_templates().await?;
    Ok(Json(templates))
}

// PUT /api/settings/templates
// A chave identifica o modelo: gravar de novo sobrescreve o conteúdo.
#[utoipa::path(
    put,
    path = "/api/settings/templates",
    tag = "Settings",
    request_body = UpsertTemplatePayload,
    responses(
        (status = 200, description = "Modelo criado ou atualizado", body = MessageTemplate)
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_template(
    State(app_state): State<AppState>,
    Json(payload): Json<UpsertTemplatePayload>,
) -> Result<Json<MessageTemplate>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let template = app_state
        .settings_repo
        .upsert_template(&app_state.db_pool, &payload.key_name, &payload.content)
        .await?;

    Ok(Json(template))
}
