// src/models/job_order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Status de fabricação/montagem da lente vendida.
// As transições são livres: qualquer status pode ser gravado a qualquer
// momento; o status atual é sempre a linha mais recente da trilha.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "job_order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobOrderStatus {
    Pending,
    Ordered,
    Completed,
}

// Uma linha da trilha append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobOrderEntry {
    pub id: Uuid,
    pub invoice_item_id: Uuid,
    pub status: JobOrderStatus,
    pub author: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Visão de listagem: item de lente + fatura + status atual.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobOrderSummary {
    pub invoice_item_id: Uuid,
    pub invoice_number: String,
    pub customer_name: String,
    pub product_name: String,
    pub status: JobOrderStatus,
    pub author: String,
    pub updated_at: DateTime<Utc>,
}
