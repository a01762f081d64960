// src/models/lens.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LensType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Uma célula da grade dioptrica: saldo de um tipo de lente em um grau
// específico. Chave natural: (lens_type_id, sph, cyl).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LensStock {
    pub id: Uuid,
    pub lens_type_id: Uuid,
    pub sph: Decimal,
    pub cyl: Decimal,
    pub quantity: i32,
    pub minimum_stock: i32,
    pub reorder_point: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
