// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Categoria que marca lentes de grau. Itens dessa categoria carregam
// receita óptica na fatura e geram ordem de serviço.
pub const LENS_CATEGORY: &str = "Lensa";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub category: String,

    // Faixas de preço: loja física, online, compra e venda.
    pub store_price: Decimal,
    pub online_price: Option<Decimal>,
    pub buy_price: Option<Decimal>,
    pub sell_price: Option<Decimal>,

    // stock_qty só tem significado quando track_inventory = true.
    pub stock_qty: i32,
    pub track_inventory: bool,
    pub low_stock_alert: i32,

    // Fotos, variações e observações livres (JSONB).
    pub metadata: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_lens(&self) -> bool {
        self.category == LENS_CATEGORY
    }
}
