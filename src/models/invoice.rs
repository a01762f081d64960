// src/models/invoice.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- FILIAL ---
// As duas lojas físicas. A filial particiona a numeração de faturas:
// cada uma tem seu prefixo e sua sequência mensal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "branch", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Branch {
    GadingSerpong, // Vira "GADING_SERPONG"
    KelapaDua,     // Vira "KELAPA_DUA"
}

impl Branch {
    // Prefixo usado na composição do número da fatura (GS2405001, KD2405001...)
    pub fn prefix(&self) -> &'static str {
        match self {
            Branch::GadingSerpong => "GS",
            Branch::KelapaDua => "KD",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Branch::GadingSerpong => "Gading Serpong",
            Branch::KelapaDua => "Kelapa Dua",
        }
    }
}

// --- STATUS DA FATURA ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "invoice_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    Partial,
    Paid,
    Cancelled,
}

// --- FATURA ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub branch: Branch,

    pub customer_id: Option<Uuid>,
    // Snapshot do cliente no momento da venda (o cadastro pode mudar depois).
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,

    // Invariantes: grand_total = total_amount - discount_amount
    //              remaining_balance = grand_total - paid_amount
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub grand_total: Decimal,
    pub down_payment: Decimal,
    pub paid_amount: Decimal,
    pub remaining_balance: Decimal,

    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- ITEM DA FATURA ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,

    pub quantity: i32,
    pub price: Decimal,
    pub discount: Decimal,

    // Receita óptica (apenas itens "Lensa"). Convenção de sinal:
    // SPH mantém o sinal digitado, CYL é sempre negativo, ADD sempre positivo.
    pub sph: Option<Decimal>,
    pub cyl: Option<Decimal>,
    pub axis: Option<Decimal>,
    pub add_power: Option<Decimal>,
    pub mpd: Option<Decimal>,

    pub created_at: DateTime<Utc>,
}

impl InvoiceItem {
    pub fn has_prescription(&self) -> bool {
        self.sph.is_some()
            || self.cyl.is_some()
            || self.axis.is_some()
            || self.add_power.is_some()
            || self.mpd.is_some()
    }
}

// Fatura completa para a tela de detalhe e para o PDF.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub header: Invoice,
    pub items: Vec<InvoiceItem>,
    pub payments: Vec<Payment>,
}

// --- PAGAMENTOS ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub payment_type_id: Option<Uuid>,
    pub amount: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentType {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_prefixes() {
        assert_eq!(Branch::GadingSerpong.prefix(), "GS");
        assert_eq!(Branch::KelapaDua.prefix(), "KD");
    }

    #[test]
    fn branch_display_names() {
        assert_eq!(Branch::KelapaDua.display_name(), "Kelapa Dua");
        assert_eq!(Branch::GadingSerpong.display_name(), "Gading Serpong");
    }

    #[test]
    fn branch_serde_screaming_snake() {
        let json = serde_json::to_string(&Branch::KelapaDua).unwrap();
        assert_eq!(json, "\"KELAPA_DUA\"");
        let back: Branch = serde_json::from_str("\"GADING_SERPONG\"").unwrap();
        assert_eq!(back, Branch::GadingSerpong);
    }
}
