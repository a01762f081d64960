// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// 1. Resumo (os cards do topo do painel)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub sales_today: Decimal,
    pub sales_this_month: Decimal,
    pub invoices_today: i64,
    // Soma do saldo devedor das faturas não canceladas.
    pub outstanding_balance: Decimal,
}

// 2. Gráfico de Vendas (Últimos 30 dias)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesChartEntry {
    pub date: Option<String>, // O SQL retorna a data como string (YYYY-MM-DD)
    pub total: Option<Decimal>,
}

// 3. Top Produtos (mais vendidos em valor)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProductEntry {
    pub product_name: String,
    pub total_quantity: Option<i64>,
    pub total_revenue: Option<Decimal>,
}

// 4. Vendas do mês por filial
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchSalesEntry {
    pub branch: crate::models::invoice::Branch,
    pub total: Option<Decimal>,
    pub invoice_count: Option<i64>,
}
