// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::dashboard::{BranchSalesEntry, DashboardSummary, SalesChartEntry, TopProductEntry},
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Resumo financeiro e operacional do dia", body = DashboardSummary),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = app_state
        .dashboard_repo
        .get_summary(&app_state.db_pool)
        .await?;

    Ok(Json(summary))
}

// GET /api/dashboard/sales-chart
#[utoipa::path(
    get,
    path = "/api/dashboard/sales-chart",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Vendas por dia (últimos 30 dias)", body = Vec<SalesChartEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sales_chart(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<SalesChartEntry>>, AppError> {
    let chart = app_state.dashboard_repo.get_sales_last_30_days().await?;
    Ok(Json(chart))
}

// GET /api/dashboard/top-products
#[utoipa::path(
    get,
    path = "/api/dashboard/top-products",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Os cinco produtos com maior receita acumulada", body = Vec<TopProductEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_top_products(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<TopProductEntry>>, AppError> {
    let products = app_state.dashboard_repo.get_top_products().await?;
    Ok(Json(products))
}

// GET /api/dashboard/branch-sales
#[utoipa::path(
    get,
    path = "/api/dashboard/branch-sales",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Vendas do mês por filial", body = Vec<BranchSalesEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_branch_sales(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<BranchSalesEntry>>, AppError> {
    let branches = app_state.dashboard_repo.get_branch_sales().await?;
    Ok(Json(branches))
}
