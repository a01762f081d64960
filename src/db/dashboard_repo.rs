// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::dashboard::{BranchSalesEntry, DashboardSummary, SalesChartEntry, TopProductEntry},
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Resumo Geral
    pub async fn get_summary<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Transação para um snapshot consistente dos quatro números.
        let mut tx = executor.begin().await?;

        // A. Vendas de Hoje (faturas não canceladas emitidas hoje)
        let sales_today = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(grand_total), 0)
            FROM invoices
            WHERE status <> 'CANCELLED'
              AND created_at::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // B. Vendas do Mês
        let sales_this_month = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(grand_total), 0)
            FROM invoices
            WHERE status <> 'CANCELLED'
              AND date_trunc('month', created_at) = date_trunc('month', CURRENT_DATE)
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // C. Quantidade de faturas de hoje
        let invoices_today = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM invoices
            WHERE status <> 'CANCELLED'
              AND created_at::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // D. Saldo a receber (faturas em aberto)
        let outstanding_balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(remaining_balance), 0)
            FROM invoices
            WHERE status IN ('PENDING', 'PARTIAL')
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            sales_today,
            sales_this_month,
            invoices_today,
            outstanding_balance,
        })
    }

    // 2. Gráfico de Linha (Últimos 30 dias)
    pub async fn get_sales_last_30_days(&self) -> Result<Vec<SalesChartEntry>, AppError> {
        let data = sqlx::query_as::<_, SalesChartEntry>(
            r#"
            SELECT
                to_char(created_at, 'YYYY-MM-DD') AS date,
                SUM(grand_total) AS total
            FROM invoices
            WHERE status <> 'CANCELLED'
              AND created_at >= (CURRENT_DATE - INTERVAL '30 days')
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(data)
    }

    // 3. Top 5 Produtos mais vendidos em valor
    pub async fn get_top_products(&self) -> Result<Vec<TopProductEntry>, AppError> {
        let data = sqlx::query_as::<_, TopProductEntry>(
            r#"
            SELECT
                it.product_name,
                SUM(it.quantity)::bigint AS total_quantity,
                SUM(it.quantity * it.price - it.discount) AS total_revenue
            FROM invoice_items it
            JOIN invoices inv ON inv.id = it.invoice_id
            WHERE inv.status <> 'CANCELLED'
            GROUP BY it.product_name
            ORDER BY total_revenue DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(data)
    }

    // 4. Vendas do mês por filial
    pub async fn get_branch_sales(&self) -> Result<Vec<BranchSalesEntry>, AppError> {
        let data = sqlx::query_as::<_, BranchSalesEntry>(
            r#"
            SELECT
                branch,
                SUM(grand_total) AS total,
                COUNT(*)::bigint AS invoice_count
            FROM invoices
            WHERE status <> 'CANCELLED'
              AND date_trunc('month', created_at) = date_trunc('month', CURRENT_DATE)
            GROUP BY branch
            ORDER BY branch
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(data)
    }
}
