// src/db/job_order_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::job_order::{JobOrderEntry, JobOrderStatus, JobOrderSummary},
};

#[derive(Clone)]
pub struct JobOrderRepository {
    pool: PgPool,
}

impl JobOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Acrescenta uma linha à trilha. Nunca atualiza nada: o histórico
    // é imutável e o status atual é derivado da linha mais recente.
    pub async fn append_status<'e, E>(
        &self,
        executor: E,
        invoice_item_id: Uuid,
        status: JobOrderStatus,
        author: &str,
        notes: Option<&str>,
    ) -> Result<JobOrderEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, JobOrderEntry>(
            r#"
            INSERT INTO job_order_trackings (invoice_item_id, status, author, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(invoice_item_id)
        .bind(status)
        .bind(author)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound(format!(
                        "Item de fatura {}",
                        invoice_item_id
                    ));
                }
            }
            e.into()
        })?;

        Ok(entry)
    }

    pub async fn list_history(
        &self,
        invoice_item_id: Uuid,
    ) -> Result<Vec<JobOrderEntry>, AppError> {
        let entries = sqlx::query_as::<_, JobOrderEntry>(
            r#"
            SELECT * FROM job_order_trackings
            WHERE invoice_item_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(invoice_item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    // Listagem do quadro de ordens: a linha mais recente de cada item
    // (DISTINCT ON), juntada com fatura e produto.
    pub async fn list_current(
        &self,
        status: Option<JobOrderStatus>,
    ) -> Result<Vec<JobOrderSummary>, AppError> {
        let summaries = sqlx::query_as::<_, JobOrderSummary>(
            r#"
            SELECT * FROM (
                SELECT DISTINCT ON (t.invoice_item_id)
                    t.invoice_item_id,
                    inv.invoice_number,
                    inv.customer_name,
                    it.product_name,
                    t.status,
                    t.author,
                    t.created_at AS updated_at
                FROM job_order_trackings t
                JOIN invoice_items it ON it.id = t.invoice_item_id
                JOIN invoices inv ON inv.id = it.invoice_id
                ORDER BY t.invoice_item_id, t.created_at DESC
            ) latest
            WHERE ($1::job_order_status IS NULL OR latest.status = $1)
            ORDER BY latest.updated_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }
}
