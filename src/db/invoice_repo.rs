// src/db/invoice_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::invoice::{Branch, Invoice, InvoiceItem, InvoiceStatus, Payment, PaymentType},
};

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Numeração
    // ---

    // Serializa a alocação do número por (filial, mês). O lock é liberado
    // automaticamente no commit/rollback da transação.
    pub async fn lock_number_scope<'e, E>(&self, executor: E, scope: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(scope)
            .execute(executor)
            .await?;
        Ok(())
    }

    // Último número emitido para a filial dentro do prefixo mensal
    // (ex: 'GS2405%'). É a partir dele que a sequência avança.
    pub async fn find_last_number<'e, E>(
        &self,
        executor: E,
        branch: Branch,
        month_prefix: &str,
    ) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let last = sqlx::query_scalar::<_, String>(
            r#"
            SELECT invoice_number FROM invoices
            WHERE branch = $1 AND invoice_number LIKE $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(branch)
        .bind(format!("{}%", month_prefix))
        .fetch_optional(executor)
        .await?;

        Ok(last)
    }

    // ---
    // Escrita da fatura
    // ---

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_invoice<'e, E>(
        &self,
        executor: E,
        invoice_number: &str,
        branch: Branch,
        customer_id: Option<Uuid>,
        customer_name: &str,
        customer_phone: &str,
        customer_address: Option<&str>,
        total_amount: Decimal,
        discount_amount: Decimal,
        grand_total: Decimal,
        down_payment: Decimal,
        remaining_balance: Decimal,
        status: InvoiceStatus,
        notes: Option<&str>,
        created_by: Option<Uuid>,
    ) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (
                invoice_number, branch, customer_id,
                customer_name, customer_phone, customer_address,
                total_amount, discount_amount, grand_total,
                down_payment, paid_amount, remaining_balance,
                status, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(invoice_number)
        .bind(branch)
        .bind(customer_id)
        .bind(customer_name)
        .bind(customer_phone)
        .bind(customer_address)
        .bind(total_amount)
        .bind(discount_amount)
        .bind(grand_total)
        .bind(down_payment)
        .bind(remaining_balance)
        .bind(status)
        .bind(notes)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "O número de fatura '{}' já existe.",
                        invoice_number
                    ));
                }
            }
            e.into()
        })?;

        Ok(invoice)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        invoice_id: Uuid,
        product_id: Uuid,
        product_name: &str,
        quantity: i32,
        price: Decimal,
        discount: Decimal,
        sph: Option<Decimal>,
        cyl: Option<Decimal>,
        axis: Option<Decimal>,
        add_power: Option<Decimal>,
        mpd: Option<Decimal>,
    ) -> Result<InvoiceItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, InvoiceItem>(
            r#"
            INSERT INTO invoice_items (
                invoice_id, product_id, product_name, quantity, price, discount,
                sph, cyl, axis, add_power, mpd
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(invoice_id)
        .bind(product_id)
        .bind(product_name)
        .bind(quantity)
        .bind(price)
        .bind(discount)
        .bind(sph)
        .bind(cyl)
        .bind(axis)
        .bind(add_power)
        .bind(mpd)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    // ---
    // Leituras
    // ---

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(invoice)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        invoice_id: Uuid,
    ) -> Result<Vec<InvoiceItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, InvoiceItem>(
            "SELECT * FROM invoice_items WHERE invoice_id = $1 ORDER BY created_at ASC",
        )
        .bind(invoice_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn list_payments<'e, E>(
        &self,
        executor: E,
        invoice_id: Uuid,
    ) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE invoice_id = $1 ORDER BY created_at ASC",
        )
        .bind(invoice_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    pub async fn list(
        &self,
        branch: Option<Branch>,
        status: Option<InvoiceStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Invoice>, AppError> {
        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT * FROM invoices
            WHERE ($1::branch IS NULL OR branch = $1)
              AND ($2::invoice_status IS NULL OR status = $2)
              AND ($3::date IS NULL OR created_at::date >= $3)
              AND ($4::date IS NULL OR created_at::date <= $4)
            ORDER BY created_at DESC
            LIMIT 200
            "#,
        )
        .bind(branch)
        .bind(status)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    // ---
    // Mutações de estado
    // ---

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: InvoiceStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE invoices SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Fatura {}", id)));
        }
        Ok(())
    }

    // Os itens caem em cascata (FK ON DELETE CASCADE).
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Fatura {}", id)));
        }
        Ok(())
    }

    // ---
    // Pagamentos
    // ---

    pub async fn insert_payment<'e, E>(
        &self,
        executor: E,
        invoice_id: Uuid,
        payment_type_id: Option<Uuid>,
        amount: Decimal,
        notes: Option<&str>,
        created_by: Option<Uuid>,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (invoice_id, payment_type_id, amount, notes, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(invoice_id)
        .bind(payment_type_id)
        .bind(amount)
        .bind(notes)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(payment)
    }

    // Aplica um pagamento ao saldo da fatura em uma única query:
    // paid_amount soma, remaining_balance deriva do grand_total e o
    // status acompanha o saldo. Mantém as invariantes no próprio UPDATE.
    pub async fn apply_payment<'e, E>(
        &self,
        executor: E,
        invoice_id: Uuid,
        amount: Decimal,
    ) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices SET
                paid_amount = paid_amount + $2,
                remaining_balance = grand_total - (paid_amount + $2),
                status = CASE
                    WHEN grand_total - (paid_amount + $2) <= 0 THEN 'PAID'::invoice_status
                    ELSE 'PARTIAL'::invoice_status
                END,
                updated_at = NOW()
            WHERE id = $1 AND status <> 'CANCELLED'
            RETURNING *
            "#,
        )
        .bind(invoice_id)
        .bind(amount)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Fatura {}", invoice_id)))?;

        Ok(invoice)
    }

    // ---
    // Tipos de pagamento
    // ---

    pub async fn list_payment_types(&self) -> Result<Vec<PaymentType>, AppError> {
        let types = sqlx::query_as::<_, PaymentType>(
            "SELECT * FROM payment_types WHERE is_active ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(types)
    }

    pub async fn create_payment_type<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<PaymentType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PaymentType>(
            "INSERT INTO payment_types (name) VALUES ($1) RETURNING *",
        )
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "O tipo de pagamento '{}' já existe.",
                        name
                    ));
                }
            }
            e.into()
        })
    }

    // Renomear ou desativar. Tipos nunca são apagados: pagamentos antigos
    // continuam apontando para eles.
    pub async fn update_payment_type<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        is_active: bool,
    ) -> Result<PaymentType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PaymentType>(
            "UPDATE payment_types SET name = $2, is_active = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "O tipo de pagamento '{}' já existe.",
                        name
                    ));
                }
            }
            e.into()
        })?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Tipo de pagamento {}", id)))
    }
}
