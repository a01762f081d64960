// src/db/customer_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::customer::Customer};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Customer>, AppError> {
        let search_term = search.map(|s| format!("%{}%", s));

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE ($1::text IS NULL OR name ILIKE $1 OR phone ILIKE $1)
            ORDER BY name ASC
            LIMIT 100
            "#,
        )
        .bind(search_term)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    // O upsert da venda: o telefone identifica o cliente. Se já existir,
    // os dados são sobrescritos (última gravação vence).
    pub async fn upsert_by_phone<'e, E>(
        &self,
        executor: E,
        name: &str,
        phone: &str,
        email: Option<&str>,
        birth_date: Option<NaiveDate>,
        address: Option<&str>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, phone, email, birth_date, address)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (phone)
            DO UPDATE SET
                name = EXCLUDED.name,
                email = COALESCE(EXCLUDED.email, customers.email),
                birth_date = COALESCE(EXCLUDED.birth_date, customers.birth_date),
                address = COALESCE(EXCLUDED.address, customers.address),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(birth_date)
        .bind(address)
        .fetch_one(executor)
        .await?;

        Ok(customer)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        phone: &str,
        email: Option<&str>,
        birth_date: Option<NaiveDate>,
        address: Option<&str>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                name = $2, phone = $3, email = $4, birth_date = $5, address = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(birth_date)
        .bind(address)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "O telefone '{}' já pertence a outro cliente.",
                        phone
                    ));
                }
            }
            e.into()
        })?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Cliente {}", id)))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Cliente {}", id)));
        }
        Ok(())
    }

    // Job de recuperação: recria clientes a partir do snapshot gravado
    // nas faturas de uma data. Conflito de telefone é ignorado: o cadastro
    // vivo é mais confiável que o snapshot antigo.
    pub async fn backfill_from_invoices<'e, E>(
        &self,
        executor: E,
        date: NaiveDate,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO customers (name, phone, address)
            SELECT DISTINCT ON (customer_phone)
                customer_name, customer_phone, customer_address
            FROM invoices
            WHERE created_at::date = $1
            ORDER BY customer_phone, created_at DESC
            ON CONFLICT (phone) DO NOTHING
            "#,
        )
        .bind(date)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
