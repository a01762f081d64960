// src/db/product_repo.rs

use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::product::Product};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras
    // ---

    pub async fn list(
        &self,
        search: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Product>, AppError> {
        // Filtros opcionais resolvidos no SQL: NULL desliga o filtro.
        let search_term = search.map(|s| format!("%{}%", s));

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 OR brand ILIKE $1)
              AND ($2::text IS NULL OR category = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(search_term)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    // Produtos rastreados cujo saldo chegou ao limite de alerta.
    pub async fn list_low_stock(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE track_inventory AND stock_qty <= low_stock_alert
            ORDER BY stock_qty ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    // ---
    // Escritas
    // ---

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        brand: Option<&str>,
        category: &str,
        store_price: Decimal,
        online_price: Option<Decimal>,
        buy_price: Option<Decimal>,
        sell_price: Option<Decimal>,
        stock_qty: i32,
        track_inventory: bool,
        low_stock_alert: i32,
        metadata: &Value,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, brand, category,
                store_price, online_price, buy_price, sell_price,
                stock_qty, track_inventory, low_stock_alert, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(brand)
        .bind(category)
        .bind(store_price)
        .bind(online_price)
        .bind(buy_price)
        .bind(sell_price)
        .bind(stock_qty)
        .bind(track_inventory)
        .bind(low_stock_alert)
        .bind(metadata)
        .fetch_one(executor)
        .await?;

        Ok(product)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        brand: Option<&str>,
        category: &str,
        store_price: Decimal,
        online_price: Option<Decimal>,
        buy_price: Option<Decimal>,
        sell_price: Option<Decimal>,
        track_inventory: bool,
        low_stock_alert: i32,
        metadata: &Value,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = $2, brand = $3, category = $4,
                store_price = $5, online_price = $6, buy_price = $7, sell_price = $8,
                track_inventory = $9, low_stock_alert = $10, metadata = $11,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(brand)
        .bind(category)
        .bind(store_price)
        .bind(online_price)
        .bind(buy_price)
        .bind(sell_price)
        .bind(track_inventory)
        .bind(low_stock_alert)
        .bind(metadata)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Produto {}", id)))?;

        Ok(product)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Produto {}", id)));
        }
        Ok(())
    }

    // Trava a linha do produto para a validação de estoque dentro da
    // transação da venda (ninguém mais mexe no saldo até o commit).
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(product)
    }

    // Ajuste de saldo (positivo ou negativo). A cláusula de guarda impede
    // saldo negativo no banco, mesmo em corrida.
    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        delta: i32,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock_qty = stock_qty + $2, updated_at = NOW()
            WHERE id = $1 AND stock_qty + $2 >= 0
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;

        Ok(product)
    }
}
