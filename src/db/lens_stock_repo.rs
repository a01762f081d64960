// src/db/lens_stock_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lens::{LensStock, LensType},
};

#[derive(Clone)]
pub struct LensStockRepository {
    pool: PgPool,
}

impl LensStockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Tipos de lente
    // ---

    pub async fn list_types(&self) -> Result<Vec<LensType>, AppError> {
        let types =
            sqlx::query_as::<_, LensType>("SELECT * FROM lens_types ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(types)
    }

    pub async fn create_type<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
    ) -> Result<LensType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LensType>(
            "INSERT INTO lens_types (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "O tipo de lente '{}' já existe.",
                        name
                    ));
                }
            }
            e.into()
        })
    }

    // ---
    // Grade dioptrica
    // ---

    // A grade inteira de um tipo de lente, ordenada por grau, pronta
    // para o frontend montar a matriz SPH x CYL.
    pub async fn list_grid(&self, lens_type_id: Uuid) -> Result<Vec<LensStock>, AppError> {
        let grid = sqlx::query_as::<_, LensStock>(
            r#"
            SELECT * FROM lens_stocks
            WHERE lens_type_id = $1
            ORDER BY sph ASC, cyl ASC
            "#,
        )
        .bind(lens_type_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(grid)
    }

    // Upsert atômico na célula (tipo, SPH, CYL). É o mesmo padrão
    // ON CONFLICT do estoque de produtos: cria ou sobrescreve o saldo.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert_level<'e, E>(
        &self,
        executor: E,
        lens_type_id: Uuid,
        sph: Decimal,
        cyl: Decimal,
        quantity: i32,
        minimum_stock: i32,
        reorder_point: i32,
    ) -> Result<LensStock, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let level = sqlx::query_as::<_, LensStock>(
            r#"
            INSERT INTO lens_stocks (lens_type_id, sph, cyl, quantity, minimum_stock, reorder_point)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (lens_type_id, sph, cyl)
            DO UPDATE SET
                quantity = EXCLUDED.quantity,
                minimum_stock = EXCLUDED.minimum_stock,
                reorder_point = EXCLUDED.reorder_point,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(lens_type_id)
        .bind(sph)
        .bind(cyl)
        .bind(quantity)
        .bind(minimum_stock)
        .bind(reorder_point)
        .fetch_one(executor)
        .await?;

        Ok(level)
    }

    // Ajuste relativo com guarda contra saldo negativo.
    pub async fn adjust_quantity<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        delta: i32,
    ) -> Result<Option<LensStock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let level = sqlx::query_as::<_, LensStock>(
            r#"
            UPDATE lens_stocks
            SET quantity = quantity + $2, updated_at = NOW()
            WHERE id = $1 AND quantity + $2 >= 0
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;

        Ok(level)
    }

    // Relatório de reposição: células abaixo do mínimo.
    pub async fn list_below_minimum(&self) -> Result<Vec<LensStock>, AppError> {
        let levels = sqlx::query_as::<_, LensStock>(
            r#"
            SELECT * FROM lens_stocks
            WHERE quantity <= minimum_stock
            ORDER BY quantity ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }
}
