// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::settings::MessageTemplate};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_templates(&self) -> Result<Vec<MessageTemplate>, AppError> {
        let templates = sqlx::query_as::<_, MessageTemplate>(
            "SELECT * FROM message_templates ORDER BY key_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(templates)
    }

    // Upsert pela chave: cada template tem uma chave estável
    // (ex: 'glasses_ready') e o conteúdo editável.
    pub async fn upsert_template<'e, E>(
        &self,
        executor: E,
        key_name: &str,
        content: &str,
    ) -> Result<MessageTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, MessageTemplate>(
            r#"
            INSERT INTO message_templates (key_name, content)
            VALUES ($1, $2)
            ON CONFLICT (key_name)
            DO UPDATE SET content = EXCLUDED.content, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(key_name)
        .bind(content)
        .fetch_one(executor)
        .await?;

        Ok(template)
    }
}
