use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct TemplateStore {
    pool: SqlitePool,
}

/// Admin-managed textual content template.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub slug: String,
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// Listing entry without the body.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub slug: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

impl TemplateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all templates, most recently updated first.
    pub async fn list(&self) -> Result<Vec<TemplateSummary>, sqlx::Error> {
        sqlx::query_as(
            "SELECT slug, title, updated_at FROM templates ORDER BY updated_at DESC, slug",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Get a template by slug.
    pub async fn get(&self, slug: &str) -> Result<Option<Template>, sqlx::Error> {
        sqlx::query_as("SELECT slug, title, body, updated_at FROM templates WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
    }

    /// Insert or replace a template.
    pub async fn upsert(&self, slug: &str, title: &str, body: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO templates (slug, title, body, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(slug) DO UPDATE SET
                 title = excluded.title,
                 body = excluded.body,
                 updated_at = excluded.updated_at",
        )
        .bind(slug)
        .bind(title)
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a template by slug. Returns true if a template existed.
    pub async fn delete(&self, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
