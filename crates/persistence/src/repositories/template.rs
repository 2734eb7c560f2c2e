//! Contract template repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ContractTemplateEntity, TemplateCategoryDb};
use crate::metrics::QueryTimer;

const TEMPLATE_COLUMNS: &str = "id, name, description, category, content, placeholders, \
                                is_active, created_by, created_at, updated_at";

/// Fields changed by a template update. `None` leaves the stored value
/// untouched; `placeholders` must accompany any `content` change.
#[derive(Debug, Clone, Default)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<TemplateCategoryDb>,
    pub content: Option<String>,
    pub placeholders: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Repository for contract template database operations.
#[derive(Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    /// Creates a new TemplateRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new template with its derived placeholder list.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        category: TemplateCategoryDb,
        content: &str,
        placeholders: &[String],
        created_by: Uuid,
    ) -> Result<ContractTemplateEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_template");
        let result = sqlx::query_as::<_, ContractTemplateEntity>(&format!(
            r#"
            INSERT INTO contract_templates (name, description, category, content, placeholders, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TEMPLATE_COLUMNS}
            "#,
        ))
        .bind(name)
        .bind(description)
        .bind(category)
        .bind(content)
        .bind(placeholders)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Get a template by ID.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ContractTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_template_by_id");
        let result = sqlx::query_as::<_, ContractTemplateEntity>(&format!(
            r#"
            SELECT {TEMPLATE_COLUMNS}
            FROM contract_templates
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List templates, optionally filtered by category and active flag.
    pub async fn list(
        &self,
        category: Option<TemplateCategoryDb>,
        active: Option<bool>,
    ) -> Result<Vec<ContractTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_templates");
        let result = sqlx::query_as::<_, ContractTemplateEntity>(&format!(
            r#"
            SELECT {TEMPLATE_COLUMNS}
            FROM contract_templates
            WHERE ($1::template_category IS NULL OR category = $1)
              AND ($2::boolean IS NULL OR is_active = $2)
            ORDER BY name
            "#,
        ))
        .bind(category)
        .bind(active)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply a partial update and return the new row, or `None` when the
    /// template does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        update: TemplateUpdate,
    ) -> Result<Option<ContractTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_template");
        let result = sqlx::query_as::<_, ContractTemplateEntity>(&format!(
            r#"
            UPDATE contract_templates
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                content = COALESCE($5, content),
                placeholders = COALESCE($6, placeholders),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TEMPLATE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.category)
        .bind(update.content)
        .bind(update.placeholders)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Soft-deactivate a template. Returns the number of rows affected.
    pub async fn deactivate(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("deactivate_template");
        let result = sqlx::query(
            r#"
            UPDATE contract_templates
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // Note: TemplateRepository tests require a database connection and are
    // covered by deployment-level tests.
}
