//! Generated contract repository for database operations.

use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::GeneratedContractEntity;
use crate::metrics::QueryTimer;

const CONTRACT_COLUMNS: &str =
    "id, template_id, user_id, placeholder_values, rendered_content, created_at";

/// Repository for generated contract database operations.
#[derive(Clone)]
pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    /// Creates a new ContractRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a rendered contract.
    pub async fn create(
        &self,
        template_id: Uuid,
        user_id: Uuid,
        values: HashMap<String, String>,
        rendered_content: &str,
    ) -> Result<GeneratedContractEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_contract");
        let result = sqlx::query_as::<_, GeneratedContractEntity>(&format!(
            r#"
            INSERT INTO generated_contracts (template_id, user_id, placeholder_values, rendered_content)
            VALUES ($1, $2, $3, $4)
            RETURNING {CONTRACT_COLUMNS}
            "#,
        ))
        .bind(template_id)
        .bind(user_id)
        .bind(Json(values))
        .bind(rendered_content)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Get a generated contract by ID.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<GeneratedContractEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_contract_by_id");
        let result = sqlx::query_as::<_, GeneratedContractEntity>(&format!(
            r#"
            SELECT {CONTRACT_COLUMNS}
            FROM generated_contracts
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List generated contracts, optionally restricted to one user, newest
    /// first.
    pub async fn list(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<Vec<GeneratedContractEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_contracts");
        let result = sqlx::query_as::<_, GeneratedContractEntity>(&format!(
            r#"
            SELECT {CONTRACT_COLUMNS}
            FROM generated_contracts
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Number of generated contracts referencing a template. A non-zero
    /// count locks the template content against edits.
    pub async fn count_for_template(&self, template_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_contracts_for_template");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM generated_contracts
            WHERE template_id = $1
            "#,
        )
        .bind(template_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // Note: ContractRepository tests require a database connection and are
    // covered by deployment-level tests.
}
