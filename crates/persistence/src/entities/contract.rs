//! Generated contract entity (database row mapping).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domain::models::contract::GeneratedContract;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the generated_contracts table.
#[derive(Debug, Clone, FromRow)]
pub struct GeneratedContractEntity {
    pub id: Uuid,
    pub template_id: Uuid,
    pub user_id: Uuid,
    pub placeholder_values: Json<HashMap<String, String>>,
    pub rendered_content: String,
    pub created_at: DateTime<Utc>,
}

impl From<GeneratedContractEntity> for GeneratedContract {
    fn from(entity: GeneratedContractEntity) -> Self {
        Self {
            id: entity.id,
            template_id: entity.template_id,
            user_id: entity.user_id,
            values: entity.placeholder_values.0,
            rendered_content: entity.rendered_content,
            created_at: entity.created_at,
        }
    }
}
