//! Contract template entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::template::{ContractTemplate, TemplateCategory};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum that maps to the PostgreSQL `template_category` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "template_category", rename_all = "snake_case")]
pub enum TemplateCategoryDb {
    FundStructuring,
    Bonds,
    Advisory,
    Other,
}

impl From<TemplateCategoryDb> for TemplateCategory {
    fn from(db_category: TemplateCategoryDb) -> Self {
        match db_category {
            TemplateCategoryDb::FundStructuring => TemplateCategory::FundStructuring,
            TemplateCategoryDb::Bonds => TemplateCategory::Bonds,
            TemplateCategoryDb::Advisory => TemplateCategory::Advisory,
            TemplateCategoryDb::Other => TemplateCategory::Other,
        }
    }
}

impl From<TemplateCategory> for TemplateCategoryDb {
    fn from(category: TemplateCategory) -> Self {
        match category {
            TemplateCategory::FundStructuring => TemplateCategoryDb::FundStructuring,
            TemplateCategory::Bonds => TemplateCategoryDb::Bonds,
            TemplateCategory::Advisory => TemplateCategoryDb::Advisory,
            TemplateCategory::Other => TemplateCategoryDb::Other,
        }
    }
}

/// Database row mapping for the contract_templates table.
#[derive(Debug, Clone, FromRow)]
pub struct ContractTemplateEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: TemplateCategoryDb,
    pub content: String,
    pub placeholders: Vec<String>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContractTemplateEntity> for ContractTemplate {
    fn from(entity: ContractTemplateEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            category: entity.category.into(),
            content: entity.content,
            placeholders: entity.placeholders,
            is_active: entity.is_active,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
