//! Contract template domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Business category of a contract template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    FundStructuring,
    Bonds,
    Advisory,
    Other,
}

impl std::fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateCategory::FundStructuring => write!(f, "fund_structuring"),
            TemplateCategory::Bonds => write!(f, "bonds"),
            TemplateCategory::Advisory => write!(f, "advisory"),
            TemplateCategory::Other => write!(f, "other"),
        }
    }
}

/// A contract template with `{{PLACEHOLDER}}` tokens in its content.
///
/// `placeholders` is always derived from `content` (first-occurrence order,
/// duplicates collapsed) and never accepted from clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContractTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: TemplateCategory,
    pub content: String,
    pub placeholders: Vec<String>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new contract template.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,

    pub description: Option<String>,

    pub category: TemplateCategory,

    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,

    /// Administrator creating the template (session identity is resolved
    /// upstream of this service).
    pub created_by: Uuid,
}

/// Request to update an existing template. All fields optional.
///
/// `content` changes are rejected once generated contracts reference the
/// template.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateTemplateRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,

    pub category: Option<TemplateCategory>,

    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: Option<String>,

    pub is_active: Option<bool>,
}

/// Template info for listing (content omitted).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TemplateSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: TemplateCategory,
    pub placeholders: Vec<String>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<ContractTemplate> for TemplateSummary {
    fn from(template: ContractTemplate) -> Self {
        Self {
            id: template.id,
            name: template.name,
            description: template.description,
            category: template.category,
            placeholders: template.placeholders,
            is_active: template.is_active,
            updated_at: template.updated_at,
        }
    }
}

/// Response for listing templates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTemplatesResponse {
    pub data: Vec<TemplateSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_template_request_validation() {
        let valid = CreateTemplateRequest {
            name: "Advisory mandate".to_string(),
            description: None,
            category: TemplateCategory::Advisory,
            content: "Dear {{CLIENT_NAME}}".to_string(),
            created_by: Uuid::new_v4(),
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateTemplateRequest {
            name: String::new(),
            ..valid.clone()
        };
        assert!(empty_name.validate().is_err());

        let empty_content = CreateTemplateRequest {
            content: String::new(),
            ..valid
        };
        assert!(empty_content.validate().is_err());
    }

    #[test]
    fn test_update_template_request_allows_partial() {
        let update = UpdateTemplateRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(update.validate().is_ok());

        let bad_name = UpdateTemplateRequest {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(bad_name.validate().is_err());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(
            TemplateCategory::FundStructuring.to_string(),
            "fund_structuring"
        );
        assert_eq!(TemplateCategory::Bonds.to_string(), "bonds");
        assert_eq!(TemplateCategory::Advisory.to_string(), "advisory");
        assert_eq!(TemplateCategory::Other.to_string(), "other");
    }
}
