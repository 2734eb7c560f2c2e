//! Generated contract domain models.
//!
//! A generated contract is the persisted outcome of the generation wizard:
//! a template plus a complete set of placeholder values, rendered to text.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A contract rendered from a template for a specific client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GeneratedContract {
    pub id: Uuid,
    pub template_id: Uuid,
    pub user_id: Uuid,
    pub values: HashMap<String, String>,
    pub rendered_content: String,
    pub created_at: DateTime<Utc>,
}

/// Request to generate and persist a contract from a template.
///
/// Every placeholder of the template must carry a non-empty value; unknown
/// keys are rejected.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct GenerateContractRequest {
    pub template_id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub values: HashMap<String, String>,
}

/// Request to preview a render without persisting anything.
///
/// Values may be partial; unresolved tokens stay in the output and are
/// reported back by name.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct PreviewContractRequest {
    pub template_id: Uuid,
    #[serde(default)]
    pub values: HashMap<String, String>,
}

/// Outcome of a preview render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ContractPreview {
    pub rendered_content: String,
    pub placeholders: Vec<String>,
    pub missing_placeholders: Vec<String>,
}

/// Response for listing generated contracts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListContractsResponse {
    pub data: Vec<GeneratedContract>,
}
