//! Contract template routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::error::DomainError;
use domain::models::template::{
    ContractTemplate, CreateTemplateRequest, ListTemplatesResponse, TemplateCategory,
    UpdateTemplateRequest,
};
use domain::services::templating;
use persistence::repositories::{ContractRepository, TemplateRepository, TemplateUpdate};

use crate::app::AppState;
use crate::error::ApiError;

/// Query parameters for listing templates.
#[derive(Debug, Deserialize)]
pub struct ListTemplatesQuery {
    pub category: Option<TemplateCategory>,
    pub active: Option<bool>,
}

/// Placeholder listing for the generation wizard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TemplatePlaceholdersResponse {
    pub template_id: Uuid,
    pub placeholders: Vec<String>,
}

/// Create a new contract template.
///
/// POST /api/v1/templates
///
/// The placeholder list is derived from the content server-side.
pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<ContractTemplate>), ApiError> {
    request.validate()?;

    let placeholders = templating::extract_placeholders(&request.content);
    let repo = TemplateRepository::new(state.pool.clone());

    let template = repo
        .create(
            &request.name,
            request.description.as_deref(),
            request.category.into(),
            &request.content,
            &placeholders,
            request.created_by,
        )
        .await?;

    info!(
        template_id = %template.id,
        category = %request.category,
        placeholder_count = placeholders.len(),
        "Contract template created"
    );

    Ok((StatusCode::CREATED, Json(template.into())))
}

/// List templates, optionally filtered by category and active flag.
///
/// GET /api/v1/templates
pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<ListTemplatesQuery>,
) -> Result<Json<ListTemplatesResponse>, ApiError> {
    let repo = TemplateRepository::new(state.pool.clone());

    let templates = repo
        .list(query.category.map(Into::into), query.active)
        .await?;

    Ok(Json(ListTemplatesResponse {
        data: templates
            .into_iter()
            .map(|entity| ContractTemplate::from(entity).into())
            .collect(),
    }))
}

/// Get a template by ID.
///
/// GET /api/v1/templates/:template_id
pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> Result<Json<ContractTemplate>, ApiError> {
    let repo = TemplateRepository::new(state.pool.clone());

    let template = repo
        .find_by_id(template_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

    Ok(Json(template.into()))
}

/// Get the placeholder names of a template, in first-occurrence order.
///
/// GET /api/v1/templates/:template_id/placeholders
pub async fn get_template_placeholders(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> Result<Json<TemplatePlaceholdersResponse>, ApiError> {
    let repo = TemplateRepository::new(state.pool.clone());

    let template = repo
        .find_by_id(template_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

    Ok(Json(TemplatePlaceholdersResponse {
        template_id: template.id,
        placeholders: template.placeholders,
    }))
}

/// Update a template.
///
/// PATCH /api/v1/templates/:template_id
///
/// Content changes are rejected once generated contracts reference the
/// template; the stored documents must keep matching what they were
/// rendered from.
pub async fn update_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<ContractTemplate>, ApiError> {
    request.validate()?;

    let repo = TemplateRepository::new(state.pool.clone());

    if request.content.is_some() {
        let contract_repo = ContractRepository::new(state.pool.clone());
        let referenced = contract_repo.count_for_template(template_id).await?;
        if referenced > 0 {
            return Err(DomainError::Conflict(format!(
                "template content is referenced by {} generated contracts",
                referenced
            ))
            .into());
        }
    }

    let placeholders = request
        .content
        .as_deref()
        .map(templating::extract_placeholders);

    let update = TemplateUpdate {
        name: request.name,
        description: request.description,
        category: request.category.map(Into::into),
        content: request.content,
        placeholders,
        is_active: request.is_active,
    };

    let template = repo
        .update(template_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

    info!(template_id = %template.id, "Contract template updated");

    Ok(Json(template.into()))
}

/// Deactivate a template (soft delete).
///
/// DELETE /api/v1/templates/:template_id
pub async fn deactivate_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = TemplateRepository::new(state.pool.clone());

    let rows_affected = repo.deactivate(template_id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("Template not found".to_string()));
    }

    info!(template_id = %template_id, "Contract template deactivated");

    Ok(StatusCode::NO_CONTENT)
}
