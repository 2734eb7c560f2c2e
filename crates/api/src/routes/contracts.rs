//! Contract generation routes.
//!
//! The generation wizard works in two steps: previews render with whatever
//! values are filled in so far (unresolved tokens pass through and are
//! reported), while the final generation step requires every placeholder to
//! carry a non-empty value and persists the rendered document.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::error::DomainError;
use domain::models::contract::{
    ContractPreview, GenerateContractRequest, GeneratedContract, ListContractsResponse,
    PreviewContractRequest,
};
use domain::services::templating;
use persistence::entities::ContractTemplateEntity;
use persistence::repositories::{ContractRepository, TemplateRepository};

use crate::app::AppState;
use crate::error::ApiError;

/// Query parameters for listing generated contracts.
#[derive(Debug, Deserialize)]
pub struct ListContractsQuery {
    pub user_id: Option<Uuid>,
}

async fn active_template(
    state: &AppState,
    template_id: Uuid,
) -> Result<ContractTemplateEntity, ApiError> {
    let repo = TemplateRepository::new(state.pool.clone());
    let template = repo
        .find_by_id(template_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

    if !template.is_active {
        return Err(DomainError::Conflict("template is not active".to_string()).into());
    }

    Ok(template)
}

/// Render a preview without persisting anything.
///
/// POST /api/v1/contracts/preview
pub async fn preview_contract(
    State(state): State<AppState>,
    Json(request): Json<PreviewContractRequest>,
) -> Result<Json<ContractPreview>, ApiError> {
    request.validate()?;

    let template = active_template(&state, request.template_id).await?;

    let missing = templating::missing_placeholders(&template.content, &request.values);
    let rendered = templating::render(&template.content, &request.values);

    Ok(Json(ContractPreview {
        rendered_content: rendered,
        placeholders: template.placeholders,
        missing_placeholders: missing,
    }))
}

/// Generate and persist a contract.
///
/// POST /api/v1/contracts
///
/// Rejects unknown value keys and incomplete placeholder values; the stored
/// document never contains unresolved tokens.
pub async fn generate_contract(
    State(state): State<AppState>,
    Json(request): Json<GenerateContractRequest>,
) -> Result<(StatusCode, Json<GeneratedContract>), ApiError> {
    request.validate()?;

    let template = active_template(&state, request.template_id).await?;

    let unknown: Vec<&str> = request
        .values
        .keys()
        .filter(|key| !template.placeholders.iter().any(|p| p == *key))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(ApiError::Validation(format!(
            "unknown placeholder keys: {}",
            unknown.join(", ")
        )));
    }

    let missing = templating::missing_placeholders(&template.content, &request.values);
    if !missing.is_empty() {
        return Err(ApiError::Validation(format!(
            "missing values for placeholders: {}",
            missing.join(", ")
        )));
    }

    let rendered = templating::render(&template.content, &request.values);

    let repo = ContractRepository::new(state.pool.clone());
    let contract = repo
        .create(template.id, request.user_id, request.values, &rendered)
        .await?;

    info!(
        contract_id = %contract.id,
        template_id = %template.id,
        user_id = %contract.user_id,
        "Contract generated"
    );

    Ok((StatusCode::CREATED, Json(contract.into())))
}

/// Get a generated contract by ID.
///
/// GET /api/v1/contracts/:contract_id
pub async fn get_contract(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
) -> Result<Json<GeneratedContract>, ApiError> {
    let repo = ContractRepository::new(state.pool.clone());

    let contract = repo
        .find_by_id(contract_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contract not found".to_string()))?;

    Ok(Json(contract.into()))
}

/// List generated contracts, optionally for a single user.
///
/// GET /api/v1/contracts
pub async fn list_contracts(
    State(state): State<AppState>,
    Query(query): Query<ListContractsQuery>,
) -> Result<Json<ListContractsResponse>, ApiError> {
    let repo = ContractRepository::new(state.pool.clone());

    let contracts = repo.list(query.user_id).await?;

    Ok(Json(ListContractsResponse {
        data: contracts.into_iter().map(Into::into).collect(),
    }))
}
