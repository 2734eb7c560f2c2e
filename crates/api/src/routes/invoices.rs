//! Invoice routes.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::invoice::{
    CreateInvoiceRequest, Invoice, InvoiceStatus, ListInvoicesResponse, RecordPaymentRequest,
};
use domain::services::invoicing;
use persistence::entities::{InvoiceItemEntity, InvoiceStatusDb};
use persistence::repositories::{InvoiceListFilter, InvoiceRepository, NewInvoice, NewInvoiceItem};
use shared::pagination::{decode_cursor, encode_cursor};

use crate::app::AppState;
use crate::error::ApiError;

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// `overdue` also matches past-due sent invoices that the background
    /// sweep has not persisted yet.
    pub status: Option<InvoiceStatus>,
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

/// Create a new invoice.
///
/// POST /api/v1/invoices
///
/// The invoice number is allocated from the per-year sequence, amounts and
/// due date are derived server-side. `initial_status: sent` is for
/// system-generated invoices (e.g. issued from a completed payment).
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<Invoice>), ApiError> {
    request.validate()?;
    request.validate_consistency()?;

    let amounts = invoicing::compute_amounts(&request.items, request.vat_rate)?;
    let invoice_date = request
        .invoice_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let status = request.initial_status.unwrap_or(InvoiceStatus::Draft);

    let repo = InvoiceRepository::new(state.pool.clone());
    let (invoice, items) = repo
        .create(NewInvoice {
            invoice_type: request.invoice_type.into(),
            status: status.into(),
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            customer_address: request.customer_address,
            customer_vat_id: request.customer_vat_id,
            items: request
                .items
                .into_iter()
                .map(|item| NewInvoiceItem {
                    description: item.description,
                    quantity: item.quantity,
                    unit: item.unit,
                    unit_price: item.unit_price,
                })
                .collect(),
            net_amount: amounts.net_amount,
            vat_rate: request.vat_rate,
            vat_amount: amounts.vat_amount,
            gross_amount: amounts.gross_amount,
            currency: request.currency.into(),
            invoice_date,
            due_date: invoicing::due_date(invoice_date),
            installment_number: request.installment_number,
            total_installments: request.total_installments,
        })
        .await?;

    info!(
        invoice_id = %invoice.id,
        invoice_number = %invoice.invoice_number,
        status = %status,
        gross_amount = %amounts.gross_amount,
        "Invoice created"
    );

    Ok((StatusCode::CREATED, Json(invoice.into_invoice(items))))
}

/// List invoices with keyset pagination, newest first.
///
/// GET /api/v1/invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<ListInvoicesResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.config.limits.default_page_size)
        .clamp(1, state.config.limits.max_page_size);

    let cursor = match query.cursor.as_deref() {
        Some(raw) => Some(decode_cursor(raw)?),
        None => None,
    };

    let repo = InvoiceRepository::new(state.pool.clone());
    // Fetch one extra row to learn whether another page exists.
    let mut entities = repo
        .list(&InvoiceListFilter {
            status: query.status.map(Into::into),
            cursor,
            limit: limit + 1,
        })
        .await?;

    let next_cursor = if entities.len() as i64 > limit {
        entities.truncate(limit as usize);
        entities
            .last()
            .map(|entity| encode_cursor(entity.created_at, entity.id))
    } else {
        None
    };

    let ids: Vec<Uuid> = entities.iter().map(|entity| entity.id).collect();
    let mut items_by_invoice: HashMap<Uuid, Vec<InvoiceItemEntity>> = HashMap::new();
    for item in repo.items_for_invoices(&ids).await? {
        items_by_invoice
            .entry(item.invoice_id)
            .or_default()
            .push(item);
    }

    let today = Utc::now().date_naive();
    let data = entities
        .into_iter()
        .map(|entity| {
            let items = items_by_invoice.remove(&entity.id).unwrap_or_default();
            let mut invoice = entity.into_invoice(items);
            invoice.status = invoice.effective_status(today);
            invoice
        })
        .collect();

    Ok(Json(ListInvoicesResponse { data, next_cursor }))
}

/// Get an invoice by ID.
///
/// GET /api/v1/invoices/:invoice_id
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Invoice>, ApiError> {
    let repo = InvoiceRepository::new(state.pool.clone());

    let entity = repo
        .find_by_id(invoice_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invoice not found".to_string()))?;
    let items = repo.items_for_invoice(invoice_id).await?;

    let mut invoice = entity.into_invoice(items);
    invoice.status = invoice.effective_status(Utc::now().date_naive());

    Ok(Json(invoice))
}

/// Mark a draft invoice as sent.
///
/// POST /api/v1/invoices/:invoice_id/send
pub async fn send_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Invoice>, ApiError> {
    let invoice =
        apply_transition(&state, invoice_id, InvoiceStatus::Sent, None, None, None).await?;

    info!(
        invoice_id = %invoice_id,
        invoice_number = %invoice.invoice_number,
        "Invoice sent"
    );

    Ok(Json(invoice))
}

/// Record a payment on a sent or overdue invoice.
///
/// POST /api/v1/invoices/:invoice_id/payment
pub async fn record_payment(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<Json<Invoice>, ApiError> {
    request.validate()?;

    let paid_at = request.paid_at.unwrap_or_else(Utc::now);
    let invoice = apply_transition(
        &state,
        invoice_id,
        InvoiceStatus::Paid,
        Some(paid_at),
        Some(&request.payment_method),
        request.payment_reference.as_deref(),
    )
    .await?;

    info!(
        invoice_id = %invoice_id,
        invoice_number = %invoice.invoice_number,
        payment_method = %request.payment_method,
        "Invoice paid"
    );

    Ok(Json(invoice))
}

/// Cancel a draft or sent invoice.
///
/// POST /api/v1/invoices/:invoice_id/cancel
pub async fn cancel_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Invoice>, ApiError> {
    let invoice =
        apply_transition(&state, invoice_id, InvoiceStatus::Cancelled, None, None, None).await?;

    info!(
        invoice_id = %invoice_id,
        invoice_number = %invoice.invoice_number,
        "Invoice cancelled"
    );

    Ok(Json(invoice))
}

/// Check the transition against the domain table, then apply it with a
/// status guard in SQL so a concurrent update cannot slip through. No
/// partial state change: a lost race rejects the whole operation.
async fn apply_transition(
    state: &AppState,
    invoice_id: Uuid,
    to: InvoiceStatus,
    paid_at: Option<chrono::DateTime<Utc>>,
    payment_method: Option<&str>,
    payment_reference: Option<&str>,
) -> Result<Invoice, ApiError> {
    let repo = InvoiceRepository::new(state.pool.clone());

    let entity = repo
        .find_by_id(invoice_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invoice not found".to_string()))?;

    let current: InvoiceStatus = entity.status.into();
    current.ensure_transition(to)?;

    let allowed_from: Vec<InvoiceStatusDb> = InvoiceStatus::allowed_sources(to)
        .iter()
        .map(|status| InvoiceStatusDb::from(*status))
        .collect();

    let updated = repo
        .transition_status(
            invoice_id,
            to.into(),
            &allowed_from,
            paid_at,
            payment_method,
            payment_reference,
        )
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("invoice status changed concurrently, retry".to_string())
        })?;

    let items = repo.items_for_invoice(invoice_id).await?;
    Ok(updated.into_invoice(items))
}
