//! Invoice domain models and the invoice status state machine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::DomainError;

/// Kind of invoice issued by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    Analysis,
    Shop,
    Installment,
    Final,
    CreditNote,
}

impl std::fmt::Display for InvoiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceType::Analysis => write!(f, "analysis"),
            InvoiceType::Shop => write!(f, "shop"),
            InvoiceType::Installment => write!(f, "installment"),
            InvoiceType::Final => write!(f, "final"),
            InvoiceType::CreditNote => write!(f, "credit_note"),
        }
    }
}

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
            InvoiceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl InvoiceStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }

    /// Whether the state machine permits moving from `self` to `to`.
    pub fn can_transition_to(self, to: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, to),
            (Draft, Sent)
                | (Draft, Cancelled)
                | (Sent, Paid)
                | (Sent, Overdue)
                | (Sent, Cancelled)
                | (Overdue, Paid)
        )
    }

    /// Checks a transition, returning the domain error the caller surfaces
    /// as a rejected operation.
    pub fn ensure_transition(self, to: InvoiceStatus) -> Result<(), DomainError> {
        if self.can_transition_to(to) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition { from: self, to })
        }
    }

    /// States from which `to` may be entered.
    ///
    /// Used by the persistence layer to guard status updates in SQL
    /// (`WHERE status = ANY(...)`) so a concurrent transition cannot slip
    /// past the check.
    pub fn allowed_sources(to: InvoiceStatus) -> &'static [InvoiceStatus] {
        use InvoiceStatus::*;
        match to {
            Draft => &[],
            Sent => &[Draft],
            Paid => &[Sent, Overdue],
            Overdue => &[Sent],
            Cancelled => &[Draft, Sent],
        }
    }
}

/// Invoice currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Eur,
    Chf,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Eur => write!(f, "eur"),
            Currency::Chf => write!(f, "chf"),
        }
    }
}

/// A single invoice line.
///
/// Quantities may be fractional (1.5 consulting days) and, for credit
/// notes, negative. The calculator never rejects negative line totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InvoiceItem {
    #[validate(length(min = 1, max = 500, message = "description must be 1-500 characters"))]
    pub description: String,

    pub quantity: Decimal,

    #[validate(length(min = 1, max = 20, message = "unit must be 1-20 characters"))]
    pub unit: String,

    pub unit_price: Decimal,
}

impl InvoiceItem {
    /// Exact line total, no rounding.
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// An invoice as stored and served by the portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invoice {
    pub id: Uuid,
    /// `INV-{year}-{5-digit sequence}`, unique, monotonic within a year.
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub status: InvoiceStatus,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub customer_vat_id: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub net_amount: Decimal,
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub gross_amount: Decimal,
    pub currency: Currency,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub installment_number: Option<i32>,
    pub total_installments: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// A sent invoice whose due date has passed is overdue, whether or not
    /// the background sweep has persisted the status yet.
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Sent && self.due_date < today
    }

    /// Status as it should be displayed and filtered on read paths.
    pub fn effective_status(&self, today: NaiveDate) -> InvoiceStatus {
        if self.is_past_due(today) {
            InvoiceStatus::Overdue
        } else {
            self.status
        }
    }
}

/// Request to create a new invoice.
///
/// The server derives the invoice number, due date and all amounts; clients
/// only supply line items and the VAT rate.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateInvoiceRequest {
    pub invoice_type: InvoiceType,

    #[validate(length(min = 1, max = 200, message = "customer_name must be 1-200 characters"))]
    pub customer_name: String,

    #[validate(email(message = "customer_email must be a valid email address"))]
    pub customer_email: String,

    #[validate(length(min = 1, max = 500, message = "customer_address must be 1-500 characters"))]
    pub customer_address: String,

    pub customer_vat_id: Option<String>,

    #[validate(length(min = 1, message = "at least one item is required"))]
    #[validate(nested)]
    pub items: Vec<InvoiceItem>,

    #[validate(custom(function = "validate_vat_rate"))]
    pub vat_rate: Decimal,

    pub currency: Currency,

    /// Defaults to today when omitted.
    pub invoice_date: Option<NaiveDate>,

    /// `draft` (default) for manually created invoices, `sent` for
    /// system-generated ones (e.g. issued from a completed payment).
    pub initial_status: Option<InvoiceStatus>,

    pub installment_number: Option<i32>,
    pub total_installments: Option<i32>,
}

/// Request to record a payment on a sent or overdue invoice.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RecordPaymentRequest {
    #[validate(length(min = 1, max = 100, message = "payment_method must be 1-100 characters"))]
    pub payment_method: String,

    pub payment_reference: Option<String>,

    /// Defaults to the current time when omitted.
    pub paid_at: Option<DateTime<Utc>>,
}

/// Response for listing invoices with cursor pagination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListInvoicesResponse {
    pub data: Vec<Invoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl CreateInvoiceRequest {
    /// Cross-field rules the derive cannot express: installment fields must
    /// match the invoice type, and the initial status is restricted to
    /// `draft` or `sent`.
    pub fn validate_consistency(&self) -> Result<(), DomainError> {
        match self.invoice_type {
            InvoiceType::Installment => {
                let (number, total) = match (self.installment_number, self.total_installments) {
                    (Some(n), Some(t)) => (n, t),
                    _ => {
                        return Err(DomainError::InvalidInput(
                            "installment invoices require installment_number and total_installments"
                                .to_string(),
                        ))
                    }
                };
                if number < 1 || number > total {
                    return Err(DomainError::InvalidInput(
                        "installment_number must be between 1 and total_installments".to_string(),
                    ));
                }
            }
            _ => {
                if self.installment_number.is_some() || self.total_installments.is_some() {
                    return Err(DomainError::InvalidInput(
                        "installment fields are only valid for installment invoices".to_string(),
                    ));
                }
            }
        }

        if let Some(status) = self.initial_status {
            if !matches!(status, InvoiceStatus::Draft | InvoiceStatus::Sent) {
                return Err(DomainError::InvalidInput(
                    "initial_status must be draft or sent".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn validate_vat_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if *rate < Decimal::ZERO || *rate > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("vat_rate");
        err.message = Some("vat_rate must be between 0 and 100".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;

    fn consulting_item() -> InvoiceItem {
        InvoiceItem {
            description: "Structuring analysis".to_string(),
            quantity: Decimal::ONE,
            unit: "flat".to_string(),
            unit_price: Decimal::new(299_000, 2),
        }
    }

    fn valid_request() -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            invoice_type: InvoiceType::Analysis,
            customer_name: Name().fake(),
            customer_email: SafeEmail().fake(),
            customer_address: "Bahnhofstrasse 1, 8001 Zurich".to_string(),
            customer_vat_id: None,
            items: vec![consulting_item()],
            vat_rate: "7.7".parse().unwrap(),
            currency: Currency::Chf,
            invoice_date: None,
            initial_status: None,
            installment_number: None,
            total_installments: None,
        }
    }

    #[test]
    fn test_valid_request_passes_validation() {
        let request = valid_request();
        assert!(request.validate().is_ok());
        assert!(request.validate_consistency().is_ok());
    }

    #[test]
    fn test_empty_items_rejected() {
        let request = CreateInvoiceRequest {
            items: vec![],
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_vat_rate_out_of_range_rejected() {
        let request = CreateInvoiceRequest {
            vat_rate: "101".parse().unwrap(),
            ..valid_request()
        };
        assert!(request.validate().is_err());

        let negative = CreateInvoiceRequest {
            vat_rate: "-1".parse().unwrap(),
            ..valid_request()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_installment_fields_required_for_installment_type() {
        let missing = CreateInvoiceRequest {
            invoice_type: InvoiceType::Installment,
            ..valid_request()
        };
        assert!(missing.validate_consistency().is_err());

        let valid = CreateInvoiceRequest {
            invoice_type: InvoiceType::Installment,
            installment_number: Some(2),
            total_installments: Some(3),
            ..valid_request()
        };
        assert!(valid.validate_consistency().is_ok());

        let out_of_range = CreateInvoiceRequest {
            invoice_type: InvoiceType::Installment,
            installment_number: Some(4),
            total_installments: Some(3),
            ..valid_request()
        };
        assert!(out_of_range.validate_consistency().is_err());
    }

    #[test]
    fn test_installment_fields_rejected_for_other_types() {
        let request = CreateInvoiceRequest {
            installment_number: Some(1),
            total_installments: Some(2),
            ..valid_request()
        };
        assert!(request.validate_consistency().is_err());
    }

    #[test]
    fn test_initial_status_restricted_to_draft_or_sent() {
        for status in [InvoiceStatus::Draft, InvoiceStatus::Sent] {
            let request = CreateInvoiceRequest {
                initial_status: Some(status),
                ..valid_request()
            };
            assert!(request.validate_consistency().is_ok());
        }

        for status in [
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
            InvoiceStatus::Cancelled,
        ] {
            let request = CreateInvoiceRequest {
                initial_status: Some(status),
                ..valid_request()
            };
            assert!(request.validate_consistency().is_err());
        }
    }

    #[test]
    fn test_allowed_transitions() {
        use InvoiceStatus::*;

        assert!(Draft.can_transition_to(Sent));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Sent.can_transition_to(Paid));
        assert!(Sent.can_transition_to(Overdue));
        assert!(Sent.can_transition_to(Cancelled));
        assert!(Overdue.can_transition_to(Paid));
    }

    #[test]
    fn test_terminal_states_admit_no_transitions() {
        use InvoiceStatus::*;

        for from in [Paid, Cancelled] {
            assert!(from.is_terminal());
            for to in [Draft, Sent, Paid, Overdue, Cancelled] {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn test_paid_to_sent_rejected_with_invalid_transition() {
        let err = InvoiceStatus::Paid
            .ensure_transition(InvoiceStatus::Sent)
            .unwrap_err();
        match err {
            DomainError::InvalidTransition { from, to } => {
                assert_eq!(from, InvoiceStatus::Paid);
                assert_eq!(to, InvoiceStatus::Sent);
            }
            _ => panic!("Expected InvalidTransition error"),
        }
    }

    #[test]
    fn test_allowed_sources_mirror_transition_table() {
        use InvoiceStatus::*;

        for to in [Draft, Sent, Paid, Overdue, Cancelled] {
            for from in [Draft, Sent, Paid, Overdue, Cancelled] {
                let in_sources = InvoiceStatus::allowed_sources(to).contains(&from);
                assert_eq!(in_sources, from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn test_effective_status_computes_overdue_on_read() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let due = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();

        let mut invoice = Invoice {
            id: Uuid::new_v4(),
            invoice_number: "INV-2026-00001".to_string(),
            invoice_type: InvoiceType::Analysis,
            status: InvoiceStatus::Sent,
            customer_name: "Client".to_string(),
            customer_email: "client@example.com".to_string(),
            customer_address: "Address".to_string(),
            customer_vat_id: None,
            items: vec![consulting_item()],
            net_amount: Decimal::new(299_000, 2),
            vat_rate: "7.7".parse().unwrap(),
            vat_amount: Decimal::new(23_023, 2),
            gross_amount: Decimal::new(322_023, 2),
            currency: Currency::Chf,
            invoice_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            due_date: due,
            paid_at: None,
            payment_method: None,
            payment_reference: None,
            installment_number: None,
            total_installments: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(invoice.is_past_due(today));
        assert_eq!(invoice.effective_status(today), InvoiceStatus::Overdue);

        // Not yet due
        assert!(!invoice.is_past_due(due));
        assert_eq!(invoice.effective_status(due), InvoiceStatus::Sent);

        // Draft invoices never show as overdue
        invoice.status = InvoiceStatus::Draft;
        assert!(!invoice.is_past_due(today));
        assert_eq!(invoice.effective_status(today), InvoiceStatus::Draft);
    }
}
