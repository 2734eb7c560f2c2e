//! Invoice entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::invoice::{Currency, Invoice, InvoiceItem, InvoiceStatus, InvoiceType};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum that maps to the PostgreSQL `invoice_type` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invoice_type", rename_all = "snake_case")]
pub enum InvoiceTypeDb {
    Analysis,
    Shop,
    Installment,
    Final,
    CreditNote,
}

impl From<InvoiceTypeDb> for InvoiceType {
    fn from(db_type: InvoiceTypeDb) -> Self {
        match db_type {
            InvoiceTypeDb::Analysis => InvoiceType::Analysis,
            InvoiceTypeDb::Shop => InvoiceType::Shop,
            InvoiceTypeDb::Installment => InvoiceType::Installment,
            InvoiceTypeDb::Final => InvoiceType::Final,
            InvoiceTypeDb::CreditNote => InvoiceType::CreditNote,
        }
    }
}

impl From<InvoiceType> for InvoiceTypeDb {
    fn from(invoice_type: InvoiceType) -> Self {
        match invoice_type {
            InvoiceType::Analysis => InvoiceTypeDb::Analysis,
            InvoiceType::Shop => InvoiceTypeDb::Shop,
            InvoiceType::Installment => InvoiceTypeDb::Installment,
            InvoiceType::Final => InvoiceTypeDb::Final,
            InvoiceType::CreditNote => InvoiceTypeDb::CreditNote,
        }
    }
}

/// Database enum that maps to the PostgreSQL `invoice_status` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invoice_status", rename_all = "lowercase")]
pub enum InvoiceStatusDb {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl sqlx::postgres::PgHasArrayType for InvoiceStatusDb {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_invoice_status")
    }
}

impl From<InvoiceStatusDb> for InvoiceStatus {
    fn from(db_status: InvoiceStatusDb) -> Self {
        match db_status {
            InvoiceStatusDb::Draft => InvoiceStatus::Draft,
            InvoiceStatusDb::Sent => InvoiceStatus::Sent,
            InvoiceStatusDb::Paid => InvoiceStatus::Paid,
            InvoiceStatusDb::Overdue => InvoiceStatus::Overdue,
            InvoiceStatusDb::Cancelled => InvoiceStatus::Cancelled,
        }
    }
}

impl From<InvoiceStatus> for InvoiceStatusDb {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => InvoiceStatusDb::Draft,
            InvoiceStatus::Sent => InvoiceStatusDb::Sent,
            InvoiceStatus::Paid => InvoiceStatusDb::Paid,
            InvoiceStatus::Overdue => InvoiceStatusDb::Overdue,
            InvoiceStatus::Cancelled => InvoiceStatusDb::Cancelled,
        }
    }
}

/// Database enum that maps to the PostgreSQL `currency_code` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "currency_code", rename_all = "lowercase")]
pub enum CurrencyDb {
    Eur,
    Chf,
}

impl From<CurrencyDb> for Currency {
    fn from(db_currency: CurrencyDb) -> Self {
        match db_currency {
            CurrencyDb::Eur => Currency::Eur,
            CurrencyDb::Chf => Currency::Chf,
        }
    }
}

impl From<Currency> for CurrencyDb {
    fn from(currency: Currency) -> Self {
        match currency {
            Currency::Eur => CurrencyDb::Eur,
            Currency::Chf => CurrencyDb::Chf,
        }
    }
}

/// Database row mapping for the invoices table (line items live in
/// invoice_items).
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceEntity {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_type: InvoiceTypeDb,
    pub status: InvoiceStatusDb,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub customer_vat_id: Option<String>,
    pub net_amount: Decimal,
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub gross_amount: Decimal,
    pub currency: CurrencyDb,
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

/// Database row mapping for the invoice_items table.
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceItemEntity {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub line_no: i32,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
}

impl From<InvoiceItemEntity> for InvoiceItem {
    fn from(entity: InvoiceItemEntity) -> Self {
        Self {
            description: entity.description,
            quantity: entity.quantity,
            unit: entity.unit,
            unit_price: entity.unit_price,
        }
    }
}

impl InvoiceEntity {
    /// Assembles the domain invoice from the row and its line items
    /// (already ordered by line_no).
    pub fn into_invoice(self, items: Vec<InvoiceItemEntity>) -> Invoice {
        Invoice {
            id: self.id,
            invoice_number: self.invoice_number,
            invoice_type: self.invoice_type.into(),
            status: self.status.into(),
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_address: self.customer_address,
            customer_vat_id: self.customer_vat_id,
            items: items.into_iter().map(Into::into).collect(),
            net_amount: self.net_amount,
            vat_rate: self.vat_rate,
            vat_amount: self.vat_amount,
            gross_amount: self.gross_amount,
            currency: self.currency.into(),
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            paid_at: self.paid_at,
            payment_method: self.payment_method,
            payment_reference: self.payment_reference,
            installment_number: self.installment_number,
            total_installments: self.total_installments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
