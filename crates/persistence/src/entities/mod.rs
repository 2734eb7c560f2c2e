//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod contract;
pub mod invoice;
pub mod template;

pub use contract::GeneratedContractEntity;
pub use invoice::{
    CurrencyDb, InvoiceEntity, InvoiceItemEntity, InvoiceStatusDb, InvoiceTypeDb,
};
pub use template::{ContractTemplateEntity, TemplateCategoryDb};
