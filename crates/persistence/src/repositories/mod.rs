//! Repository implementations.

pub mod contract;
pub mod invoice;
pub mod template;

pub use contract::ContractRepository;
pub use invoice::{InvoiceListFilter, InvoiceRepository, NewInvoice, NewInvoiceItem};
pub use template::{TemplateRepository, TemplateUpdate};
