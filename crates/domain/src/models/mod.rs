//! Domain models for the Client Portal.

pub mod contract;
pub mod invoice;
pub mod template;

pub use contract::GeneratedContract;
pub use invoice::Invoice;
pub use template::ContractTemplate;
