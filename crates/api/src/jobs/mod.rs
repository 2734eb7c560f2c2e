//! Background jobs.

pub mod overdue_invoices;

pub use overdue_invoices::OverdueSweepJob;
