//! Billing service for the school administration backend.
//!
//! Covers the receivable side of the financial subsystem:
//! - Bill issuance per student (SPP and other bill types)
//! - Listing by unit, by student, and by a parent's children
//! - Payment recording with the fully-settling status transition
//! - Best-effort notifications to the student and linked parent
//!
//! Recording a payment always marks the referenced bill `Paid`, whatever
//! the amount. That mirrors how manual settlements are entered at the
//! front desk; partial-payment accumulation is an open product question
//! and is deliberately not implemented here.

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{BillingError, BillingResult};
pub use models::*;
pub use repository::{BillingStore, InMemoryBillingStore, PgBillingRepository};
pub use service::BillingService;
