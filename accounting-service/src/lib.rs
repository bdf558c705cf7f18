//! Accounting for the school administration backend.
//!
//! Covers the payable and institutional side of the financial subsystem:
//! - Staff payroll with server-computed totals
//! - The general cash ledger (income/expense, including third-party debt)
//! - Daily infaq entries
//! - Academic years with single-active activation
//! - Dashboard analytics over the ledger tables

pub mod academic_year;
pub mod error;
pub mod ledger;
pub mod models;
pub mod payroll;
pub mod reporting;

pub use academic_year::AcademicYearService;
pub use error::{AccountingError, AccountingResult};
pub use ledger::{CashLedgerService, DailyInfaqService};
pub use models::*;
pub use payroll::PayrollService;
pub use reporting::AnalyticsService;
