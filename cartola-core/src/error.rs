//! Typed failures for the strict engine variants.
//!
//! The permissive calculation paths never fail; degenerate numeric inputs
//! flow through them unchanged. These errors cover the two documented
//! degenerate cases callers may opt into rejecting.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Health percentages divide by the monthly income.
    #[error("monthly income must be positive, got {income}")]
    NonPositiveIncome { income: i64 },

    /// The installment counter runs past the end of its schedule.
    #[error("transaction {id}: installment {current}/{total} is past the end of its schedule")]
    InvertedInstallment {
        id: String,
        current: u32,
        total: u32,
    },
}
