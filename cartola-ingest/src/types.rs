use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    BankAccount,
    CreditCard,
}

/// Normalized output of statement parsers (bank-agnostic)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRecord {
    pub date: NaiveDate,
    pub description: String,
    /// Non-negative magnitude in whole pesos.
    pub amount: i64,
    /// Optional running balance (account cartolas usually include one)
    pub balance: Option<i64>,
    /// true = abono (credit/deposit); false = cargo (charge)
    pub is_income: bool,
    /// (current, total) when the row carries a cuota marker like "03/12"
    pub installment: Option<(u32, u32)>,
}
