//! Transaction data contract shared by the engine, ingest adapters and CLI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The three buckets of the 50/30/20 budgeting rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CategoryType {
    #[serde(rename = "Necesidad")]
    Need,
    #[serde(rename = "Deseo")]
    Want,
    #[serde(rename = "Ahorro")]
    Savings,
}

impl CategoryType {
    /// Target share of monthly income under the 50/30/20 rule, in percent.
    pub fn target_pct(&self) -> f64 {
        match self {
            CategoryType::Need => 50.0,
            CategoryType::Want => 30.0,
            CategoryType::Savings => 20.0,
        }
    }

    /// Spanish label, as shown in statements and persisted data.
    pub fn label(&self) -> &'static str {
        match self {
            CategoryType::Need => "Necesidad",
            CategoryType::Want => "Deseo",
            CategoryType::Savings => "Ahorro",
        }
    }
}

/// Installment schedule of a multi-payment purchase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Installment {
    /// 1-based index of the installment already reached.
    pub current: u32,
    /// Total number of installments in the purchase.
    pub total: u32,
    /// Fixed per-installment payment amount, in whole pesos.
    pub value: i64,
}

impl Installment {
    /// Installments still owed. Negative when the counters are inverted.
    pub fn remaining(&self) -> i64 {
        self.total as i64 - self.current as i64
    }

    /// True when `current > total`. Malformed upstream data is carried, not
    /// rejected; strict callers can check this before trusting balances.
    pub fn is_inverted(&self) -> bool {
        self.current > self.total
    }
}

/// A financial movement imported from a statement or entered manually.
///
/// Immutable once created except for `category` and `sub_category`, which
/// classification actions may reassign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique id assigned at ingestion; never reused.
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    /// Non-negative magnitude in whole pesos.
    pub amount: i64,
    /// `None` = unclassified; excluded from health totals until assigned.
    #[serde(default)]
    pub category: Option<CategoryType>,
    #[serde(default = "default_sub_category")]
    pub sub_category: String,
    /// true = abono (income); false = cargo (expense).
    #[serde(default)]
    pub is_income: bool,
    /// Present iff this movement is one installment of a larger purchase.
    #[serde(default)]
    pub installment: Option<Installment>,
}

pub(crate) fn default_sub_category() -> String {
    "Otros".to_string()
}

impl Transaction {
    /// Create a manually entered transaction.
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        amount: i64,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            description: description.into(),
            amount,
            category: None,
            sub_category: default_sub_category(),
            is_income: false,
            installment: None,
        }
    }

    pub fn is_installment(&self) -> bool {
        self.installment.is_some()
    }

    /// Monthly contribution of this movement: the per-installment value for
    /// installment purchases, the full amount otherwise.
    pub fn contribution(&self) -> i64 {
        match self.installment {
            Some(inst) => inst.value,
            None => self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_contribution_plain() {
        let t = Transaction::new("t-1", date(2023, 11, 1), "Supermercado Jumbo", 85_000);
        assert!(!t.is_installment());
        assert_eq!(t.contribution(), 85_000);
    }

    #[test]
    fn test_contribution_installment() {
        let mut t = Transaction::new("t-2", date(2023, 11, 5), "iPhone 15 Pro", 1_200_000);
        t.installment = Some(Installment {
            current: 3,
            total: 12,
            value: 100_000,
        });
        assert!(t.is_installment());
        assert_eq!(t.contribution(), 100_000);
    }

    #[test]
    fn test_installment_remaining_and_inverted() {
        let inst = Installment {
            current: 3,
            total: 12,
            value: 100_000,
        };
        assert_eq!(inst.remaining(), 9);
        assert!(!inst.is_inverted());

        let bad = Installment {
            current: 14,
            total: 12,
            value: 100_000,
        };
        assert_eq!(bad.remaining(), -2);
        assert!(bad.is_inverted());
    }

    #[test]
    fn test_category_serde_spanish_names() {
        let json = serde_json::to_string(&CategoryType::Need).unwrap();
        assert_eq!(json, "\"Necesidad\"");
        let back: CategoryType = serde_json::from_str("\"Ahorro\"").unwrap();
        assert_eq!(back, CategoryType::Savings);
    }

    #[test]
    fn test_transaction_deserialize_defaults() {
        let json = r#"{
            "id": "1",
            "date": "2023-11-02",
            "description": "Netflix",
            "amount": 9500
        }"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.category, None);
        assert_eq!(t.sub_category, "Otros");
        assert!(!t.is_income);
        assert_eq!(t.installment, None);
    }

    #[test]
    fn test_transaction_round_trip() {
        let mut t = Transaction::new("8", date(2023, 11, 20), "Crédito Consumo Santander", 5_000_000);
        t.category = Some(CategoryType::Need);
        t.sub_category = "Finanzas".to_string();
        t.installment = Some(Installment {
            current: 12,
            total: 48,
            value: 155_000,
        });

        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("subCategory"));
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
