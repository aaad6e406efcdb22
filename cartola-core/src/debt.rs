//! Debt timelines for installment-bearing purchases.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::error::EngineError;
use crate::transaction::Transaction;

/// Full Spanish month names, indexed by zero-based month.
pub const MONTH_NAMES_LONG: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Remaining schedule of one installment-bearing transaction.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DebtSummary {
    pub description: String,
    pub current_installment: u32,
    pub total_installments: u32,
    pub monthly_value: i64,
    /// May be negative when the counters are inverted; not guarded here.
    pub remaining_balance: i64,
    /// Month the schedule completes, e.g. "agosto de 2024".
    pub end_date: String,
}

/// One summary per installment-bearing transaction, in input order.
///
/// No deduplication: a purchase imported twice produces two rows and is
/// double-counted downstream.
pub fn debt_timeline(transactions: &[Transaction], today: NaiveDate) -> Vec<DebtSummary> {
    transactions
        .iter()
        .filter_map(|t| {
            let inst = t.installment?;
            let remaining = inst.remaining();
            Some(DebtSummary {
                description: t.description.clone(),
                current_installment: inst.current,
                total_installments: inst.total,
                monthly_value: inst.value,
                remaining_balance: remaining * inst.value,
                end_date: format_month_year(add_months(today, remaining)),
            })
        })
        .collect()
}

/// Strict variant: fails on the first installment whose counters are
/// inverted (`current > total`).
pub fn try_debt_timeline(
    transactions: &[Transaction],
    today: NaiveDate,
) -> Result<Vec<DebtSummary>, EngineError> {
    for t in transactions {
        if let Some(inst) = t.installment {
            if inst.is_inverted() {
                return Err(EngineError::InvertedInstallment {
                    id: t.id.clone(),
                    current: inst.current,
                    total: inst.total,
                });
            }
        }
    }
    Ok(debt_timeline(transactions, today))
}

/// Calendar month shift; negative offsets walk backwards. Saturates on the
/// (unreachable in practice) chrono range limits.
fn add_months(date: NaiveDate, months: i64) -> NaiveDate {
    if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
            .unwrap_or(date)
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs() as u32))
            .unwrap_or(date)
    }
}

fn format_month_year(date: NaiveDate) -> String {
    format!(
        "{} de {}",
        MONTH_NAMES_LONG[date.month0() as usize],
        date.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Installment;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn installment_txn(id: &str, description: &str, current: u32, total: u32, value: i64) -> Transaction {
        let mut t = Transaction::new(id, date(2023, 11, 5), description, value * total as i64);
        t.installment = Some(Installment {
            current,
            total,
            value,
        });
        t
    }

    #[test]
    fn test_remaining_balance_and_end_date() {
        let txns = vec![installment_txn("4", "iPhone 15 Pro", 3, 12, 100_000)];
        let debts = debt_timeline(&txns, date(2023, 11, 15));
        assert_eq!(debts.len(), 1);
        let d = &debts[0];
        assert_eq!(d.remaining_balance, 9 * 100_000);
        // 9 months after November 2023
        assert_eq!(d.end_date, "agosto de 2024");
    }

    #[test]
    fn test_non_installments_are_skipped() {
        let txns = vec![
            Transaction::new("1", date(2023, 11, 1), "Supermercado Jumbo", 85_000),
            installment_txn("2", "Seguro Automotriz", 5, 12, 35_000),
        ];
        let debts = debt_timeline(&txns, date(2023, 11, 15));
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0].description, "Seguro Automotriz");
    }

    #[test]
    fn test_duplicate_rows_are_not_merged() {
        let txns = vec![
            installment_txn("a", "iPhone 15 Pro", 3, 12, 100_000),
            installment_txn("b", "iPhone 15 Pro", 3, 12, 100_000),
        ];
        let debts = debt_timeline(&txns, date(2023, 11, 15));
        assert_eq!(debts.len(), 2);
    }

    #[test]
    fn test_inverted_counters_pass_through() {
        let txns = vec![installment_txn("x", "Cuota fantasma", 14, 12, 50_000)];
        let debts = debt_timeline(&txns, date(2024, 3, 10));
        assert_eq!(debts[0].remaining_balance, -100_000);
        // Two months back from March 2024
        assert_eq!(debts[0].end_date, "enero de 2024");
    }

    #[test]
    fn test_strict_rejects_inverted_counters() {
        let txns = vec![installment_txn("x", "Cuota fantasma", 14, 12, 50_000)];
        let err = try_debt_timeline(&txns, date(2024, 3, 10)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvertedInstallment {
                id: "x".to_string(),
                current: 14,
                total: 12,
            }
        );

        let ok = vec![installment_txn("y", "iPhone 15 Pro", 3, 12, 100_000)];
        assert!(try_debt_timeline(&ok, date(2024, 3, 10)).is_ok());
    }

    #[test]
    fn test_year_rollover() {
        let txns = vec![installment_txn("8", "Crédito Consumo Santander", 12, 48, 155_000)];
        let debts = debt_timeline(&txns, date(2023, 11, 20));
        assert_eq!(debts[0].remaining_balance, 36 * 155_000);
        assert_eq!(debts[0].end_date, "noviembre de 2026");
    }
}
