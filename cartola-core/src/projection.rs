//! Forward-looking monthly commitment projections.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::credit::{CreditOperation, MonthlySubscriptionEntry, SavingsProject};
use crate::transaction::{Installment, Transaction};

/// Abbreviated Spanish month names, indexed by zero-based month.
pub const MONTH_NAMES: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

pub const DEFAULT_PROJECTION_MONTHS: usize = 6;

/// Committed outflow for one future month.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectionPoint {
    /// 3-letter Spanish month label.
    pub month: String,
    pub amount: i64,
}

/// Project committed installment payments over the next `months` calendar
/// months, starting at `start`'s month.
///
/// An installment is counted at offset `i` while `current + i <= total`:
/// one payment per calendar month from now until the schedule runs out.
/// Income, variable expenses and manual entries are ignored here; see
/// [`commitment_projection`] for the extended series.
pub fn cash_flow_projection(
    transactions: &[Transaction],
    months: usize,
    start: NaiveDate,
) -> Vec<ProjectionPoint> {
    let installments: Vec<Installment> =
        transactions.iter().filter_map(|t| t.installment).collect();
    let start_month = start.month0() as usize;

    (0..months)
        .map(|i| {
            let amount = installments
                .iter()
                .filter(|inst| inst.current as i64 + i as i64 <= inst.total as i64)
                .map(|inst| inst.value)
                .sum();
            ProjectionPoint {
                month: MONTH_NAMES[(start_month + i) % 12].to_string(),
                amount,
            }
        })
        .collect()
}

/// Extended projection: statement installments plus credit-operation
/// schedules, fixed manual subscriptions and required monthly savings
/// contributions.
pub fn commitment_projection(
    transactions: &[Transaction],
    credits: &[CreditOperation],
    subscriptions: &[MonthlySubscriptionEntry],
    projects: &[SavingsProject],
    months: usize,
    start: NaiveDate,
) -> Vec<ProjectionPoint> {
    let mut points = cash_flow_projection(transactions, months, start);
    let fixed: i64 = subscriptions.iter().map(|s| s.monthly_amount).sum();
    let savings: i64 = projects.iter().map(|p| p.required_monthly(start)).sum();

    for (i, point) in points.iter_mut().enumerate() {
        for credit in credits {
            // Remaining installments decrement one per projected month.
            if (credit.paid_installments as i64 + i as i64) < credit.total_installments as i64 {
                point.amount += credit.monthly_installment;
            }
        }
        point.amount += fixed + savings;
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Installment;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn installment_txn(id: &str, current: u32, total: u32, value: i64) -> Transaction {
        let mut t = Transaction::new(id, date(2023, 11, 5), "compra en cuotas", value * total as i64);
        t.installment = Some(Installment {
            current,
            total,
            value,
        });
        t
    }

    #[test]
    fn test_point_count_matches_horizon() {
        let txns = vec![installment_txn("1", 3, 12, 100_000)];
        assert_eq!(cash_flow_projection(&txns, 6, date(2023, 11, 1)).len(), 6);
        assert_eq!(cash_flow_projection(&txns, 1, date(2023, 11, 1)).len(), 1);
        assert!(cash_flow_projection(&txns, 0, date(2023, 11, 1)).is_empty());
    }

    #[test]
    fn test_schedule_completion_boundary() {
        // 10/12: included while current + i <= total, so offsets 0, 1, 2.
        let txns = vec![installment_txn("1", 10, 12, 70_000)];
        let points = cash_flow_projection(&txns, 6, date(2023, 11, 1));
        let amounts: Vec<i64> = points.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![70_000, 70_000, 70_000, 0, 0, 0]);
    }

    #[test]
    fn test_month_labels_wrap_the_year() {
        let txns = vec![installment_txn("1", 1, 48, 155_000)];
        let points = cash_flow_projection(&txns, 4, date(2023, 11, 20));
        let labels: Vec<&str> = points.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(labels, vec!["Nov", "Dic", "Ene", "Feb"]);
    }

    #[test]
    fn test_multiple_installments_are_summed() {
        let txns = vec![
            installment_txn("1", 3, 12, 100_000),
            installment_txn("2", 5, 12, 35_000),
            Transaction::new("3", date(2023, 11, 1), "Supermercado Jumbo", 85_000),
        ];
        let points = cash_flow_projection(&txns, 6, date(2023, 11, 1));
        assert_eq!(points[0].amount, 135_000);
        // plain transactions never enter the projection
        assert!(points.iter().all(|p| p.amount <= 135_000));
    }

    #[test]
    fn test_commitment_projection_combines_sources() {
        let txns = vec![installment_txn("1", 10, 12, 70_000)];
        let credits = vec![CreditOperation {
            id: "c1".to_string(),
            description: "Crédito consumo".to_string(),
            total_amount: 1_200_000,
            total_installments: 24,
            monthly_installment: 50_000,
            paid_installments: 23,
        }];
        let subs = vec![MonthlySubscriptionEntry {
            id: "s1".to_string(),
            description: "Gimnasio".to_string(),
            monthly_amount: 24_900,
        }];
        let projects = vec![SavingsProject {
            id: "p1".to_string(),
            name: "Viaje".to_string(),
            target_amount: 600_000,
            target_date: date(2024, 5, 1),
            saved_amount: 0,
            created_at: date(2023, 11, 1),
        }];

        let points =
            commitment_projection(&txns, &credits, &subs, &projects, 3, date(2023, 11, 1));
        // savings: 600.000 over 6 months = 100.000 per month
        // credit: one installment left, offset 0 only
        assert_eq!(points[0].amount, 70_000 + 50_000 + 24_900 + 100_000);
        assert_eq!(points[1].amount, 70_000 + 24_900 + 100_000);
        assert_eq!(points[2].amount, 70_000 + 24_900 + 100_000);
    }

    #[test]
    fn test_idempotent() {
        let txns = vec![installment_txn("1", 3, 12, 100_000)];
        let a = cash_flow_projection(&txns, 6, date(2023, 11, 1));
        let b = cash_flow_projection(&txns, 6, date(2023, 11, 1));
        assert_eq!(a, b);
    }
}
