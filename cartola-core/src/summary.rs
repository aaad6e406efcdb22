//! Dashboard aggregates and the read-only snapshot handed to the
//! presentation and chat layers.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::debt::{DebtSummary, debt_timeline};
use crate::health::{BudgetHealth, calculate_health};
use crate::projection::{DEFAULT_PROJECTION_MONTHS, ProjectionPoint, cash_flow_projection};
use crate::subscriptions::{Subscription, detect_subscriptions};
use crate::transaction::Transaction;

/// Contribution total for one sub-category.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategorySpend {
    pub name: String,
    pub value: i64,
}

/// Sum of monthly contribution values over all transactions.
pub fn total_monthly_expenses(transactions: &[Transaction]) -> i64 {
    transactions.iter().map(|t| t.contribution()).sum()
}

/// Sum of remaining balances over a debt timeline.
pub fn total_debt_balance(debts: &[DebtSummary]) -> i64 {
    debts.iter().map(|d| d.remaining_balance).sum()
}

/// Contribution totals grouped by sub-category, largest first. Ties break
/// alphabetically so the order is deterministic.
pub fn category_spending(transactions: &[Transaction]) -> Vec<CategorySpend> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CategorySpend> = Vec::new();

    for t in transactions {
        match index.get(t.sub_category.as_str()) {
            Some(&i) => out[i].value += t.contribution(),
            None => {
                index.insert(t.sub_category.as_str(), out.len());
                out.push(CategorySpend {
                    name: t.sub_category.clone(),
                    value: t.contribution(),
                });
            }
        }
    }

    out.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    out
}

/// Every derived entity the dashboard and the chat assistant read,
/// recomputed in full from the current transaction list.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSnapshot {
    pub monthly_income: i64,
    pub health: BudgetHealth,
    pub subscriptions: Vec<Subscription>,
    pub debts: Vec<DebtSummary>,
    pub projection: Vec<ProjectionPoint>,
    pub total_monthly_expenses: i64,
    pub total_debt_balance: i64,
    pub category_spending: Vec<CategorySpend>,
}

impl FinanceSnapshot {
    pub fn compute(transactions: &[Transaction], monthly_income: i64, today: NaiveDate) -> Self {
        let debts = debt_timeline(transactions, today);
        let total_debt = total_debt_balance(&debts);
        Self {
            monthly_income,
            health: calculate_health(transactions, monthly_income),
            subscriptions: detect_subscriptions(transactions),
            projection: cash_flow_projection(transactions, DEFAULT_PROJECTION_MONTHS, today),
            total_monthly_expenses: total_monthly_expenses(transactions),
            total_debt_balance: total_debt,
            category_spending: category_spending(transactions),
            debts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{CategoryType, Installment};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_transactions() -> Vec<Transaction> {
        let mut arriendo = Transaction::new("6", date(2023, 11, 12), "Arriendo Depto", 650_000);
        arriendo.category = Some(CategoryType::Need);
        arriendo.sub_category = "Vivienda".to_string();

        let mut netflix = Transaction::new("2", date(2023, 11, 2), "Netflix", 9_500);
        netflix.category = Some(CategoryType::Want);
        netflix.sub_category = "Entretenimiento".to_string();

        let mut netflix_oct = Transaction::new("9", date(2023, 10, 2), "Netflix", 9_500);
        netflix_oct.category = Some(CategoryType::Want);
        netflix_oct.sub_category = "Entretenimiento".to_string();

        let mut iphone = Transaction::new("4", date(2023, 11, 5), "iPhone 15 Pro", 1_200_000);
        iphone.category = Some(CategoryType::Want);
        iphone.sub_category = "Tecnología".to_string();
        iphone.installment = Some(Installment {
            current: 3,
            total: 12,
            value: 100_000,
        });

        vec![arriendo, netflix, netflix_oct, iphone]
    }

    #[test]
    fn test_total_monthly_expenses_uses_contributions() {
        let txns = sample_transactions();
        // 650.000 + 9.500 + 9.500 + 100.000 (installment value, not price)
        assert_eq!(total_monthly_expenses(&txns), 769_000);
    }

    #[test]
    fn test_category_spending_sorted_desc() {
        let txns = sample_transactions();
        let spending = category_spending(&txns);
        let names: Vec<&str> = spending.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Vivienda", "Tecnología", "Entretenimiento"]);
        assert_eq!(spending[2].value, 19_000);
    }

    #[test]
    fn test_snapshot_is_consistent() {
        let txns = sample_transactions();
        let snapshot = FinanceSnapshot::compute(&txns, 6_137_000, date(2023, 11, 15));

        assert_eq!(snapshot.projection.len(), DEFAULT_PROJECTION_MONTHS);
        assert_eq!(snapshot.subscriptions.len(), 1);
        assert_eq!(snapshot.debts.len(), 1);
        assert_eq!(snapshot.total_debt_balance, 900_000);
        assert_eq!(
            snapshot.total_monthly_expenses,
            total_monthly_expenses(&txns)
        );
    }

    #[test]
    fn test_snapshot_idempotent() {
        let txns = sample_transactions();
        let a = FinanceSnapshot::compute(&txns, 6_137_000, date(2023, 11, 15));
        let b = FinanceSnapshot::compute(&txns, 6_137_000, date(2023, 11, 15));
        assert_eq!(a, b);
    }
}
