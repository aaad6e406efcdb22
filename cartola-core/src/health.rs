//! 50/30/20 budget health score.

use serde::Serialize;

use crate::error::EngineError;
use crate::transaction::{CategoryType, Transaction};

/// Per-bucket contribution totals, in whole pesos.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CategoryTotals {
    pub need: i64,
    pub want: i64,
    pub savings: i64,
}

impl CategoryTotals {
    pub fn get(&self, category: CategoryType) -> i64 {
        match category {
            CategoryType::Need => self.need,
            CategoryType::Want => self.want,
            CategoryType::Savings => self.savings,
        }
    }

    fn add(&mut self, category: CategoryType, value: i64) {
        match category {
            CategoryType::Need => self.need += value,
            CategoryType::Want => self.want += value,
            CategoryType::Savings => self.savings += value,
        }
    }

    /// Sum over all three buckets.
    pub fn sum(&self) -> i64 {
        self.need + self.want + self.savings
    }
}

/// Composite 50/30/20 assessment of one month of spending.
///
/// Percentages are not clamped; values above 100 are the caller's problem
/// to render.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetHealth {
    /// 0-100; overspending on Needs weighs twice as hard as on Wants.
    pub score: f64,
    pub totals: CategoryTotals,
    pub need_pct: f64,
    pub want_pct: f64,
}

/// Aggregate categorized transactions into bucket totals and derive the
/// health score. Unclassified transactions are skipped, not an error.
///
/// Permissive by design: `monthly_income <= 0` produces non-finite
/// percentages instead of failing. Use [`try_calculate_health`] to reject
/// that input instead.
pub fn calculate_health(transactions: &[Transaction], monthly_income: i64) -> BudgetHealth {
    let mut totals = CategoryTotals::default();
    for t in transactions {
        if let Some(category) = t.category {
            totals.add(category, t.contribution());
        }
    }

    let income = monthly_income as f64;
    let need_pct = totals.need as f64 / income * 100.0;
    let want_pct = totals.want as f64 / income * 100.0;

    // Linear penalty for exceeding the 50/30 targets; Savings never enters
    // the score.
    let need_diff = (need_pct - 50.0).max(0.0);
    let want_diff = (want_pct - 30.0).max(0.0);
    let score = (100.0 - need_diff * 2.0 - want_diff * 1.5).max(0.0);

    BudgetHealth {
        score,
        totals,
        need_pct,
        want_pct,
    }
}

/// Strict variant: fails on a non-positive income denominator.
pub fn try_calculate_health(
    transactions: &[Transaction],
    monthly_income: i64,
) -> Result<BudgetHealth, EngineError> {
    if monthly_income <= 0 {
        return Err(EngineError::NonPositiveIncome {
            income: monthly_income,
        });
    }
    Ok(calculate_health(transactions, monthly_income))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Installment;
    use chrono::NaiveDate;

    fn txn(id: &str, description: &str, amount: i64, category: Option<CategoryType>) -> Transaction {
        let mut t = Transaction::new(
            id,
            NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(),
            description,
            amount,
        );
        t.category = category;
        t
    }

    #[test]
    fn test_uncategorized_only_scores_perfect() {
        let txns = vec![
            txn("1", "Supermercado Jumbo", 85_000, None),
            txn("2", "Netflix", 9_500, None),
        ];
        let health = calculate_health(&txns, 1_000_000);
        assert_eq!(health.totals, CategoryTotals::default());
        assert_eq!(health.score, 100.0);
    }

    #[test]
    fn test_totals_are_additive() {
        let mut iphone = txn("4", "iPhone 15 Pro", 1_200_000, Some(CategoryType::Want));
        iphone.installment = Some(Installment {
            current: 3,
            total: 12,
            value: 100_000,
        });
        let txns = vec![
            txn("1", "Arriendo Depto", 650_000, Some(CategoryType::Need)),
            txn("2", "Netflix", 9_500, Some(CategoryType::Want)),
            txn("3", "Depósito APV", 120_000, Some(CategoryType::Savings)),
            iphone,
            txn("5", "Sin clasificar", 99_999, None),
        ];
        let health = calculate_health(&txns, 2_000_000);
        // Installments contribute their monthly value, not the full price.
        assert_eq!(health.totals.need, 650_000);
        assert_eq!(health.totals.want, 109_500);
        assert_eq!(health.totals.savings, 120_000);
        assert_eq!(health.totals.sum(), 650_000 + 109_500 + 120_000);
    }

    #[test]
    fn test_reference_scenario() {
        // income 6.137.000, Need 3.500.000, Want 1.200.000
        let txns = vec![
            txn("1", "Arriendo + cuentas", 3_500_000, Some(CategoryType::Need)),
            txn("2", "Restaurantes", 1_200_000, Some(CategoryType::Want)),
        ];
        let health = calculate_health(&txns, 6_137_000);
        assert!((health.need_pct - 57.03).abs() < 0.01, "need_pct = {}", health.need_pct);
        assert!((health.want_pct - 19.55).abs() < 0.01, "want_pct = {}", health.want_pct);
        // Only the Need overshoot is penalized: 100 - 2 * 7.03
        assert!((health.score - 85.94).abs() < 0.01, "score = {}", health.score);
    }

    #[test]
    fn test_no_clamping_above_100_pct() {
        let txns = vec![txn("1", "Arriendo", 1_500_000, Some(CategoryType::Need))];
        let health = calculate_health(&txns, 1_000_000);
        assert!((health.need_pct - 150.0).abs() < f64::EPSILON);
        // 100 - 2 * 100 floors at zero
        assert_eq!(health.score, 0.0);
    }

    #[test]
    fn test_permissive_zero_income_passes_through() {
        let txns = vec![txn("1", "Arriendo", 650_000, Some(CategoryType::Need))];
        let health = calculate_health(&txns, 0);
        assert!(health.need_pct.is_infinite());
        assert_eq!(health.score, 0.0);
    }

    #[test]
    fn test_strict_rejects_non_positive_income() {
        let err = try_calculate_health(&[], 0).unwrap_err();
        assert_eq!(err, EngineError::NonPositiveIncome { income: 0 });
        assert!(try_calculate_health(&[], -5).is_err());
        assert!(try_calculate_health(&[], 1).is_ok());
    }

    #[test]
    fn test_idempotent() {
        let txns = vec![
            txn("1", "Arriendo", 650_000, Some(CategoryType::Need)),
            txn("2", "Netflix", 9_500, Some(CategoryType::Want)),
        ];
        let a = calculate_health(&txns, 6_137_000);
        let b = calculate_health(&txns, 6_137_000);
        assert_eq!(a, b);
    }
}
