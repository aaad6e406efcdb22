//! Manually tracked entities that grew around the imported transactions:
//! credit operations, fixed monthly subscriptions, savings projects and
//! calendar tasks. All persist in the [`crate::userdata::UserData`]
//! snapshot; balances and quotas are derived on read, never stored.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A consumer credit paid in fixed monthly installments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreditOperation {
    pub id: String,
    pub description: String,
    /// Original amount of the credit, in whole pesos.
    pub total_amount: i64,
    pub total_installments: u32,
    pub monthly_installment: i64,
    pub paid_installments: u32,
}

impl CreditOperation {
    /// Installments still owed. Negative when over-paid counters slip in.
    pub fn remaining_installments(&self) -> i64 {
        self.total_installments as i64 - self.paid_installments as i64
    }

    pub fn pending_balance(&self) -> i64 {
        self.remaining_installments() * self.monthly_installment
    }

    /// Completion ratio in 0..=1 (for progress rendering).
    pub fn progress(&self) -> f64 {
        self.paid_installments as f64 / self.total_installments as f64
    }
}

/// A fixed monthly charge entered by hand (rent, gym, insurance).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySubscriptionEntry {
    pub id: String,
    pub description: String,
    pub monthly_amount: i64,
}

/// A savings goal with a target amount and date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SavingsProject {
    pub id: String,
    pub name: String,
    pub target_amount: i64,
    pub target_date: NaiveDate,
    pub saved_amount: i64,
    pub created_at: NaiveDate,
}

impl SavingsProject {
    /// Pesos still missing to reach the target, floored at zero.
    pub fn remaining_target(&self) -> i64 {
        (self.target_amount - self.saved_amount).max(0)
    }

    /// Contribution needed per month to hit the target on time. The
    /// denominator is floored at one month so past-due targets ask for the
    /// whole remainder now instead of dividing by zero.
    pub fn required_monthly(&self, today: NaiveDate) -> i64 {
        let months = months_between(today, self.target_date).max(1);
        self.remaining_target() / months
    }
}

/// Calendar months from `from` to `to`, ignoring days. Negative when `to`
/// is in an earlier month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskKind {
    #[serde(rename = "pago")]
    Pago,
    #[serde(rename = "recordatorio")]
    Recordatorio,
    #[serde(rename = "otro")]
    Otro,
}

impl TaskKind {
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Pago => "pago",
            TaskKind::Recordatorio => "recordatorio",
            TaskKind::Otro => "otro",
        }
    }
}

/// A dated reminder shown on the dashboard calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarTask {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub completed: bool,
}

impl CalendarTask {
    /// Uncompleted and due today or earlier.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        !self.completed && self.date <= today
    }
}
