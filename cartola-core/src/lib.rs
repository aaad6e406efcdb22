//! cartola-core: pure calculation engine for the cartola finance dashboard.
//!
//! Every function recomputes its result from its full input on each call;
//! nothing here holds state, performs I/O or depends on input ordering
//! beyond the documented first-seen echoes.

pub mod credit;
pub mod debt;
pub mod error;
pub mod health;
pub mod projection;
pub mod subscriptions;
pub mod summary;
pub mod transaction;
pub mod userdata;

pub use credit::{
    CalendarTask, CreditOperation, MonthlySubscriptionEntry, SavingsProject, TaskKind,
    months_between,
};
pub use debt::{DebtSummary, MONTH_NAMES_LONG, debt_timeline, try_debt_timeline};
pub use error::EngineError;
pub use health::{BudgetHealth, CategoryTotals, calculate_health, try_calculate_health};
pub use projection::{
    DEFAULT_PROJECTION_MONTHS, MONTH_NAMES, ProjectionPoint, cash_flow_projection,
    commitment_projection,
};
pub use subscriptions::{SUBSCRIPTION_MIN_COUNT, Subscription, detect_subscriptions};
pub use summary::{
    CategorySpend, FinanceSnapshot, category_spending, total_debt_balance,
    total_monthly_expenses,
};
pub use transaction::{CategoryType, Installment, Transaction};
pub use userdata::{FileKind, ImportedFile, USER_DATA_VERSION, UserData};
