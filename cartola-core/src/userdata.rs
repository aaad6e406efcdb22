//! Persisted user snapshot and its schema migration.
//!
//! The engine never touches storage; this is the shape the CLI (and any
//! future sync backend) reads and writes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::credit::{CalendarTask, CreditOperation, MonthlySubscriptionEntry, SavingsProject};
use crate::transaction::Transaction;

pub const USER_DATA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileKind {
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "excel")]
    Excel,
    #[serde(rename = "pdf")]
    Pdf,
}

/// One import batch. Remembers the transactions it created so the whole
/// batch can be removed later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportedFile {
    pub id: String,
    pub name: String,
    pub kind: FileKind,
    pub import_date: NaiveDate,
    pub transaction_count: usize,
    pub transaction_ids: Vec<String>,
}

/// Everything persisted for one user. Every field defaults so payloads
/// written by older builds still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    /// Bumped when the persisted shape changes; [`UserData::migrate`]
    /// upgrades older payloads on load.
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub credit_operations: Vec<CreditOperation>,
    #[serde(default)]
    pub manual_subscriptions: Vec<MonthlySubscriptionEntry>,
    #[serde(default)]
    pub calendar_tasks: Vec<CalendarTask>,
    #[serde(default)]
    pub savings_projects: Vec<SavingsProject>,
    #[serde(default)]
    pub imported_files: Vec<ImportedFile>,
    #[serde(default)]
    pub user_name: String,
}

impl UserData {
    /// Upgrade a payload written by an older build to the current schema.
    pub fn migrate(mut self) -> Self {
        if self.schema_version == 0 {
            // v0 payloads predate explicit sub-categories.
            for t in &mut self.transactions {
                if t.sub_category.trim().is_empty() {
                    t.sub_category = "Otros".to_string();
                }
            }
            self.schema_version = USER_DATA_VERSION;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
            && self.credit_operations.is_empty()
            && self.manual_subscriptions.is_empty()
            && self.calendar_tasks.is_empty()
            && self.savings_projects.is_empty()
            && self.user_name.is_empty()
    }

    /// Remove one import batch and every transaction it created. Returns
    /// the number of transactions removed; 0 when the batch id is unknown.
    pub fn forget_batch(&mut self, batch_id: &str) -> usize {
        let Some(pos) = self.imported_files.iter().position(|f| f.id == batch_id) else {
            return 0;
        };
        let file = self.imported_files.remove(pos);
        let before = self.transactions.len();
        self.transactions
            .retain(|t| !file.transaction_ids.contains(&t.id));
        before - self.transactions.len()
    }

    /// Bulk clear of imported movements and their batch records. Manual
    /// entities (credits, subscriptions, projects, tasks) survive.
    pub fn clear_transactions(&mut self) -> usize {
        let removed = self.transactions.len();
        self.transactions.clear();
        self.imported_files.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch(id: &str, transaction_ids: &[&str]) -> ImportedFile {
        ImportedFile {
            id: id.to_string(),
            name: format!("{id}.csv"),
            kind: FileKind::Csv,
            import_date: date(2023, 11, 15),
            transaction_count: transaction_ids.len(),
            transaction_ids: transaction_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_default_is_empty() {
        assert!(UserData::default().is_empty());
    }

    #[test]
    fn test_legacy_payload_migrates() {
        let json = r#"{
            "transactions": [
                {"id": "1", "date": "2023-11-01", "description": "Jumbo", "amount": 85000, "subCategory": "  "}
            ],
            "userName": "Felipe"
        }"#;
        let data: UserData = serde_json::from_str(json).unwrap();
        assert_eq!(data.schema_version, 0);

        let data = data.migrate();
        assert_eq!(data.schema_version, USER_DATA_VERSION);
        assert_eq!(data.transactions[0].sub_category, "Otros");
        assert_eq!(data.user_name, "Felipe");
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let data = UserData {
            schema_version: USER_DATA_VERSION,
            user_name: "Felipe".to_string(),
            ..UserData::default()
        };
        assert_eq!(data.clone().migrate(), data);
    }

    #[test]
    fn test_forget_batch_removes_only_its_transactions() {
        let mut data = UserData {
            schema_version: USER_DATA_VERSION,
            transactions: vec![
                Transaction::new("a-0001", date(2023, 11, 1), "Jumbo", 85_000),
                Transaction::new("a-0002", date(2023, 11, 2), "Netflix", 9_500),
                Transaction::new("b-0001", date(2023, 11, 3), "Copec", 30_000),
            ],
            imported_files: vec![batch("a", &["a-0001", "a-0002"]), batch("b", &["b-0001"])],
            ..UserData::default()
        };

        assert_eq!(data.forget_batch("a"), 2);
        assert_eq!(data.transactions.len(), 1);
        assert_eq!(data.transactions[0].id, "b-0001");
        assert_eq!(data.imported_files.len(), 1);

        assert_eq!(data.forget_batch("missing"), 0);
    }

    #[test]
    fn test_clear_keeps_manual_entities() {
        let mut data = UserData {
            schema_version: USER_DATA_VERSION,
            transactions: vec![Transaction::new("a-0001", date(2023, 11, 1), "Jumbo", 85_000)],
            imported_files: vec![batch("a", &["a-0001"])],
            manual_subscriptions: vec![MonthlySubscriptionEntry {
                id: "s1".to_string(),
                description: "Gimnasio".to_string(),
                monthly_amount: 24_900,
            }],
            ..UserData::default()
        };

        assert_eq!(data.clear_transactions(), 1);
        assert!(data.transactions.is_empty());
        assert!(data.imported_files.is_empty());
        assert_eq!(data.manual_subscriptions.len(), 1);
    }

    #[test]
    fn test_round_trip_current_schema() {
        let data = UserData {
            schema_version: USER_DATA_VERSION,
            user_name: "Felipe".to_string(),
            ..UserData::default()
        };
        let json = serde_json::to_string_pretty(&data).unwrap();
        assert!(json.contains("schemaVersion"));
        let back: UserData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
