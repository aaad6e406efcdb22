//! cartola-ingest: statement import adapters.
//!
//! Parsers normalize heterogeneous bank exports into [`StatementRecord`]s;
//! [`to_transactions`] turns a parsed batch into core transactions ready
//! for classification.

pub mod parsers;
pub mod types;

pub use parsers::card_text::parse_card_statement_text;
pub use parsers::cartola_csv::{parse_cartola_csv, parse_cartola_text};
pub use types::{StatementKind, StatementRecord};

use cartola_core::{Installment, Transaction};

/// Convert parsed statement records into transactions, assigning batch-
/// scoped ids (`"{batch}-0001"`, ...). New transactions start unclassified
/// with the default "Otros" sub-category.
pub fn to_transactions(records: &[StatementRecord], batch: &str) -> Vec<Transaction> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut t = Transaction::new(
                format!("{batch}-{:04}", i + 1),
                r.date,
                &r.description,
                r.amount,
            );
            t.is_income = r.is_income;
            // The statement shows the monthly charge, which is the
            // per-installment value.
            t.installment = r.installment.map(|(current, total)| Installment {
                current,
                total,
                value: r.amount,
            });
            t
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(description: &str, amount: i64) -> StatementRecord {
        StatementRecord {
            date: NaiveDate::from_ymd_opt(2023, 11, 5).unwrap(),
            description: description.to_string(),
            amount,
            balance: None,
            is_income: false,
            installment: None,
        }
    }

    #[test]
    fn test_batch_scoped_ids() {
        let records = vec![record("JUMBO", 85_000), record("NETFLIX.COM", 9_500)];
        let txns = to_transactions(&records, "cartola-nov");
        assert_eq!(txns[0].id, "cartola-nov-0001");
        assert_eq!(txns[1].id, "cartola-nov-0002");
    }

    #[test]
    fn test_new_transactions_start_unclassified() {
        let txns = to_transactions(&[record("JUMBO", 85_000)], "b");
        assert_eq!(txns[0].category, None);
        assert_eq!(txns[0].sub_category, "Otros");
    }

    #[test]
    fn test_installment_marker_maps_to_schedule() {
        let mut r = record("FALABELLA CUOTA", 100_000);
        r.installment = Some((3, 12));
        let txns = to_transactions(&[r], "card-nov");
        let inst = txns[0].installment.unwrap();
        assert_eq!(inst.current, 3);
        assert_eq!(inst.total, 12);
        assert_eq!(inst.value, 100_000);
        assert_eq!(txns[0].contribution(), 100_000);
    }
}
