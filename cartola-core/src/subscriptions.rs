//! Recurring-charge detection.
//!
//! A subscription is inferred retroactively: identical (description, amount)
//! seen at least twice. No cadence is derived from date deltas; the
//! `Monthly` label is an assumption.

use serde::Serialize;
use std::collections::HashMap;

use crate::transaction::Transaction;

/// Minimum occurrences of a (description, amount) pair to qualify.
pub const SUBSCRIPTION_MIN_COUNT: usize = 2;

/// A charge recurring with identical description and amount.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Subscription {
    /// Normalized description, first letter re-capitalized.
    pub description: String,
    pub amount: i64,
    /// Assumed cadence label; always `"Monthly"`.
    pub frequency: String,
    /// How many times the pair occurred.
    pub count: usize,
}

/// Group transactions by lowercased, trimmed description plus exact amount
/// and keep the groups with two or more occurrences.
///
/// A subscription whose price changed across months shows up as separate
/// singleton groups and is therefore *not* detected. Output is in
/// first-seen order.
pub fn detect_subscriptions(transactions: &[Transaction]) -> Vec<Subscription> {
    let mut index: HashMap<(String, i64), usize> = HashMap::new();
    let mut groups: Vec<(String, i64, usize)> = Vec::new();

    for t in transactions {
        let key = (t.description.trim().to_lowercase(), t.amount);
        match index.get(&key) {
            Some(&i) => groups[i].2 += 1,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key.0, key.1, 1));
            }
        }
    }

    groups
        .into_iter()
        .filter(|&(_, _, count)| count >= SUBSCRIPTION_MIN_COUNT)
        .map(|(description, amount, count)| Subscription {
            description: capitalize_first(&description),
            amount,
            frequency: "Monthly".to_string(),
            count,
        })
        .collect()
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
