//! Date-keyed search index built once from a transaction history

use std::cmp::Ordering;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::TransactionStore;
use crate::types::Transaction;

#[derive(Debug)]
struct IndexNode {
    tx: Transaction,
    left: Option<Box<IndexNode>>,
    right: Option<Box<IndexNode>>,
}

/// Balanced binary search tree over transaction dates.
///
/// Built in one pass from a history whose records already sit in ascending
/// date order; the midpoint split keeps the tree height logarithmic. The
/// index is a snapshot: records appended after the build are not visible
/// until it is rebuilt.
#[derive(Debug)]
pub struct DateIndex {
    root: Option<Box<IndexNode>>,
    len: usize,
}

impl DateIndex {
    /// Build an index over the store's records.
    ///
    /// Fails when the history is empty or its dates are not in ascending
    /// order, since the midpoint construction relies on sorted input.
    pub fn build(store: &TransactionStore) -> Result<Self> {
        let records: Vec<Transaction> = store.iter().cloned().collect();
        if records.is_empty() {
            return Err(Error::precondition("cannot index an empty history"));
        }
        if records.windows(2).any(|w| w[0].date > w[1].date) {
            return Err(Error::precondition("history is not in ascending date order"));
        }

        let len = records.len();
        let root = build_subtree(&records);
        debug!(records = len, "date index built");
        Ok(Self { root, len })
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the index holds no records
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All records dated exactly `date`, in their original insertion order
    pub fn transactions_on(&self, date: NaiveDate) -> Vec<&Transaction> {
        let mut hits = Vec::new();
        collect_on(self.root.as_deref(), date, &mut hits);
        hits
    }

    /// All indexed records in ascending date order
    pub fn in_order(&self) -> Vec<&Transaction> {
        let mut out = Vec::with_capacity(self.len);
        walk_in_order(self.root.as_deref(), &mut out);
        out
    }
}

fn build_subtree(records: &[Transaction]) -> Option<Box<IndexNode>> {
    if records.is_empty() {
        return None;
    }
    let mid = records.len() / 2;
    Some(Box::new(IndexNode {
        tx: records[mid].clone(),
        left: build_subtree(&records[..mid]),
        right: build_subtree(&records[mid + 1..]),
    }))
}

fn collect_on<'a>(node: Option<&'a IndexNode>, date: NaiveDate, hits: &mut Vec<&'a Transaction>) {
    let node = match node {
        Some(node) => node,
        None => return,
    };
    match date.cmp(&node.tx.date) {
        Ordering::Less => collect_on(node.left.as_deref(), date, hits),
        Ordering::Greater => collect_on(node.right.as_deref(), date, hits),
        Ordering::Equal => {
            // Duplicates of the key can sit on either side; emit them as an
            // in-order run
            collect_on(node.left.as_deref(), date, hits);
            hits.push(&node.tx);
            collect_on(node.right.as_deref(), date, hits);
        }
    }
}

fn walk_in_order<'a>(node: Option<&'a IndexNode>, out: &mut Vec<&'a Transaction>) {
    if let Some(node) = node {
        walk_in_order(node.left.as_deref(), out);
        out.push(&node.tx);
        walk_in_order(node.right.as_deref(), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn tx_on(id: &str, (y, m, d): (i32, u32, u32), amount: f64) -> Transaction {
        Transaction::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            amount,
        )
    }

    fn store_of(records: Vec<Transaction>) -> TransactionStore {
        let mut store = TransactionStore::new();
        for tx in records {
            store.append(tx);
        }
        store
    }

    fn height(node: Option<&IndexNode>) -> usize {
        match node {
            Some(node) => {
                1 + height(node.left.as_deref()).max(height(node.right.as_deref()))
            }
            None => 0,
        }
    }

    #[test]
    fn test_in_order_reproduces_input() {
        let store = store_of(vec![
            tx_on("t0", (2024, 1, 3), 10.0),
            tx_on("t1", (2024, 1, 7), 20.0),
            tx_on("t2", (2024, 1, 11), 30.0),
            tx_on("t3", (2024, 1, 15), 40.0),
            tx_on("t4", (2024, 1, 20), 50.0),
        ]);
        let index = DateIndex::build(&store).unwrap();

        let ids: Vec<&str> = index
            .in_order()
            .into_iter()
            .map(|t| t.transaction_id.as_str())
            .collect();
        assert_eq!(ids, vec!["t0", "t1", "t2", "t3", "t4"]);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_midpoint_build_stays_balanced() {
        let records: Vec<Transaction> = (1..=31)
            .map(|d| tx_on(&format!("t{d}"), (2024, 1, d), d as f64))
            .collect();
        let index = DateIndex::build(&store_of(records)).unwrap();

        // 31 records fill a perfect tree of height 5
        assert_eq!(height(index.root.as_deref()), 5);
    }

    #[test]
    fn test_lookup_returns_all_records_for_a_date() {
        let store = store_of(vec![
            tx_on("t0", (2024, 1, 1), 10.0),
            tx_on("t1", (2024, 1, 1), 20.0),
            tx_on("t2", (2024, 1, 2), 5.0),
        ]);
        let index = DateIndex::build(&store).unwrap();

        let amounts: Vec<f64> = index
            .transactions_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .into_iter()
            .map(|t| t.amount)
            .collect();
        assert_eq!(amounts, vec![10.0, 20.0]);
    }

    #[test]
    fn test_lookup_misses_return_empty() {
        let store = store_of(vec![tx_on("t0", (2024, 1, 1), 10.0)]);
        let index = DateIndex::build(&store).unwrap();

        let hits = index.transactions_on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!(hits.is_empty());
    }

    #[test]
    fn test_build_rejects_unsorted_history() {
        let store = store_of(vec![
            tx_on("t0", (2024, 1, 5), 10.0),
            tx_on("t1", (2024, 1, 2), 20.0),
        ]);
        assert!(matches!(
            DateIndex::build(&store),
            Err(Error::PreconditionViolated(_))
        ));
    }

    #[test]
    fn test_build_rejects_empty_history() {
        let store = TransactionStore::new();
        assert!(matches!(
            DateIndex::build(&store),
            Err(Error::PreconditionViolated(_))
        ));
    }
}
