//! Append-only transaction history backed by an index-linked arena

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Location, Transaction};

/// Stable handle to one stored transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHandle(usize);

/// Arena node carrying a record and its chain links
#[derive(Debug)]
struct Node {
    tx: Transaction,
    flagged: bool,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Mean and spread of qualifying transaction amounts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountStats {
    pub mean: f64,
    pub std_dev: f64,
    pub sample_count: usize,
}

impl AmountStats {
    /// Standard score of an amount against these statistics; defined as 0
    /// when the history shows no dispersion
    pub fn zscore(&self, amount: f64) -> f64 {
        if self.std_dev == 0.0 {
            0.0
        } else {
            (amount - self.mean) / self.std_dev
        }
    }
}

/// Chronological per-user transaction history.
///
/// Nodes live in an arena and chain through integer links, so the sequence
/// reads like a doubly linked list without pointer surgery. Append-only;
/// insertion order is the order records were supplied, and the store never
/// reorders. The fraud flag lives on the node, not on the value copies
/// handed out by queries.
#[derive(Debug, Default)]
pub struct TransactionStore {
    nodes: Vec<Node>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl TransactionStore {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no record has been appended
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach a record at the tail
    pub fn append(&mut self, tx: Transaction) -> TxHandle {
        let idx = self.nodes.len();
        self.nodes.push(Node {
            tx,
            flagged: false,
            prev: self.tail,
            next: None,
        });
        if let Some(tail) = self.tail {
            self.nodes[tail].next = Some(idx);
        } else {
            self.head = Some(idx);
        }
        self.tail = Some(idx);
        TxHandle(idx)
    }

    /// Iterate handle/record pairs oldest first
    pub fn entries(&self) -> impl Iterator<Item = (TxHandle, &Transaction)> + '_ {
        std::iter::successors(self.head, move |&idx| self.nodes[idx].next)
            .map(|idx| (TxHandle(idx), &self.nodes[idx].tx))
    }

    /// Iterate records oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> + '_ {
        self.entries().map(|(_, tx)| tx)
    }

    /// Iterate records newest first
    pub fn iter_rev(&self) -> impl Iterator<Item = &Transaction> + '_ {
        std::iter::successors(self.tail, move |&idx| self.nodes[idx].prev)
            .map(|idx| &self.nodes[idx].tx)
    }

    /// Last `n` records, newest first
    pub fn recent(&self, n: usize) -> Vec<Transaction> {
        self.iter_rev().take(n).cloned().collect()
    }

    /// Records paid at `location` exactly, oldest first
    pub fn at_location(&self, location: &Location) -> Vec<Transaction> {
        self.iter()
            .filter(|tx| tx.location == *location)
            .cloned()
            .collect()
    }

    /// Whether a stored record carries the fraud flag
    pub fn is_flagged(&self, handle: TxHandle) -> bool {
        self.nodes[handle.0].flagged
    }

    /// Set or clear the fraud flag on a stored record
    pub fn set_flagged(&mut self, handle: TxHandle, flagged: bool) {
        self.nodes[handle.0].flagged = flagged;
    }

    /// Count of records currently flagged
    pub fn flagged_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.flagged).count()
    }

    /// Mean and population standard deviation of `amount` over records
    /// satisfying `predicate`; both are 0 when nothing qualifies
    pub fn statistics<F>(&self, predicate: F) -> AmountStats
    where
        F: Fn(&Transaction) -> bool,
    {
        let amounts: Vec<f64> = self
            .iter()
            .filter(|tx| predicate(tx))
            .map(|tx| tx.amount)
            .collect();
        let count = amounts.len();
        if count == 0 {
            return AmountStats {
                mean: 0.0,
                std_dev: 0.0,
                sample_count: 0,
            };
        }

        let mean = amounts.iter().sum::<f64>() / count as f64;
        let variance = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / count as f64;
        let stats = AmountStats {
            mean,
            std_dev: variance.sqrt(),
            sample_count: count,
        };
        debug!(
            count,
            mean = stats.mean,
            std_dev = stats.std_dev,
            "amount statistics computed"
        );
        stats
    }
}
