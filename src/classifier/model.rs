//! Naive Bayes model trained from a heuristic-labeled history

use serde::Serialize;
use tracing::{debug, info};

use super::features::{
    status_index, AmountBand, DayPeriod, FeatureVector, Region, STATUS_CATEGORIES,
};
use crate::error::{Error, Result};
use crate::store::{AmountStats, TransactionStore};
use crate::types::Transaction;

/// Per-class feature counts
#[derive(Debug, Clone, Default)]
struct ClassCounts {
    amount: [u32; AmountBand::CATEGORIES],
    region: [u32; Region::CATEGORIES],
    period: [u32; DayPeriod::CATEGORIES],
    status: [u32; STATUS_CATEGORIES],
    total: u32,
}

impl ClassCounts {
    fn record(&mut self, features: &FeatureVector) {
        self.amount[features.amount.index()] += 1;
        self.region[features.region.index()] += 1;
        self.period[features.period.index()] += 1;
        self.status[status_index(features.status)] += 1;
        self.total += 1;
    }

    /// Class-conditional likelihood of the vector under add-one smoothing:
    /// each factor is (count + 1) / (total + categories)
    fn likelihood(&self, features: &FeatureVector) -> f64 {
        let total = self.total as f64;
        let amount = (self.amount[features.amount.index()] as f64 + 1.0)
            / (total + AmountBand::CATEGORIES as f64);
        let region = (self.region[features.region.index()] as f64 + 1.0)
            / (total + Region::CATEGORIES as f64);
        let period = (self.period[features.period.index()] as f64 + 1.0)
            / (total + DayPeriod::CATEGORIES as f64);
        let status = (self.status[status_index(features.status)] as f64 + 1.0)
            / (total + STATUS_CATEGORIES as f64);
        amount * region * period * status
    }
}

/// Normalized posterior over the two classes
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Prediction {
    pub fraud_probability: f64,
    pub legit_probability: f64,
}

impl Prediction {
    /// Fraud verdict; a tie reads as legitimate
    pub fn is_fraud(&self) -> bool {
        self.fraud_probability > self.legit_probability
    }
}

/// Two-class Naive Bayes over the categorical features of a history.
///
/// The flag left on each record by a heuristics pass is the training
/// label, so the model learns to generalize whatever the rules caught.
#[derive(Debug, Clone)]
pub struct BayesModel {
    fraud: ClassCounts,
    legit: ClassCounts,
    reference_country: String,
}

impl BayesModel {
    /// Count feature occurrences per class over the whole store.
    ///
    /// Fails when no record is flagged, since a one-class partition gives
    /// the model nothing to contrast against.
    pub fn train(
        store: &TransactionStore,
        stats: &AmountStats,
        reference_country: &str,
    ) -> Result<Self> {
        let mut fraud = ClassCounts::default();
        let mut legit = ClassCounts::default();
        for (handle, tx) in store.entries() {
            let features = FeatureVector::extract(tx, stats, reference_country);
            if store.is_flagged(handle) {
                fraud.record(&features);
            } else {
                legit.record(&features);
            }
        }
        if fraud.total == 0 {
            return Err(Error::InsufficientTrainingData);
        }

        info!(
            flagged = fraud.total,
            unflagged = legit.total,
            "classifier trained"
        );
        Ok(Self {
            fraud,
            legit,
            reference_country: reference_country.to_string(),
        })
    }

    /// Flagged and unflagged record counts seen during training
    pub fn partition_sizes(&self) -> (u32, u32) {
        (self.fraud.total, self.legit.total)
    }

    /// Posterior class probabilities for a candidate record
    pub fn score(&self, tx: &Transaction, stats: &AmountStats) -> Prediction {
        let features = FeatureVector::extract(tx, stats, &self.reference_country);
        let total = (self.fraud.total + self.legit.total) as f64;
        let fraud_mass = self.fraud.total as f64 / total * self.fraud.likelihood(&features);
        let legit_mass = self.legit.total as f64 / total * self.legit.likelihood(&features);

        // Smoothing keeps the flagged class's mass positive, so the
        // normalizer never vanishes
        let norm = fraud_mass + legit_mass;
        let prediction = Prediction {
            fraud_probability: fraud_mass / norm,
            legit_probability: legit_mass / norm,
        };
        debug!(
            transaction_id = %tx.transaction_id,
            fraud_probability = prediction.fraud_probability,
            "candidate scored"
        );
        prediction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, Transaction, TxStatus};
    use chrono::{NaiveDate, NaiveTime};

    fn tx(id: &str, (h, m, s): (u32, u32, u32), amount: f64) -> Transaction {
        Transaction::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveTime::from_hms_opt(h, m, s).unwrap(),
            amount,
        )
        .with_location(Location::new("Pune", "Maharashtra", "India"))
    }

    fn stats() -> AmountStats {
        AmountStats {
            mean: 100.0,
            std_dev: 10.0,
            sample_count: 10,
        }
    }

    #[test]
    fn test_smoothed_likelihood() {
        let mut counts = ClassCounts::default();
        let stats = stats();
        // z-scores 0.5, 1.0 and 2.0: two typical amounts, one elevated
        for (id, amount) in [("a", 105.0), ("b", 110.0), ("c", 120.0)] {
            counts.record(&FeatureVector::extract(&tx(id, (12, 0, 0), amount), &stats, "India"));
        }

        let probe = FeatureVector::extract(&tx("p", (12, 0, 0), 100.0), &stats, "India");
        // amount: (2+1)/(3+3), region: (3+1)/(3+2), period: (3+1)/(3+3),
        // status: (3+1)/(3+2)
        let expected = (3.0 / 6.0) * (4.0 / 5.0) * (4.0 / 6.0) * (4.0 / 5.0);
        assert!((counts.likelihood(&probe) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_train_requires_a_flagged_partition() {
        let mut store = TransactionStore::new();
        store.append(tx("t0", (12, 0, 0), 100.0));
        store.append(tx("t1", (13, 0, 0), 105.0));

        assert!(matches!(
            BayesModel::train(&store, &stats(), "India"),
            Err(Error::InsufficientTrainingData)
        ));
    }

    #[test]
    fn test_posteriors_sum_to_one_and_separate_classes() {
        let mut store = TransactionStore::new();
        for i in 0..3 {
            let handle = store.append(
                tx(&format!("f{i}"), (2, 0, 0), 400.0)
                    .with_location(Location::new("Oslo", "Oslo", "Norway"))
                    .with_status(TxStatus::Failure),
            );
            store.set_flagged(handle, true);
        }
        for i in 0..9 {
            store.append(tx(&format!("l{i}"), (11, 0, 0), 100.0));
        }

        let stats = stats();
        let model = BayesModel::train(&store, &stats, "India").unwrap();
        assert_eq!(model.partition_sizes(), (3, 9));

        let risky = model.score(
            &tx("c0", (3, 0, 0), 390.0)
                .with_location(Location::new("Oslo", "Oslo", "Norway"))
                .with_status(TxStatus::Failure),
            &stats,
        );
        assert!((risky.fraud_probability + risky.legit_probability - 1.0).abs() < 1e-12);
        assert!(risky.is_fraud());

        let benign = model.score(&tx("c1", (11, 0, 0), 101.0), &stats);
        assert!(!benign.is_fraud());
    }

    #[test]
    fn test_all_flagged_history_still_scores() {
        let mut store = TransactionStore::new();
        for i in 0..4 {
            let handle = store.append(tx(&format!("f{i}"), (3, 0, 0), 500.0));
            store.set_flagged(handle, true);
        }

        let stats = stats();
        let model = BayesModel::train(&store, &stats, "India").unwrap();
        let prediction = model.score(&tx("c0", (3, 0, 0), 500.0), &stats);

        // An empty legitimate class has zero prior mass
        assert_eq!(prediction.legit_probability, 0.0);
        assert!(prediction.is_fraud());
    }
}
