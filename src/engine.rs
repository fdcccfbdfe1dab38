//! Risk engine facade over the directory, store, index and classifier

use chrono::NaiveDate;
use tracing::info;

use crate::classifier::{BayesModel, Prediction};
use crate::config::DetectionConfig;
use crate::directory::{AuthOutcome, CardDirectory, UserAccount};
use crate::error::{Error, Result};
use crate::heuristics;
use crate::index::DateIndex;
use crate::store::AmountStats;
use crate::types::{CardProfile, FraudAlert, FraudSignal, Location, Transaction, TxStatus};

/// Traversal order for full-history reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    OldestFirst,
    NewestFirst,
}

/// Single entry point tying the card directory, per-card histories and
/// the fraud detectors together.
///
/// Derived structures (date index, amount statistics, trained model) are
/// cached per card and dropped whenever the underlying history grows, so
/// a stale snapshot can never answer for records it has not seen.
pub struct RiskEngine {
    directory: CardDirectory,
    reference_country: String,
    amplitude_z: f64,
}

impl RiskEngine {
    pub fn new(detection: &DetectionConfig) -> Self {
        info!(
            reference_country = %detection.reference_country,
            amplitude_z = detection.amplitude_z,
            "risk engine initialized"
        );
        Self {
            directory: CardDirectory::new(),
            reference_country: detection.reference_country.clone(),
            amplitude_z: detection.amplitude_z,
        }
    }

    /// Number of loaded card profiles
    pub fn profile_count(&self) -> usize {
        self.directory.len()
    }

    /// Register a cardholder with an empty history
    pub fn load_profile(&mut self, profile: CardProfile) -> Result<()> {
        self.directory.insert(UserAccount::new(profile))
    }

    /// Check a cleartext secret against a card's stored password
    pub fn authenticate(&self, card_number: u64, secret: &str) -> AuthOutcome {
        self.directory.authenticate(card_number, secret)
    }

    /// Append a record to a card's history
    pub fn append_transaction(&mut self, card_number: u64, tx: Transaction) -> Result<()> {
        let account = self.account_mut(card_number)?;
        account.store.append(tx);
        // Derived structures refer to the previous history and are dropped
        account.index = None;
        account.stats = None;
        account.model = None;
        Ok(())
    }

    /// Build and cache the date index for a card's history
    pub fn build_index(&mut self, card_number: u64) -> Result<()> {
        let account = self.account_mut(card_number)?;
        account.index = Some(DateIndex::build(&account.store)?);
        Ok(())
    }

    /// Compute and cache amount statistics over the card's settled records
    pub fn compute_statistics(&mut self, card_number: u64) -> Result<AmountStats> {
        let account = self.account_mut(card_number)?;
        Ok(ensure_stats(account))
    }

    /// Run the rule heuristics over the card's full history, flagging
    /// matching records and returning their alerts
    pub fn evaluate_heuristics(&mut self, card_number: u64) -> Result<Vec<FraudAlert>> {
        let amplitude_z = self.amplitude_z;
        let account = self.account_mut(card_number)?;
        let stats = ensure_stats(account);
        let alerts =
            heuristics::evaluate(&mut account.store, &stats, &account.profile.home, amplitude_z);
        info!(
            flagged = alerts.len(),
            history = account.store.len(),
            "heuristic evaluation complete"
        );
        Ok(alerts)
    }

    /// All records dated `date`, via the card's date index
    pub fn transactions_on(&self, card_number: u64, date: NaiveDate) -> Result<Vec<Transaction>> {
        let account = self.account(card_number)?;
        let index = account
            .index
            .as_ref()
            .ok_or_else(|| Error::precondition("date index not built for this history"))?;
        Ok(index.transactions_on(date).into_iter().cloned().collect())
    }

    /// All records paid at `location` exactly
    pub fn transactions_at(&self, card_number: u64, location: &Location) -> Result<Vec<Transaction>> {
        let account = self.account(card_number)?;
        Ok(account.store.at_location(location))
    }

    /// The card's last `n` records, newest first
    pub fn recent(&self, card_number: u64, n: usize) -> Result<Vec<Transaction>> {
        let account = self.account(card_number)?;
        Ok(account.store.recent(n))
    }

    /// The card's full history in the requested order
    pub fn history(&self, card_number: u64, direction: Direction) -> Result<Vec<Transaction>> {
        let account = self.account(card_number)?;
        let records = match direction {
            Direction::OldestFirst => account.store.iter().cloned().collect(),
            Direction::NewestFirst => account.store.iter_rev().cloned().collect(),
        };
        Ok(records)
    }

    /// Train and cache the card's classifier from its flagged history
    pub fn train_classifier(&mut self, card_number: u64) -> Result<()> {
        let reference_country = self.reference_country.clone();
        let account = self.account_mut(card_number)?;
        let stats = ensure_stats(account);
        let model = BayesModel::train(&account.store, &stats, &reference_country)?;
        account.model = Some(model);
        Ok(())
    }

    /// Score a candidate record against the card's trained classifier
    pub fn score(&self, card_number: u64, candidate: &Transaction) -> Result<Prediction> {
        let account = self.account(card_number)?;
        let model = account.model.as_ref().ok_or(Error::InsufficientTrainingData)?;
        let stats = account
            .stats
            .as_ref()
            .ok_or_else(|| Error::precondition("statistics not computed for this history"))?;
        Ok(model.score(candidate, stats))
    }

    /// Screen a candidate with the standalone rules when no model exists
    pub fn screen_candidate(
        &self,
        card_number: u64,
        candidate: &Transaction,
    ) -> Result<Vec<FraudSignal>> {
        let account = self.account(card_number)?;
        let stats = account
            .stats
            .as_ref()
            .ok_or_else(|| Error::precondition("statistics not computed for this history"))?;
        Ok(heuristics::screen(candidate, stats, self.amplitude_z))
    }

    fn account(&self, card_number: u64) -> Result<&UserAccount> {
        self.directory
            .lookup(card_number)
            .ok_or(Error::UnknownCard(card_number))
    }

    fn account_mut(&mut self, card_number: u64) -> Result<&mut UserAccount> {
        self.directory
            .lookup_mut(card_number)
            .ok_or(Error::UnknownCard(card_number))
    }
}

/// Return the cached statistics, computing them over settled records first
/// if the cache is cold
fn ensure_stats(account: &mut UserAccount) -> AmountStats {
    match account.stats {
        Some(stats) => stats,
        None => {
            let stats = account
                .store
                .statistics(|tx| tx.status == TxStatus::Success);
            account.stats = Some(stats);
            stats
        }
    }
}
