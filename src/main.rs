//! Card Risk Screening - Main Entry Point
//!
//! Loads cardholder profiles and one card's transaction history, runs the
//! rule heuristics over it, trains the classifier from the flagged records,
//! and screens candidate transactions.

use anyhow::{bail, Context, Result};
use cardwatch::{
    config::AppConfig,
    directory::AuthOutcome,
    engine::RiskEngine,
    metrics::SessionMetrics,
    types::{CardProfile, Location, Transaction, TxStatus},
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// One row of the profiles CSV
#[derive(Debug, Deserialize)]
struct ProfileRow {
    name: String,
    card_number: u64,
    security_code: u16,
    expiry: String,
    password: String,
    city: String,
    state: String,
    country: String,
}

impl ProfileRow {
    fn into_profile(self) -> CardProfile {
        CardProfile::new(self.name, self.card_number, self.password)
            .with_card_details(self.security_code, self.expiry)
            .with_home(Location::new(&self.city, &self.state, &self.country))
    }
}

/// One row of a transactions CSV
#[derive(Debug, Deserialize)]
struct TransactionRow {
    transaction_id: String,
    date: String,
    time: String,
    city: String,
    state: String,
    country: String,
    amount: f64,
    status: TxStatus,
}

impl TransactionRow {
    fn into_transaction(self) -> Result<Transaction> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .with_context(|| format!("bad date in row {}", self.transaction_id))?;
        let time = NaiveTime::parse_from_str(&self.time, "%H:%M:%S")
            .with_context(|| format!("bad time in row {}", self.transaction_id))?;
        Ok(
            Transaction::new(self.transaction_id, date, time, self.amount)
                .with_location(Location::new(&self.city, &self.state, &self.country))
                .with_status(self.status),
        )
    }
}

fn load_profiles(path: &str) -> Result<Vec<CardProfile>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open profiles CSV {path}"))?;
    let mut profiles = Vec::new();
    for row in reader.deserialize() {
        let row: ProfileRow = row.context("Malformed profile row")?;
        profiles.push(row.into_profile());
    }
    Ok(profiles)
}

fn load_transactions(path: &str) -> Result<Vec<Transaction>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open transactions CSV {path}"))?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let row: TransactionRow = row.context("Malformed transaction row")?;
        records.push(row.into_transaction()?);
    }
    Ok(records)
}

fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("cardwatch={}", config.logging.level).parse()?);
    if config.logging.format == "pretty" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }

    info!("Starting screening session");

    // Load cardholder profiles into the directory
    let profiles = load_profiles(&config.data.profiles_path)?;
    if profiles.is_empty() {
        bail!("no profiles in {}", config.data.profiles_path);
    }

    // Session card and secret from the command line
    let args: Vec<String> = std::env::args().collect();
    let card_number = match args.get(1) {
        Some(arg) => arg.parse().context("card number must be numeric")?,
        None => profiles[0].card_number,
    };
    let secret = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| "changeit".to_string());

    let mut engine = RiskEngine::new(&config.detection);
    for profile in profiles {
        if let Err(e) = engine.load_profile(profile) {
            warn!(error = %e, "Skipping profile");
        }
    }
    info!(profiles = engine.profile_count(), "Directory loaded");

    // Authenticate before touching the history
    match engine.authenticate(card_number, &secret) {
        AuthOutcome::Authenticated => info!(card_number, "Cardholder authenticated"),
        AuthOutcome::WrongPassword => bail!("wrong password for card {card_number}"),
        AuthOutcome::UnknownCard => bail!("card {card_number} is not in the directory"),
    }

    let mut metrics = SessionMetrics::new();

    // Ingest the history
    let history = load_transactions(&config.data.history_path)?;
    info!(records = history.len(), "Loading transaction history");
    for tx in history {
        engine.append_transaction(card_number, tx)?;
        metrics.record_ingested();
    }

    engine.build_index(card_number)?;
    let stats = engine.compute_statistics(card_number)?;
    info!(
        mean = format!("{:.2}", stats.mean),
        std_dev = format!("{:.2}", stats.std_dev),
        samples = stats.sample_count,
        "Amount statistics computed"
    );

    // Rule pass over the full history
    let alerts = engine.evaluate_heuristics(card_number)?;
    for alert in &alerts {
        metrics.record_alert(&alert.signals);
        info!(
            transaction_id = %alert.transaction_id,
            date = %alert.date,
            amount = alert.amount,
            explanation = %alert.explanation(),
            "Fraud alert"
        );
    }

    // Activity on the most recent date, via the index
    if let Some(last) = engine.recent(card_number, 1)?.first() {
        let same_day = engine.transactions_on(card_number, last.date)?;
        info!(date = %last.date, count = same_day.len(), "Most recent date activity");
    }

    // Train the classifier from the flagged history
    let trained = match engine.train_classifier(card_number) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Classifier unavailable, falling back to rule screen");
            false
        }
    };

    // Screen the candidates, one verdict line per candidate
    let candidates = load_transactions(&config.data.candidates_path)?;
    info!(
        candidates = candidates.len(),
        "Screening candidate transactions"
    );
    for candidate in candidates {
        if trained {
            let prediction = engine.score(card_number, &candidate)?;
            metrics.record_prediction(prediction.fraud_probability, prediction.is_fraud());
            if prediction.is_fraud() {
                info!(
                    transaction_id = %candidate.transaction_id,
                    fraud_probability = format!("{:.4}", prediction.fraud_probability),
                    "Candidate called fraud"
                );
            } else {
                debug!(
                    transaction_id = %candidate.transaction_id,
                    fraud_probability = format!("{:.4}", prediction.fraud_probability),
                    "Candidate below fraud odds"
                );
            }
            let verdict = if prediction.is_fraud() { "fraud" } else { "legit" };
            println!(
                "{}",
                serde_json::json!({
                    "transaction_id": candidate.transaction_id,
                    "fraud_probability": prediction.fraud_probability,
                    "verdict": verdict,
                })
            );
        } else {
            let signals = engine.screen_candidate(card_number, &candidate)?;
            metrics.record_screen(!signals.is_empty());
            if !signals.is_empty() {
                info!(
                    transaction_id = %candidate.transaction_id,
                    signals = ?signals,
                    "Candidate flagged by rule screen"
                );
            }
            let verdict = if signals.is_empty() { "legit" } else { "suspicious" };
            println!(
                "{}",
                serde_json::json!({
                    "transaction_id": candidate.transaction_id,
                    "signals": signals,
                    "verdict": verdict,
                })
            );
        }
    }

    // Print final summary
    metrics.print_summary();

    Ok(())
}
