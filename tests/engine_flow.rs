//! End-to-end screening flow over the public API

use cardwatch::config::DetectionConfig;
use cardwatch::directory::obfuscate;
use cardwatch::{
    AuthOutcome, CardProfile, Direction, FraudSignal, Location, RiskEngine, Transaction, TxStatus,
};
use chrono::{NaiveDate, NaiveTime};

const CARD: u64 = 4716391509124420;

fn pune() -> Location {
    Location::new("Pune", "Maharashtra", "India")
}

fn oslo() -> Location {
    Location::new("Oslo", "Oslo", "Norway")
}

fn tx(id: &str, day: u32, (hour, minute): (u32, u32), amount: f64) -> Transaction {
    Transaction::new(
        id.to_string(),
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
        amount,
    )
    .with_location(pune())
}

/// A month of mostly ordinary activity: one night-time purchase abroad,
/// one amount spike, one run of failed payments
fn march_history() -> Vec<Transaction> {
    vec![
        tx("t0", 1, (10, 0), 95.0),
        tx("t1", 2, (11, 0), 105.0),
        tx("t2", 3, (12, 30), 110.0),
        tx("t3", 4, (14, 0), 90.0),
        tx("t4", 5, (9, 30), 100.0),
        tx("t5", 5, (15, 0), 98.0),
        tx("t6", 6, (13, 0), 102.0),
        tx("t7", 7, (3, 0), 130.0).with_location(oslo()),
        tx("t8", 8, (12, 0), 2500.0),
        tx("t9", 9, (12, 0), 60.0).with_status(TxStatus::Failure),
        tx("t10", 9, (14, 0), 62.0).with_status(TxStatus::Failure),
        tx("t11", 10, (9, 0), 64.0).with_status(TxStatus::Failure),
        tx("t12", 11, (10, 0), 101.0),
        tx("t13", 12, (11, 0), 99.0),
        tx("t14", 13, (12, 0), 104.0),
        tx("t15", 14, (13, 0), 96.0),
        tx("t16", 15, (10, 30), 103.0),
    ]
}

fn seeded_engine() -> RiskEngine {
    let mut engine = RiskEngine::new(&DetectionConfig::default());
    let profile = CardProfile::new("Asha Rao".to_string(), CARD, obfuscate("opensesame"))
        .with_home(pune());
    engine.load_profile(profile).unwrap();
    for record in march_history() {
        engine.append_transaction(CARD, record).unwrap();
    }
    engine
}

#[test]
fn test_authentication_and_statistics() {
    let mut engine = seeded_engine();

    assert_eq!(
        engine.authenticate(CARD, "opensesame"),
        AuthOutcome::Authenticated
    );
    assert_eq!(
        engine.authenticate(CARD, "letmein"),
        AuthOutcome::WrongPassword
    );
    assert_eq!(engine.authenticate(42, "opensesame"), AuthOutcome::UnknownCard);

    // Failed payments stay out of the amount statistics
    let stats = engine.compute_statistics(CARD).unwrap();
    assert_eq!(stats.sample_count, 14);
    assert!((stats.mean - 3833.0 / 14.0).abs() < 1e-9);
    assert!(stats.std_dev > 617.0 && stats.std_dev < 618.0);
}

#[test]
fn test_heuristic_alerts_over_history() {
    let mut engine = seeded_engine();
    let alerts = engine.evaluate_heuristics(CARD).unwrap();

    assert_eq!(alerts.len(), 3);

    assert_eq!(alerts[0].transaction_id, "t7");
    assert_eq!(
        alerts[0].signals,
        vec![FraudSignal::OddHour, FraudSignal::LocationAnomaly]
    );

    // The spike also reads as an anomaly: it is the return leg from abroad
    assert_eq!(alerts[1].transaction_id, "t8");
    assert_eq!(
        alerts[1].signals,
        vec![FraudSignal::AmplitudeOutlier, FraudSignal::LocationAnomaly]
    );

    assert_eq!(alerts[2].transaction_id, "t9");
    assert_eq!(alerts[2].signals, vec![FraudSignal::FailureRun]);
}

#[test]
fn test_date_index_queries() {
    let mut engine = seeded_engine();
    engine.build_index(CARD).unwrap();

    let day5 = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    let hits = engine.transactions_on(CARD, day5).unwrap();
    let ids: Vec<&str> = hits.iter().map(|t| t.transaction_id.as_str()).collect();
    assert_eq!(ids, vec!["t4", "t5"]);

    let quiet_day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert!(engine.transactions_on(CARD, quiet_day).unwrap().is_empty());
}

#[test]
fn test_classifier_verdicts() {
    let mut engine = seeded_engine();
    engine.evaluate_heuristics(CARD).unwrap();
    engine.train_classifier(CARD).unwrap();

    let risky = tx("c0", 20, (2, 0), 2400.0)
        .with_location(oslo())
        .with_status(TxStatus::Failure);
    let prediction = engine.score(CARD, &risky).unwrap();
    assert!(prediction.is_fraud());
    assert!(prediction.fraud_probability > 0.9);

    let benign = tx("c1", 20, (11, 0), 100.0);
    let prediction = engine.score(CARD, &benign).unwrap();
    assert!(!prediction.is_fraud());
    assert!(prediction.fraud_probability < 0.1);
}

#[test]
fn test_history_traversal() {
    let engine = seeded_engine();

    let newest_first = engine.history(CARD, Direction::NewestFirst).unwrap();
    assert_eq!(newest_first[0].transaction_id, "t16");

    let oldest_first = engine.history(CARD, Direction::OldestFirst).unwrap();
    assert_eq!(oldest_first[0].transaction_id, "t0");
    assert_eq!(oldest_first.len(), 17);

    let ids: Vec<String> = engine
        .recent(CARD, 3)
        .unwrap()
        .into_iter()
        .map(|t| t.transaction_id)
        .collect();
    assert_eq!(ids, vec!["t16", "t15", "t14"]);
}

#[test]
fn test_location_filter() {
    let engine = seeded_engine();

    let abroad = engine.transactions_at(CARD, &oslo()).unwrap();
    assert_eq!(abroad.len(), 1);
    assert_eq!(abroad[0].transaction_id, "t7");
}
