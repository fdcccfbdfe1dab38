//! Rule-based fraud signals evaluated over a transaction history

use chrono::Timelike;
use tracing::debug;

use crate::store::{AmountStats, TransactionStore};
use crate::types::{FraudAlert, FraudSignal, Location, Transaction, TxStatus};

/// Default standard-score magnitude treated as an amount outlier
pub const AMPLITUDE_Z: f64 = 3.0;
/// First hour of the day considered normal activity
pub const DAY_START_HOUR: u32 = 6;
/// Last hour of the day considered normal activity
pub const DAY_END_HOUR: u32 = 22;
/// Consecutive failures that make a failure run
pub const FAILURE_RUN_LEN: usize = 3;
/// Same-day gap in seconds under which two records count as a burst pair
pub const BURST_GAP_SECS: i64 = 300;
/// Consecutive burst pairs that make a burst
pub const BURST_RUN_LEN: usize = 3;

/// Whether the amount sits `threshold` or more standard deviations from
/// the history mean, in either direction
pub fn amplitude_outlier(tx: &Transaction, stats: &AmountStats, threshold: f64) -> bool {
    stats.zscore(tx.amount).abs() >= threshold
}

/// Whether the record falls outside normal daytime hours
pub fn odd_hour(tx: &Transaction) -> bool {
    let hour = tx.time.hour();
    hour < DAY_START_HOUR || hour > DAY_END_HOUR
}

fn failure_run(seq: &[Transaction], pos: usize) -> bool {
    seq[pos..]
        .iter()
        .take_while(|tx| tx.status == TxStatus::Failure)
        .count()
        >= FAILURE_RUN_LEN
}

/// A burst is a run of same-date records whose seconds-of-day gaps stay
/// under the threshold. The gap is a signed difference, so a later record
/// stamped earlier in the day still counts as part of the burst.
fn burst(seq: &[Transaction], pos: usize) -> bool {
    let mut pairs = 0;
    for pair in seq[pos..].windows(2) {
        let gap = pair[1].time.num_seconds_from_midnight() as i64
            - pair[0].time.num_seconds_from_midnight() as i64;
        if pair[0].date == pair[1].date && gap < BURST_GAP_SECS {
            pairs += 1;
        } else {
            break;
        }
    }
    pairs >= BURST_RUN_LEN
}

fn location_anomaly(tx: &Transaction, prev: Option<&Transaction>, home: &Location) -> bool {
    let prev = match prev {
        Some(prev) => prev,
        // The first record has nothing to break continuity with
        None => return false,
    };
    let same_country =
        tx.location.country == prev.location.country && prev.location.country == home.country;
    let same_state =
        tx.location.state == prev.location.state && prev.location.state == home.state;
    !(same_country || same_state)
}

/// Run every rule over the full history, flag matching records in the
/// store and return one alert per flagged record
pub fn evaluate(
    store: &mut TransactionStore,
    stats: &AmountStats,
    home: &Location,
    amplitude_z: f64,
) -> Vec<FraudAlert> {
    let (handles, seq): (Vec<_>, Vec<_>) =
        store.entries().map(|(h, tx)| (h, tx.clone())).unzip();

    let mut alerts = Vec::new();
    for (pos, tx) in seq.iter().enumerate() {
        let mut signals = Vec::new();
        if amplitude_outlier(tx, stats, amplitude_z) {
            signals.push(FraudSignal::AmplitudeOutlier);
        }
        if odd_hour(tx) {
            signals.push(FraudSignal::OddHour);
        }
        if failure_run(&seq, pos) {
            signals.push(FraudSignal::FailureRun);
        }
        if burst(&seq, pos) {
            signals.push(FraudSignal::BurstFrequency);
        }
        let prev = pos.checked_sub(1).map(|p| &seq[p]);
        if location_anomaly(tx, prev, home) {
            signals.push(FraudSignal::LocationAnomaly);
        }

        // Re-evaluation clears flags left by an earlier pass
        store.set_flagged(handles[pos], !signals.is_empty());
        if !signals.is_empty() {
            debug!(
                transaction_id = %tx.transaction_id,
                signals = ?signals,
                "transaction flagged"
            );
            alerts.push(FraudAlert::new(tx, signals));
        }
    }
    alerts
}

/// Screen a candidate record that is not part of any history. Only the
/// rules that need no neighboring records apply.
pub fn screen(tx: &Transaction, stats: &AmountStats, amplitude_z: f64) -> Vec<FraudSignal> {
    let mut signals = Vec::new();
    if amplitude_outlier(tx, stats, amplitude_z) {
        signals.push(FraudSignal::AmplitudeOutlier);
    }
    if odd_hour(tx) {
        signals.push(FraudSignal::OddHour);
    }
    signals
}
