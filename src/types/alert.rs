//! Fraud alert types raised by the heuristic pass

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::Transaction;

/// A rule that can mark a transaction as suspicious
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudSignal {
    /// Amount sits far outside the cardholder's usual spend
    AmplitudeOutlier,
    /// Payment made during unusual hours
    OddHour,
    /// Part of a run of consecutive failed payments
    FailureRun,
    /// Several payments within minutes of each other
    BurstFrequency,
    /// Location breaks continuity with recent activity and the billing address
    LocationAnomaly,
}

impl FraudSignal {
    /// Stable snake_case name, used for metrics keys and report output
    pub fn name(&self) -> &'static str {
        match self {
            FraudSignal::AmplitudeOutlier => "amplitude_outlier",
            FraudSignal::OddHour => "odd_hour",
            FraudSignal::FailureRun => "failure_run",
            FraudSignal::BurstFrequency => "burst_frequency",
            FraudSignal::LocationAnomaly => "location_anomaly",
        }
    }

    /// Operator-facing explanation of the signal
    pub fn describe(&self) -> &'static str {
        match self {
            FraudSignal::AmplitudeOutlier => "amount far outside the cardholder's usual range",
            FraudSignal::OddHour => "payment made during unusual hours",
            FraudSignal::FailureRun => "part of a run of consecutive failed payments",
            FraudSignal::BurstFrequency => "several payments within a few minutes",
            FraudSignal::LocationAnomaly => {
                "location matches neither recent activity nor the billing address"
            }
        }
    }
}

/// Alert generated when the heuristic pass flags a stored transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAlert {
    /// Unique alert identifier
    pub alert_id: String,

    /// Associated transaction ID
    pub transaction_id: String,

    /// Signals that triggered the alert
    pub signals: Vec<FraudSignal>,

    /// Payment date of the flagged transaction
    pub date: NaiveDate,

    /// Payment time of the flagged transaction
    pub time: NaiveTime,

    /// Amount charged
    pub amount: f64,

    /// Alert generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl FraudAlert {
    /// Create an alert for a flagged transaction
    pub fn new(transaction: &Transaction, signals: Vec<FraudSignal>) -> Self {
        Self {
            alert_id: uuid::Uuid::new_v4().to_string(),
            transaction_id: transaction.transaction_id.clone(),
            signals,
            date: transaction.date,
            time: transaction.time,
            amount: transaction.amount,
            timestamp: Utc::now(),
        }
    }

    /// Printable one-line explanation listing every triggered signal
    pub fn explanation(&self) -> String {
        self.signals
            .iter()
            .map(|s| s.describe())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
