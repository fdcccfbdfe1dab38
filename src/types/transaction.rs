//! Transaction record types for per-card fraud screening

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Settlement outcome of a payment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failure,
}

/// Where a payment was made
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Location {
    /// Create a location from string parts
    pub fn new(city: &str, state: &str, country: &str) -> Self {
        Self {
            city: city.to_string(),
            state: state.to_string(),
            country: country.to_string(),
        }
    }
}

/// A single card transaction as supplied by the record source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction/record identifier
    pub transaction_id: String,

    /// Payment date
    pub date: NaiveDate,

    /// Payment time of day
    pub time: NaiveTime,

    /// Payment location
    pub location: Location,

    /// Amount charged
    pub amount: f64,

    /// Whether the payment settled
    pub status: TxStatus,
}

impl Transaction {
    /// Create a transaction with required fields; the location defaults to
    /// empty and the status to a settled payment
    pub fn new(transaction_id: String, date: NaiveDate, time: NaiveTime, amount: f64) -> Self {
        Self {
            transaction_id,
            date,
            time,
            location: Location::new("", "", ""),
            amount,
            status: TxStatus::Success,
        }
    }

    /// Set the payment location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Set the settlement status
    pub fn with_status(mut self, status: TxStatus) -> Self {
        self.status = status;
        self
    }
}
