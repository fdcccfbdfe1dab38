//! Categorical feature extraction for the Naive Bayes classifier

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::store::AmountStats;
use crate::types::{Transaction, TxStatus};

/// Standard-score magnitude up to which an amount reads as typical
pub const TYPICAL_Z: f64 = 1.5;
/// Standard-score magnitude up to which an amount reads as elevated
pub const ELEVATED_Z: f64 = 3.0;

/// Amount band relative to the history's amount statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountBand {
    Typical,
    Elevated,
    Extreme,
}

impl AmountBand {
    pub const CATEGORIES: usize = 3;

    pub fn from_zscore(z: f64) -> Self {
        let magnitude = z.abs();
        if magnitude <= TYPICAL_Z {
            AmountBand::Typical
        } else if magnitude <= ELEVATED_Z {
            AmountBand::Elevated
        } else {
            AmountBand::Extreme
        }
    }

    pub fn index(self) -> usize {
        match self {
            AmountBand::Typical => 0,
            AmountBand::Elevated => 1,
            AmountBand::Extreme => 2,
        }
    }
}

/// Whether the record's country matches the configured reference country
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Domestic,
    International,
}

impl Region {
    pub const CATEGORIES: usize = 2;

    pub fn from_country(country: &str, reference: &str) -> Self {
        if country == reference {
            Region::Domestic
        } else {
            Region::International
        }
    }

    pub fn index(self) -> usize {
        match self {
            Region::Domestic => 0,
            Region::International => 1,
        }
    }
}

/// Coarse time-of-day band.
///
/// Daytime is the open interval between hours 6 and 16, so hour 6 itself
/// lands in the evening band rather than the daytime one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPeriod {
    Odd,
    Daytime,
    Evening,
}

impl DayPeriod {
    pub const CATEGORIES: usize = 3;

    pub fn from_hour(hour: u32) -> Self {
        if !(6..=22).contains(&hour) {
            DayPeriod::Odd
        } else if hour > 6 && hour < 16 {
            DayPeriod::Daytime
        } else {
            DayPeriod::Evening
        }
    }

    pub fn index(self) -> usize {
        match self {
            DayPeriod::Odd => 0,
            DayPeriod::Daytime => 1,
            DayPeriod::Evening => 2,
        }
    }
}

pub const STATUS_CATEGORIES: usize = 2;

pub fn status_index(status: TxStatus) -> usize {
    match status {
        TxStatus::Success => 0,
        TxStatus::Failure => 1,
    }
}

/// A transaction reduced to the four categorical features the model sees
#[derive(Debug, Clone, Copy)]
pub struct FeatureVector {
    pub amount: AmountBand,
    pub region: Region,
    pub period: DayPeriod,
    pub status: TxStatus,
}

impl FeatureVector {
    pub fn extract(tx: &Transaction, stats: &AmountStats, reference_country: &str) -> Self {
        Self {
            amount: AmountBand::from_zscore(stats.zscore(tx.amount)),
            region: Region::from_country(&tx.location.country, reference_country),
            period: DayPeriod::from_hour(tx.time.hour()),
            status: tx.status,
        }
    }
}
