//! Per-Card Fraud Risk Scoring Library
//!
//! A fixed-capacity card directory feeds per-user transaction histories
//! through rule heuristics and an online-trained Naive Bayes classifier.

pub mod classifier;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod index;
pub mod metrics;
pub mod store;
pub mod types;

pub use classifier::{BayesModel, Prediction};
pub use config::AppConfig;
pub use directory::{AuthOutcome, CardDirectory};
pub use engine::{Direction, RiskEngine};
pub use error::{Error, Result};
pub use index::DateIndex;
pub use metrics::SessionMetrics;
pub use store::{AmountStats, TransactionStore};
pub use types::{CardProfile, FraudAlert, FraudSignal, Location, Transaction, TxStatus};
