//! Type definitions for the risk engine

pub mod alert;
pub mod profile;
pub mod transaction;

pub use alert::{FraudAlert, FraudSignal};
pub use profile::CardProfile;
pub use transaction::{Location, Transaction, TxStatus};
