//! Cardholder profile types

use serde::{Deserialize, Serialize};

use super::Location;

/// A cardholder profile as loaded from the account source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardProfile {
    /// Cardholder name
    pub name: String,

    /// Card number, the unique account key
    pub card_number: u64,

    /// Card verification code
    pub security_code: u16,

    /// Card expiry as printed, MM/YY
    pub expiry: String,

    /// Account password, held in obfuscated form (see
    /// [`obfuscate`](crate::directory::obfuscate))
    pub password: String,

    /// Billing address
    pub home: Location,
}

impl CardProfile {
    /// Create a profile with required fields; card details and the billing
    /// address default to empty
    pub fn new(name: String, card_number: u64, password: String) -> Self {
        Self {
            name,
            card_number,
            security_code: 0,
            expiry: String::new(),
            password,
            home: Location::new("", "", ""),
        }
    }

    /// Set the billing address
    pub fn with_home(mut self, home: Location) -> Self {
        self.home = home;
        self
    }

    /// Set the verification code and expiry
    pub fn with_card_details(mut self, security_code: u16, expiry: String) -> Self {
        self.security_code = security_code;
        self.expiry = expiry;
        self
    }
}
