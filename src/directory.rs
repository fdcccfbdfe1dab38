//! Open-addressed card directory with quadratic probing

use tracing::debug;

use crate::classifier::BayesModel;
use crate::error::{Error, Result};
use crate::index::DateIndex;
use crate::store::{AmountStats, TransactionStore};
use crate::types::CardProfile;

/// Slot count of the directory table; prime and fixed for the process lifetime
pub const TABLE_SIZE: usize = 53;

/// Outcome of an authentication attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Secret matched the stored password
    Authenticated,
    /// Account exists but the secret did not match
    WrongPassword,
    /// No account on file for the card number
    UnknownCard,
}

/// One directory entry: the profile plus every per-user derived structure
#[derive(Debug)]
pub struct UserAccount {
    /// Profile as loaded from the account source
    pub profile: CardProfile,
    /// Chronological transaction history
    pub store: TransactionStore,
    /// Date index, present once built from the current history
    pub index: Option<DateIndex>,
    /// Amount statistics over the current history
    pub stats: Option<AmountStats>,
    /// Classifier trained from the current flagged history
    pub model: Option<BayesModel>,
}

impl UserAccount {
    /// Wrap a freshly loaded profile with an empty history
    pub fn new(profile: CardProfile) -> Self {
        Self {
            profile,
            store: TransactionStore::new(),
            index: None,
            stats: None,
            model: None,
        }
    }
}

/// Fixed-capacity open-addressed map from card number to account.
///
/// No deletion is supported, so a free slot along a probe path reliably
/// means the key is absent. The table never resizes; insertion into a
/// directory whose probe sequence is exhausted fails with
/// [`Error::DirectoryFull`].
#[derive(Debug)]
pub struct CardDirectory {
    slots: Vec<Option<UserAccount>>,
}

impl CardDirectory {
    /// Create an empty directory of [`TABLE_SIZE`] slots
    pub fn new() -> Self {
        Self {
            slots: (0..TABLE_SIZE).map(|_| None).collect(),
        }
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when no profile has been loaded
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Base table index for a card number: the number is folded in
    /// base-10000 chunks with a multiplier of 37
    fn slot_base(card_number: u64) -> usize {
        let mut hash: u64 = 0;
        let mut n = card_number;
        while n > 0 {
            hash = (hash + n % 10_000) * 37;
            n /= 10_000;
        }
        (hash % TABLE_SIZE as u64) as usize
    }

    /// Probe slot for attempt `i` from `base`
    fn probe(base: usize, i: usize) -> usize {
        (base + i * i) % TABLE_SIZE
    }

    /// Place an account in the first free probe slot for its card number
    pub fn insert(&mut self, account: UserAccount) -> Result<()> {
        let base = Self::slot_base(account.profile.card_number);
        for i in 0..TABLE_SIZE {
            let slot = Self::probe(base, i);
            if self.slots[slot].is_none() {
                debug!(slot, probes = i + 1, "account placed");
                self.slots[slot] = Some(account);
                return Ok(());
            }
        }
        Err(Error::DirectoryFull(TABLE_SIZE))
    }

    /// Slot holding `card_number`, resolved through the full probe sequence
    fn find_slot(&self, card_number: u64) -> Option<usize> {
        let base = Self::slot_base(card_number);
        for i in 0..TABLE_SIZE {
            let slot = Self::probe(base, i);
            match &self.slots[slot] {
                None => return None,
                Some(account) if account.profile.card_number == card_number => return Some(slot),
                Some(_) => {}
            }
        }
        None
    }

    /// Find the account for a card number
    pub fn lookup(&self, card_number: u64) -> Option<&UserAccount> {
        let slot = self.find_slot(card_number)?;
        self.slots[slot].as_ref()
    }

    /// Mutable variant of [`lookup`](Self::lookup)
    pub fn lookup_mut(&mut self, card_number: u64) -> Option<&mut UserAccount> {
        let slot = self.find_slot(card_number)?;
        self.slots[slot].as_mut()
    }

    /// Check a supplied secret against the stored obfuscated password
    pub fn authenticate(&self, card_number: u64, secret: &str) -> AuthOutcome {
        match self.lookup(card_number) {
            None => AuthOutcome::UnknownCard,
            Some(account) if obfuscate(secret) == account.profile.password => {
                AuthOutcome::Authenticated
            }
            Some(_) => AuthOutcome::WrongPassword,
        }
    }
}

impl Default for CardDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Reversible character-shift obfuscation applied to stored passwords.
///
/// Bytes below 90 shift up by 15, the rest shift down by 16. This is an
/// obfuscation step, not a hash; profiles arrive with it already applied
/// and authentication compares in the obfuscated domain.
pub fn obfuscate(secret: &str) -> String {
    secret
        .bytes()
        .map(|b| if b < 90 { (b + 15) as char } else { (b - 16) as char })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;

    fn profile(card_number: u64) -> CardProfile {
        CardProfile::new(
            format!("holder_{card_number}"),
            card_number,
            obfuscate("pass123"),
        )
        .with_home(Location::new("Pune", "Maharashtra", "India"))
    }

    #[test]
    fn test_insert_then_lookup() {
        let mut dir = CardDirectory::new();
        dir.insert(UserAccount::new(profile(4716391509124420))).unwrap();

        assert!(dir.lookup(4716391509124420).is_some());
        assert!(dir.lookup(4716391509124421).is_none());
        assert_eq!(dir.len(), 1);
        assert!(!dir.is_empty());
    }

    #[test]
    fn test_colliding_keys_resolve_through_probing() {
        // Keys below 10_000 hash from a single base-10000 chunk, so keys
        // congruent mod TABLE_SIZE land on the same base slot.
        let mut dir = CardDirectory::new();
        let keys: Vec<u64> = (0..10).map(|i| 100 + TABLE_SIZE as u64 * i).collect();

        for &key in &keys {
            dir.insert(UserAccount::new(profile(key))).unwrap();
        }
        for &key in &keys {
            assert_eq!(dir.lookup(key).map(|a| a.profile.card_number), Some(key));
        }
    }

    #[test]
    fn test_probe_sequence_covers_half_the_table() {
        // i^2 mod 53 takes (53 + 1) / 2 distinct values, so 27 keys sharing
        // a base slot fit and the 28th fails even though free slots remain.
        let mut dir = CardDirectory::new();
        for i in 0..27u64 {
            dir.insert(UserAccount::new(profile(100 + 53 * i))).unwrap();
        }
        assert!(dir.len() < TABLE_SIZE);

        let overflow = dir.insert(UserAccount::new(profile(100 + 53 * 27)));
        assert!(matches!(overflow, Err(Error::DirectoryFull(_))));
    }

    #[test]
    fn test_authenticate_outcomes() {
        let mut dir = CardDirectory::new();
        dir.insert(UserAccount::new(profile(1111222233334444))).unwrap();

        assert_eq!(
            dir.authenticate(1111222233334444, "pass123"),
            AuthOutcome::Authenticated
        );
        assert_eq!(
            dir.authenticate(1111222233334444, "PASS123"),
            AuthOutcome::WrongPassword
        );
        assert_eq!(
            dir.authenticate(9999888877776666, "pass123"),
            AuthOutcome::UnknownCard
        );
    }

    #[test]
    fn test_obfuscate_shifts_around_the_boundary() {
        // 'P' (80) and '1' (49) sit below the pivot, 'a' and 's' above it
        assert_eq!(obfuscate("Pass1"), "_Qcc@");
        assert_ne!(obfuscate("pass123"), "pass123");
    }
}
