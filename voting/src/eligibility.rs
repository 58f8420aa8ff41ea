//! Voter eligibility.
//!
//! Voting is open by default: a voter with no explicit authorization record is
//! eligible. The administrator can flip any address's record either way. When
//! the session requires a minimum balance, the voter's ledger balance must
//! also reach it.

use agora_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Eligibility {
    authorizations: HashMap<Address, bool>,
}

impl Eligibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authorize(&mut self, voter: &Address) {
        self.authorizations.insert(voter.clone(), true);
    }

    pub fn revoke(&mut self, voter: &Address) {
        self.authorizations.insert(voter.clone(), false);
    }

    /// The explicit authorization record of `voter`, if one exists.
    pub fn record(&self, voter: &Address) -> Option<bool> {
        self.authorizations.get(voter).copied()
    }

    /// Whether `voter` may take part.
    ///
    /// `balance` is only consulted when `minimum_balance` is set.
    pub fn is_eligible(
        &self,
        voter: &Address,
        minimum_balance: Option<Amount>,
        balance: impl FnOnce() -> Amount,
    ) -> bool {
        let funded = match minimum_balance {
            Some(minimum) => balance() >= minimum,
            None => true,
        };
        let authorized = self.record(voter).unwrap_or(true);
        funded && authorized
    }
}
