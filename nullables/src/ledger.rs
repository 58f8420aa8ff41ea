//! Nullable ledger: in-memory balances and a custody account.

use agora_ledger::{Ledger, LedgerError};
use agora_types::{Address, Amount};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory ledger for testing.
///
/// Charged value accumulates in a custody balance; payouts draw from it.
pub struct NullLedger {
    balances: Mutex<HashMap<Address, Amount>>,
    custody: Mutex<Amount>,
    rejecting: Mutex<bool>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            custody: Mutex::new(Amount::ZERO),
            rejecting: Mutex::new(false),
        }
    }

    /// Credit `amount` to `account`.
    pub fn fund(&self, account: &Address, amount: u128) {
        let mut balances = self.balances.lock().unwrap();
        let entry = balances.entry(account.clone()).or_default();
        *entry = Amount::new(entry.raw().saturating_add(amount));
    }

    /// Value currently held in the core's custody.
    pub fn custody(&self) -> Amount {
        *self.custody.lock().unwrap()
    }

    /// Make every subsequent transfer fail (or succeed again).
    pub fn reject_transfers(&self, reject: bool) {
        *self.rejecting.lock().unwrap() = reject;
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for NullLedger {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .unwrap_or_default()
    }

    fn charge(&self, from: &Address, amount: Amount) -> Result<(), LedgerError> {
        if *self.rejecting.lock().unwrap() {
            return Err(LedgerError::Rejected("ledger offline".to_string()));
        }
        let mut balances = self.balances.lock().unwrap();
        let available = balances.get(from).copied().unwrap_or_default();
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientFunds {
                account: from.to_string(),
                needed: amount.raw(),
                available: available.raw(),
            })?;
        let mut custody = self.custody.lock().unwrap();
        *custody = custody
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Rejected("custody overflow".to_string()))?;
        balances.insert(from.clone(), remaining);
        Ok(())
    }

    fn pay_out(&self, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        if *self.rejecting.lock().unwrap() {
            return Err(LedgerError::Rejected("ledger offline".to_string()));
        }
        let mut custody = self.custody.lock().unwrap();
        let remaining = custody
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientFunds {
                account: "custody".to_string(),
                needed: amount.raw(),
                available: custody.raw(),
            })?;
        let mut balances = self.balances.lock().unwrap();
        let credited = balances
            .get(to)
            .copied()
            .unwrap_or_default()
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Rejected(format!("balance overflow for {to}")))?;
        *custody = remaining;
        balances.insert(to.clone(), credited);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_moves_value_into_custody() {
        let ledger = NullLedger::new();
        let alice = Address::new("alice");
        ledger.fund(&alice, 10);
        ledger.charge(&alice, Amount::new(4)).unwrap();
        assert_eq!(ledger.balance_of(&alice), Amount::new(6));
        assert_eq!(ledger.custody(), Amount::new(4));
    }

    #[test]
    fn overdraft_is_rejected_without_effect() {
        let ledger = NullLedger::new();
        let alice = Address::new("alice");
        ledger.fund(&alice, 3);
        let err = ledger.charge(&alice, Amount::new(4)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { needed: 4, available: 3, .. }));
        assert_eq!(ledger.balance_of(&alice), Amount::new(3));
        assert!(ledger.custody().is_zero());
    }

    #[test]
    fn pay_out_draws_from_custody() {
        let ledger = NullLedger::new();
        let alice = Address::new("alice");
        let admin = Address::new("admin");
        ledger.fund(&alice, 5);
        ledger.charge(&alice, Amount::new(5)).unwrap();
        ledger.pay_out(&admin, Amount::new(5)).unwrap();
        assert_eq!(ledger.balance_of(&admin), Amount::new(5));
        assert!(ledger.pay_out(&admin, Amount::new(1)).is_err());
    }

    #[test]
    fn custody_overflow_leaves_balances_untouched() {
        let ledger = NullLedger::new();
        let (whale, bob) = (Address::new("whale"), Address::new("bob"));
        ledger.fund(&whale, u128::MAX);
        ledger.charge(&whale, Amount::new(u128::MAX)).unwrap();
        ledger.fund(&bob, 1);
        assert!(matches!(
            ledger.charge(&bob, Amount::new(1)),
            Err(LedgerError::Rejected(_))
        ));
        assert_eq!(ledger.balance_of(&bob), Amount::new(1));
        assert_eq!(ledger.custody(), Amount::new(u128::MAX));
    }

    #[test]
    fn rejecting_ledger_fails_transfers() {
        let ledger = NullLedger::new();
        let alice = Address::new("alice");
        ledger.fund(&alice, 5);
        ledger.reject_transfers(true);
        assert!(matches!(
            ledger.charge(&alice, Amount::new(1)),
            Err(LedgerError::Rejected(_))
        ));
    }
}
