//! The ledger trait and its blanket impls.

use crate::LedgerError;
use agora_types::{Address, Amount};
use std::sync::Arc;

/// Moves value between accounts and the voting core's custody account.
pub trait Ledger {
    /// Current spendable balance of `account`.
    fn balance_of(&self, account: &Address) -> Amount;

    /// Move `amount` from `from` into the core's custody.
    ///
    /// Must either move the full amount or fail without effect.
    fn charge(&self, from: &Address, amount: Amount) -> Result<(), LedgerError>;

    /// Move `amount` out of the core's custody to `to`.
    fn pay_out(&self, to: &Address, amount: Amount) -> Result<(), LedgerError>;
}

impl<L: Ledger + ?Sized> Ledger for &L {
    fn balance_of(&self, account: &Address) -> Amount {
        (**self).balance_of(account)
    }

    fn charge(&self, from: &Address, amount: Amount) -> Result<(), LedgerError> {
        (**self).charge(from, amount)
    }

    fn pay_out(&self, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        (**self).pay_out(to, amount)
    }
}

impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    fn balance_of(&self, account: &Address) -> Amount {
        (**self).balance_of(account)
    }

    fn charge(&self, from: &Address, amount: Amount) -> Result<(), LedgerError> {
        (**self).charge(from, amount)
    }

    fn pay_out(&self, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        (**self).pay_out(to, amount)
    }
}
