use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient funds in {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: String,
        needed: u128,
        available: u128,
    },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}
