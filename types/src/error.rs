//! Parse and conversion errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("amount is empty")]
    EmptyAmount,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("amount must not be negative: {0}")]
    NegativeAmount(String),

    #[error("amount {amount} has more than {max} decimal places")]
    TooManyDecimals { amount: String, max: u32 },

    #[error("amount overflows 128-bit wei: {0}")]
    AmountOverflow(String),

    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unknown currency key: {0}")]
    UnknownCurrency(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
