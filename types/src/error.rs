//! Errors produced while parsing or combining coin amounts.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinError {
    #[error("invalid coin expression: {0:?}")]
    InvalidFormat(String),

    #[error("invalid denomination: {0:?}")]
    InvalidDenom(String),

    #[error("arithmetic overflow in coin amount")]
    Overflow,
}
