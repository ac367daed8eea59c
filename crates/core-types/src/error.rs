// In crates/core-types/src/error.rs

use thiserror::Error;

/// Errors raised while building a `PortfolioConfiguration`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Portfolio '{0}' has no instruments")]
    EmptyPortfolio(String),

    #[error("Instrument '{0}' is listed more than once")]
    DuplicateInstrument(String),

    #[error("Instrument '{instrument}' has a negative {field}")]
    NegativeField { instrument: String, field: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
