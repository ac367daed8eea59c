// In crates/allocation/src/error.rs

use thiserror::Error;

/// Every reason a sizing calculation can be aborted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Enter a valid positive account balance.")]
    InvalidBalance,

    #[error("Enter a valid desired margin usage % strictly between 0 and 100 (e.g. 20).")]
    InvalidMarginUsage,

    #[error("Enter a valid price for {0}.")]
    InvalidPrice(String),

    #[error("Enter a valid minimum stake for {0}.")]
    InvalidMinStake(String),

    #[error("Enter a valid margin at minimum stake for {0}.")]
    InvalidMarginFloor(String),

    #[error("Configure a positive margin rate for {0}.")]
    InvalidMarginRate(String),

    #[error("Pinned stake for {0} must be positive and not below its minimum stake.")]
    InvalidPinnedStake(String),

    #[error("Configure a positive base stake for {0}.")]
    InvalidBaseStake(String),

    #[error("No valid instruments with a positive total weight.")]
    NoValidInstruments,

    #[error("Margin consumed at the base stakes is zero or negative; cannot rescale.")]
    DegenerateBaseConfiguration,

    #[error("No margin budget is left for scaling after pinned positions.")]
    DegenerateMarginConfiguration,

    #[error("The inputs for {0} produce a stake or margin too large to represent.")]
    Overflow(String),

    #[error(transparent)]
    Analytics(#[from] analytics::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
