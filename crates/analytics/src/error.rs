// In crates/analytics/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("The {0} is too large to represent.")]
    Overflow(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
