// In crates/app-config/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load configuration")]
    LoadError(#[from] config::ConfigError),

    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid portfolio definition: {0}")]
    PortfolioError(#[from] core_types::Error),

    #[error("No portfolio named '{0}' was found")]
    UnknownPortfolio(String),
}

pub type Result<T> = std::result::Result<T, Error>;
