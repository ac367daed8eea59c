// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use core_types::PortfolioConfiguration;
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, DefaultSettings, Settings};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        .add_source(File::with_name("config/base"))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        // e.g. `APP_DEFAULTS__MARGIN_USAGE_PERCENT=25`
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;

    Ok(settings)
}

/// Loads one portfolio definition.
///
/// `name` matches either the file stem (`cash_dfb`) or the `name` field
/// declared inside the file.
pub fn load_portfolio(dir: &Path, name: &str) -> Result<PortfolioConfiguration> {
    let direct = dir.join(format!("{name}.toml"));
    if direct.is_file() {
        return read_portfolio(&direct);
    }

    list_portfolios(dir)?
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| Error::UnknownPortfolio(name.to_string()))
}

/// Loads every `*.toml` portfolio in `dir`, sorted by name.
pub fn list_portfolios(dir: &Path) -> Result<Vec<PortfolioConfiguration>> {
    let mut portfolios = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }
        portfolios.push(read_portfolio(&path)?);
    }
    portfolios.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(portfolios)
}

fn read_portfolio(path: &Path) -> Result<PortfolioConfiguration> {
    let content = std::fs::read_to_string(path)?;
    let portfolio: PortfolioConfiguration = toml::from_str(&content)?;
    let portfolio = portfolio.validate()?;
    tracing::debug!(
        path = %path.display(),
        portfolio = %portfolio.name,
        instruments = portfolio.instruments.len(),
        "Loaded portfolio definition."
    );
    Ok(portfolio)
}
