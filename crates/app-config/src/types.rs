// In crates/app-config/src/types.rs

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Fallback values for inputs the user leaves out.
    #[serde(default)]
    pub defaults: DefaultSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
    /// Directory holding one `<name>.toml` file per portfolio.
    #[serde(default = "default_portfolio_dir")]
    pub portfolio_dir: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DefaultSettings {
    /// Share of the balance to commit as margin, in percent.
    #[serde(default = "default_margin_usage")]
    pub margin_usage_percent: Decimal,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            margin_usage_percent: default_margin_usage(),
        }
    }
}

/// Helper functions for serde defaults
fn default_portfolio_dir() -> PathBuf {
    PathBuf::from("config/portfolios")
}
fn default_margin_usage() -> Decimal {
    Decimal::from(20)
}
