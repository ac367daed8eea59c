// In app/src/main.rs

use allocation::AllocationEngine;
use anyhow::{Context, Result};
use app_config::Settings;
use clap::{Parser, Subcommand};
use core_types::{PortfolioConfiguration, RawInstrumentInput, RawSizingRequest, RawTableRequest, TableRow};
use tracing_subscriber::prelude::*;
mod report;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Turns a target allocation into per-instrument stakes that consume a chosen share of the account as margin.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sizes a configured portfolio at the given prices.
    Size {
        /// Portfolio file stem or declared name (e.g. "tier1_retail").
        #[arg(short, long)]
        portfolio: String,

        /// Account balance.
        #[arg(short, long)]
        balance: String,

        /// Desired margin usage in percent of the balance (e.g. "20").
        #[arg(short, long)]
        margin_pct: Option<String>,

        /// Live price per instrument, as NAME=VALUE. Repeat for each instrument.
        #[arg(long = "price", value_name = "NAME=VALUE")]
        prices: Vec<String>,

        /// Minimum stake override, as NAME=VALUE.
        #[arg(long = "min-stake", value_name = "NAME=VALUE")]
        min_stakes: Vec<String>,

        /// Margin at minimum stake override, as NAME=VALUE.
        #[arg(long = "margin-at-min", value_name = "NAME=VALUE")]
        margins_at_min: Vec<String>,

        /// Group rows by sector with subtotals.
        #[arg(long)]
        by_sector: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Sizes an ad-hoc instrument table. Invalid rows are skipped.
    Table {
        /// Account balance.
        #[arg(short, long)]
        balance: String,

        /// Desired margin usage in percent of the balance.
        #[arg(short, long)]
        margin_pct: Option<String>,

        /// One row as "name,sector,weight%,price,min_stake,margin_at_min".
        #[arg(long = "row", value_name = "CSV")]
        rows: Vec<String>,

        /// Group rows by sector with subtotals.
        #[arg(long)]
        by_sector: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Lists the configured portfolios.
    List,
}

// --- Main Application Entry Point ---

fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = app_config::load_settings().context("Failed to load application settings")?;

    // Logs go to stderr so stdout carries only the report.
    let configured_level = parse_log_level(&settings.app.log_level);
    let level = configured_level.unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(tracing_subscriber::filter::Targets::new().with_default(level));
    tracing_subscriber::registry().with(fmt_layer).init();

    if configured_level.is_none() {
        tracing::warn!(
            log_level = %settings.app.log_level,
            "Unrecognized log level in settings; using INFO."
        );
    }

    tracing::debug!(environment = %settings.app.environment, "Settings loaded.");

    match cli.command {
        Commands::Size {
            portfolio,
            balance,
            margin_pct,
            prices,
            min_stakes,
            margins_at_min,
            by_sector,
            json,
        } => {
            let config = app_config::load_portfolio(&settings.app.portfolio_dir, &portfolio)
                .with_context(|| format!("Failed to load portfolio '{}'", portfolio))?;
            let request = build_request(
                &settings,
                &config,
                balance,
                margin_pct,
                &prices,
                &min_stakes,
                &margins_at_min,
            )?;
            handle_size(&config, &request, by_sector, json)?;
        }
        Commands::Table {
            balance,
            margin_pct,
            rows,
            by_sector,
            json,
        } => {
            let request = RawTableRequest {
                account_balance: balance,
                margin_usage_percent: margin_pct
                    .unwrap_or_else(|| settings.defaults.margin_usage_percent.to_string()),
                rows: rows.iter().map(|r| TableRow::from_csv(r)).collect(),
            };
            handle_table(&request, by_sector, json)?;
        }
        Commands::List => {
            let portfolios = app_config::list_portfolios(&settings.app.portfolio_dir)
                .context("Failed to read the portfolio directory")?;
            print!("{}", report::render_portfolios(&portfolios));
        }
    }

    Ok(())
}

/// The configured level, or `None` when the setting names no level.
fn parse_log_level(setting: &str) -> Option<tracing::Level> {
    setting.trim().parse().ok()
}

// --- "Size" Subcommand Logic ---

/// Collects the command-line inputs into a raw request snapshot.
fn build_request(
    settings: &Settings,
    config: &PortfolioConfiguration,
    balance: String,
    margin_pct: Option<String>,
    prices: &[String],
    min_stakes: &[String],
    margins_at_min: &[String],
) -> Result<RawSizingRequest> {
    // Margin usage falls back to the portfolio's default, then the global one.
    let margin_usage_percent = margin_pct
        .or_else(|| config.default_margin_usage_percent.map(|d| d.to_string()))
        .unwrap_or_else(|| settings.defaults.margin_usage_percent.to_string());

    let mut inputs: Vec<RawInstrumentInput> = Vec::new();
    fn entry<'v>(inputs: &'v mut Vec<RawInstrumentInput>, name: &str) -> &'v mut RawInstrumentInput {
        let idx = match inputs.iter().position(|i| i.name == name) {
            Some(idx) => idx,
            None => {
                inputs.push(RawInstrumentInput::new(name, ""));
                inputs.len() - 1
            }
        };
        &mut inputs[idx]
    }

    for arg in prices {
        let (name, value) = split_pair(arg)?;
        entry(&mut inputs, name).live_price = value.to_string();
    }
    for arg in min_stakes {
        let (name, value) = split_pair(arg)?;
        entry(&mut inputs, name).min_stake = Some(value.to_string());
    }
    for arg in margins_at_min {
        let (name, value) = split_pair(arg)?;
        entry(&mut inputs, name).margin_at_min_stake = Some(value.to_string());
    }

    Ok(RawSizingRequest {
        account_balance: balance,
        margin_usage_percent,
        instruments: inputs,
    })
}

/// Splits `NAME=VALUE` on the last `=`, so names may contain one.
fn split_pair(arg: &str) -> Result<(&str, &str)> {
    arg.rsplit_once('=')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Expected NAME=VALUE, got '{}'", arg))
}

fn handle_size(config: &PortfolioConfiguration, request: &RawSizingRequest, by_sector: bool, json: bool) -> Result<()> {
    let engine = AllocationEngine::new(config);
    let result = engine
        .size(request)
        .with_context(|| format!("Could not size portfolio '{}'", config.name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}\n", config.name);
        print!("{}", report::render(&result, by_sector));
    }
    Ok(())
}

// --- "Table" Subcommand Logic ---

fn handle_table(request: &RawTableRequest, by_sector: bool, json: bool) -> Result<()> {
    let sizing = allocation::size_table(request).context("Could not size the instrument table")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sizing)?);
    } else {
        print!("{}", report::render_excluded(&sizing.excluded));
        print!("{}", report::render(&sizing.result, by_sector));
    }
    Ok(())
}
