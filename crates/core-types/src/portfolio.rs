// In crates/core-types/src/portfolio.rs

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How margin is specified for every instrument of a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginMode {
    /// A flat fraction of notional (`margin_rate`).
    Rate,
    /// A minimum tradable stake and the margin charged at that stake.
    MinStake,
}

/// How the margin budget is split across the unpinned instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    /// Split in proportion to `weight`.
    #[default]
    TargetWeights,
    /// Rescale the `base_stake` template by one global factor.
    BaseStakes,
}

/// A single tradable as configured in a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
    /// Relative target weight. Only the ratio to the portfolio sum matters.
    #[serde(default)]
    pub weight: Decimal,
    #[serde(default)]
    pub margin_rate: Option<Decimal>,
    /// Default minimum stake; a request may override it.
    #[serde(default)]
    pub min_stake: Option<Decimal>,
    /// Default margin at the minimum stake; a request may override it.
    #[serde(default)]
    pub margin_at_min_stake: Option<Decimal>,
    #[serde(default)]
    pub base_stake: Option<Decimal>,
    /// Locks the stake. The locked margin is taken off the budget first.
    #[serde(default)]
    pub pinned_stake: Option<Decimal>,
}

impl Instrument {
    /// A weighted instrument with no margin details yet.
    pub fn new(name: impl Into<String>, weight: Decimal) -> Self {
        Self {
            name: name.into(),
            sector: None,
            weight,
            margin_rate: None,
            min_stake: None,
            margin_at_min_stake: None,
            base_stake: None,
            pinned_stake: None,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_margin_rate(mut self, rate: Decimal) -> Self {
        self.margin_rate = Some(rate);
        self
    }

    pub fn with_min_stake(mut self, min_stake: Decimal, margin_at_min_stake: Decimal) -> Self {
        self.min_stake = Some(min_stake);
        self.margin_at_min_stake = Some(margin_at_min_stake);
        self
    }

    pub fn with_base_stake(mut self, base_stake: Decimal) -> Self {
        self.base_stake = Some(base_stake);
        self
    }

    pub fn with_pinned_stake(mut self, stake: Decimal) -> Self {
        self.pinned_stake = Some(stake);
        self
    }
}

/// An immutable, ordered instrument set plus the modes that drive sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfiguration {
    pub name: String,
    pub margin_mode: MarginMode,
    #[serde(default)]
    pub sizing_mode: SizingMode,
    /// Margin usage (in percent) suggested to the caller when none is given.
    #[serde(default)]
    pub default_margin_usage_percent: Option<Decimal>,
    pub instruments: Vec<Instrument>,
}

impl PortfolioConfiguration {
    /// Builds and validates a configuration.
    pub fn new(
        name: impl Into<String>,
        margin_mode: MarginMode,
        sizing_mode: SizingMode,
        instruments: Vec<Instrument>,
    ) -> Result<Self> {
        Self {
            name: name.into(),
            margin_mode,
            sizing_mode,
            default_margin_usage_percent: None,
            instruments,
        }
        .validate()
    }

    /// Checks the structural rules a deserialized configuration must obey.
    pub fn validate(self) -> Result<Self> {
        if self.instruments.is_empty() {
            return Err(Error::EmptyPortfolio(self.name));
        }

        {
            let mut seen = HashSet::new();
            for instrument in &self.instruments {
                if !seen.insert(instrument.name.as_str()) {
                    return Err(Error::DuplicateInstrument(instrument.name.clone()));
                }
                let signed = [
                    ("weight", Some(instrument.weight)),
                    ("base stake", instrument.base_stake),
                    ("pinned stake", instrument.pinned_stake),
                ];
                for (field, value) in signed {
                    if value.is_some_and(|v| v < Decimal::ZERO) {
                        return Err(Error::NegativeField {
                            instrument: instrument.name.clone(),
                            field,
                        });
                    }
                }
            }
        }

        Ok(self)
    }

    pub fn with_default_margin_usage(mut self, percent: Decimal) -> Self {
        self.default_margin_usage_percent = Some(percent);
        self
    }

    pub fn instrument(&self, name: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.name == name)
    }

    pub fn total_weight(&self) -> Decimal {
        self.instruments.iter().map(|i| i.weight).sum()
    }
}
