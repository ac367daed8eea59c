// In crates/analytics/src/types.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One instrument row of a sizing result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLine {
    pub name: String,
    pub sector: Option<String>,
    pub price: Decimal,
    /// Currency per point.
    pub stake: Decimal,
    pub notional: Decimal,
    pub margin_used: Decimal,
    pub target_margin: Decimal,
    /// Share of total margin used, in percent.
    pub weight_percent: Decimal,
    pub floor_bound: bool,
    pub pinned: bool,
}

/// Notional and margin summed over one sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorSubtotal {
    pub sector: String,
    /// Instrument names in portfolio order.
    pub instruments: Vec<String>,
    pub notional: Decimal,
    pub margin_used: Decimal,
    pub weight_percent: Decimal,
}

/// The complete outcome of one sizing pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SizingResult {
    pub account_balance: Decimal,
    pub target_margin: Decimal,
    pub total_margin: Decimal,
    pub total_notional: Decimal,
    /// `100 * total_margin / account_balance`.
    pub actual_margin_used_percent: Decimal,
    /// Set only when base stakes were rescaled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_factor: Option<Decimal>,
    pub positions: Vec<PositionLine>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sectors: Vec<SectorSubtotal>,
}

impl SizingResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self, name: &str) -> Option<&PositionLine> {
        self.positions.iter().find(|p| p.name == name)
    }

    /// Realized margin above the budget, caused by binding floors or pinned legs.
    pub fn margin_overshoot(&self) -> Decimal {
        (self.total_margin - self.target_margin).max(Decimal::ZERO)
    }
}
