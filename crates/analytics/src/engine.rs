use crate::types::{PositionLine, SectorSubtotal, SizingResult};
use crate::{Error, Result};
use core_types::{DerivedPosition, checked_sum};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Sectors with a fixed display order.
pub const KNOWN_SECTORS: [&str; 4] = ["Equity", "Bond", "Commodity", "FX"];

/// Label given to positions that carry no sector.
const UNCLASSIFIED: &str = "Other";

/// The engine responsible for rolling derived positions up into a result.
#[derive(Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes totals, weight percentages and sector subtotals.
    pub fn calculate(
        &self,
        account_balance: Decimal,
        target_margin: Decimal,
        positions: Vec<DerivedPosition>,
        scale_factor: Option<Decimal>,
    ) -> Result<SizingResult> {
        let mut result = SizingResult::new();
        result.account_balance = account_balance;
        result.target_margin = target_margin;
        result.scale_factor = scale_factor;

        // --- Portfolio Totals ---
        result.total_margin =
            checked_sum(positions.iter().map(|p| p.margin_used)).ok_or(Error::Overflow("total margin"))?;
        result.total_notional =
            checked_sum(positions.iter().map(|p| p.notional)).ok_or(Error::Overflow("total notional"))?;
        if account_balance > dec!(0) {
            result.actual_margin_used_percent = percent_of(result.total_margin, account_balance)
                .ok_or(Error::Overflow("margin used percentage"))?;
        }

        // --- Per-Instrument Lines ---
        let total_margin = result.total_margin;
        let has_sectors = positions.iter().any(|p| p.sector.is_some());
        result.positions = positions
            .into_iter()
            .map(|p| PositionLine {
                notional: p.notional,
                weight_percent: share_percent(p.margin_used, total_margin),
                name: p.name,
                sector: p.sector,
                price: p.price,
                stake: p.stake,
                margin_used: p.margin_used,
                target_margin: p.target_margin,
                floor_bound: p.floor_bound,
                pinned: p.pinned,
            })
            .collect();

        // --- Sector Rollups ---
        if has_sectors {
            result.sectors = self.sector_subtotals(&result.positions, total_margin);
        }

        tracing::debug!(
            %total_margin,
            total_notional = %result.total_notional,
            sectors = result.sectors.len(),
            "Aggregated sizing result."
        );

        Ok(result)
    }

    /// Groups lines by sector. Known sectors use their fixed order; as soon as a
    /// free-form label appears, every sector falls back to first-seen order.
    ///
    /// Labels are compared exactly, so `equity` is a free-form sector.
    /// Each subtotal is bounded by the portfolio totals, which are checked
    /// before this runs.
    pub fn sector_subtotals(&self, lines: &[PositionLine], total_margin: Decimal) -> Vec<SectorSubtotal> {
        let mut subtotals: Vec<SectorSubtotal> = Vec::new();
        for line in lines {
            let sector = line.sector.as_deref().unwrap_or(UNCLASSIFIED);
            let idx = match subtotals.iter().position(|s| s.sector == sector) {
                Some(idx) => idx,
                None => {
                    subtotals.push(SectorSubtotal {
                        sector: sector.to_string(),
                        instruments: Vec::new(),
                        notional: dec!(0),
                        margin_used: dec!(0),
                        weight_percent: dec!(0),
                    });
                    subtotals.len() - 1
                }
            };
            let entry = &mut subtotals[idx];
            entry.instruments.push(line.name.clone());
            entry.notional += line.notional;
            entry.margin_used += line.margin_used;
        }

        for entry in &mut subtotals {
            entry.weight_percent = share_percent(entry.margin_used, total_margin);
        }

        let all_known = subtotals.iter().all(|s| known_rank(&s.sector).is_some());
        if all_known {
            subtotals.sort_by_key(|s| known_rank(&s.sector));
        }

        subtotals
    }
}

fn known_rank(sector: &str) -> Option<usize> {
    KNOWN_SECTORS.iter().position(|k| *k == sector)
}

/// `100 * part / total`, or zero when nothing was used. `part` never exceeds
/// `total`, so the result is at most 100.
fn share_percent(part: Decimal, total: Decimal) -> Decimal {
    if total > dec!(0) {
        percent_of(part, total).unwrap_or(dec!(100))
    } else {
        dec!(0)
    }
}

/// `100 * part / whole`. Multiplying first keeps precision; dividing first is
/// the fallback when `100 * part` is out of range.
fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    match part.checked_mul(dec!(100)) {
        Some(scaled) => scaled.checked_div(whole),
        None => part.checked_div(whole)?.checked_mul(dec!(100)),
    }
}
