// In app/src/report.rs

use allocation::ExcludedRow;
use analytics::{PositionLine, SizingResult};
use core_types::PortfolioConfiguration;
use rust_decimal::Decimal;
use std::fmt::Write;

const RULE_WIDTH: usize = 96;

/// Fixed-point formatting: 2 places for money and percentages, 4 for stakes.
fn fixed(value: Decimal, places: u32) -> String {
    format!("{:.*}", places as usize, value.round_dp(places))
}

fn header() -> String {
    format!(
        "{:<25} {:>10} {:>15} {:>13} {:>12} {:>10}\n{}\n",
        "Instrument",
        "Price",
        "Stake (/pt)",
        "Notional",
        "Margin",
        "Weight %",
        "-".repeat(RULE_WIDTH)
    )
}

fn line(p: &PositionLine) -> String {
    let flag = match (p.pinned, p.floor_bound) {
        (true, _) => "P",
        (false, true) => "F",
        _ => "",
    };
    format!(
        "{:<25} {:>10} {:>15} {:>13} {:>12} {:>10}  {}\n",
        p.name,
        fixed(p.price, 2),
        fixed(p.stake, 4),
        fixed(p.notional, 2),
        fixed(p.margin_used, 2),
        fixed(p.weight_percent, 2),
        flag
    )
}

/// Renders a sizing result as a fixed-width table.
pub fn render(result: &SizingResult, by_sector: bool) -> String {
    let mut out = header();

    if by_sector && !result.sectors.is_empty() {
        for sector in &result.sectors {
            let _ = writeln!(out, "\n{} {} {}", "-".repeat(10), sector.sector, "-".repeat(10));
            for name in &sector.instruments {
                if let Some(p) = result.position(name) {
                    out.push_str(&line(p));
                }
            }
            let _ = writeln!(
                out,
                "  {:<23} {:>10} {:>15} {:>13} {:>12} {:>10}",
                format!("{} subtotal", sector.sector),
                "",
                "",
                fixed(sector.notional, 2),
                fixed(sector.margin_used, 2),
                fixed(sector.weight_percent, 2)
            );
        }
    } else {
        for p in &result.positions {
            out.push_str(&line(p));
        }
    }

    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    let _ = writeln!(
        out,
        "{:<52} {:>13} {:>12} (target {})",
        "TOTALS",
        fixed(result.total_notional, 2),
        fixed(result.total_margin, 2),
        fixed(result.target_margin, 2)
    );
    let _ = writeln!(
        out,
        "Margin used: {}% of balance {}",
        fixed(result.actual_margin_used_percent, 2),
        fixed(result.account_balance, 2)
    );
    if let Some(scale) = result.scale_factor {
        let _ = writeln!(out, "Base stakes scaled by {}", fixed(scale, 4));
    }
    if result.positions.iter().any(|p| p.floor_bound || p.pinned) {
        let _ = writeln!(out, "F = held at minimum stake, P = pinned stake");
    }

    out
}

/// Lists the rows a dynamic table dropped.
pub fn render_excluded(excluded: &[ExcludedRow]) -> String {
    let mut out = String::new();
    for row in excluded {
        let _ = writeln!(out, "Skipped row {} ({}): {}", row.index + 1, row.name, row.reason);
    }
    out
}

/// One block per configured portfolio.
pub fn render_portfolios(portfolios: &[PortfolioConfiguration]) -> String {
    let mut out = String::new();
    for portfolio in portfolios {
        let _ = writeln!(
            out,
            "{} [margin: {:?}, sizing: {:?}]",
            portfolio.name, portfolio.margin_mode, portfolio.sizing_mode
        );
        for i in &portfolio.instruments {
            let _ = writeln!(
                out,
                "  {:<25} {:<10} weight {:>7}{}",
                i.name,
                i.sector.as_deref().unwrap_or("-"),
                i.weight.to_string(),
                i.pinned_stake.map(|s| format!("  pinned {s}")).unwrap_or_default()
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fixed_rounds_to_requested_places() {
        assert_eq!(fixed(dec!(200), 4), "200.0000");
        assert_eq!(fixed(dec!(0.016666), 4), "0.0167");
        assert_eq!(fixed(dec!(49.999), 2), "50.00");
    }
}
