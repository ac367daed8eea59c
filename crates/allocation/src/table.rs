// In crates/allocation/src/table.rs

use crate::parse::parse_decimal;
use crate::validator::{parse_balance, parse_margin_usage};
use crate::{Error, Result};
use core_types::{Leg, MarginModel, RawTableRequest, SizingRequest, TableRow, checked_sum};
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Why a table row was left out of the calculation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRejection {
    #[error("blank instrument name")]
    BlankName,
    #[error("duplicate instrument name")]
    DuplicateName,
    #[error("weight is missing or negative")]
    InvalidWeight,
    #[error("price is missing or not positive")]
    InvalidPrice,
    #[error("minimum stake is missing or not positive")]
    InvalidMinStake,
    #[error("margin at minimum stake is missing or negative")]
    InvalidMarginFloor,
}

/// A row that did not make it into the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedRow {
    /// Zero-based position in the submitted table.
    pub index: usize,
    pub name: String,
    pub reason: RowRejection,
}

/// The canonical request built from the surviving rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableValidation {
    pub request: SizingRequest,
    pub excluded: Vec<ExcludedRow>,
}

/// Validates a user-defined table.
///
/// Balance and margin usage are hard failures. Bad rows are skipped and
/// reported; the call only fails if nothing usable is left.
pub fn validate_table(raw: &RawTableRequest) -> Result<TableValidation> {
    let account_balance = parse_balance(&raw.account_balance)?;
    let margin_usage = parse_margin_usage(&raw.margin_usage_percent)?;

    let mut legs = Vec::new();
    let mut excluded = Vec::new();
    let mut seen = HashSet::new();

    for (index, row) in raw.rows.iter().enumerate() {
        let name = row.name.trim();
        let outcome = if seen.contains(name) {
            Err(RowRejection::DuplicateName)
        } else {
            parse_row(row)
        };

        match outcome {
            Ok(leg) => {
                seen.insert(name.to_string());
                legs.push(leg);
            }
            Err(reason) => {
                tracing::warn!(index, instrument = %name, %reason, "Excluding table row.");
                excluded.push(ExcludedRow {
                    index,
                    name: name.to_string(),
                    reason,
                });
            }
        }
    }

    let total_weight = checked_sum(legs.iter().map(|l| l.weight))
        .ok_or_else(|| Error::Overflow("the total weight".into()))?;
    if legs.is_empty() || total_weight <= dec!(0) {
        return Err(Error::NoValidInstruments);
    }

    Ok(TableValidation {
        request: SizingRequest {
            account_balance,
            margin_usage,
            legs,
        },
        excluded,
    })
}

fn parse_row(row: &TableRow) -> std::result::Result<Leg, RowRejection> {
    let name = row.name.trim();
    if name.is_empty() {
        return Err(RowRejection::BlankName);
    }
    let weight = parse_decimal(&row.weight)
        .filter(|w| *w >= dec!(0))
        .ok_or(RowRejection::InvalidWeight)?;
    let price = parse_decimal(&row.live_price)
        .filter(|p| *p > dec!(0))
        .ok_or(RowRejection::InvalidPrice)?;
    let min_stake = parse_decimal(&row.min_stake)
        .filter(|s| *s > dec!(0))
        .ok_or(RowRejection::InvalidMinStake)?;
    let margin_at_min_stake = parse_decimal(&row.margin_at_min_stake)
        .filter(|m| *m >= dec!(0))
        .ok_or(RowRejection::InvalidMarginFloor)?;

    let sector = row.sector.trim();
    Ok(Leg {
        name: name.to_string(),
        sector: (!sector.is_empty()).then(|| sector.to_string()),
        weight,
        price,
        margin: MarginModel::MinStake {
            min_stake,
            margin_at_min_stake,
        },
        base_stake: None,
        pinned_stake: None,
    })
}
