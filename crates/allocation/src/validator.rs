// In crates/allocation/src/validator.rs

use crate::parse::parse_decimal;
use crate::{Error, Result};
use core_types::{
    Instrument, Leg, MarginMode, MarginModel, PortfolioConfiguration, RawInstrumentInput,
    RawSizingRequest, SizingMode, SizingRequest,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Turns a raw request into a canonical one, stopping at the first bad field.
///
/// Fields are checked in the order the user sees them: balance, margin usage,
/// then each instrument in portfolio order (price, minimum stake, margin floor).
pub fn validate(config: &PortfolioConfiguration, raw: &RawSizingRequest) -> Result<SizingRequest> {
    let account_balance = parse_balance(&raw.account_balance)?;
    let margin_usage = parse_margin_usage(&raw.margin_usage_percent)?;

    for input in &raw.instruments {
        if config.instrument(&input.name).is_none() {
            tracing::warn!(
                instrument = %input.name,
                portfolio = %config.name,
                "Ignoring input for an instrument that is not in the portfolio."
            );
        }
    }

    let legs = config
        .instruments
        .iter()
        .map(|instrument| validate_leg(config, instrument, raw.input(&instrument.name)))
        .collect::<Result<Vec<_>>>()?;

    Ok(SizingRequest {
        account_balance,
        margin_usage,
        legs,
    })
}

/// The balance must be a strictly positive number.
pub(crate) fn parse_balance(input: &str) -> Result<Decimal> {
    parse_decimal(input)
        .filter(|b| *b > dec!(0))
        .ok_or(Error::InvalidBalance)
}

/// Converts a percentage ("20") into a fraction strictly inside (0, 1).
pub(crate) fn parse_margin_usage(input: &str) -> Result<Decimal> {
    parse_decimal(input)
        .map(|pct| pct / dec!(100))
        .filter(|f| *f > dec!(0) && *f < dec!(1))
        .ok_or(Error::InvalidMarginUsage)
}

fn validate_leg(
    config: &PortfolioConfiguration,
    instrument: &Instrument,
    input: Option<&RawInstrumentInput>,
) -> Result<Leg> {
    let name = &instrument.name;

    let price = input
        .and_then(|i| parse_decimal(&i.live_price))
        .filter(|p| *p > dec!(0))
        .ok_or_else(|| Error::InvalidPrice(name.clone()))?;

    let margin = match config.margin_mode {
        MarginMode::MinStake => {
            let min_stake = resolve(input.and_then(|i| i.min_stake.as_deref()), instrument.min_stake)
                .filter(|s| *s > dec!(0))
                .ok_or_else(|| Error::InvalidMinStake(name.clone()))?;
            let margin_at_min_stake = resolve(
                input.and_then(|i| i.margin_at_min_stake.as_deref()),
                instrument.margin_at_min_stake,
            )
            .filter(|m| *m >= dec!(0))
            .ok_or_else(|| Error::InvalidMarginFloor(name.clone()))?;
            MarginModel::MinStake {
                min_stake,
                margin_at_min_stake,
            }
        }
        MarginMode::Rate => {
            let margin_rate = instrument
                .margin_rate
                .filter(|r| *r > dec!(0))
                .ok_or_else(|| Error::InvalidMarginRate(name.clone()))?;
            MarginModel::Rate { margin_rate }
        }
    };

    if let Some(pinned) = instrument.pinned_stake {
        let below_floor = margin.floor().is_some_and(|floor| pinned < floor);
        if pinned <= dec!(0) || below_floor {
            return Err(Error::InvalidPinnedStake(name.clone()));
        }
    } else if config.sizing_mode == SizingMode::BaseStakes
        && !instrument.base_stake.is_some_and(|b| b > dec!(0))
    {
        return Err(Error::InvalidBaseStake(name.clone()));
    }

    Ok(Leg {
        name: name.clone(),
        sector: instrument.sector.clone(),
        weight: instrument.weight,
        price,
        margin,
        base_stake: instrument.base_stake,
        pinned_stake: instrument.pinned_stake,
    })
}

/// A supplied string wins over the configured default. A supplied string that
/// does not parse is an error even when a default exists.
fn resolve(supplied: Option<&str>, configured: Option<Decimal>) -> Option<Decimal> {
    match supplied {
        Some(text) => parse_decimal(text),
        None => configured,
    }
}
