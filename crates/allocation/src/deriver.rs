// In crates/allocation/src/deriver.rs

use crate::{Error, Result};
use core_types::{DerivedPosition, Leg, MarginModel};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Converts a leg's margin share into a stake.
///
/// The ideal stake is `target_margin / margin_per_unit`. A minimum stake, when
/// the margin model has one, is applied afterwards and wins. The surplus margin
/// a binding floor creates is reported, never taken back from other legs.
///
/// Fails with [`Error::Overflow`] when any derived quantity does not fit in a
/// `Decimal`.
pub fn derive_stake(leg: &Leg, target_margin: Decimal) -> Result<DerivedPosition> {
    let margin_per_unit = unit_margin(leg)?;

    // No margin information: hold the platform minimum and charge its margin as-is.
    if margin_per_unit <= dec!(0) {
        let (stake, margin_used) = match leg.margin {
            MarginModel::MinStake {
                min_stake,
                margin_at_min_stake,
            } => (min_stake, margin_at_min_stake),
            MarginModel::Rate { .. } => (dec!(0), dec!(0)),
        };
        return position(leg, stake, margin_used, target_margin, true, false);
    }

    let ideal_stake = target_margin
        .checked_div(margin_per_unit)
        .ok_or_else(|| overflow(leg))?;
    let (stake, floor_bound) = match leg.margin.floor() {
        Some(floor) if ideal_stake < floor => (floor, true),
        _ => (ideal_stake, false),
    };
    let margin_used = stake.checked_mul(margin_per_unit).ok_or_else(|| overflow(leg))?;

    tracing::debug!(
        instrument = %leg.name,
        %target_margin,
        %ideal_stake,
        %stake,
        %margin_used,
        floor_bound,
        "Derived stake."
    );

    position(leg, stake, margin_used, target_margin, floor_bound, false)
}

/// Sizes a leg whose stake is locked by configuration.
pub fn derive_pinned(leg: &Leg, stake: Decimal) -> Result<DerivedPosition> {
    let margin_used = stake
        .checked_mul(unit_margin(leg)?)
        .ok_or_else(|| overflow(leg))?;
    tracing::debug!(instrument = %leg.name, %stake, %margin_used, "Pinned stake.");
    position(leg, stake, margin_used, margin_used, false, true)
}

pub(crate) fn unit_margin(leg: &Leg) -> Result<Decimal> {
    leg.margin_per_unit().ok_or_else(|| overflow(leg))
}

pub(crate) fn overflow(leg: &Leg) -> Error {
    tracing::warn!(instrument = %leg.name, "Sizing arithmetic out of range.");
    Error::Overflow(leg.name.clone())
}

fn position(
    leg: &Leg,
    stake: Decimal,
    margin_used: Decimal,
    target_margin: Decimal,
    floor_bound: bool,
    pinned: bool,
) -> Result<DerivedPosition> {
    let notional = stake.checked_mul(leg.price).ok_or_else(|| overflow(leg))?;
    Ok(DerivedPosition {
        name: leg.name.clone(),
        sector: leg.sector.clone(),
        price: leg.price,
        stake,
        notional,
        margin_used,
        target_margin,
        floor_bound,
        pinned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_stake_leg(min_stake: Decimal, margin_at_min_stake: Decimal) -> Leg {
        Leg {
            name: "US 500".into(),
            sector: Some("Equity".into()),
            weight: dec!(1),
            price: dec!(5000),
            margin: MarginModel::MinStake {
                min_stake,
                margin_at_min_stake,
            },
            base_stake: None,
            pinned_stake: None,
        }
    }

    #[test]
    fn flat_rate_realizes_target_exactly() {
        let leg = Leg {
            margin: MarginModel::Rate { margin_rate: dec!(0.05) },
            price: dec!(100),
            ..min_stake_leg(dec!(1), dec!(1))
        };
        let pos = derive_stake(&leg, dec!(1000)).unwrap();
        assert_eq!(pos.stake, dec!(200));
        assert_eq!(pos.margin_used, dec!(1000));
        assert_eq!(pos.notional, dec!(20000));
        assert!(!pos.floor_bound);
    }

    #[test]
    fn floor_binds_and_margin_exceeds_share() {
        let pos = derive_stake(&min_stake_leg(dec!(0.04), dec!(5)), dec!(2)).unwrap();
        assert_eq!(pos.stake, dec!(0.04));
        assert_eq!(pos.margin_used, dec!(5));
        assert_eq!(pos.target_margin, dec!(2));
        assert!(pos.floor_bound);
    }

    #[test]
    fn floor_not_binding_hits_share() {
        let pos = derive_stake(&min_stake_leg(dec!(0.04), dec!(5)), dec!(250)).unwrap();
        assert_eq!(pos.stake, dec!(2));
        assert_eq!(pos.margin_used, dec!(250));
        assert!(!pos.floor_bound);
    }

    #[test]
    fn zero_margin_pins_to_minimum() {
        let pos = derive_stake(&min_stake_leg(dec!(0.5), dec!(0)), dec!(300)).unwrap();
        assert_eq!(pos.stake, dec!(0.5));
        assert_eq!(pos.margin_used, dec!(0));
        assert!(pos.floor_bound);
    }

    #[test]
    fn pinned_leg_reports_own_margin_as_target() {
        let pos = derive_pinned(&min_stake_leg(dec!(0.04), dec!(5)), dec!(1)).unwrap();
        assert_eq!(pos.stake, dec!(1));
        assert_eq!(pos.margin_used, dec!(125));
        assert_eq!(pos.target_margin, dec!(125));
        assert!(pos.pinned);
    }

    #[test]
    fn tiny_margin_per_unit_overflows_notional() {
        // 1e-25 per point makes the ideal stake 2e28; at 100 per point its
        // notional no longer fits.
        let leg = Leg {
            price: dec!(100),
            ..min_stake_leg(dec!(1), dec!(0.0000000000000000000000001))
        };
        let err = derive_stake(&leg, dec!(2000)).unwrap_err();
        assert_eq!(err, Error::Overflow("US 500".into()));
    }

    #[test]
    fn huge_margin_per_unit_is_an_error() {
        let leg = min_stake_leg(dec!(0.00000000000000000000001), dec!(100000000));
        assert_eq!(derive_stake(&leg, dec!(2000)).unwrap_err(), Error::Overflow("US 500".into()));
        assert_eq!(derive_pinned(&leg, dec!(1)).unwrap_err(), Error::Overflow("US 500".into()));
    }
}
