// In crates/allocation/src/distributor.rs

use crate::deriver::{overflow, unit_margin};
use crate::{Error, Result};
use core_types::{Leg, SizingMode, checked_sum};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// The margin share assigned to each leg, in the order the legs were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub shares: Vec<Decimal>,
    /// The global factor applied to base stakes, when one was used.
    pub scale_factor: Option<Decimal>,
}

/// The universal interface for splitting a margin budget across legs.
///
/// A `MarginDistributor` only decides how much margin each leg *should*
/// consume. Turning that share into a stake, and enforcing any floor, is
/// left to the stake deriver.
pub trait MarginDistributor: Sync {
    /// The name of the distribution rule.
    fn name(&self) -> &'static str;

    /// Splits `budget` across `legs`.
    ///
    /// # Returns
    ///
    /// * `Ok(Distribution)`: one share per leg, summing to `budget`.
    /// * `Err(Error)`: if the legs give no usable basis for a split.
    fn distribute(&self, budget: Decimal, legs: &[&Leg]) -> Result<Distribution>;
}

/// Picks the distributor that implements a portfolio's sizing mode.
pub fn for_mode(mode: SizingMode) -> Box<dyn MarginDistributor + Send> {
    match mode {
        SizingMode::TargetWeights => Box::new(WeightedDistributor),
        SizingMode::BaseStakes => Box::new(BaseStakeDistributor),
    }
}

/// Splits the budget in proportion to normalized target weights.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedDistributor;

impl MarginDistributor for WeightedDistributor {
    fn name(&self) -> &'static str {
        "WeightedDistributor"
    }

    fn distribute(&self, budget: Decimal, legs: &[&Leg]) -> Result<Distribution> {
        let total_weight = checked_sum(legs.iter().map(|l| l.weight))
            .ok_or_else(|| Error::Overflow("the total weight".into()))?;
        if total_weight <= dec!(0) {
            return Err(Error::NoValidInstruments);
        }

        let shares = legs
            .iter()
            .map(|l| budget * (l.weight / total_weight))
            .collect();

        Ok(Distribution {
            shares,
            scale_factor: None,
        })
    }
}

/// Rescales a template of base stakes by a single factor so that the template
/// consumes exactly the budget.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseStakeDistributor;

impl MarginDistributor for BaseStakeDistributor {
    fn name(&self) -> &'static str {
        "BaseStakeDistributor"
    }

    fn distribute(&self, budget: Decimal, legs: &[&Leg]) -> Result<Distribution> {
        let base_margins = legs
            .iter()
            .map(|l| {
                l.base_stake
                    .unwrap_or(dec!(0))
                    .checked_mul(unit_margin(l)?)
                    .ok_or_else(|| overflow(l))
            })
            .collect::<Result<Vec<Decimal>>>()?;
        let current = checked_sum(base_margins.iter().copied())
            .ok_or_else(|| Error::Overflow("the base-stake template".into()))?;
        if current <= dec!(0) {
            return Err(Error::DegenerateBaseConfiguration);
        }

        let scale_factor = budget
            .checked_div(current)
            .ok_or_else(|| Error::Overflow("the base-stake template".into()))?;
        tracing::debug!(%current, %scale_factor, "Rescaling base stakes.");

        let shares = base_margins
            .iter()
            .zip(legs)
            .map(|(m, l)| m.checked_mul(scale_factor).ok_or_else(|| overflow(l)))
            .collect::<Result<Vec<Decimal>>>()?;
        Ok(Distribution {
            shares,
            scale_factor: Some(scale_factor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::MarginModel;

    fn leg(name: &str, weight: Decimal, price: Decimal, rate: Decimal, base: Option<Decimal>) -> Leg {
        Leg {
            name: name.to_string(),
            sector: None,
            weight,
            price,
            margin: MarginModel::Rate { margin_rate: rate },
            base_stake: base,
            pinned_stake: None,
        }
    }

    #[test]
    fn weighted_split_normalizes_weights() {
        let a = leg("A", dec!(3), dec!(100), dec!(0.05), None);
        let b = leg("B", dec!(1), dec!(100), dec!(0.05), None);
        let dist = WeightedDistributor.distribute(dec!(2000), &[&a, &b]).unwrap();
        assert_eq!(dist.shares, [dec!(1500), dec!(500)]);
        assert_eq!(dist.scale_factor, None);
    }

    #[test]
    fn weighted_split_needs_positive_weight() {
        let a = leg("A", dec!(0), dec!(100), dec!(0.05), None);
        let err = WeightedDistributor.distribute(dec!(2000), &[&a]).unwrap_err();
        assert_eq!(err, Error::NoValidInstruments);
    }

    #[test]
    fn base_stakes_share_one_scale_factor() {
        // Base margins: 2 * 100 * 0.05 = 10 and 1 * 200 * 0.05 = 10.
        let a = leg("A", dec!(0), dec!(100), dec!(0.05), Some(dec!(2)));
        let b = leg("B", dec!(0), dec!(200), dec!(0.05), Some(dec!(1)));
        let dist = BaseStakeDistributor.distribute(dec!(1000), &[&a, &b]).unwrap();
        assert_eq!(dist.scale_factor, Some(dec!(50)));
        assert_eq!(dist.shares, [dec!(500), dec!(500)]);
    }

    #[test]
    fn oversized_weights_are_an_error() {
        let a = leg("A", Decimal::MAX, dec!(100), dec!(0.05), None);
        let b = leg("B", Decimal::MAX, dec!(100), dec!(0.05), None);
        let err = WeightedDistributor.distribute(dec!(2000), &[&a, &b]).unwrap_err();
        assert_eq!(err, Error::Overflow("the total weight".into()));
    }

    #[test]
    fn base_stakes_without_margin_are_degenerate() {
        let a = Leg {
            margin: MarginModel::MinStake {
                min_stake: dec!(1),
                margin_at_min_stake: dec!(0),
            },
            ..leg("A", dec!(0), dec!(100), dec!(0.05), Some(dec!(2)))
        };
        let err = BaseStakeDistributor.distribute(dec!(1000), &[&a]).unwrap_err();
        assert_eq!(err, Error::DegenerateBaseConfiguration);
    }

    #[test]
    fn mode_selects_distributor() {
        assert_eq!(for_mode(SizingMode::TargetWeights).name(), "WeightedDistributor");
        assert_eq!(for_mode(SizingMode::BaseStakes).name(), "BaseStakeDistributor");
    }
}
