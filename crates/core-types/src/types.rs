// In crates/core-types/src/types.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The resolved margin requirement of one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MarginModel {
    /// Margin is `stake * price * margin_rate`.
    Rate { margin_rate: Decimal },
    /// Margin is linear in stake, anchored at the platform's minimum stake.
    MinStake {
        min_stake: Decimal,
        margin_at_min_stake: Decimal,
    },
}

impl MarginModel {
    /// Margin consumed by one unit of stake (one currency unit per point).
    ///
    /// Returns `None` when the value does not fit in a `Decimal`.
    pub fn margin_per_unit(&self, price: Decimal) -> Option<Decimal> {
        match *self {
            MarginModel::Rate { margin_rate } => price.checked_mul(margin_rate),
            MarginModel::MinStake {
                min_stake,
                margin_at_min_stake,
            } => {
                if min_stake > Decimal::ZERO {
                    margin_at_min_stake.checked_div(min_stake)
                } else {
                    Some(Decimal::ZERO)
                }
            }
        }
    }

    /// The smallest stake the platform allows, if any.
    pub fn floor(&self) -> Option<Decimal> {
        match *self {
            MarginModel::Rate { .. } => None,
            MarginModel::MinStake { min_stake, .. } => Some(min_stake),
        }
    }
}

/// One validated instrument ready for sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub name: String,
    pub sector: Option<String>,
    pub weight: Decimal,
    pub price: Decimal,
    pub margin: MarginModel,
    pub base_stake: Option<Decimal>,
    pub pinned_stake: Option<Decimal>,
}

impl Leg {
    pub fn margin_per_unit(&self) -> Option<Decimal> {
        self.margin.margin_per_unit(self.price)
    }
}

/// The canonical numeric request produced by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingRequest {
    pub account_balance: Decimal,
    /// A fraction in (0, 1).
    pub margin_usage: Decimal,
    pub legs: Vec<Leg>,
}

impl SizingRequest {
    /// The aggregate margin budget.
    pub fn target_margin(&self) -> Decimal {
        self.account_balance * self.margin_usage
    }
}

/// The stake chosen for one leg and the margin it consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedPosition {
    pub name: String,
    pub sector: Option<String>,
    pub price: Decimal,
    pub stake: Decimal,
    /// `stake * price`.
    pub notional: Decimal,
    pub margin_used: Decimal,
    /// The proportional margin share the leg was asked to hit.
    pub target_margin: Decimal,
    /// The minimum stake decided the size.
    pub floor_bound: bool,
    /// The stake was locked by configuration.
    pub pinned: bool,
}

/// Sums decimals, returning `None` instead of overflowing.
pub fn checked_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, Decimal::checked_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn margin_per_unit_by_model() {
        let rate = MarginModel::Rate { margin_rate: dec!(0.05) };
        assert_eq!(rate.margin_per_unit(dec!(100)), Some(dec!(5)));
        assert_eq!(rate.floor(), None);

        let min = MarginModel::MinStake {
            min_stake: dec!(0.04),
            margin_at_min_stake: dec!(5),
        };
        assert_eq!(min.margin_per_unit(dec!(5000)), Some(dec!(125)));
        assert_eq!(min.floor(), Some(dec!(0.04)));
    }

    #[test]
    fn margin_per_unit_out_of_range_is_none() {
        let min = MarginModel::MinStake {
            min_stake: dec!(0.00000000000000000000001),
            margin_at_min_stake: dec!(100000000),
        };
        assert_eq!(min.margin_per_unit(dec!(100)), None);

        let rate = MarginModel::Rate { margin_rate: Decimal::MAX };
        assert_eq!(rate.margin_per_unit(dec!(2)), None);
    }

    #[test]
    fn checked_sum_reports_overflow() {
        assert_eq!(checked_sum([dec!(1), dec!(2.5)]), Some(dec!(3.5)));
        assert_eq!(checked_sum(Vec::<Decimal>::new()), Some(dec!(0)));
        assert_eq!(checked_sum([Decimal::MAX, dec!(1)]), None);
    }
}
