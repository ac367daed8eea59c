// In crates/allocation/src/engine.rs

use crate::deriver::{derive_pinned, derive_stake};
use crate::distributor::{self, MarginDistributor};
use crate::table::{ExcludedRow, validate_table};
use crate::validator::validate;
use crate::{Error, Result};
use analytics::{AnalyticsEngine, SizingResult};
use core_types::{DerivedPosition, Leg, PortfolioConfiguration, RawSizingRequest, RawTableRequest, SizingMode, SizingRequest};
use rust_decimal_macros::dec;
use serde::Serialize;

/// Sizes requests against one configured portfolio.
///
/// The engine holds no mutable state: every call validates a fresh snapshot,
/// runs the allocation and returns an owned result.
pub struct AllocationEngine<'a> {
    config: &'a PortfolioConfiguration,
    distributor: Box<dyn MarginDistributor + Send>,
    analytics: AnalyticsEngine,
}

impl<'a> AllocationEngine<'a> {
    pub fn new(config: &'a PortfolioConfiguration) -> Self {
        Self {
            config,
            distributor: distributor::for_mode(config.sizing_mode),
            analytics: AnalyticsEngine::new(),
        }
    }

    pub fn config(&self) -> &PortfolioConfiguration {
        self.config
    }

    /// Validate, distribute, derive and aggregate in one pass.
    pub fn size(&self, raw: &RawSizingRequest) -> Result<SizingResult> {
        let request = validate(self.config, raw)?;
        tracing::info!(
            portfolio = %self.config.name,
            distributor = self.distributor.name(),
            "Sizing portfolio."
        );
        allocate(&request, self.distributor.as_ref(), &self.analytics)
    }
}

/// The result of sizing a user-defined table, with the rows that were skipped.
#[derive(Debug, Clone, Serialize)]
pub struct TableSizing {
    pub result: SizingResult,
    pub excluded: Vec<ExcludedRow>,
}

/// Sizes a dynamic instrument table with proportional weights and floors.
pub fn size_table(raw: &RawTableRequest) -> Result<TableSizing> {
    let validation = validate_table(raw)?;
    let result = allocate(
        &validation.request,
        distributor::for_mode(SizingMode::TargetWeights).as_ref(),
        &AnalyticsEngine::new(),
    )?;
    Ok(TableSizing {
        result,
        excluded: validation.excluded,
    })
}

/// Runs the allocation over an already validated request.
///
/// Pinned legs are sized first and their margin is taken off the budget. The
/// rest of the budget is split by `distributor` over the unpinned legs, and
/// every share is turned into a stake.
pub fn allocate(
    request: &SizingRequest,
    distributor: &(dyn MarginDistributor + Send),
    analytics: &AnalyticsEngine,
) -> Result<SizingResult> {
    let target_margin = request.target_margin();

    let mut positions: Vec<Option<DerivedPosition>> = vec![None; request.legs.len()];
    let mut free: Vec<(usize, &Leg)> = Vec::new();
    let mut pinned_margin = dec!(0);

    for (idx, leg) in request.legs.iter().enumerate() {
        match leg.pinned_stake {
            Some(stake) => {
                let pos = derive_pinned(leg, stake)?;
                pinned_margin = pinned_margin
                    .checked_add(pos.margin_used)
                    .ok_or_else(|| Error::Overflow(leg.name.clone()))?;
                positions[idx] = Some(pos);
            }
            None => free.push((idx, leg)),
        }
    }

    let mut scale_factor = None;
    if !free.is_empty() {
        let budget = target_margin - pinned_margin;
        if budget <= dec!(0) {
            return Err(Error::DegenerateMarginConfiguration);
        }

        let free_legs: Vec<&Leg> = free.iter().map(|(_, leg)| *leg).collect();
        let distribution = distributor.distribute(budget, &free_legs)?;
        scale_factor = distribution.scale_factor;

        for ((idx, leg), share) in free.iter().zip(distribution.shares) {
            positions[*idx] = Some(derive_stake(leg, share)?);
        }
    }

    let positions: Vec<DerivedPosition> = positions.into_iter().flatten().collect();
    let floors_bound = positions.iter().filter(|p| p.floor_bound).count();
    let result = analytics.calculate(request.account_balance, target_margin, positions, scale_factor)?;

    tracing::info!(
        %target_margin,
        total_margin = %result.total_margin,
        total_notional = %result.total_notional,
        instruments = result.positions.len(),
        floors_bound,
        "Allocation complete."
    );

    Ok(result)
}
