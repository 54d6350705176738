// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Letture.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Cost accrual over a delta stream.

use crate::error::{CoreError, Result};
use crate::interval::Interval;
use crate::price::PriceResolver;
use crate::reading::Fascia;
use crate::reconcile::DeltaRecord;
use rust_decimal::Decimal;
use tracing::warn;

/// One successfully priced interval. `cumulative_cost` is carried at full
/// precision; rounding happens only at the point of persistence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostRecord {
    pub interval: Interval,
    pub cost: Decimal,
    pub cumulative_cost: Decimal,
}

/// Price each delta with the unit price of the month its interval starts in.
///
/// An interval without a resolvable price is skipped: no record, cumulative
/// cost unchanged. The gap is permanent until a later re-run finds the quote.
/// A lookup failure recovers the same way; only a defective quote (non-
/// positive price, impossible fascia projection) surfaces as `Err` and
/// aborts the run.
pub fn accrue<'r, I>(
    deltas: I,
    resolver: &'r PriceResolver<'r>,
    fascia: Option<Fascia>,
    initial_cost: Decimal,
) -> CostStream<'r, I>
where
    I: Iterator<Item = DeltaRecord>,
{
    CostStream {
        deltas,
        resolver,
        fascia,
        cumulative: initial_cost,
    }
}

/// Lazy stream of priced intervals; see [`accrue`].
#[derive(Debug)]
pub struct CostStream<'r, I> {
    deltas: I,
    resolver: &'r PriceResolver<'r>,
    fascia: Option<Fascia>,
    cumulative: Decimal,
}

impl<I> Iterator for CostStream<'_, I>
where
    I: Iterator<Item = DeltaRecord>,
{
    type Item = Result<CostRecord>;

    fn next(&mut self) -> Option<Result<CostRecord>> {
        loop {
            let record = self.deltas.next()?;
            let period = record.interval.period();
            match self.resolver.resolve(period, self.fascia) {
                Ok(Some(quote)) => {
                    let cost = record.delta * quote.unit_price;
                    self.cumulative += cost;
                    return Some(Ok(CostRecord {
                        interval: record.interval,
                        cost,
                        cumulative_cost: self.cumulative,
                    }));
                }
                Ok(None) => {
                    warn!(%period, delta = %record.delta, "no unit price for period, skipping interval");
                    continue;
                }
                Err(error @ CoreError::IndexLookup { .. }) => {
                    warn!(%period, %error, "index lookup failed, skipping interval");
                    continue;
                }
                Err(error) => return Some(Err(error)),
            }
        }
    }
}
