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

//! Unit price resolution: fixed-price windows first, then the index oracle.

use crate::error::{CoreError, Result};
use crate::interval::Period;
use crate::reading::{Commodity, Fascia};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One month's quote as published by the index source. PSV is a single
/// value; PUN carries one value per billed fascia, selected by key.
#[derive(Debug, Clone, PartialEq)]
pub enum MonthlyQuote {
    Single(Decimal),
    PerFascia(BTreeMap<Fascia, Decimal>),
}

impl MonthlyQuote {
    /// Project the component that applies to `fascia`. `None` when the
    /// quote does not carry a value for that selection.
    pub fn project(&self, fascia: Option<Fascia>) -> Option<Decimal> {
        match self {
            Self::Single(price) => fascia.is_none().then_some(*price),
            Self::PerFascia(prices) => fascia.and_then(|f| prices.get(&f).copied()),
        }
    }
}

/// A resolved unit price for one commodity, period and fascia.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub period: Period,
    pub fascia: Option<Fascia>,
    pub unit_price: Decimal,
}

/// "From month M of year Y onward, the price is P". Used for periods the
/// index source has no data for yet, typically the current supply contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedPriceWindow {
    pub from_year: i32,
    pub from_month: u32,
    pub unit_price: Decimal,
}

impl FixedPriceWindow {
    pub fn start(&self) -> Period {
        Period {
            year: self.from_year,
            month: self.from_month,
        }
    }

    pub fn covers(&self, period: Period) -> bool {
        period >= self.start()
    }
}

/// The external monthly index source. `Ok(None)` means the source has no
/// quote for that month; `Err` means the lookup itself failed.
pub trait PriceOracle {
    fn monthly_quote(&self, commodity: Commodity, period: Period) -> Result<Option<MonthlyQuote>>;
}

/// Resolves unit prices for one commodity: configured fixed-price windows
/// take precedence over the oracle, and every resolved price is validated
/// to be strictly positive before it reaches a caller.
pub struct PriceResolver<'a> {
    commodity: Commodity,
    fixed_windows: Vec<FixedPriceWindow>,
    oracle: &'a dyn PriceOracle,
}

impl std::fmt::Debug for PriceResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceResolver")
            .field("commodity", &self.commodity)
            .field("fixed_windows", &self.fixed_windows)
            .finish_non_exhaustive()
    }
}

impl<'a> PriceResolver<'a> {
    pub fn new(
        commodity: Commodity,
        fixed_windows: Vec<FixedPriceWindow>,
        oracle: &'a dyn PriceOracle,
    ) -> Self {
        Self {
            commodity,
            fixed_windows,
            oracle,
        }
    }

    pub fn commodity(&self) -> Commodity {
        self.commodity
    }

    /// `Ok(None)` is a normal pricing gap and never fatal. With several
    /// fixed windows covering the period, the latest-starting one wins.
    pub fn resolve(&self, period: Period, fascia: Option<Fascia>) -> Result<Option<PriceQuote>> {
        if let Some(window) = self
            .fixed_windows
            .iter()
            .filter(|w| w.covers(period))
            .max_by_key(|w| w.start())
        {
            return validated(period, fascia, window.unit_price).map(Some);
        }

        let Some(quote) = self.oracle.monthly_quote(self.commodity, period)? else {
            return Ok(None);
        };
        let unit_price = quote
            .project(fascia)
            .ok_or(CoreError::FasciaProjection { period, fascia })?;
        validated(period, fascia, unit_price).map(Some)
    }
}

fn validated(period: Period, fascia: Option<Fascia>, unit_price: Decimal) -> Result<PriceQuote> {
    if unit_price <= Decimal::ZERO {
        return Err(CoreError::InvalidQuote {
            period,
            price: unit_price,
        });
    }
    Ok(PriceQuote {
        period,
        fascia,
        unit_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct StaticOracle(Option<MonthlyQuote>);

    impl PriceOracle for StaticOracle {
        fn monthly_quote(
            &self,
            _commodity: Commodity,
            _period: Period,
        ) -> Result<Option<MonthlyQuote>> {
            Ok(self.0.clone())
        }
    }

    fn period(year: i32, month: u32) -> Period {
        Period { year, month }
    }

    fn window(year: i32, month: u32, price: Decimal) -> FixedPriceWindow {
        FixedPriceWindow {
            from_year: year,
            from_month: month,
            unit_price: price,
        }
    }

    #[test]
    fn test_fixed_window_takes_precedence_over_oracle() {
        let oracle = StaticOracle(Some(MonthlyQuote::Single(dec!(0.999))));
        let resolver =
            PriceResolver::new(Commodity::Gas, vec![window(2025, 9, dec!(0.505))], &oracle);
        let quote = resolver.resolve(period(2025, 10), None).unwrap().unwrap();
        assert_eq!(quote.unit_price, dec!(0.505));
    }

    #[test]
    fn test_period_before_fixed_window_uses_oracle() {
        let oracle = StaticOracle(Some(MonthlyQuote::Single(dec!(0.478))));
        let resolver =
            PriceResolver::new(Commodity::Gas, vec![window(2025, 9, dec!(0.505))], &oracle);
        let quote = resolver.resolve(period(2025, 3), None).unwrap().unwrap();
        assert_eq!(quote.unit_price, dec!(0.478));
    }

    #[test]
    fn test_latest_starting_window_wins() {
        let oracle = StaticOracle(None);
        let resolver = PriceResolver::new(
            Commodity::Gas,
            vec![window(2024, 1, dec!(0.60)), window(2025, 9, dec!(0.505))],
            &oracle,
        );
        let quote = resolver.resolve(period(2025, 12), None).unwrap().unwrap();
        assert_eq!(quote.unit_price, dec!(0.505));
    }

    #[test]
    fn test_missing_quote_is_not_an_error() {
        let oracle = StaticOracle(None);
        let resolver = PriceResolver::new(Commodity::Gas, Vec::new(), &oracle);
        assert!(resolver.resolve(period(2025, 1), None).unwrap().is_none());
    }

    #[test]
    fn test_non_positive_price_is_fatal() {
        let oracle = StaticOracle(Some(MonthlyQuote::Single(dec!(0))));
        let resolver = PriceResolver::new(Commodity::Gas, Vec::new(), &oracle);
        let err = resolver.resolve(period(2025, 1), None).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuote { .. }));
    }

    #[test]
    fn test_per_fascia_projection() {
        let quote = MonthlyQuote::PerFascia(BTreeMap::from([
            (Fascia::F1, dec!(0.152)),
            (Fascia::F2, dec!(0.148)),
            (Fascia::F3, dec!(0.121)),
        ]));
        assert_eq!(quote.project(Some(Fascia::F2)), Some(dec!(0.148)));
        assert_eq!(quote.project(Some(Fascia::F4)), None);
        assert_eq!(quote.project(None), None);
    }

    #[test]
    fn test_projecting_missing_fascia_is_fatal() {
        let oracle = StaticOracle(Some(MonthlyQuote::PerFascia(BTreeMap::from([(
            Fascia::F1,
            dec!(0.152),
        )]))));
        let resolver = PriceResolver::new(Commodity::Electricity, Vec::new(), &oracle);
        let err = resolver
            .resolve(period(2025, 1), Some(Fascia::F3))
            .unwrap_err();
        assert!(matches!(err, CoreError::FasciaProjection { .. }));
    }

    #[test]
    fn test_single_quote_needs_no_fascia() {
        let oracle = StaticOracle(Some(MonthlyQuote::Single(dec!(0.478))));
        let resolver = PriceResolver::new(Commodity::Gas, Vec::new(), &oracle);
        let err = resolver
            .resolve(period(2025, 1), Some(Fascia::F1))
            .unwrap_err();
        assert!(matches!(err, CoreError::FasciaProjection { .. }));
    }
}
