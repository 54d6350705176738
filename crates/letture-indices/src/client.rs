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

use letture_core::{Commodity, CoreError, Fascia, MonthlyQuote, Period, PriceOracle, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://indici.solare.cz";

/// HTTP client for the monthly index scraper service. One endpoint per
/// commodity; a 404 means the month has not been published yet and is
/// reported as "no quote", not as a failure.
#[derive(Debug)]
pub struct IndexClient {
    client: Client,
    base_url: String,
}

impl Default for IndexClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct PsvMonth {
    psv: rust_decimal::Decimal,
}

#[derive(Debug, Deserialize)]
struct PunMonth {
    f1: rust_decimal::Decimal,
    f2: rust_decimal::Decimal,
    f3: rust_decimal::Decimal,
}

impl IndexClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn get_month<T: DeserializeOwned>(&self, index: &str, period: Period) -> Result<Option<T>> {
        let url = format!(
            "{}/api/{index}/{}/{}",
            self.base_url, period.year, period.month
        );
        debug!(url, "fetching monthly index quote");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| CoreError::IndexLookup {
                period,
                reason: e.to_string(),
            })?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%period, index, "no quote published for period");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(CoreError::IndexLookup {
                period,
                reason: format!("HTTP {}", response.status()),
            });
        }
        response
            .json::<T>()
            .map(Some)
            .map_err(|e| CoreError::IndexLookup {
                period,
                reason: format!("invalid response body: {e}"),
            })
    }
}

impl PriceOracle for IndexClient {
    fn monthly_quote(&self, commodity: Commodity, period: Period) -> Result<Option<MonthlyQuote>> {
        match commodity {
            Commodity::Gas => Ok(self
                .get_month::<PsvMonth>("psv", period)?
                .map(|month| MonthlyQuote::Single(month.psv))),
            Commodity::Electricity => {
                Ok(self.get_month::<PunMonth>("pun", period)?.map(|month| {
                    MonthlyQuote::PerFascia(BTreeMap::from([
                        (Fascia::F1, month.f1),
                        (Fascia::F2, month.f2),
                        (Fascia::F3, month.f3),
                    ]))
                }))
            }
        }
    }
}
