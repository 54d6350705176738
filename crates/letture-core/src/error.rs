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

//! Error types for the core engine

use crate::interval::Period;
use crate::reading::Fascia;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A quote WAS found but its price is not strictly positive. This points
    /// at corrupt reference data and aborts the run, unlike a missing quote
    /// which only skips the interval.
    #[error("non-positive unit price {price} resolved for {period}")]
    InvalidQuote { period: Period, price: Decimal },

    #[error("monthly quote for {period} carries no value for fascia {fascia:?}")]
    FasciaProjection {
        period: Period,
        fascia: Option<Fascia>,
    },

    /// The index service could not be queried (transport, HTTP or decode
    /// failure). Distinct from "no data for that month", which is not an
    /// error at all; recovery is the same skip.
    #[error("index lookup for {period} failed: {reason}")]
    IndexLookup { period: Period, reason: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
