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

//! Letture Core - The reading reconciliation and cost-accrual engine
//!
//! Pure logic only: turning unordered batches of cumulative meter readings
//! into monotonic per-period deltas, and deltas into accrued cost. All I/O
//! (recorder database, index service, CSV files) lives in sibling crates.

pub mod accrue;
pub mod error;
pub mod interval;
pub mod price;
pub mod reading;
pub mod reconcile;
pub mod series;

pub use accrue::{CostRecord, CostStream, accrue};
pub use error::{CoreError, Result};
pub use interval::{Interval, Period};
pub use price::{FixedPriceWindow, MonthlyQuote, PriceOracle, PriceQuote, PriceResolver};
pub use reading::{Commodity, Fascia, Reading};
pub use reconcile::{DeltaRecord, DeltaStream, ReconciliationState, reconcile};
pub use series::ReadingSeries;
