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

//! Letture Recorder - Access to the Home Assistant recorder database
//!
//! The recorder is consumed, never owned: this crate looks series up in the
//! metadata tables, seeds reconciliation state from the latest persisted
//! rows, and overwrites `(state, sum)` on existing statistics buckets. It
//! never creates rows.

pub mod buckets;
pub mod db;
pub mod error;

pub use buckets::{BucketUpdate, StatisticsBucketUpdater};
pub use db::{RecorderDb, RecorderTx};
pub use error::{RecorderError, Result};
