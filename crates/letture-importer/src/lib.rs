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

//! Letture Importer - The batch binaries
//!
//! `letture-csv-importer` reconciles supplier CSV exports into the recorder's
//! consumption statistics; `letture-cost-importer` re-reads those statistics
//! and accrues monthly index cost on top of them.

pub mod config;
pub mod error;
pub mod formats;
pub mod run;

pub use config::{ImporterConfig, load_config, save_config};
pub use error::{ImporterError, Result};
pub use formats::ImportBatch;
pub use run::IndexKind;
