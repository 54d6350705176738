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

//! Error types for the importer binaries

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImporterError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("config serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{0}' is not a recognized supplier export")]
    UnrecognizedFormat(PathBuf),

    #[error("row parse error: {0}")]
    InvalidRow(String),

    #[error("reconciliation error: {0}")]
    Core(#[from] letture_core::CoreError),

    #[error("recorder error: {0}")]
    Recorder(#[from] letture_recorder::RecorderError),

    #[error("{0} series could not be processed")]
    SeriesFailed(usize),
}

pub type Result<T> = std::result::Result<T, ImporterError>;
