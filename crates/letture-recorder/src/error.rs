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

//! Error types for the recorder crate

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecorderError {
    /// The importer never creates the recorder database; pointing it at a
    /// missing file is a startup error, not a reason to make an empty one.
    #[error("no recorder database at {0}")]
    DatabaseMissing(PathBuf),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// The series name has no mapping in the recorder's metadata tables.
    /// Fatal for that series only; siblings in the batch still process.
    #[error("no recorder metadata for '{id}'")]
    MetadataNotFound { id: String },

    #[error("unusable stored value: {0}")]
    Value(String),
}

pub type Result<T> = std::result::Result<T, RecorderError>;
