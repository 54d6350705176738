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

//! Letture cost importer - Entry point for the cost pass

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use letture_importer::config::load_config;
use letture_importer::run::{IndexKind, import_costs};
use letture_indices::IndexClient;
use letture_recorder::RecorderDb;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "letture-cost-importer")]
#[command(about = "Accrue monthly index cost over recorded meter statistics", long_about = None)]
struct Cli {
    /// Which monthly index to price against
    #[arg(value_enum)]
    indice: IndexKind,

    /// Path to the Home Assistant recorder database
    #[arg(short, long, default_value = "home-assistant_v2.db")]
    database: PathBuf,

    /// Path to the importer configuration file
    #[arg(short, long, default_value = "letture_config.json")]
    config: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let client = match &config.index_base_url {
        Some(base_url) => IndexClient::with_base_url(base_url.clone()),
        None => IndexClient::new(),
    };

    let mut db = RecorderDb::open(&cli.database)?;
    import_costs(&mut db, cli.indice, &config, &client, Utc::now())?;

    info!("Done");
    Ok(())
}
