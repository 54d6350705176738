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

//! Letture CSV importer - Entry point for the readings pass

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use letture_importer::config::load_config;
use letture_importer::formats::read_readings;
use letture_importer::run::import_readings;
use letture_recorder::RecorderDb;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "letture-csv-importer")]
#[command(about = "Import supplier meter-reading CSV exports into the Home Assistant recorder", long_about = None)]
struct Cli {
    /// Path to the supplier CSV export
    csv: PathBuf,

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

    let batch = read_readings(&cli.csv)?;
    let mut db = RecorderDb::open(&cli.database)?;
    import_readings(&mut db, batch, &config, Utc::now())?;

    info!("Done");
    Ok(())
}
