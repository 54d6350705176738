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

//! Configuration for the importer binaries

use crate::error::{ImporterError, Result};
use letture_core::FixedPriceWindow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_gas_sensor() -> String {
    "lettura_gas".to_owned()
}

fn default_luce_sensor_prefix() -> String {
    "lettura_luce".to_owned()
}

fn default_psv_fixed_prices() -> Vec<FixedPriceWindow> {
    // Current gas supply contract: flat 0.505 EUR/Smc from September 2025.
    vec![FixedPriceWindow {
        from_year: 2025,
        from_month: 9,
        unit_price: Decimal::new(505, 3),
    }]
}

fn default_pun_fixed_prices() -> Vec<FixedPriceWindow> {
    // Current electricity supply contract: flat 0.122 EUR/kWh from
    // September 2025, all fasce.
    vec![FixedPriceWindow {
        from_year: 2025,
        from_month: 9,
        unit_price: Decimal::new(122, 3),
    }]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// Recorder sensor name for the gas meter (without the `sensor.` prefix)
    #[serde(default = "default_gas_sensor")]
    pub gas_sensor: String,

    /// Recorder sensor name prefix for the electricity meter; per-fascia
    /// sensors are `{prefix}_f1` .. `{prefix}_f3`
    #[serde(default = "default_luce_sensor_prefix")]
    pub luce_sensor_prefix: String,

    /// Fixed-price windows that override the PSV index
    #[serde(default = "default_psv_fixed_prices")]
    pub psv_fixed_prices: Vec<FixedPriceWindow>,

    /// Fixed-price windows that override the PUN index
    #[serde(default = "default_pun_fixed_prices")]
    pub pun_fixed_prices: Vec<FixedPriceWindow>,

    /// Custom index service base URL (overrides the default endpoint)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_base_url: Option<String>,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            gas_sensor: default_gas_sensor(),
            luce_sensor_prefix: default_luce_sensor_prefix(),
            psv_fixed_prices: default_psv_fixed_prices(),
            pun_fixed_prices: default_pun_fixed_prices(),
            index_base_url: None,
        }
    }
}

pub fn load_config(path: &Path) -> Result<ImporterConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ImporterError::Config(format!("Failed to parse config: {e}")))
    } else {
        // Create with defaults
        let config = ImporterConfig::default();
        save_config(path, &config)?;
        Ok(config)
    }
}

pub fn save_config(path: &Path, config: &ImporterConfig) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let content = serde_json::to_string_pretty(config)?;

    // Atomic write
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    Ok(())
}
