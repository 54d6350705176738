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

//! Orchestration of the two batch passes.
//!
//! The readings pass reconciles a CSV batch into the recorder's consumption
//! statistics; the cost pass re-reads those statistics as a reading series
//! and accrues index cost into the matching `_cost` statistics. Each pass
//! runs inside one transaction: a series without recorder metadata is
//! skipped and reported at the end, any other failure rolls everything back.

use crate::config::ImporterConfig;
use crate::error::{ImporterError, Result};
use crate::formats::ImportBatch;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use letture_core::{
    Commodity, Fascia, PriceOracle, PriceResolver, Reading, ReadingSeries, ReconciliationState,
    accrue, reconcile,
};
use letture_recorder::{BucketUpdate, RecorderDb, RecorderError, RecorderTx, StatisticsBucketUpdater};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Which monthly index the cost pass prices against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndexKind {
    /// Gas, priced by the PSV index
    Psv,
    /// Electricity, priced per fascia by the PUN index
    Pun,
}

/// Reconcile a parsed CSV batch into consumption states and statistics.
pub fn import_readings(
    db: &mut RecorderDb,
    batch: ImportBatch,
    config: &ImporterConfig,
    now: DateTime<Utc>,
) -> Result<()> {
    let series: Vec<(String, Vec<Reading>)> = match batch {
        ImportBatch::Gas(readings) => vec![(config.gas_sensor.clone(), readings)],
        ImportBatch::Electricity(per_fascia) => per_fascia
            .into_iter()
            .map(|(fascia, readings)| (luce_sensor(config, fascia), readings))
            .collect(),
    };

    let tx = db.transaction()?;
    let mut failed = 0usize;
    for (sensor, readings) in series {
        match import_series(&tx, &sensor, readings, now) {
            Ok(imported) => info!(sensor, imported, "series reconciled"),
            Err(ImporterError::Recorder(RecorderError::MetadataNotFound { ref id })) => {
                warn!(sensor, id, "no recorder metadata for series, skipping");
                failed += 1;
            }
            Err(e) => return Err(e),
        }
    }
    tx.commit()?;

    if failed > 0 {
        return Err(ImporterError::SeriesFailed(failed));
    }
    Ok(())
}

fn import_series(
    tx: &RecorderTx<'_>,
    sensor: &str,
    readings: Vec<Reading>,
    now: DateTime<Utc>,
) -> Result<usize> {
    let entity_id = format!("sensor.{sensor}");
    let state_metadata_id = tx.state_metadata_id(&entity_id)?;
    let statistics_metadata_id = tx.statistics_metadata_id(&entity_id)?;

    let current = tx.latest_state(state_metadata_id)?.unwrap_or(Decimal::ZERO);
    info!(sensor, state = %current, "importing readings");

    let series = ReadingSeries::normalize(readings);
    let initial = ReconciliationState {
        cumulative_value: current,
        cumulative_cost: Decimal::ZERO,
    };
    let updater = StatisticsBucketUpdater::with_short_term(tx, statistics_metadata_id);
    // The recorder's running sum and the meter counter differ by whatever
    // the sum accumulated before this meter was tracked; carry that offset
    // forward so overwritten buckets stay continuous with older ones. It is
    // seeded from the last bucket strictly before the first accepted
    // reading, which may be later than the first reading in the batch.
    let mut sum_offset = None;
    let mut imported = 0usize;
    for record in reconcile(series, &initial, now) {
        let offset = match sum_offset {
            Some(offset) => offset,
            None => {
                let offset = tx
                    .latest_bucket_before(statistics_metadata_id, record.interval.from)?
                    .map_or(Decimal::ZERO, |(state, sum)| sum - state);
                sum_offset = Some(offset);
                offset
            }
        };
        tx.overwrite_states(state_metadata_id, &record.interval, record.cumulative)?;
        updater.apply(&BucketUpdate {
            interval: record.interval,
            state: record.cumulative,
            sum: record.cumulative + offset,
        })?;
        imported += 1;
    }
    Ok(imported)
}

/// Accrue index cost over the consumption statistics already in the store.
pub fn import_costs(
    db: &mut RecorderDb,
    index: IndexKind,
    config: &ImporterConfig,
    oracle: &dyn PriceOracle,
    now: DateTime<Utc>,
) -> Result<()> {
    let (commodity, windows) = match index {
        IndexKind::Psv => (Commodity::Gas, config.psv_fixed_prices.clone()),
        IndexKind::Pun => (Commodity::Electricity, config.pun_fixed_prices.clone()),
    };
    let targets: Vec<(String, Option<Fascia>)> = match index {
        IndexKind::Psv => vec![(config.gas_sensor.clone(), None)],
        IndexKind::Pun => Fascia::BILLED
            .iter()
            .map(|fascia| (luce_sensor(config, *fascia), Some(*fascia)))
            .collect(),
    };
    let resolver = PriceResolver::new(commodity, windows, oracle);

    let tx = db.transaction()?;
    let mut failed = 0usize;
    for (sensor, fascia) in targets {
        match accrue_series(&tx, &sensor, fascia, &resolver, now) {
            Ok(priced) => info!(sensor, priced, "cost accrued"),
            Err(ImporterError::Recorder(RecorderError::MetadataNotFound { ref id })) => {
                warn!(sensor, id, "no recorder metadata for series, skipping");
                failed += 1;
            }
            Err(e) => return Err(e),
        }
    }
    tx.commit()?;

    if failed > 0 {
        return Err(ImporterError::SeriesFailed(failed));
    }
    Ok(())
}

fn accrue_series(
    tx: &RecorderTx<'_>,
    sensor: &str,
    fascia: Option<Fascia>,
    resolver: &PriceResolver<'_>,
    now: DateTime<Utc>,
) -> Result<usize> {
    let statistic_id = format!("sensor.{sensor}");
    let reading_metadata_id = tx.statistics_metadata_id(&statistic_id)?;
    let cost_metadata_id = tx.statistics_metadata_id(&format!("{statistic_id}_cost"))?;

    let buckets = tx.consumption_buckets(reading_metadata_id)?;
    if buckets.is_empty() {
        info!(sensor, "no consumption history, nothing to accrue");
        return Ok(0);
    }

    // Each bucket state is a cumulative reading; the first one only seeds
    // the state, so the series starts costing from the second bucket on.
    // Cumulative cost restarts at zero every run (full recompute).
    let first_state = buckets[0].1;
    let readings = buckets
        .into_iter()
        .map(|(start, state)| Reading {
            taken_at: start,
            fascia,
            value: state,
        })
        .collect();
    let initial = ReconciliationState {
        cumulative_value: first_state,
        cumulative_cost: Decimal::ZERO,
    };

    let updater = StatisticsBucketUpdater::long_term(tx, cost_metadata_id);
    let deltas = reconcile(ReadingSeries::normalize(readings), &initial, now);
    let mut priced = 0usize;
    for record in accrue(deltas, resolver, fascia, Decimal::ZERO) {
        let record = record?;
        let total = record.cumulative_cost.round_dp(2);
        updater.apply(&BucketUpdate {
            interval: record.interval,
            state: total,
            sum: total,
        })?;
        priced += 1;
    }
    Ok(priced)
}

fn luce_sensor(config: &ImporterConfig, fascia: Fascia) -> String {
    format!("{}_f{}", config.luce_sensor_prefix, fascia.number())
}
