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

use crate::error::{RecorderError, Result};
use chrono::{DateTime, Utc};
use letture_core::Interval;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, params};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;
use tracing::debug;

/// Handle to an existing recorder database, opened read-write.
#[derive(Debug)]
pub struct RecorderDb {
    conn: Connection,
}

impl RecorderDb {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RecorderError::DatabaseMissing(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        Ok(Self { conn })
    }

    /// All mutations of one run happen inside a single transaction; it is
    /// rolled back on drop unless [`RecorderTx::commit`] runs.
    pub fn transaction(&mut self) -> Result<RecorderTx<'_>> {
        Ok(RecorderTx {
            tx: self.conn.transaction()?,
        })
    }
}

/// Scoped transaction over the recorder schema.
#[derive(Debug)]
pub struct RecorderTx<'c> {
    pub(crate) tx: rusqlite::Transaction<'c>,
}

impl RecorderTx<'_> {
    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    /// Metadata id of the current-value representation of a series.
    pub fn state_metadata_id(&self, entity_id: &str) -> Result<i64> {
        self.tx
            .query_row(
                "SELECT metadata_id FROM states_meta WHERE entity_id = ?1",
                params![entity_id],
                |row| row.get(0),
            )
            .map_err(|e| metadata_error(e, entity_id))
    }

    /// Metadata id of the historical-statistics representation of a series.
    pub fn statistics_metadata_id(&self, statistic_id: &str) -> Result<i64> {
        self.tx
            .query_row(
                "SELECT id FROM statistics_meta WHERE statistic_id = ?1",
                params![statistic_id],
                |row| row.get(0),
            )
            .map_err(|e| metadata_error(e, statistic_id))
    }

    /// Latest persisted state of a series, seeding the reconciliation.
    pub fn latest_state(&self, state_metadata_id: i64) -> Result<Option<Decimal>> {
        let value = self.tx.query_row(
            "SELECT state FROM states WHERE metadata_id = ?1 ORDER BY state_id DESC LIMIT 1",
            params![state_metadata_id],
            |row| row.get::<_, Value>(0),
        );
        match value {
            Ok(value) => decimal_from_sql(value).map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RecorderError::Db(e)),
        }
    }

    /// Latest `(state, sum)` bucket strictly before `ts`. Seeds the offset
    /// between a series' running sum and its cumulative meter value.
    pub fn latest_bucket_before(
        &self,
        statistics_metadata_id: i64,
        ts: DateTime<Utc>,
    ) -> Result<Option<(Decimal, Decimal)>> {
        let row = self.tx.query_row(
            "SELECT state, sum FROM statistics
             WHERE metadata_id = ?1 AND start_ts < ?2
             ORDER BY start_ts DESC LIMIT 1",
            params![statistics_metadata_id, epoch_ts(ts)],
            |row| {
                Ok((
                    row.get::<_, Option<f64>>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                ))
            },
        );
        match row {
            Ok((state, sum)) => Ok(Some((
                decimal_from_real(state.unwrap_or(0.0))?,
                decimal_from_real(sum.unwrap_or(0.0))?,
            ))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RecorderError::Db(e)),
        }
    }

    /// All long-term buckets of a consumption series, oldest first. Each
    /// bucket's state is a cumulative meter value; the cost pass re-reads
    /// them as a reading series.
    pub fn consumption_buckets(
        &self,
        statistics_metadata_id: i64,
    ) -> Result<Vec<(DateTime<Utc>, Decimal)>> {
        let mut stmt = self.tx.prepare(
            "SELECT start_ts, state FROM statistics WHERE metadata_id = ?1 ORDER BY start_ts",
        )?;
        let rows = stmt.query_map(params![statistics_metadata_id], |row| {
            Ok((row.get::<_, f64>(0)?, row.get::<_, Option<f64>>(1)?))
        })?;
        let mut buckets = Vec::new();
        for row in rows {
            let (start_ts, state) = row?;
            let Some(state) = state else {
                debug!(start_ts, "bucket without state, ignoring");
                continue;
            };
            buckets.push((datetime_from_epoch(start_ts)?, decimal_from_real(state)?));
        }
        Ok(buckets)
    }

    /// Overwrite the current-value rows of a series that fall inside the
    /// interval. Rows carrying their own change timestamps are left alone.
    pub fn overwrite_states(
        &self,
        state_metadata_id: i64,
        interval: &Interval,
        state: Decimal,
    ) -> Result<usize> {
        let touched = self.tx.execute(
            "UPDATE states
             SET state = ?1
             WHERE last_changed_ts IS NULL
               AND metadata_id = ?2
               AND last_reported_ts IS NULL
               AND last_updated_ts >= ?3
               AND last_updated_ts < ?4",
            params![
                state.to_string(),
                state_metadata_id,
                epoch_ts(interval.from),
                epoch_ts(interval.to)
            ],
        )?;
        Ok(touched)
    }
}

fn metadata_error(e: rusqlite::Error, id: &str) -> RecorderError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => RecorderError::MetadataNotFound { id: id.to_owned() },
        other => RecorderError::Db(other),
    }
}

pub(crate) fn epoch_ts(ts: DateTime<Utc>) -> f64 {
    ts.timestamp() as f64
}

pub(crate) fn datetime_from_epoch(ts: f64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts as i64, 0)
        .ok_or_else(|| RecorderError::Value(format!("timestamp {ts} out of range")))
}

pub(crate) fn decimal_from_real(value: f64) -> Result<Decimal> {
    Decimal::try_from(value)
        .map_err(|e| RecorderError::Value(format!("cannot read {value} as a decimal: {e}")))
}

pub(crate) fn real_from_decimal(value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| RecorderError::Value(format!("{value} is not representable as a float")))
}

fn decimal_from_sql(value: Value) -> Result<Decimal> {
    match value {
        Value::Integer(i) => Ok(Decimal::from(i)),
        Value::Real(f) => decimal_from_real(f),
        Value::Text(s) => s
            .parse()
            .map_err(|e| RecorderError::Value(format!("cannot read '{s}' as a decimal: {e}"))),
        Value::Null => Err(RecorderError::Value("stored state is NULL".into())),
        Value::Blob(_) => Err(RecorderError::Value("stored state is a blob".into())),
    }
}
