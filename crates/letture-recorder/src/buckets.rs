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

//! Set-based overwrite of statistics buckets inside an interval.

use crate::db::{RecorderTx, epoch_ts, real_from_decimal};
use crate::error::Result;
use letture_core::Interval;
use rusqlite::params;
use rust_decimal::Decimal;
use tracing::trace;

const LONG_TERM: &str = "statistics";
const SHORT_TERM: &str = "statistics_short_term";

/// Absolute values for every bucket whose `start_ts` falls in the interval.
/// `sum` is the computed cumulative value, never an increment, which is what
/// makes re-applying the same update idempotent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketUpdate {
    pub interval: Interval,
    pub state: Decimal,
    pub sum: Decimal,
}

/// Applies bucket updates for one statistics series. Consumption series
/// update both the long-term and short-term tables; cost series only the
/// long-term one.
#[derive(Debug)]
pub struct StatisticsBucketUpdater<'t, 'c> {
    tx: &'t RecorderTx<'c>,
    metadata_id: i64,
    short_term: bool,
}

impl<'t, 'c> StatisticsBucketUpdater<'t, 'c> {
    pub fn long_term(tx: &'t RecorderTx<'c>, metadata_id: i64) -> Self {
        Self {
            tx,
            metadata_id,
            short_term: false,
        }
    }

    pub fn with_short_term(tx: &'t RecorderTx<'c>, metadata_id: i64) -> Self {
        Self {
            tx,
            metadata_id,
            short_term: true,
        }
    }

    /// Overwrite `(state, sum)` on every persisted bucket inside the
    /// update's interval. Buckets outside it, and series with no matching
    /// buckets at all, are untouched; that is not an error. Returns the
    /// number of rows overwritten.
    pub fn apply(&self, update: &BucketUpdate) -> Result<usize> {
        let mut touched = self.overwrite(LONG_TERM, update)?;
        if self.short_term {
            touched += self.overwrite(SHORT_TERM, update)?;
        }
        trace!(
            metadata_id = self.metadata_id,
            from = %update.interval.from,
            to = %update.interval.to,
            touched,
            "buckets overwritten"
        );
        Ok(touched)
    }

    fn overwrite(&self, table: &str, update: &BucketUpdate) -> Result<usize> {
        let sql = format!(
            "UPDATE {table}
             SET state = ?1, sum = ?2
             WHERE metadata_id = ?3 AND start_ts >= ?4 AND start_ts < ?5"
        );
        let touched = self.tx.tx.execute(
            &sql,
            params![
                real_from_decimal(update.state)?,
                real_from_decimal(update.sum.round_dp(2))?,
                self.metadata_id,
                epoch_ts(update.interval.from),
                epoch_ts(update.interval.to)
            ],
        )?;
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RecorderDb;
    use chrono::{DateTime, TimeZone, Utc};
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use tempfile::NamedTempFile;

    fn recorder_db(file: &NamedTempFile) -> RecorderDb {
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch(
            "CREATE TABLE statistics (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 metadata_id INTEGER,
                 start_ts REAL,
                 state REAL,
                 sum REAL
             );
             CREATE TABLE statistics_short_term (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 metadata_id INTEGER,
                 start_ts REAL,
                 state REAL,
                 sum REAL
             );",
        )
        .unwrap();
        drop(conn);
        RecorderDb::open(file.path()).unwrap()
    }

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap()
    }

    fn seed_buckets(tx: &RecorderTx<'_>, table: &str) {
        for day in 1..=5 {
            tx.tx
                .execute(
                    &format!(
                        "INSERT INTO {table} (metadata_id, start_ts, state, sum)
                         VALUES (3, ?1, 0.0, 0.0)"
                    ),
                    params![epoch_ts(ts(day))],
                )
                .unwrap();
        }
    }

    fn bucket_rows(tx: &RecorderTx<'_>, table: &str) -> Vec<(f64, f64)> {
        let mut stmt = tx
            .tx
            .prepare(&format!(
                "SELECT state, sum FROM {table} ORDER BY start_ts"
            ))
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap();
        rows.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_apply_overwrites_only_buckets_in_interval() {
        let file = NamedTempFile::new().unwrap();
        let mut db = recorder_db(&file);
        let tx = db.transaction().unwrap();
        seed_buckets(&tx, LONG_TERM);
        let updater = StatisticsBucketUpdater::long_term(&tx, 3);
        let update = BucketUpdate {
            interval: Interval {
                from: ts(2),
                to: ts(4),
            },
            state: dec!(150),
            sum: dec!(150),
        };
        assert_eq!(updater.apply(&update).unwrap(), 2);
        let rows = bucket_rows(&tx, LONG_TERM);
        assert_eq!(rows[0], (0.0, 0.0));
        assert_eq!(rows[1], (150.0, 150.0));
        assert_eq!(rows[2], (150.0, 150.0));
        assert_eq!(rows[3], (0.0, 0.0));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let file = NamedTempFile::new().unwrap();
        let mut db = recorder_db(&file);
        let tx = db.transaction().unwrap();
        seed_buckets(&tx, LONG_TERM);
        let updater = StatisticsBucketUpdater::long_term(&tx, 3);
        let update = BucketUpdate {
            interval: Interval {
                from: ts(1),
                to: ts(6),
            },
            state: dec!(99.5),
            sum: dec!(123.456),
        };
        updater.apply(&update).unwrap();
        let first = bucket_rows(&tx, LONG_TERM);
        updater.apply(&update).unwrap();
        assert_eq!(bucket_rows(&tx, LONG_TERM), first);
        // Sum is rounded to 2 decimals at persistence.
        assert_eq!(first[0], (99.5, 123.46));
    }

    #[test]
    fn test_short_term_table_updated_when_enabled() {
        let file = NamedTempFile::new().unwrap();
        let mut db = recorder_db(&file);
        let tx = db.transaction().unwrap();
        seed_buckets(&tx, LONG_TERM);
        seed_buckets(&tx, SHORT_TERM);
        let update = BucketUpdate {
            interval: Interval {
                from: ts(1),
                to: ts(6),
            },
            state: dec!(10),
            sum: dec!(10),
        };
        let touched = StatisticsBucketUpdater::with_short_term(&tx, 3)
            .apply(&update)
            .unwrap();
        assert_eq!(touched, 10);
        assert_eq!(bucket_rows(&tx, SHORT_TERM)[0], (10.0, 10.0));
    }

    #[test]
    fn test_no_matching_buckets_is_not_an_error() {
        let file = NamedTempFile::new().unwrap();
        let mut db = recorder_db(&file);
        let tx = db.transaction().unwrap();
        let updater = StatisticsBucketUpdater::long_term(&tx, 3);
        let update = BucketUpdate {
            interval: Interval {
                from: ts(1),
                to: ts(2),
            },
            state: dec!(1),
            sum: dec!(1),
        };
        assert_eq!(updater.apply(&update).unwrap(), 0);
    }
}
