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

//! Delta reconciliation: cumulative readings against the last known state.

use crate::interval::Interval;
use crate::reading::Reading;
use crate::series::ReadingSeries;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

/// Last persisted state of a series before the current batch. Interval N+1's
/// starting cumulative value is interval N's ending value, so exactly one of
/// these exists per series and it is advanced once per processed interval.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReconciliationState {
    pub cumulative_value: Decimal,
    pub cumulative_cost: Decimal,
}

/// One accepted reading, expressed as the delta it contributes and the
/// half-open interval it is valid for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaRecord {
    pub interval: Interval,
    pub delta: Decimal,
    pub cumulative: Decimal,
}

/// Walk a normalized series against `initial`, yielding one [`DeltaRecord`]
/// per accepted reading.
///
/// A reading whose value does not exceed the running cumulative state is
/// skipped (meter reset or duplicate submission): no record, state unchanged.
/// Equal values are skipped too, so no zero-delta records are ever emitted.
/// Each record's interval ends at the next *accepted* reading; the last one
/// ends at `now`, which the caller captures once per run.
pub fn reconcile(
    series: ReadingSeries,
    initial: &ReconciliationState,
    now: DateTime<Utc>,
) -> DeltaStream {
    DeltaStream {
        readings: series.into_iter(),
        prev_state: initial.cumulative_value,
        state: initial.cumulative_value,
        pending: None,
        now,
    }
}

/// Lazy, finite, single-pass stream over accepted readings. Cumulative
/// values of consecutive records strictly increase.
#[derive(Debug)]
pub struct DeltaStream {
    readings: std::vec::IntoIter<Reading>,
    /// Cumulative value before the pending reading.
    prev_state: Decimal,
    /// Cumulative value of the pending reading, or the initial state.
    state: Decimal,
    /// Accepted reading whose interval end is not known yet.
    pending: Option<Reading>,
    now: DateTime<Utc>,
}

impl Iterator for DeltaStream {
    type Item = DeltaRecord;

    fn next(&mut self) -> Option<DeltaRecord> {
        loop {
            match self.readings.next() {
                Some(reading) => {
                    if reading.value <= self.state {
                        debug!(
                            taken_at = %reading.taken_at,
                            value = %reading.value,
                            state = %self.state,
                            "skipping non-increasing reading"
                        );
                        continue;
                    }
                    let previous = self.pending.replace(reading);
                    let (prev, cumulative) = (self.prev_state, self.state);
                    self.prev_state = self.state;
                    self.state = reading.value;
                    if let Some(accepted) = previous {
                        return Some(DeltaRecord {
                            interval: Interval {
                                from: accepted.taken_at,
                                to: reading.taken_at,
                            },
                            delta: cumulative - prev,
                            cumulative,
                        });
                    }
                }
                None => {
                    let last = self.pending.take()?;
                    return Some(DeltaRecord {
                        interval: Interval {
                            from: last.taken_at,
                            to: self.now,
                        },
                        delta: self.state - self.prev_state,
                        cumulative: self.state,
                    });
                }
            }
        }
    }
}
