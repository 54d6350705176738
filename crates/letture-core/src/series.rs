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

use crate::reading::Reading;

/// Readings for exactly one (commodity, fascia) pair, ordered by timestamp.
#[derive(Debug, Clone)]
pub struct ReadingSeries {
    readings: Vec<Reading>,
}

impl ReadingSeries {
    /// Sorts by timestamp ascending. The sort is stable, so readings with
    /// equal timestamps keep their input order; which duplicate wins is
    /// deliberately left to the monotonic filter downstream.
    pub fn normalize(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.taken_at);
        Self { readings }
    }

    pub fn first(&self) -> Option<&Reading> {
        self.readings.first()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reading> {
        self.readings.iter()
    }
}

impl IntoIterator for ReadingSeries {
    type Item = Reading;
    type IntoIter = std::vec::IntoIter<Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.into_iter()
    }
}
