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

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical quantity a meter measures. Gas is metered as a single volume,
/// electricity separately per fascia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commodity {
    Gas,
    Electricity,
}

impl Commodity {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gas => "gas",
            Self::Electricity => "electricity",
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Italian time-of-use tariff band. Meters expose up to six bands in their
/// exports; only F1 (peak), F2 (mid) and F3 (off-peak) are billed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Fascia {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
}

impl Fascia {
    /// Every band a supplier export carries.
    pub const ALL: [Self; 6] = [Self::F1, Self::F2, Self::F3, Self::F4, Self::F5, Self::F6];

    /// The bands that are actually billed and priced.
    pub const BILLED: [Self; 3] = [Self::F1, Self::F2, Self::F3];

    pub fn number(self) -> u8 {
        match self {
            Self::F1 => 1,
            Self::F2 => 2,
            Self::F3 => 3,
            Self::F4 => 4,
            Self::F5 => 5,
            Self::F6 => 6,
        }
    }
}

impl fmt::Display for Fascia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.number())
    }
}

/// One absolute cumulative meter observation. Immutable once parsed;
/// ordering between readings is by `taken_at` only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub taken_at: DateTime<Utc>,
    pub fascia: Option<Fascia>,
    pub value: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billed_fasce() {
        assert_eq!(Fascia::BILLED.len(), 3);
        assert_eq!(Fascia::BILLED[0].number(), 1);
        assert_eq!(Fascia::BILLED[2].number(), 3);
    }

    #[test]
    fn test_fascia_display() {
        assert_eq!(Fascia::F1.to_string(), "F1");
        assert_eq!(Fascia::F6.to_string(), "F6");
    }

    #[test]
    fn test_commodity_display_name() {
        assert_eq!(Commodity::Gas.display_name(), "gas");
        assert_eq!(Commodity::Electricity.display_name(), "electricity");
    }
}
