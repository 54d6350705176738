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

//! The two supported supplier CSV export formats.
//!
//! Gas exports are semicolon-delimited and recognized by their `PDR` header
//! column; electricity exports are comma-delimited and recognized by `pod`.
//! Rows that fail to parse are dropped with a warning, never fatal to the
//! batch. An export matching neither format is an error.

use crate::error::{ImporterError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::StringRecord;
use letture_core::{Fascia, Reading};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

const GAS_DATE_COLUMN: &str = "DATA LETTURA";
const GAS_VALUE_COLUMN: &str = "LETTURA";
const GAS_DATE_FORMAT: &str = "%Y-%m-%d";
const LUCE_DATE_COLUMN: &str = "data_lettura";
const LUCE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Readings parsed from one supplier export, keyed the way they are
/// imported: gas as a single series, electricity per billed fascia.
#[derive(Debug)]
pub enum ImportBatch {
    Gas(Vec<Reading>),
    Electricity(BTreeMap<Fascia, Vec<Reading>>),
}

/// Detect the export format from the header line and parse the file.
pub fn read_readings(path: &Path) -> Result<ImportBatch> {
    let mut header_line = String::new();
    BufReader::new(std::fs::File::open(path)?).read_line(&mut header_line)?;

    if header_line.split(';').any(|h| h.trim() == "PDR") {
        info!(path = %path.display(), "reading gas export");
        Ok(ImportBatch::Gas(parse_gas(path)?))
    } else if header_line.split(',').any(|h| h.trim() == "pod") {
        info!(path = %path.display(), "reading electricity export");
        Ok(ImportBatch::Electricity(parse_luce(path)?))
    } else {
        Err(ImporterError::UnrecognizedFormat(path.to_path_buf()))
    }
}

fn column(headers: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| ImporterError::UnrecognizedFormat(path.to_path_buf()))
}

fn field<'r>(record: &'r StringRecord, index: usize) -> Result<&'r str> {
    record
        .get(index)
        .ok_or_else(|| ImporterError::InvalidRow(format!("missing field {index}")))
}

fn parse_gas(path: &Path) -> Result<Vec<Reading>> {
    let mut reader = csv::ReaderBuilder::new().delimiter(b';').from_path(path)?;
    let headers = reader.headers()?.clone();
    let date_idx = column(&headers, GAS_DATE_COLUMN, path)?;
    let value_idx = column(&headers, GAS_VALUE_COLUMN, path)?;

    let mut readings = Vec::new();
    for (line, record) in reader.records().enumerate() {
        match record
            .map_err(ImporterError::from)
            .and_then(|r| parse_gas_row(&r, date_idx, value_idx))
        {
            Ok(reading) => readings.push(reading),
            Err(error) => warn!(line = line + 2, %error, "dropping unparseable gas reading"),
        }
    }
    Ok(readings)
}

fn parse_gas_row(record: &StringRecord, date_idx: usize, value_idx: usize) -> Result<Reading> {
    let taken_at = parse_date(field(record, date_idx)?, GAS_DATE_FORMAT)?;
    // Gas exports zero-pad the counter; an all-zeros field reads as 0 and is
    // then dropped by the monotonic filter.
    let raw = field(record, value_idx)?.trim();
    let digits = raw.trim_start_matches('0');
    let value = if digits.is_empty() {
        Decimal::ZERO
    } else {
        parse_decimal(digits)?
    };
    Ok(Reading {
        taken_at,
        fascia: None,
        value,
    })
}

fn parse_luce(path: &Path) -> Result<BTreeMap<Fascia, Vec<Reading>>> {
    let mut reader = csv::ReaderBuilder::new().delimiter(b',').from_path(path)?;
    let headers = reader.headers()?.clone();
    let date_idx = column(&headers, LUCE_DATE_COLUMN, path)?;
    let value_idx: Vec<usize> = Fascia::ALL
        .iter()
        .map(|f| column(&headers, &format!("lettura_f{}", f.number()), path))
        .collect::<Result<_>>()?;

    let mut per_fascia: BTreeMap<Fascia, Vec<Reading>> =
        Fascia::BILLED.iter().map(|f| (*f, Vec::new())).collect();
    for (line, record) in reader.records().enumerate() {
        match record
            .map_err(ImporterError::from)
            .and_then(|r| parse_luce_row(&r, date_idx, &value_idx))
        {
            Ok(row) => {
                for (fascia, reading) in row {
                    if let Some(readings) = per_fascia.get_mut(&fascia) {
                        readings.push(reading);
                    }
                }
            }
            Err(error) => {
                warn!(line = line + 2, %error, "dropping unparseable electricity reading");
            }
        }
    }
    Ok(per_fascia)
}

/// Parses all six metered fasce (a bad value in any drops the row) but only
/// returns the billed ones.
fn parse_luce_row(
    record: &StringRecord,
    date_idx: usize,
    value_idx: &[usize],
) -> Result<Vec<(Fascia, Reading)>> {
    let taken_at = parse_date(field(record, date_idx)?, LUCE_DATE_FORMAT)?;
    let mut values = Vec::with_capacity(Fascia::ALL.len());
    for (fascia, idx) in Fascia::ALL.iter().zip(value_idx) {
        values.push((*fascia, parse_decimal(field(record, *idx)?.trim())?));
    }
    Ok(values
        .into_iter()
        .filter(|(fascia, _)| Fascia::BILLED.contains(fascia))
        .map(|(fascia, value)| {
            (
                fascia,
                Reading {
                    taken_at,
                    fascia: Some(fascia),
                    value,
                },
            )
        })
        .collect())
}

/// Read dates carry no time of day; they become midnight UTC so repeated
/// runs are location-independent.
fn parse_date(raw: &str, format: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw.trim(), format)
        .map_err(|e| ImporterError::InvalidRow(format!("bad date '{raw}': {e}")))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ImporterError::InvalidRow(format!("bad date '{raw}'")))
}

fn parse_decimal(raw: &str) -> Result<Decimal> {
    raw.parse()
        .map_err(|e| ImporterError::InvalidRow(format!("bad value '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_gas_export() {
        let file = csv_file(
            "PDR;DATA LETTURA;LETTURA\n\
             123456;2025-01-15;0001234\n\
             123456;2025-02-15;0001310\n",
        );
        let batch = read_readings(file.path()).unwrap();
        let ImportBatch::Gas(readings) = batch else {
            panic!("expected a gas batch");
        };
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].taken_at, midnight(2025, 1, 15));
        assert_eq!(readings[0].value, dec!(1234));
        assert_eq!(readings[0].fascia, None);
        assert_eq!(readings[1].value, dec!(1310));
    }

    #[test]
    fn test_gas_all_zeros_reads_as_zero() {
        let file = csv_file("PDR;DATA LETTURA;LETTURA\n123456;2025-01-15;000000\n");
        let ImportBatch::Gas(readings) = read_readings(file.path()).unwrap() else {
            panic!("expected a gas batch");
        };
        assert_eq!(readings[0].value, Decimal::ZERO);
    }

    #[test]
    fn test_gas_bad_rows_are_dropped_not_fatal() {
        let file = csv_file(
            "PDR;DATA LETTURA;LETTURA\n\
             123456;not-a-date;0001234\n\
             123456;2025-01-15;12x34\n\
             123456;2025-02-15;0001310\n",
        );
        let ImportBatch::Gas(readings) = read_readings(file.path()).unwrap() else {
            panic!("expected a gas batch");
        };
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].value, dec!(1310));
    }

    #[test]
    fn test_luce_export_imports_billed_fasce() {
        let file = csv_file(
            "pod,data_lettura,lettura_f1,lettura_f2,lettura_f3,lettura_f4,lettura_f5,lettura_f6\n\
             IT001E0,15/01/2025,100.5,200,300,0,0,0\n\
             IT001E0,15/02/2025,110.5,210,330,0,0,0\n",
        );
        let ImportBatch::Electricity(per_fascia) = read_readings(file.path()).unwrap() else {
            panic!("expected an electricity batch");
        };
        assert_eq!(per_fascia.len(), 3);
        let f1 = &per_fascia[&Fascia::F1];
        assert_eq!(f1.len(), 2);
        assert_eq!(f1[0].value, dec!(100.5));
        assert_eq!(f1[0].taken_at, midnight(2025, 1, 15));
        assert_eq!(f1[0].fascia, Some(Fascia::F1));
        assert_eq!(per_fascia[&Fascia::F3][1].value, dec!(330));
    }

    #[test]
    fn test_luce_bad_band_value_drops_whole_row() {
        let file = csv_file(
            "pod,data_lettura,lettura_f1,lettura_f2,lettura_f3,lettura_f4,lettura_f5,lettura_f6\n\
             IT001E0,15/01/2025,100,200,300,0,0,bad\n\
             IT001E0,15/02/2025,110,210,330,0,0,0\n",
        );
        let ImportBatch::Electricity(per_fascia) = read_readings(file.path()).unwrap() else {
            panic!("expected an electricity batch");
        };
        assert_eq!(per_fascia[&Fascia::F1].len(), 1);
        assert_eq!(per_fascia[&Fascia::F1][0].value, dec!(110));
    }

    #[test]
    fn test_unrecognized_export_is_an_error() {
        let file = csv_file("timestamp,value\n2025-01-01,100\n");
        let err = read_readings(file.path()).unwrap_err();
        assert!(matches!(err, ImporterError::UnrecognizedFormat(_)));
    }
}
