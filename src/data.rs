//! CSV price loading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{Reader, StringRecord};

use crate::model::{PricePoint, PriceSeries};

const DATE_COLUMNS: [&str; 3] = ["date", "datetime", "timestamp"];
const CLOSE_COLUMNS: [&str; 4] = ["adj close", "adj_close", "adjclose", "close"];

/// Load a daily close series from a CSV file with a header row.
///
/// The date column is one of `date`, `datetime` or `timestamp`; the price column is
/// the adjusted close when present, otherwise `close`. Rows with an empty or `null`
/// close are skipped. Rows are sorted by date.
pub fn load_prices(path: &Path) -> Result<PriceSeries> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_prices(file).with_context(|| format!("failed to load prices from {}", path.display()))
}

pub fn read_prices<R: Read>(input: R) -> Result<PriceSeries> {
    let mut reader = Reader::from_reader(input);
    let headers = reader.headers().context("missing CSV header")?.clone();
    let date_idx = find_column(&headers, &DATE_COLUMNS)
        .with_context(|| format!("no date column in header {:?}", headers))?;
    let close_idx = find_column(&headers, &CLOSE_COLUMNS)
        .with_context(|| format!("no close column in header {:?}", headers))?;

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("bad CSV record {}", line + 2))?;
        let raw_close = record.get(close_idx).unwrap_or("").trim();
        if raw_close.is_empty() || raw_close.eq_ignore_ascii_case("null") {
            skipped += 1;
            continue;
        }
        let raw_date = record.get(date_idx).unwrap_or("").trim();
        let date = parse_date(raw_date)
            .with_context(|| format!("line {}: invalid date '{}'", line + 2, raw_date))?;
        let close: f64 = raw_close
            .parse()
            .with_context(|| format!("line {}: invalid close '{}'", line + 2, raw_close))?;
        points.push(PricePoint { date, close });
    }
    if points.is_empty() {
        bail!("CSV contains no prices");
    }
    if skipped > 0 {
        tracing::warn!(skipped, "Skipped rows without a close price");
    }

    points.sort_by_key(|p| p.date);
    let series = PriceSeries::new(points)?;
    tracing::debug!(rows = series.len(), "Loaded price series");
    Ok(series)
}

fn find_column(headers: &StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // e.g. 2024-01-02T00:00:00-05:00; the date is taken in the stamp's own offset
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}
