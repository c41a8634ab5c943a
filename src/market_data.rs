use std::path::Path;

use serde::Deserialize;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use yahoo_finance_api as yahoo;

use crate::error::DataError;
use crate::series::{self, Price};

/// Fetch daily closing prices for a symbol covering the trailing `years`
/// years.
///
/// Ordered earliest to latest; quotes without a finite close are dropped.
pub async fn fetch_daily_closes(symbol: &str, years: i64) -> Result<Vec<Price>, DataError> {
    let provider = yahoo::YahooConnector::new()?;

    let end = OffsetDateTime::now_utc();
    let start = end - time::Duration::days(years * 365);

    let response = provider
        .get_quote_history_interval(symbol, start, end, "1d")
        .await?;
    let quotes = response.quotes()?;

    let mut prices: Vec<Price> = quotes
        .iter()
        .filter_map(|q| {
            if !q.close.is_finite() {
                return None;
            }
            let date = OffsetDateTime::from_unix_timestamp(q.timestamp as i64).ok()?;
            Some(Price {
                value: q.close,
                date,
            })
        })
        .collect();

    // Sort by date to ensure correct order
    prices.sort_by_key(|p| p.date.unix_timestamp());

    if prices.is_empty() {
        return Err(DataError::NoData(symbol.to_string()));
    }
    Ok(prices)
}

#[derive(Debug, Deserialize)]
struct CloseRow {
    date: String,
    close: String,
}

/// Load `(date, close)` rows from a CSV file.
///
/// The close column is treated as text and coerced; rows that fail coercion
/// are logged and skipped rather than aborting the load. Dates must be
/// `YYYY-MM-DD`.
pub fn load_close_csv(path: &Path) -> Result<Vec<Price>, DataError> {
    let date_format = format_description!("[year]-[month]-[day]");
    let mut reader = csv::Reader::from_path(path)?;

    let mut prices = Vec::new();
    for row in reader.deserialize() {
        let row: CloseRow = row?;
        let date = Date::parse(&row.date, &date_format)
            .map_err(|_| DataError::BadDate(row.date.clone()))?;
        let Some(value) = series::coerce_close(&row.close) else {
            tracing::warn!(date = %row.date, raw = %row.close, "dropping non-numeric close");
            continue;
        };
        prices.push(Price {
            value,
            date: date.midnight().assume_utc(),
        });
    }

    prices.sort_by_key(|p| p.date.unix_timestamp());

    if prices.is_empty() {
        return Err(DataError::NoData(path.display().to_string()));
    }
    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(file: &str) -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("resources/test");
        path.push(file);
        path
    }

    #[test]
    fn test_load_close_csv_drops_malformed_closes() {
        let prices = load_close_csv(&fixture("sample_closes.csv")).unwrap();

        let values: Vec<f64> = prices.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![100.0, 101.5, 102.25, 103.1]);
        // ascending dates
        for w in prices.windows(2) {
            assert!(w[0].date < w[1].date);
        }
    }

    #[test]
    fn test_load_close_csv_rejects_bad_dates() {
        match load_close_csv(&fixture("bad_dates.csv")) {
            Err(DataError::BadDate(raw)) => assert_eq!(raw, "01/02/2024"),
            other => panic!("expected BadDate, got {other:?}"),
        }
    }

    #[test]
    fn test_load_close_csv_requires_usable_rows() {
        match load_close_csv(&fixture("all_missing.csv")) {
            Err(DataError::NoData(_)) => {}
            other => panic!("expected NoData, got {other:?}"),
        }
    }
}
