use crate::domain::errors::DataError;
use crate::domain::market::{OhlcvBar, OhlcvSeries, Timeframe};
use crate::domain::validation::data_quality::{DataQualityReport, check_bars};
use crate::domain::validation::BarValidator;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const TIME_HEADERS: [&str; 4] = ["time", "timestamp", "date", "datetime"];
const VOLUME_HEADERS: [&str; 2] = ["volume", "vol"];

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Fail on any quality issue instead of dropping bad bars
    pub strict: bool,
}

impl LoadOptions {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            strict: false,
        }
    }
}

/// Loads an OHLCV CSV with flexible, case-insensitive header mapping.
///
/// Headers not recognized as OHLCV base fields are kept as extra numeric
/// columns on the series (unparseable cells become NaN), which is what
/// makes preloaded indicators possible on platform exports.
pub fn load_csv(
    path: &Path,
    options: &LoadOptions,
) -> Result<(OhlcvSeries, DataQualityReport), DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_csv_reader(file, &path.display().to_string(), options)
}

pub fn load_csv_reader<R: Read>(
    reader: R,
    source_name: &str,
    options: &LoadOptions,
) -> Result<(OhlcvSeries, DataQualityReport), DataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| DataError::Csv {
            path: source_name.to_string(),
            reason: e.to_string(),
        })?
        .clone();
    let header_list: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();

    let find = |names: &[&str]| -> Option<usize> {
        header_list
            .iter()
            .position(|h| names.iter().any(|n| h == n))
    };

    let missing = |column: &str| DataError::MissingColumn {
        column: column.to_string(),
        headers: header_list.join(","),
    };

    let time_idx = find(&TIME_HEADERS).ok_or_else(|| missing("time"))?;
    let open_idx = find(&["open"]).ok_or_else(|| missing("open"))?;
    let high_idx = find(&["high"]).ok_or_else(|| missing("high"))?;
    let low_idx = find(&["low"]).ok_or_else(|| missing("low"))?;
    let close_idx = find(&["close"]).ok_or_else(|| missing("close"))?;
    let volume_idx = find(&VOLUME_HEADERS);

    let base: Vec<usize> = [
        Some(time_idx),
        Some(open_idx),
        Some(high_idx),
        Some(low_idx),
        Some(close_idx),
        volume_idx,
    ]
    .into_iter()
    .flatten()
    .collect();

    // Everything else rides along as an extra numeric column
    let extra_indices: Vec<(usize, String)> = header_list
        .iter()
        .enumerate()
        .filter(|(i, _)| !base.contains(i))
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut bars: Vec<OhlcvBar> = Vec::new();
    let mut extras: BTreeMap<String, Vec<f64>> = extra_indices
        .iter()
        .map(|(_, h)| (h.clone(), Vec::new()))
        .collect();

    for (record_no, record) in csv_reader.records().enumerate() {
        // +2: one for the header row, one for 1-based line numbers
        let row = record_no + 2;
        let record = record.map_err(|e| DataError::Csv {
            path: source_name.to_string(),
            reason: format!("row {}: {}", row, e),
        })?;

        let field = |idx: usize| record.get(idx).unwrap_or("");
        let number = |idx: usize, name: &str| -> Result<f64, DataError> {
            field(idx).parse::<f64>().map_err(|_| DataError::Csv {
                path: source_name.to_string(),
                reason: format!("row {}: bad number '{}' in column '{}'", row, field(idx), name),
            })
        };

        let timestamp = parse_timestamp(field(time_idx), row)?;
        if let Some(prev) = bars.last()
            && timestamp <= prev.timestamp
        {
            return Err(DataError::NonMonotonic {
                row,
                current: timestamp.to_rfc3339(),
                previous: prev.timestamp.to_rfc3339(),
            });
        }

        let volume = match volume_idx {
            Some(idx) => number(idx, "volume")?,
            None => 0.0,
        };

        bars.push(OhlcvBar::new(
            timestamp,
            number(open_idx, "open")?,
            number(high_idx, "high")?,
            number(low_idx, "low")?,
            number(close_idx, "close")?,
            volume,
        ));

        for (idx, name) in &extra_indices {
            let value = field(*idx).parse::<f64>().unwrap_or(f64::NAN);
            if let Some(column) = extras.get_mut(name) {
                column.push(value);
            }
        }
    }

    if bars.is_empty() {
        return Err(DataError::EmptySeries);
    }

    // Keep extras aligned with whatever the quality pass drops
    let mask: Vec<bool> = bars
        .iter()
        .map(|b| BarValidator::check_bar(b).is_none())
        .collect();
    let (kept, report) = check_bars(&options.symbol, options.timeframe, bars, options.strict)?;

    let mut series = OhlcvSeries::new(options.symbol.clone(), options.timeframe, kept);
    for (name, values) in extras {
        let filtered: Vec<f64> = values
            .into_iter()
            .zip(mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(v, _)| v)
            .collect();
        series.insert_column(name.clone(), filtered)?;
        debug!("Loaded extra column '{}'", name);
    }

    info!(
        "Loaded {} bars for {} from {} ({} dropped, {} gaps)",
        series.len(),
        series.symbol,
        source_name,
        report.dropped,
        report.gaps
    );

    Ok((series, report))
}

/// Accepts unix seconds, unix milliseconds, RFC 3339, and the common
/// `%Y-%m-%d [%H:%M[:%S]]` date formats.
fn parse_timestamp(value: &str, row: usize) -> Result<DateTime<Utc>, DataError> {
    let v = value.trim();
    let bad = || DataError::BadTimestamp {
        value: value.to_string(),
        row,
    };

    if let Ok(n) = v.parse::<i64>() {
        // Millisecond stamps are ~1e12 in this century, second stamps ~1e9
        let (secs, nanos) = if n.abs() >= 100_000_000_000 {
            (n.div_euclid(1000), (n.rem_euclid(1000) * 1_000_000) as u32)
        } else {
            (n, 0)
        };
        return DateTime::from_timestamp(secs, nanos).ok_or_else(bad);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(v, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(v, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(bad())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv_text: &str) -> Result<(OhlcvSeries, DataQualityReport), DataError> {
        load_csv_reader(
            csv_text.as_bytes(),
            "test.csv",
            &LoadOptions::new("XAUUSD", Timeframe::OneHour),
        )
    }

    #[test]
    fn test_basic_load_with_unix_seconds() {
        let text = "time,open,high,low,close,volume\n\
                    1700000000,2000.0,2005.0,1998.0,2003.0,120\n\
                    1700003600,2003.0,2010.0,2001.0,2008.0,140\n";
        let (series, report) = load(text).unwrap();

        assert_eq!(series.len(), 2);
        assert!(report.is_clean());
        assert_eq!(series.bars[0].close, 2003.0);
    }

    #[test]
    fn test_case_insensitive_headers_and_dates() {
        let text = "Date,Open,High,Low,Close\n\
                    2024-01-02 00:00:00,2000,2005,1998,2003\n\
                    2024-01-02 01:00:00,2003,2010,2001,2008\n";
        let (series, _) = load(text).unwrap();

        assert_eq!(series.len(), 2);
        // No volume column: defaults to zero
        assert!(!series.has_volume());
    }

    #[test]
    fn test_extra_columns_become_series_columns() {
        let text = "time,open,high,low,close,volume,hist\n\
                    1700000000,2000,2005,1998,2003,120,0.5\n\
                    1700003600,2003,2010,2001,2008,140,-0.25\n";
        let (series, _) = load(text).unwrap();

        assert_eq!(series.column("hist").unwrap(), &[0.5, -0.25]);
    }

    #[test]
    fn test_non_monotonic_rejected() {
        let text = "time,open,high,low,close\n\
                    1700003600,2003,2010,2001,2008\n\
                    1700000000,2000,2005,1998,2003\n";
        let err = load(text).unwrap_err();
        assert!(matches!(err, DataError::NonMonotonic { row: 3, .. }));
    }

    #[test]
    fn test_invalid_bar_dropped_with_aligned_extras() {
        let text = "time,open,high,low,close,hist\n\
                    1700000000,2000,2005,1998,2003,0.1\n\
                    1700003600,2003,2001,2010,2008,0.2\n\
                    1700007200,2003,2010,2001,2008,0.3\n";
        let (series, report) = load(text).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(report.dropped, 1);
        assert_eq!(series.column("hist").unwrap(), &[0.1, 0.3]);
    }

    #[test]
    fn test_missing_required_column() {
        let text = "time,open,high,low\n1700000000,1,2,0.5\n";
        assert!(matches!(
            load(text).unwrap_err(),
            DataError::MissingColumn { .. }
        ));
    }

    #[test]
    fn test_millisecond_timestamps() {
        let ts = parse_timestamp("1700000000000", 2).unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            load("time,open,high,low,close\n").unwrap_err(),
            DataError::EmptySeries
        ));
    }
}
