//! CSV file price data adapter.
//!
//! Two layouts are understood:
//! - bid/ask: a banner line, a header line, then nine columns
//!   `Date, BidOpen, BidHigh, BidLow, BidClose, AskOpen, AskHigh, AskLow, AskClose`;
//!   the close is the bid close
//! - simple: a header naming a `Date` and a `Close` column, anything else ignored

use crate::domain::error::FxcrossError;
use crate::domain::price_bar::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

const BID_ASK_COLUMNS: usize = 9;
const BID_CLOSE_COLUMN: usize = 4;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y%m%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d", "%m/%d/%Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvLayout {
    #[default]
    Auto,
    BidAsk,
    Simple,
}

impl FromStr for CsvLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(CsvLayout::Auto),
            "bid_ask" | "truefx" => Ok(CsvLayout::BidAsk),
            "simple" => Ok(CsvLayout::Simple),
            other => Err(format!(
                "unknown layout '{other}' (expected auto, bid_ask or simple)"
            )),
        }
    }
}

impl fmt::Display for CsvLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvLayout::Auto => write!(f, "auto"),
            CsvLayout::BidAsk => write!(f, "bid_ask"),
            CsvLayout::Simple => write!(f, "simple"),
        }
    }
}

pub struct CsvAdapter {
    path: PathBuf,
    layout: CsvLayout,
}

impl CsvAdapter {
    pub fn new(path: PathBuf, layout: CsvLayout) -> Self {
        Self { path, layout }
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self) -> Result<Vec<PriceBar>, FxcrossError> {
        let source = self.source();
        let content = fs::read_to_string(&self.path).map_err(|e| FxcrossError::DataRead {
            path: source.clone(),
            reason: e.to_string(),
        })?;
        let bars = parse_bars(&content, self.layout, &source)?;
        info!(path = %source, bars = bars.len(), "loaded price data");
        Ok(bars)
    }

    fn source(&self) -> String {
        self.path.display().to_string()
    }
}

/// Parse CSV text into bars sorted by timestamp.
pub fn parse_bars(content: &str, layout: CsvLayout, source: &str) -> Result<Vec<PriceBar>, FxcrossError> {
    let layout = match layout {
        CsvLayout::Auto => detect_layout(content),
        explicit => explicit,
    };
    debug!(%layout, "parsing price csv");

    let bars = match layout {
        CsvLayout::Simple => parse_simple(content, source)?,
        _ => parse_bid_ask(content, source)?,
    };
    finish(bars, source)
}

fn detect_layout(content: &str) -> CsvLayout {
    let first_line = content.lines().next().unwrap_or_default();
    let names: Vec<String> = first_line
        .split(',')
        .map(|s| s.trim().trim_matches('"').to_lowercase())
        .collect();
    let has_date = names.iter().any(|n| is_date_header(n));
    let has_close = names.iter().any(|n| n == "close");
    if has_date && has_close {
        CsvLayout::Simple
    } else {
        CsvLayout::BidAsk
    }
}

fn is_date_header(name: &str) -> bool {
    matches!(name, "date" | "datetime" | "timestamp")
}

fn parse_bid_ask(content: &str, source: &str) -> Result<Vec<PriceBar>, FxcrossError> {
    // Line 1 is a banner. Line 2 is normally a header whose names are
    // replaced, but it is kept as data when it already starts with a timestamp.
    let body = content.split_once('\n').map(|(_, rest)| rest).unwrap_or("");

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| csv_error(source, &e))?;
        // +1 for the banner line that was cut off
        let line = record.position().map(|p| p.line()).unwrap_or(0) + 1;

        let date_str = record.get(0).unwrap_or_default();
        if row == 0 && parse_timestamp(date_str).is_none() {
            continue;
        }
        if record.len() != BID_ASK_COLUMNS {
            return Err(malformed(
                source,
                line,
                format!("expected {BID_ASK_COLUMNS} columns, found {}", record.len()),
            ));
        }

        let timestamp = parse_timestamp(date_str)
            .ok_or_else(|| malformed(source, line, format!("invalid date '{date_str}'")))?;
        let close = parse_close(record.get(BID_CLOSE_COLUMN), source, line)?;
        bars.push(PriceBar::new(timestamp, close));
    }

    Ok(bars)
}

fn parse_simple(content: &str, source: &str) -> Result<Vec<PriceBar>, FxcrossError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().map_err(|e| csv_error(source, &e))?.clone();
    let find = |pred: &dyn Fn(&str) -> bool, column: &str| {
        headers
            .iter()
            .position(|h| pred(h.to_lowercase().as_str()))
            .ok_or_else(|| FxcrossError::MissingColumn {
                path: source.to_string(),
                column: column.to_string(),
            })
    };
    let date_idx = find(&is_date_header, "Date")?;
    let close_idx = find(&|h: &str| h == "close", "Close")?;

    let mut bars = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| csv_error(source, &e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let date_str = record
            .get(date_idx)
            .ok_or_else(|| malformed(source, line, "missing date value"))?;
        let timestamp = parse_timestamp(date_str)
            .ok_or_else(|| malformed(source, line, format!("invalid date '{date_str}'")))?;
        let close = parse_close(record.get(close_idx), source, line)?;
        bars.push(PriceBar::new(timestamp, close));
    }

    Ok(bars)
}

fn finish(mut bars: Vec<PriceBar>, source: &str) -> Result<Vec<PriceBar>, FxcrossError> {
    if bars.is_empty() {
        return Err(FxcrossError::NoData {
            path: source.to_string(),
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    if let Some(dup) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
        return Err(FxcrossError::DuplicateTimestamp {
            path: source.to_string(),
            timestamp: dup[0].timestamp.to_string(),
        });
    }
    Ok(bars)
}

fn parse_close(value: Option<&str>, source: &str, line: u64) -> Result<f64, FxcrossError> {
    let raw = value.ok_or_else(|| malformed(source, line, "missing close value"))?;
    let close: f64 = raw
        .parse()
        .map_err(|e| malformed(source, line, format!("invalid close value '{raw}': {e}")))?;
    if !close.is_finite() || close <= 0.0 {
        return Err(malformed(
            source,
            line,
            format!("close must be a positive price, got {raw}"),
        ));
    }
    Ok(close)
}

/// Parse the timestamp forms found in broker and data-vendor exports.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().trim_matches('"');
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn malformed(source: &str, line: u64, reason: impl Into<String>) -> FxcrossError {
    FxcrossError::MalformedData {
        path: source.to_string(),
        line,
        reason: reason.into(),
    }
}

fn csv_error(source: &str, err: &csv::Error) -> FxcrossError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    malformed(source, line, format!("CSV parse error: {err}"))
}
