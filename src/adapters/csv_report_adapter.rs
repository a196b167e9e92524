//! CSV export of the trade log and of per-bar indicator values.

use crate::domain::error::FxcrossError;
use crate::domain::indicator::IndicatorSet;
use crate::domain::metrics::cumulative_pips;
use crate::domain::position::Trade;
use crate::domain::price_bar::PriceBar;
use crate::domain::signal::Signal;
use crate::domain::strategy::PolicyKind;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLayout {
    /// One row per trade with both timestamps and the direction.
    Full,
    /// Entry side only, plus a running pip total.
    Compact,
}

impl ReportLayout {
    /// Layout used when none is configured.
    pub fn for_policy(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::Reversal => ReportLayout::Full,
            PolicyKind::RsiExit => ReportLayout::Compact,
        }
    }
}

impl FromStr for ReportLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ReportLayout::Full),
            "compact" => Ok(ReportLayout::Compact),
            other => Err(format!(
                "unknown report layout '{other}' (expected full or compact)"
            )),
        }
    }
}

impl fmt::Display for ReportLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLayout::Full => write!(f, "full"),
            ReportLayout::Compact => write!(f, "compact"),
        }
    }
}

#[derive(Serialize)]
struct FullRow {
    #[serde(rename = "Entry Time")]
    entry_time: String,
    #[serde(rename = "Exit Time")]
    exit_time: String,
    #[serde(rename = "Direction")]
    direction: String,
    #[serde(rename = "Entry Price")]
    entry_price: f64,
    #[serde(rename = "Exit Price")]
    exit_price: f64,
    #[serde(rename = "PnL (pips)")]
    pnl_pips: String,
}

#[derive(Serialize)]
struct CompactRow {
    #[serde(rename = "Entry Time")]
    entry_time: String,
    #[serde(rename = "Entry Price")]
    entry_price: f64,
    #[serde(rename = "Exit Price")]
    exit_price: f64,
    #[serde(rename = "PnL (pips)")]
    pnl_pips: String,
    #[serde(rename = "Total (pips)")]
    total_pips: String,
}

#[derive(Serialize)]
struct IndicatorRow {
    timestamp: String,
    close: f64,
    ema_short: Option<f64>,
    ema_long: Option<f64>,
    rsi: Option<f64>,
    signal: String,
}

pub struct CsvReportAdapter {
    layout: ReportLayout,
}

impl CsvReportAdapter {
    pub fn new(layout: ReportLayout) -> Self {
        Self { layout }
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, trades: &[Trade], output_path: &Path) -> Result<(), FxcrossError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| write_error(output_path, e))?;

        match self.layout {
            ReportLayout::Full => {
                // serde only emits the header with the first record
                if trades.is_empty() {
                    wtr.write_record([
                        "Entry Time",
                        "Exit Time",
                        "Direction",
                        "Entry Price",
                        "Exit Price",
                        "PnL (pips)",
                    ])
                    .map_err(|e| write_error(output_path, e))?;
                }
                for trade in trades {
                    wtr.serialize(FullRow {
                        entry_time: format_time(&trade.entry_time),
                        exit_time: format_time(&trade.exit_time),
                        direction: trade.direction.to_string(),
                        entry_price: trade.entry_price,
                        exit_price: trade.exit_price,
                        pnl_pips: format_pips(trade.pnl_pips),
                    })
                    .map_err(|e| write_error(output_path, e))?;
                }
            }
            ReportLayout::Compact => {
                if trades.is_empty() {
                    wtr.write_record([
                        "Entry Time",
                        "Entry Price",
                        "Exit Price",
                        "PnL (pips)",
                        "Total (pips)",
                    ])
                    .map_err(|e| write_error(output_path, e))?;
                }
                for (trade, total) in trades.iter().zip(cumulative_pips(trades)) {
                    wtr.serialize(CompactRow {
                        entry_time: format_time(&trade.entry_time),
                        entry_price: trade.entry_price,
                        exit_price: trade.exit_price,
                        pnl_pips: format_pips(trade.pnl_pips),
                        total_pips: format_pips(total),
                    })
                    .map_err(|e| write_error(output_path, e))?;
                }
            }
        }

        wtr.flush().map_err(|e| write_error(output_path, e))?;
        info!(path = %output_path.display(), trades = trades.len(), layout = %self.layout, "wrote trade log");
        Ok(())
    }
}

/// Write one row per bar with the indicator values and the signal fired on it.
pub fn write_indicators(
    bars: &[PriceBar],
    indicators: &IndicatorSet,
    signals: &[Signal],
    output_path: &Path,
) -> Result<(), FxcrossError> {
    let mut wtr = csv::Writer::from_path(output_path).map_err(|e| write_error(output_path, e))?;

    if bars.is_empty() {
        wtr.write_record(["timestamp", "close", "ema_short", "ema_long", "rsi", "signal"])
            .map_err(|e| write_error(output_path, e))?;
    }
    for (i, bar) in bars.iter().enumerate() {
        wtr.serialize(IndicatorRow {
            timestamp: format_time(&bar.timestamp),
            close: bar.close,
            ema_short: indicators.ema_short.get(i),
            ema_long: indicators.ema_long.get(i),
            rsi: indicators.rsi.get(i),
            signal: signals.get(i).copied().unwrap_or_default().to_string(),
        })
        .map_err(|e| write_error(output_path, e))?;
    }

    wtr.flush().map_err(|e| write_error(output_path, e))?;
    info!(path = %output_path.display(), bars = bars.len(), "wrote indicator table");
    Ok(())
}

fn format_time(time: &NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn format_pips(pips: f64) -> String {
    format!("{pips:.1}")
}

fn write_error(path: &Path, err: impl fmt::Display) -> FxcrossError {
    FxcrossError::ReportWrite {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorParams;
    use crate::domain::position::Side;
    use crate::domain::signal::{derive_signals, RsiLevels};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample_trades() -> Vec<Trade> {
        vec![
            Trade {
                entry_time: at(2, 9),
                exit_time: at(2, 15),
                direction: Side::Long,
                entry_price: 1.1,
                exit_price: 1.105,
                pnl_pips: 50.0,
            },
            Trade {
                entry_time: at(2, 15),
                exit_time: at(3, 10),
                direction: Side::Short,
                entry_price: 1.105,
                exit_price: 1.107,
                pnl_pips: -20.0,
            },
        ]
    }

    #[test]
    fn layout_parses_and_defaults_per_policy() {
        assert_eq!("Full".parse::<ReportLayout>().unwrap(), ReportLayout::Full);
        assert_eq!("compact".parse::<ReportLayout>().unwrap(), ReportLayout::Compact);
        assert!("wide".parse::<ReportLayout>().is_err());
        assert_eq!(ReportLayout::for_policy(PolicyKind::Reversal), ReportLayout::Full);
        assert_eq!(ReportLayout::for_policy(PolicyKind::RsiExit), ReportLayout::Compact);
    }

    #[test]
    fn full_layout_writes_one_row_per_trade() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        CsvReportAdapter::new(ReportLayout::Full)
            .write(&sample_trades(), &path)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Entry Time,Exit Time,Direction,Entry Price,Exit Price,PnL (pips)"
        );
        assert_eq!(lines[1], "2024-01-02 09:00:00,2024-01-02 15:00:00,long,1.1,1.105,50.0");
        assert_eq!(lines[2], "2024-01-02 15:00:00,2024-01-03 10:00:00,short,1.105,1.107,-20.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn compact_layout_carries_running_total() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        CsvReportAdapter::new(ReportLayout::Compact)
            .write(&sample_trades(), &path)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Entry Time,Entry Price,Exit Price,PnL (pips),Total (pips)");
        assert_eq!(lines[1], "2024-01-02 09:00:00,1.1,1.105,50.0,50.0");
        assert_eq!(lines[2], "2024-01-02 15:00:00,1.105,1.107,-20.0,30.0");
    }

    #[test]
    fn empty_trade_log_still_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        CsvReportAdapter::new(ReportLayout::Full).write(&[], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.trim_end(),
            "Entry Time,Exit Time,Direction,Entry Price,Exit Price,PnL (pips)"
        );
    }

    #[test]
    fn unwritable_path_is_report_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("trades.csv");
        let err = CsvReportAdapter::new(ReportLayout::Full)
            .write(&sample_trades(), &path)
            .unwrap_err();
        assert!(matches!(err, FxcrossError::ReportWrite { .. }));
    }

    #[test]
    fn indicator_export_leaves_warmup_cells_empty() {
        let bars: Vec<PriceBar> = [1.1, 1.101, 1.1005, 1.102]
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::new(at(2, i as u32), c))
            .collect();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let params = IndicatorParams {
            ema_short_period: 2,
            ema_long_period: 3,
            rsi_period: 2,
        };
        let indicators = IndicatorSet::compute(&closes, &params);
        let signals = derive_signals(&indicators, &RsiLevels::default());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("indicators.csv");
        write_indicators(&bars, &indicators, &signals, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "timestamp,close,ema_short,ema_long,rsi,signal");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "2024-01-02 00:00:00,1.1,1.1,1.1,,");
        let third: Vec<&str> = lines[3].split(',').collect();
        assert_eq!(third.len(), 6);
        assert!(!third[4].is_empty());
    }
}
