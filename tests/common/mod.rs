#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fxcross::domain::error::FxcrossError;
use fxcross::domain::indicator::IndicatorParams;
pub use fxcross::domain::price_bar::PriceBar;
use fxcross::domain::signal::RsiLevels;
use fxcross::domain::strategy::{ExitPolicy, StrategyConfig};
use fxcross::ports::data_port::DataPort;
use std::io::Write;

pub struct MockDataPort {
    pub bars: Vec<PriceBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self) -> Result<Vec<PriceBar>, FxcrossError> {
        if let Some(reason) = &self.error {
            return Err(FxcrossError::DataRead {
                path: self.source(),
                reason: reason.clone(),
            });
        }
        if self.bars.is_empty() {
            return Err(FxcrossError::NoData { path: self.source() });
        }
        Ok(self.bars.clone())
    }

    fn source(&self) -> String {
        "mock".to_string()
    }
}

pub fn hour(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(i as i64)
}

/// Hourly bars starting 2024-01-02 00:00.
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar::new(hour(i), close))
        .collect()
}

/// Five bars where the only EMA cross happens before RSI is defined.
pub const SHORT_SCENARIO: [f64; 5] = [1.1000, 1.1010, 1.1005, 1.1020, 1.1030];

/// Sixteen bars with crosses in both directions, some confirmed by RSI.
pub const SWING_SCENARIO: [f64; 16] = [
    1.1, 1.098, 1.0995, 1.1015, 1.0995, 1.099, 1.101, 1.103, 1.1035, 1.1025, 1.1005, 1.1025,
    1.1035, 1.102, 1.1015, 1.1025,
];

pub fn short_periods() -> IndicatorParams {
    IndicatorParams {
        ema_short_period: 2,
        ema_long_period: 3,
        rsi_period: 2,
    }
}

/// EMA 2/3, RSI 3, both levels at 50.
pub fn swing_config(policy: ExitPolicy) -> StrategyConfig {
    StrategyConfig {
        indicators: IndicatorParams {
            ema_short_period: 2,
            ema_long_period: 3,
            rsi_period: 3,
        },
        levels: RsiLevels {
            buy_level: 50.0,
            sell_level: 50.0,
        },
        policy,
        close_open_at_end: false,
    }
}

pub fn write_temp_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Render closes as a bid/ask CSV with a banner and header line.
pub fn bid_ask_csv(closes: &[f64]) -> String {
    let mut out = String::from("EUR/USD hourly\nDate,BO,BH,BL,BC,AO,AH,AL,AC\n");
    for (i, close) in closes.iter().enumerate() {
        let ask = close + 0.0002;
        out.push_str(&format!(
            "{},{close},{close},{close},{close},{ask},{ask},{ask},{ask}\n",
            hour(i).format("%Y-%m-%d %H:%M:%S")
        ));
    }
    out
}
