//! Time-indexed closing price.

use chrono::NaiveDateTime;

/// Pips per unit of quote currency.
pub const PIP_FACTOR: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub close: f64,
}

impl PriceBar {
    pub fn new(timestamp: NaiveDateTime, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Closing prices in bar order, as consumed by the indicator engine.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Price difference expressed in pips.
pub fn to_pips(price_diff: f64) -> f64 {
    price_diff * PIP_FACTOR
}
