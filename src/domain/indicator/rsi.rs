//! RSI (Relative Strength Index) indicator implementation.
//!
//! Average gain/loss is the simple mean of the trailing n price changes,
//! summed from the window at every bar so a window without losses is exactly 0.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! If both are 0 the price never moved inside the window: RSI is undefined.
//!
//! Warmup: first n bars are null (need n price changes).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_rsi(closes: &[f64], period: usize) -> IndicatorSeries {
    let mut values = vec![None; closes.len()];

    if period == 0 || closes.len() <= period {
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values,
        };
    }

    // changes[i] is the move into bar i + 1
    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    for (i, window) in changes.windows(period).enumerate() {
        let gain: f64 = window.iter().map(|c| c.max(0.0)).sum();
        let loss: f64 = window.iter().map(|c| (-c).max(0.0)).sum();
        values[i + period] = rsi_value(gain / period as f64, loss / period as f64);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { None } else { Some(100.0) }
    } else {
        Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
    }
}
