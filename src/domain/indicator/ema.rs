//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1). Seeded by weighting every observation from the start of the
//! series: EMA[t] = Σ (1-k)^j·C[t-j] / Σ (1-k)^j for j in 0..=t, kept as a
//! running denominator and applied incrementally as
//! EMA[t] = EMA[t-1] + (C[t] - EMA[t-1]) / Σ (1-k)^j, which stays exact on a
//! constant series. Defined from the first bar; no warmup.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_ema(closes: &[f64], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values: vec![None; closes.len()],
        };
    }

    let k = 2.0 / (period as f64 + 1.0);
    let decay = 1.0 - k;
    let mut ema = 0.0;
    let mut denominator = 0.0;

    let values = closes
        .iter()
        .map(|&close| {
            denominator = 1.0 + decay * denominator;
            ema += (close - ema) / denominator;
            Some(ema)
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}
