//! Technical indicator implementations.
//!
//! This module provides types for representing indicator series:
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: one nullable value per price bar
//! - `IndicatorSet`: the EMA-short / EMA-long / RSI triple the strategy reads

pub mod ema;
pub mod rsi;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
}

/// Values aligned 1:1 with the price bars. `None` marks a bar where the
/// indicator is undefined (warm-up, or no price movement for RSI).
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Index of the first defined value.
    pub fn first_valid(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub ema_short_period: usize,
    pub ema_long_period: usize,
    pub rsi_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_short_period: 50,
            ema_long_period: 100,
            rsi_period: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub ema_short: IndicatorSeries,
    pub ema_long: IndicatorSeries,
    pub rsi: IndicatorSeries,
}

impl IndicatorSet {
    pub fn compute(closes: &[f64], params: &IndicatorParams) -> Self {
        Self {
            ema_short: ema::calculate_ema(closes, params.ema_short_period),
            ema_long: ema::calculate_ema(closes, params.ema_long_period),
            rsi: rsi::calculate_rsi(closes, params.rsi_period),
        }
    }

    /// Number of bars covered; all three series share it.
    pub fn len(&self) -> usize {
        self.ema_short.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_short.is_empty()
    }
}
