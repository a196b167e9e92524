//! Crossover signal derivation.
//!
//! # Evaluation Semantics
//!
//! - Crossovers require `index >= 1`; bar 0 never signals
//! - A cross needs strict inequality now and the non-crossed state (`<=`/`>=`)
//!   on the previous bar, so equal EMAs never fire
//! - Any null operand means no signal

use crate::domain::indicator::IndicatorSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signal {
    #[default]
    None,
    BuyCross,
    SellCross,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::None => write!(f, ""),
            Signal::BuyCross => write!(f, "BUY"),
            Signal::SellCross => write!(f, "SELL"),
        }
    }
}

/// Direction of an EMA-short / EMA-long crossover, before RSI confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    Bullish,
    Bearish,
}

/// RSI confirmation levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiLevels {
    /// A bearish cross only signals above this level.
    pub buy_level: f64,
    /// A bullish cross only signals below this level.
    pub sell_level: f64,
}

impl Default for RsiLevels {
    fn default() -> Self {
        Self {
            buy_level: 70.0,
            sell_level: 30.0,
        }
    }
}

pub fn ema_cross(indicators: &IndicatorSet, bar_index: usize) -> Option<Cross> {
    if bar_index == 0 {
        return None;
    }
    let short_curr = indicators.ema_short.get(bar_index)?;
    let long_curr = indicators.ema_long.get(bar_index)?;
    let short_prev = indicators.ema_short.get(bar_index - 1)?;
    let long_prev = indicators.ema_long.get(bar_index - 1)?;

    if short_curr > long_curr && short_prev <= long_prev {
        Some(Cross::Bullish)
    } else if short_curr < long_curr && short_prev >= long_prev {
        Some(Cross::Bearish)
    } else {
        None
    }
}

pub fn signal_at(indicators: &IndicatorSet, levels: &RsiLevels, bar_index: usize) -> Signal {
    let Some(cross) = ema_cross(indicators, bar_index) else {
        return Signal::None;
    };
    let Some(rsi) = indicators.rsi.get(bar_index) else {
        return Signal::None;
    };

    match cross {
        Cross::Bullish if rsi < levels.sell_level => Signal::BuyCross,
        Cross::Bearish if rsi > levels.buy_level => Signal::SellCross,
        _ => Signal::None,
    }
}

pub fn derive_signals(indicators: &IndicatorSet, levels: &RsiLevels) -> Vec<Signal> {
    (0..indicators.len())
        .map(|i| signal_at(indicators, levels, i))
        .collect()
}
