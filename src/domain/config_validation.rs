//! Configuration validation.
//!
//! Validates every strategy field before a backtest runs.

use crate::domain::error::FxcrossError;
use crate::domain::strategy::{ExitPolicy, StrategyConfig};
use tracing::warn;

pub const EMA_SHORT_RANGE: (usize, usize) = (2, 100);
pub const EMA_LONG_RANGE: (usize, usize) = (2, 200);
pub const RSI_PERIOD_RANGE: (usize, usize) = (2, 50);
pub const RSI_BUY_LEVEL_RANGE: (f64, f64) = (50.0, 100.0);
pub const RSI_SELL_LEVEL_RANGE: (f64, f64) = (0.0, 50.0);
pub const RSI_ENTRY_THRESHOLD_RANGE: (f64, f64) = (0.0, 100.0);
pub const RSI_EXIT_LEVEL_RANGE: (f64, f64) = (0.0, 100.0);

pub fn validate_strategy_config(config: &StrategyConfig) -> Result<(), FxcrossError> {
    validate_ema_periods(config)?;
    validate_rsi_period(config)?;
    validate_rsi_levels(config)?;
    validate_exit_level(config)?;
    Ok(())
}

fn validate_ema_periods(config: &StrategyConfig) -> Result<(), FxcrossError> {
    let short = config.indicators.ema_short_period;
    let long = config.indicators.ema_long_period;
    check_period("ema_short_period", short, EMA_SHORT_RANGE)?;
    check_period("ema_long_period", long, EMA_LONG_RANGE)?;
    if short >= long {
        // still a valid crossover, the two lines simply swap roles
        warn!(short, long, "ema_short_period is not below ema_long_period");
    }
    Ok(())
}

fn validate_rsi_period(config: &StrategyConfig) -> Result<(), FxcrossError> {
    check_period("rsi_period", config.indicators.rsi_period, RSI_PERIOD_RANGE)
}

fn validate_rsi_levels(config: &StrategyConfig) -> Result<(), FxcrossError> {
    match config.policy {
        ExitPolicy::Reversal => {
            check_level("rsi_buy_level", config.levels.buy_level, RSI_BUY_LEVEL_RANGE)?;
            check_level("rsi_sell_level", config.levels.sell_level, RSI_SELL_LEVEL_RANGE)
        }
        // the buy level is never consulted by the long-only policy
        ExitPolicy::RsiExit { .. } => check_level(
            "rsi_sell_level",
            config.levels.sell_level,
            RSI_ENTRY_THRESHOLD_RANGE,
        ),
    }
}

fn validate_exit_level(config: &StrategyConfig) -> Result<(), FxcrossError> {
    match config.policy {
        ExitPolicy::Reversal => Ok(()),
        ExitPolicy::RsiExit { exit_level } => {
            check_level("rsi_exit_level", exit_level, RSI_EXIT_LEVEL_RANGE)
        }
    }
}

fn check_period(key: &str, value: usize, (min, max): (usize, usize)) -> Result<(), FxcrossError> {
    if value < min || value > max {
        return Err(FxcrossError::invalid(
            "indicators",
            key,
            format!("{key} must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(())
}

fn check_level(key: &str, value: f64, (min, max): (f64, f64)) -> Result<(), FxcrossError> {
    if !value.is_finite() || value < min || value > max {
        return Err(FxcrossError::invalid(
            "strategy",
            key,
            format!("{key} must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(())
}
