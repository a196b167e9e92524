//! Strategy configuration: indicator periods, RSI levels and exit policy.

use crate::domain::indicator::IndicatorParams;
use crate::domain::signal::RsiLevels;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_RSI_EXIT_LEVEL: f64 = 70.0;

/// How an open position is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitPolicy {
    /// An opposite signal closes the position and opens the other side on
    /// the same bar.
    Reversal,
    /// Long only. A bearish EMA cross or RSI above `exit_level` closes the
    /// position and the strategy waits flat for the next entry.
    RsiExit { exit_level: f64 },
}

impl ExitPolicy {
    pub fn kind(&self) -> PolicyKind {
        match self {
            ExitPolicy::Reversal => PolicyKind::Reversal,
            ExitPolicy::RsiExit { .. } => PolicyKind::RsiExit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKind {
    #[default]
    Reversal,
    RsiExit,
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "reversal" => Ok(PolicyKind::Reversal),
            "rsi_exit" => Ok(PolicyKind::RsiExit),
            other => Err(format!(
                "unknown policy '{other}' (expected reversal or rsi_exit)"
            )),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Reversal => write!(f, "reversal"),
            PolicyKind::RsiExit => write!(f, "rsi_exit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub indicators: IndicatorParams,
    pub levels: RsiLevels,
    pub policy: ExitPolicy,
    /// Close a position still open after the last bar at that bar's close
    /// instead of dropping it.
    pub close_open_at_end: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            indicators: IndicatorParams::default(),
            levels: RsiLevels::default(),
            policy: ExitPolicy::Reversal,
            close_open_at_end: false,
        }
    }
}
