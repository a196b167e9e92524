//! Single-pass trade simulation.
//!
//! The bar sequence is folded once from bar 1, carrying a [`Position`]. Each
//! step sees the bar, its signal and the policy, and returns the next
//! position plus at most one closed trade.

use crate::domain::indicator::IndicatorSet;
use crate::domain::position::{Position, Side, Trade};
use crate::domain::price_bar::PriceBar;
use crate::domain::signal::{ema_cross, signal_at, Cross, Signal};
use crate::domain::strategy::{ExitPolicy, StrategyConfig};
use tracing::{debug, info, info_span};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub trades: Vec<Trade>,
    /// Position still open after the last bar and not converted to a trade.
    pub open_position: Position,
}

/// What the state machine needs to know about one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarEvent {
    pub signal: Signal,
    pub cross: Option<Cross>,
    pub rsi: Option<f64>,
}

impl BarEvent {
    pub fn at(indicators: &IndicatorSet, config: &StrategyConfig, bar_index: usize) -> Self {
        Self {
            signal: signal_at(indicators, &config.levels, bar_index),
            cross: ema_cross(indicators, bar_index),
            rsi: indicators.rsi.get(bar_index),
        }
    }
}

pub fn step(
    position: Position,
    bar: &PriceBar,
    event: BarEvent,
    policy: &ExitPolicy,
) -> (Position, Option<Trade>) {
    match policy {
        ExitPolicy::Reversal => step_reversal(position, bar, event.signal),
        ExitPolicy::RsiExit { exit_level } => step_rsi_exit(position, bar, event, *exit_level),
    }
}

fn step_reversal(position: Position, bar: &PriceBar, signal: Signal) -> (Position, Option<Trade>) {
    let wanted = match signal {
        Signal::BuyCross => Side::Long,
        Signal::SellCross => Side::Short,
        Signal::None => return (position, None),
    };

    match position.side() {
        None => (Position::open(wanted, bar), None),
        Some(side) if side.opposite() == wanted => (Position::open(wanted, bar), position.close(bar)),
        Some(_) => (position, None),
    }
}

fn step_rsi_exit(
    position: Position,
    bar: &PriceBar,
    event: BarEvent,
    exit_level: f64,
) -> (Position, Option<Trade>) {
    match position {
        Position::Flat if event.signal == Signal::BuyCross => (Position::open(Side::Long, bar), None),
        Position::Flat => (position, None),
        Position::Open { .. } => {
            let overbought = event.rsi.is_some_and(|rsi| rsi > exit_level);
            if overbought || event.cross == Some(Cross::Bearish) {
                (Position::Flat, position.close(bar))
            } else {
                (position, None)
            }
        }
    }
}

pub fn simulate(
    bars: &[PriceBar],
    indicators: &IndicatorSet,
    config: &StrategyConfig,
) -> SimulationResult {
    let _span = info_span!("simulate", bars = bars.len(), policy = %config.policy.kind()).entered();
    debug_assert_eq!(bars.len(), indicators.len());

    let (open_position, mut trades) = bars
        .iter()
        .enumerate()
        .skip(1)
        .fold((Position::Flat, Vec::new()), |(position, mut trades), (i, bar)| {
            let event = BarEvent::at(indicators, config, i);
            let (next, trade) = step(position, bar, event, &config.policy);
            if let Some(trade) = trade {
                debug!(
                    direction = %trade.direction,
                    exit_time = %trade.exit_time,
                    pnl_pips = trade.pnl_pips,
                    "closed trade"
                );
                trades.push(trade);
            }
            if next != position {
                if let Some(side) = next.side() {
                    debug!(%side, time = %bar.timestamp, price = bar.close, "opened position");
                }
            }
            (next, trades)
        });

    let open_position = match (open_position, bars.last()) {
        (Position::Open { entry_time, .. }, Some(last))
            if config.close_open_at_end && last.timestamp > entry_time =>
        {
            trades.extend(open_position.close(last));
            Position::Flat
        }
        _ => open_position,
    };

    if let Position::Open {
        side, entry_time, ..
    } = open_position
    {
        info!(%side, %entry_time, "position open at end of data was not closed");
    }

    SimulationResult {
        trades,
        open_position,
    }
}
