//! Position tracking and closed trades.

use crate::domain::price_bar::{to_pips, PriceBar};
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// Simulation state: flat, or exactly one open position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    #[default]
    Flat,
    Open {
        side: Side,
        entry_price: f64,
        entry_time: NaiveDateTime,
    },
}

impl Position {
    pub fn open(side: Side, bar: &PriceBar) -> Self {
        Position::Open {
            side,
            entry_price: bar.close,
            entry_time: bar.timestamp,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            Position::Flat => None,
            Position::Open { side, .. } => Some(*side),
        }
    }

    pub fn unrealized_pips(&self, price: f64) -> f64 {
        match *self {
            Position::Flat => 0.0,
            Position::Open {
                side, entry_price, ..
            } => pnl_pips(side, entry_price, price),
        }
    }

    /// Close at `bar`'s close. `None` when flat.
    pub fn close(&self, bar: &PriceBar) -> Option<Trade> {
        match *self {
            Position::Flat => None,
            Position::Open {
                side,
                entry_price,
                entry_time,
            } => Some(Trade {
                entry_time,
                exit_time: bar.timestamp,
                direction: side,
                entry_price,
                exit_price: bar.close,
                pnl_pips: pnl_pips(side, entry_price, bar.close),
            }),
        }
    }
}

/// (exit - entry) for longs, (entry - exit) for shorts, in pips.
pub fn pnl_pips(side: Side, entry_price: f64, exit_price: f64) -> f64 {
    match side {
        Side::Long => to_pips(exit_price - entry_price),
        Side::Short => to_pips(entry_price - exit_price),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub direction: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl_pips: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar::new(
            NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            close,
        )
    }

    #[test]
    fn long_trade_fifty_pips() {
        let pos = Position::open(Side::Long, &bar(1, 1.1000));
        let trade = pos.close(&bar(2, 1.1050)).unwrap();
        assert_eq!(trade.direction, Side::Long);
        assert_abs_diff_eq!(trade.pnl_pips, 50.0, epsilon = 1e-9);
        assert_eq!(trade.entry_time, bar(1, 0.0).timestamp);
        assert_eq!(trade.exit_time, bar(2, 0.0).timestamp);
    }

    #[test]
    fn short_trade_fifty_pips() {
        let pos = Position::open(Side::Short, &bar(1, 1.1050));
        let trade = pos.close(&bar(2, 1.1000)).unwrap();
        assert_eq!(trade.direction, Side::Short);
        assert_abs_diff_eq!(trade.pnl_pips, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn losing_long_is_negative() {
        assert_abs_diff_eq!(pnl_pips(Side::Long, 1.1050, 1.1000), -50.0, epsilon = 1e-9);
    }

    #[test]
    fn flat_close_is_none() {
        assert!(Position::Flat.close(&bar(1, 1.1)).is_none());
        assert!(Position::default().is_flat());
    }

    #[test]
    fn unrealized_pips() {
        let pos = Position::open(Side::Short, &bar(1, 1.2000));
        assert_abs_diff_eq!(pos.unrealized_pips(1.1990), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(Position::Flat.unrealized_pips(1.0), 0.0);
    }

    #[test]
    fn side_helpers() {
        assert_eq!(Side::Long.opposite(), Side::Short);
        assert_eq!(Side::Short.opposite(), Side::Long);
        assert_eq!(Side::Long.to_string(), "long");
        assert_eq!(Position::open(Side::Short, &bar(1, 1.0)).side(), Some(Side::Short));
        assert_eq!(Position::Flat.side(), None);
    }
}
