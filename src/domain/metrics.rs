//! Trade log statistics in pips.

use super::position::{Side, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct TradeSummary {
    pub total_trades: usize,
    pub long_trades: usize,
    pub short_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub total_pips: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    /// Deepest peak-to-trough fall of the running pip total.
    pub max_drawdown_pips: f64,
    pub avg_trade_hours: f64,
}

impl TradeSummary {
    pub fn compute(trades: &[Trade]) -> Self {
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_duration_secs = 0i64;

        for trade in trades {
            let pnl = trade.pnl_pips;
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }

            total_duration_secs += (trade.exit_time - trade.entry_time).num_seconds();
        }

        let total_trades = trades.len();
        let long_trades = trades.iter().filter(|t| t.direction == Side::Long).count();

        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };

        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        let avg_trade_hours = if total_trades > 0 {
            total_duration_secs as f64 / 3600.0 / total_trades as f64
        } else {
            0.0
        };

        TradeSummary {
            total_trades,
            long_trades,
            short_trades: total_trades - long_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            total_pips: trades.iter().map(|t| t.pnl_pips).sum(),
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            max_drawdown_pips: compute_drawdown(&cumulative_pips(trades)),
            avg_trade_hours,
        }
    }
}

/// Running pip total after each trade.
pub fn cumulative_pips(trades: &[Trade]) -> Vec<f64> {
    trades
        .iter()
        .scan(0.0, |total, trade| {
            *total += trade.pnl_pips;
            Some(*total)
        })
        .collect()
}

fn compute_drawdown(running: &[f64]) -> f64 {
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for &total in running {
        peak = peak.max(total);
        max_dd = max_dd.max(peak - total);
    }

    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn make_trade(direction: Side, pnl_pips: f64, hours: i64) -> Trade {
        let entry_time = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Trade {
            entry_time,
            exit_time: entry_time + chrono::Duration::hours(hours),
            direction,
            entry_price: 1.1,
            exit_price: 1.1 + pnl_pips / 10_000.0,
            pnl_pips,
        }
    }

    #[test]
    fn summary_empty() {
        let s = TradeSummary::compute(&[]);
        assert_eq!(s.total_trades, 0);
        assert_eq!(s.trades_won, 0);
        assert_abs_diff_eq!(s.win_rate, 0.0);
        assert_abs_diff_eq!(s.total_pips, 0.0);
        assert_abs_diff_eq!(s.profit_factor, 0.0);
        assert_abs_diff_eq!(s.max_drawdown_pips, 0.0);
    }

    #[test]
    fn summary_win_loss_breakdown() {
        let trades = vec![
            make_trade(Side::Long, 50.0, 2),
            make_trade(Side::Short, -20.0, 4),
            make_trade(Side::Long, 0.0, 6),
            make_trade(Side::Short, 30.0, 8),
        ];
        let s = TradeSummary::compute(&trades);

        assert_eq!(s.total_trades, 4);
        assert_eq!(s.long_trades, 2);
        assert_eq!(s.short_trades, 2);
        assert_eq!(s.trades_won, 2);
        assert_eq!(s.trades_lost, 1);
        assert_eq!(s.trades_breakeven, 1);
        assert_abs_diff_eq!(s.win_rate, 0.5);
        assert_abs_diff_eq!(s.total_pips, 60.0);
        assert_abs_diff_eq!(s.profit_factor, 4.0);
        assert_abs_diff_eq!(s.avg_win, 40.0);
        assert_abs_diff_eq!(s.avg_loss, 20.0);
        assert_abs_diff_eq!(s.largest_win, 50.0);
        assert_abs_diff_eq!(s.largest_loss, 20.0);
        assert_abs_diff_eq!(s.avg_trade_hours, 5.0);
    }

    #[test]
    fn profit_factor_infinite_without_losses() {
        let s = TradeSummary::compute(&[make_trade(Side::Long, 10.0, 1)]);
        assert!(s.profit_factor.is_infinite());
    }

    #[test]
    fn cumulative_pips_running_total() {
        let trades = vec![
            make_trade(Side::Long, 10.0, 1),
            make_trade(Side::Long, -5.0, 1),
            make_trade(Side::Long, 20.0, 1),
        ];
        assert_eq!(cumulative_pips(&trades), vec![10.0, 5.0, 25.0]);
    }

    #[test]
    fn drawdown_from_peak() {
        assert_abs_diff_eq!(compute_drawdown(&[10.0, 5.0, 25.0, -5.0, 0.0]), 30.0);
        assert_abs_diff_eq!(compute_drawdown(&[-10.0]), 10.0);
        assert_abs_diff_eq!(compute_drawdown(&[5.0, 10.0]), 0.0);
    }
}
