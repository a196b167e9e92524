//! Plain-text rendering of the trade log and its summary for the terminal.

use crate::domain::metrics::TradeSummary;
use crate::domain::position::Trade;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn format_trade_table(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "No trades found\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:>4}  {:<16}  {:<16}  {:<5}  {:>9}  {:>9}  {:>10}\n",
        "#", "Entry Time", "Exit Time", "Side", "Entry", "Exit", "PnL (pips)"
    ));
    output.push_str(&format!("{}\n", "-".repeat(83)));

    for (i, trade) in trades.iter().enumerate() {
        output.push_str(&format!(
            "{:>4}  {:<16}  {:<16}  {:<5}  {:>9.5}  {:>9.5}  {:>+10.1}\n",
            i + 1,
            trade.entry_time.format(TIME_FORMAT).to_string(),
            trade.exit_time.format(TIME_FORMAT).to_string(),
            trade.direction.to_string(),
            trade.entry_price,
            trade.exit_price,
            trade.pnl_pips
        ));
    }

    output
}

pub fn format_summary(summary: &TradeSummary) -> String {
    let mut output = String::new();
    output.push_str("=== Backtest Summary ===\n");
    output.push_str(&format!(
        "Total Trades:     {} ({} long, {} short)\n",
        summary.total_trades, summary.long_trades, summary.short_trades
    ));
    output.push_str(&format!(
        "Won / Lost:       {} / {} ({} breakeven)\n",
        summary.trades_won, summary.trades_lost, summary.trades_breakeven
    ));
    output.push_str(&format!("Win Rate:         {:.1}%\n", summary.win_rate * 100.0));
    output.push_str(&format!("Total PnL:        {:+.1} pips\n", summary.total_pips));
    output.push_str(&format!("Average Win:      {:.1} pips\n", summary.avg_win));
    output.push_str(&format!("Average Loss:     {:.1} pips\n", summary.avg_loss));
    output.push_str(&format!("Largest Win:      {:.1} pips\n", summary.largest_win));
    output.push_str(&format!("Largest Loss:     {:.1} pips\n", summary.largest_loss));
    output.push_str(&format!("Profit Factor:    {}\n", format_ratio(summary.profit_factor)));
    output.push_str(&format!(
        "Max Drawdown:     {:.1} pips\n",
        summary.max_drawdown_pips
    ));
    output.push_str(&format!("Avg Duration:     {:.1} h\n", summary.avg_trade_hours));
    output
}

fn format_ratio(value: f64) -> String {
    if value.is_infinite() {
        "inf".to_string()
    } else {
        format!("{value:.2}")
    }
}
