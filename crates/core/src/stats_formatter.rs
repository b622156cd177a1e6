#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]

use crate::stats::PerformanceStats;
use rust_decimal::Decimal;

pub struct StatsFormatter;

impl StatsFormatter {
    #[must_use]
    pub fn format(stats: &PerformanceStats, initial_capital: Decimal) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                    SIMULATION RESULTS                         \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("Portfolio Performance\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Initial Capital:       ${:.2}\n", initial_capital));
        output.push_str(&format!(
            "Current Equity:        ${:.2}\n",
            stats.current_equity
        ));
        output.push_str(&format!("Equity Peak:           ${:.2}\n", stats.peak_equity));
        output.push_str(&format!("Total PnL:             ${:.2}\n", stats.total_pnl));
        output.push_str(&format!(
            "Sharpe Ratio:          {:.4}\n",
            stats.sharpe_ratio
        ));
        output.push_str(&format!(
            "Max Drawdown:          {:.2}%\n",
            stats.max_drawdown * 100.0
        ));
        output.push('\n');

        output.push_str("Trade Statistics\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Total Trades:          {}\n", stats.total_trades));

        if stats.total_trades > 0 {
            output.push_str(&format!(
                "Win Rate:              {:.2}% ({}/{})\n",
                stats.win_rate, stats.winning_trades, stats.total_trades
            ));
            output.push_str(&format!(
                "Profit Factor:         {:.2}\n",
                stats.profit_factor
            ));
            output.push_str(&format!("Expectancy:            ${:.2}\n", stats.expectancy));
            output.push_str(&format!(
                "Avg Win / Avg Loss:    ${:.2} / ${:.2} (RR {:.2})\n",
                stats.average_win, stats.average_loss, stats.average_risk_reward
            ));
            output.push_str(&format!(
                "Max Streaks:           {} wins / {} losses\n",
                stats.max_consecutive_wins, stats.max_consecutive_losses
            ));
        } else {
            output.push_str("Win Rate:              N/A (no trades)\n");
        }

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        if stats.total_trades == 0 {
            output.push_str("\nNo trades were made during this run.\n");
            output.push_str("Consider a longer candle range or a different provider.\n\n");
        }

        output
    }
}
