//! Table formatting for reports.
//!
//! Typst markup for the session summary, the ledger statistics and the trade
//! log, plus a plain-text trade table for the console.

use crate::domain::ledger::{Ledger, LedgerSummary};
use crate::domain::position::Trade;
use crate::domain::simulator::SimulationParams;
use crate::ports::report_port::SessionInfo;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Escape characters that Typst treats as markup inside `[...]` content.
pub fn typst_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '[' | ']' | '#' | '*' | '_' | '$' | '@' | '<' | '>' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn format_money(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", -value)
    } else {
        format!("${:.2}", value)
    }
}

pub fn render_session_summary(params: &SimulationParams, session: &SessionInfo) -> String {
    let session_date = session
        .session
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());

    let rows = [
        ("Symbol", typst_escape(&session.symbol)),
        ("Session", session_date),
        ("Bars", session.bars.to_string()),
        ("Entry Cadence", format!("every {} bars", params.entry_cadence)),
        ("Holding Period", format!("{} bars", params.holding_period)),
        ("Warmup", format!("{} bars", params.warmup_bars)),
        ("Stop Offset", format!("{:.2}", params.stop_offset)),
        ("Reward Ratio", format!("{:.2}", params.reward_ratio)),
        ("Risk per Trade", typst_escape(&format_money(params.risk_per_trade))),
        ("Entry Buffer", format!("{:.2}", params.entry_buffer)),
    ];

    let mut out = String::from("#table(\n  columns: 2,\n  [*Property*], [*Value*],\n");
    for (name, value) in rows {
        out.push_str(&format!("  [{}], [{}],\n", name, value));
    }
    out.push_str(")\n");
    out
}

pub fn render_summary_table(summary: &LedgerSummary) -> String {
    let rows = [
        ("Total Trades", summary.total_trades.to_string()),
        ("Winning Trades", summary.winning_trades.to_string()),
        ("Losing Trades", summary.losing_trades.to_string()),
        ("Break-even Trades", summary.break_even_trades.to_string()),
        ("Win Rate", format!("{:.1}%", summary.win_rate * 100.0)),
        ("Total PnL", format_money(summary.total_pnl)),
        ("Average PnL", format_money(summary.average_pnl)),
        ("Largest Win", format_money(summary.largest_win)),
        ("Largest Loss", format_money(summary.largest_loss)),
        ("Max Drawdown", format_money(summary.max_drawdown)),
    ];

    let mut out = String::from("#table(\n  columns: 2,\n  [*Metric*], [*Value*],\n");
    for (name, value) in rows {
        out.push_str(&format!("  [{}], [{}],\n", name, typst_escape(&value)));
    }
    out.push_str(")\n");
    out
}

pub fn render_trade_log(ledger: &Ledger) -> String {
    if ledger.is_empty() {
        return "No trades executed.".to_string();
    }

    let mut out = String::from(
        "#table(\n  columns: 7,\n  align: (right, left, left, right, right, right, right),\n",
    );
    out.push_str("  [*\\#*], [*Entry Time*], [*Exit Time*], [*Entry*], [*Exit*], [*Net PnL*], [*Cumulative*],\n");

    for (i, (trade, cumulative)) in ledger
        .trades()
        .iter()
        .zip(ledger.cumulative_pnl())
        .enumerate()
    {
        out.push_str(&format!(
            "  [{}], [{}], [{}], [{:.2}], [{:.2}], [{}], [{}],\n",
            i + 1,
            trade.entry_time.format(TIME_FORMAT),
            trade.exit_time.format(TIME_FORMAT),
            trade.entry_price,
            trade.exit_price,
            typst_escape(&format_money(trade.net_pnl)),
            typst_escape(&format_money(cumulative)),
        ));
    }

    out.push_str(")\n");
    out
}

/// Fixed-width trade table for terminal output.
pub fn format_console_table(ledger: &Ledger) -> String {
    if ledger.is_empty() {
        return "No trades executed.\n".to_string();
    }

    let mut out = format!(
        "{:>3}  {:<19}  {:<19}  {:>11}  {:>11}  {:>11}  {:>14}\n",
        "#", "entry_time", "exit_time", "entry_price", "exit_price", "net_pnl", "cumulative_pnl"
    );
    for (i, (trade, cumulative)) in ledger
        .trades()
        .iter()
        .zip(ledger.cumulative_pnl())
        .enumerate()
    {
        out.push_str(&format_console_row(i, trade, cumulative));
    }
    out
}

fn format_console_row(i: usize, trade: &Trade, cumulative: f64) -> String {
    format!(
        "{:>3}  {:<19}  {:<19}  {:>11.2}  {:>11.2}  {:>11.2}  {:>14.2}\n",
        i,
        trade.entry_time.format(TIME_FORMAT).to_string(),
        trade.exit_time.format(TIME_FORMAT).to_string(),
        trade.entry_price,
        trade.exit_price,
        trade.net_pnl,
        cumulative,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 8)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample_ledger() -> Ledger {
        Ledger::from(vec![
            Trade {
                entry_index: 24,
                exit_index: 29,
                entry_time: ts(9, 54),
                exit_time: ts(9, 59),
                entry_price: 250.0,
                exit_price: 252.0,
                position_size: 100,
                net_pnl: 200.0,
            },
            Trade {
                entry_index: 30,
                exit_index: 35,
                entry_time: ts(10, 0),
                exit_time: ts(10, 5),
                entry_price: 252.0,
                exit_price: 251.5,
                position_size: 100,
                net_pnl: -50.0,
            },
        ])
    }

    fn sample_session() -> SessionInfo {
        SessionInfo {
            symbol: "TSLA".into(),
            session: NaiveDate::from_ymd_opt(2025, 4, 8),
            bars: 390,
        }
    }

    #[test]
    fn escape_markup_characters() {
        assert_eq!(typst_escape("$100"), "\\$100");
        assert_eq!(typst_escape("a_b*c#"), "a\\_b\\*c\\#");
        assert_eq!(typst_escape("plain"), "plain");
    }

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(200.0), "$200.00");
        assert_eq!(format_money(-50.5), "-$50.50");
    }

    #[test]
    fn session_summary_lists_parameters() {
        let out = render_session_summary(&SimulationParams::default(), &sample_session());
        assert!(out.starts_with("#table("));
        assert!(out.contains("[TSLA]"));
        assert!(out.contains("[2025-04-08]"));
        assert!(out.contains("[every 6 bars]"));
        assert!(out.contains("[5 bars]"));
        assert!(out.contains("[1.20]"));
        assert!(out.contains("\\$100.00"));
    }

    #[test]
    fn summary_table_values() {
        let summary = LedgerSummary::compute(&sample_ledger());
        let out = render_summary_table(&summary);
        assert!(out.contains("[Total Trades], [2]"));
        assert!(out.contains("[Win Rate], [50.0%]"));
        assert!(out.contains("[Total PnL], [\\$150.00]"));
    }

    #[test]
    fn trade_log_empty() {
        assert_eq!(render_trade_log(&Ledger::new()), "No trades executed.");
    }

    #[test]
    fn trade_log_rows() {
        let out = render_trade_log(&sample_ledger());
        assert!(out.contains("columns: 7"));
        assert!(out.contains("[2025-04-08 09:54:00], [2025-04-08 09:59:00], [250.00], [252.00]"));
        assert!(out.contains("[\\$200.00], [\\$200.00]"));
        assert!(out.contains("[-\\$50.00], [\\$150.00]"));
    }

    #[test]
    fn console_table_empty() {
        assert_eq!(format_console_table(&Ledger::new()), "No trades executed.\n");
    }

    #[test]
    fn console_table_rows() {
        let out = format_console_table(&sample_ledger());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("net_pnl"));
        assert!(lines[1].contains("2025-04-08 09:59:00"));
        assert!(lines[1].contains("200.00"));
        assert!(lines[2].trim_end().ends_with("150.00"));
        assert!(lines[2].contains("-50.00"));
    }
}
