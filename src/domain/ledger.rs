//! Trade ledger, cumulative PnL and summary statistics.

use chrono::NaiveDateTime;

use super::position::{round_to_cents, Trade};

/// Ordered trades from one simulation run, in exit order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    trades: Vec<Trade>,
}

/// One point of the cumulative-PnL curve, keyed by exit time.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub time: NaiveDateTime,
    pub cumulative_pnl: f64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Running prefix sum of `net_pnl`, same length as the ledger.
    pub fn cumulative_pnl(&self) -> Vec<f64> {
        self.trades
            .iter()
            .scan(0.0, |acc, t| {
                *acc += t.net_pnl;
                Some(*acc)
            })
            .collect()
    }

    pub fn equity_curve(&self) -> Vec<EquityPoint> {
        self.trades
            .iter()
            .zip(self.cumulative_pnl())
            .map(|(t, cumulative_pnl)| EquityPoint {
                time: t.exit_time,
                cumulative_pnl,
            })
            .collect()
    }

    pub fn total_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.net_pnl).sum()
    }
}

impl From<Vec<Trade>> for Ledger {
    fn from(trades: Vec<Trade>) -> Self {
        Self { trades }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub break_even_trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub average_pnl: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    /// Deepest peak-to-trough fall of the cumulative PnL, as a positive amount.
    pub max_drawdown: f64,
}

impl LedgerSummary {
    pub fn compute(ledger: &Ledger) -> Self {
        let trades = ledger.trades();
        let total_trades = trades.len();
        let winning_trades = trades.iter().filter(|t| t.is_win()).count();
        let losing_trades = trades.iter().filter(|t| t.is_loss()).count();
        let break_even_trades = total_trades - winning_trades - losing_trades;

        let total_pnl = round_to_cents(ledger.total_pnl());
        let (win_rate, average_pnl) = if total_trades > 0 {
            (
                winning_trades as f64 / total_trades as f64,
                total_pnl / total_trades as f64,
            )
        } else {
            (0.0, 0.0)
        };

        let largest_win = trades
            .iter()
            .map(|t| t.net_pnl)
            .filter(|&p| p > 0.0)
            .fold(0.0, f64::max);
        let largest_loss = trades
            .iter()
            .map(|t| t.net_pnl)
            .filter(|&p| p < 0.0)
            .fold(0.0, f64::min);

        LedgerSummary {
            total_trades,
            winning_trades,
            losing_trades,
            break_even_trades,
            win_rate,
            total_pnl,
            average_pnl,
            largest_win,
            largest_loss,
            max_drawdown: max_drawdown(&ledger.cumulative_pnl()),
        }
    }
}

/// Largest fall from a running peak. The curve starts from a flat zero.
fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;
    for &value in cumulative {
        peak = peak.max(value);
        worst = worst.max(peak - value);
    }
    worst
}
