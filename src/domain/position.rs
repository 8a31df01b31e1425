//! Open positions, closed trades and the sizing/PnL arithmetic between them.

use chrono::NaiveDateTime;

use super::bar::Bar;
use super::error::TradesimError;

/// The single open simulated trade. `stop_loss` and `take_profit` are recorded
/// at entry but never consulted by the exit rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_index: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_size: i64,
}

impl Position {
    /// Bars elapsed between entry and `index`.
    pub fn bars_held(&self, index: usize) -> usize {
        index.saturating_sub(self.entry_index)
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.position_size as f64
    }

    /// Realize the position at `bar`, producing the immutable trade record.
    pub fn close(&self, index: usize, bar: &Bar) -> Trade {
        Trade {
            entry_index: self.entry_index,
            exit_index: index,
            entry_time: self.entry_time,
            exit_time: bar.timestamp,
            entry_price: self.entry_price,
            exit_price: bar.close,
            position_size: self.position_size,
            net_pnl: round_to_cents(self.unrealized_pnl(bar.close)),
        }
    }
}

/// A closed, realized simulated trade.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub position_size: i64,
    pub net_pnl: f64,
}

impl Trade {
    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }

    pub fn is_win(&self) -> bool {
        self.net_pnl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.net_pnl < 0.0
    }
}

/// entry + reward_ratio * (entry - stop)
pub fn take_profit_price(entry_price: f64, stop_loss: f64, reward_ratio: f64) -> f64 {
    entry_price + reward_ratio * (entry_price - stop_loss)
}

/// Whole units such that a move from entry to stop loses about `risk_per_trade`.
///
/// Rounds half to even, so a 2.5 unit budget sizes to 2 and 3.5 sizes to 4.
/// A zero, negative or non-finite per-unit risk is rejected.
pub fn position_size(
    risk_per_trade: f64,
    entry_price: f64,
    stop_loss: f64,
) -> Result<i64, TradesimError> {
    let risk_per_unit = entry_price - stop_loss;
    if !(risk_per_unit > 0.0) || !risk_per_unit.is_finite() {
        return Err(TradesimError::InvalidRiskParameters {
            reason: format!(
                "risk per unit must be positive (entry {entry_price}, stop {stop_loss})"
            ),
        });
    }

    let units = (risk_per_trade / risk_per_unit).round_ties_even();
    if !units.is_finite() {
        return Err(TradesimError::InvalidRiskParameters {
            reason: format!("position size is not finite for risk budget {risk_per_trade}"),
        });
    }
    Ok(units as i64)
}

/// Round a currency amount to two fractional digits, ties to even.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn ts(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 8)
            .unwrap()
            .and_hms_opt(9, 30 + minute, 0)
            .unwrap()
    }

    fn sample_position() -> Position {
        Position {
            entry_index: 24,
            entry_time: ts(24),
            entry_price: 250.0,
            stop_loss: 249.0,
            take_profit: 251.2,
            position_size: 100,
        }
    }

    #[test]
    fn position_size_fixed_stop() {
        assert_eq!(position_size(100.0, 250.0, 249.0).unwrap(), 100);
    }

    #[test]
    fn position_size_rounds_half_to_even() {
        // 250 / 100 = 2.5 -> 2, 350 / 100 = 3.5 -> 4
        assert_eq!(position_size(250.0, 300.0, 200.0).unwrap(), 2);
        assert_eq!(position_size(350.0, 300.0, 200.0).unwrap(), 4);
        // 0.5 -> 0, 1.5 -> 2
        assert_eq!(position_size(50.0, 300.0, 200.0).unwrap(), 0);
        assert_eq!(position_size(150.0, 300.0, 200.0).unwrap(), 2);
    }

    #[test]
    fn position_size_rounds_non_ties_to_nearest() {
        assert_eq!(position_size(100.0, 300.0, 260.0).unwrap(), 2); // 2.5 tie -> 2
        assert_eq!(position_size(100.0, 300.0, 270.0).unwrap(), 3); // 3.33 -> 3
        assert_eq!(position_size(100.0, 300.0, 285.0).unwrap(), 7); // 6.67 -> 7
    }

    #[test]
    fn position_size_zero_risk_rejected() {
        let err = position_size(100.0, 250.0, 250.0).unwrap_err();
        assert!(matches!(err, TradesimError::InvalidRiskParameters { .. }));
    }

    #[test]
    fn position_size_negative_risk_rejected() {
        let err = position_size(100.0, 250.0, 251.0).unwrap_err();
        assert!(matches!(err, TradesimError::InvalidRiskParameters { .. }));
    }

    #[test]
    fn position_size_nan_rejected() {
        let err = position_size(100.0, f64::NAN, 249.0).unwrap_err();
        assert!(matches!(err, TradesimError::InvalidRiskParameters { .. }));
    }

    #[test]
    fn take_profit_uses_reward_multiple() {
        assert_relative_eq!(take_profit_price(250.0, 249.0, 1.2), 251.2);
        assert_relative_eq!(take_profit_price(100.0, 98.0, 2.0), 104.0);
    }

    #[test]
    fn round_to_cents_ties_to_even() {
        assert_eq!(round_to_cents(0.125), 0.12);
        assert_eq!(round_to_cents(0.375), 0.38);
        assert_eq!(round_to_cents(-0.125), -0.12);
        assert_eq!(round_to_cents(200.0), 200.0);
    }

    #[test]
    fn bars_held_counts_from_entry() {
        let pos = sample_position();
        assert_eq!(pos.bars_held(24), 0);
        assert_eq!(pos.bars_held(29), 5);
        assert_eq!(pos.bars_held(3), 0);
    }

    #[test]
    fn close_realizes_pnl() {
        let pos = sample_position();
        let trade = pos.close(29, &Bar::new(ts(29), 252.0));
        assert_eq!(trade.entry_index, 24);
        assert_eq!(trade.exit_index, 29);
        assert_eq!(trade.entry_time, ts(24));
        assert_eq!(trade.exit_time, ts(29));
        assert_eq!(trade.exit_price, 252.0);
        assert_eq!(trade.net_pnl, 200.0);
        assert_eq!(trade.bars_held(), 5);
        assert!(trade.is_win());
    }

    #[test]
    fn close_at_loss() {
        let pos = sample_position();
        let trade = pos.close(29, &Bar::new(ts(29), 248.755));
        assert_relative_eq!(trade.net_pnl, -124.5, epsilon = 1e-9);
        assert!(trade.is_loss());
        assert!(!trade.is_win());
    }
}
