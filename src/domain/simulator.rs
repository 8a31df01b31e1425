//! Forward linear-scan trade simulation.
//!
//! The scan walks the bars once, starting at `warmup_bars`, threading a
//! [`ScanState`] accumulator through [`ScanState::step`]. Entries and exits are
//! decided by pluggable predicates; the defaults open on a fixed bar cadence
//! and close after a fixed holding period. Stop-loss and take-profit levels are
//! recorded on each position but no price-based exit is applied.

use tracing::{debug, info, warn};

use super::bar::Bar;
use super::error::TradesimError;
use super::ledger::Ledger;
use super::position::{position_size, take_profit_price, Position, Trade};

/// Named parameters for a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    /// Carried through configuration; the cadence entry rule ignores it.
    pub entry_buffer: f64,
    pub reward_ratio: f64,
    pub risk_per_trade: f64,
    pub stop_offset: f64,
    pub entry_cadence: usize,
    pub holding_period: usize,
    pub warmup_bars: usize,
    pub min_bars: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            entry_buffer: 0.10,
            reward_ratio: 1.2,
            risk_per_trade: 100.0,
            stop_offset: 1.0,
            entry_cadence: 6,
            holding_period: 5,
            warmup_bars: 20,
            min_bars: 25,
        }
    }
}

/// Decides whether to open a position at `index` while flat.
pub trait EntryPredicate {
    fn should_enter(&self, index: usize, bar: &Bar) -> bool;
}

/// Decides whether to close the open position at `index`.
pub trait ExitPredicate {
    fn should_exit(&self, index: usize, position: &Position) -> bool;
}

impl<F> EntryPredicate for F
where
    F: Fn(usize, &Bar) -> bool,
{
    fn should_enter(&self, index: usize, bar: &Bar) -> bool {
        self(index, bar)
    }
}

impl<F> ExitPredicate for F
where
    F: Fn(usize, &Position) -> bool,
{
    fn should_exit(&self, index: usize, position: &Position) -> bool {
        self(index, position)
    }
}

/// Enter on every bar whose index is a multiple of `every`. Zero never enters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceEntry {
    pub every: usize,
}

impl EntryPredicate for CadenceEntry {
    fn should_enter(&self, index: usize, _bar: &Bar) -> bool {
        self.every != 0 && index % self.every == 0
    }
}

/// Exit once `bars` bars have elapsed since entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldingPeriodExit {
    pub bars: usize,
}

impl ExitPredicate for HoldingPeriodExit {
    fn should_exit(&self, index: usize, position: &Position) -> bool {
        position.bars_held(index) >= self.bars
    }
}

/// Scan state: flat, or holding exactly one position.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScanState {
    #[default]
    Flat,
    Open(Position),
}

impl ScanState {
    pub fn is_open(&self) -> bool {
        matches!(self, ScanState::Open(_))
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            ScanState::Open(pos) => Some(pos),
            ScanState::Flat => None,
        }
    }

    /// Apply one bar. Returns the next state and the trade closed on this bar, if any.
    pub fn step<E, X>(
        self,
        index: usize,
        bar: &Bar,
        params: &SimulationParams,
        entry: &E,
        exit: &X,
    ) -> Result<(ScanState, Option<Trade>), TradesimError>
    where
        E: EntryPredicate + ?Sized,
        X: ExitPredicate + ?Sized,
    {
        match self {
            ScanState::Flat if entry.should_enter(index, bar) => {
                let pos = open_position(index, bar, params)?;
                debug!(
                    index,
                    time = %bar.timestamp,
                    close = bar.close,
                    size = pos.position_size,
                    "forced entry"
                );
                Ok((ScanState::Open(pos), None))
            }
            ScanState::Flat => Ok((ScanState::Flat, None)),
            ScanState::Open(pos) if exit.should_exit(index, &pos) => {
                let trade = pos.close(index, bar);
                debug!(
                    index,
                    time = %bar.timestamp,
                    close = bar.close,
                    net_pnl = trade.net_pnl,
                    "forced exit"
                );
                Ok((ScanState::Flat, Some(trade)))
            }
            open @ ScanState::Open(_) => Ok((open, None)),
        }
    }
}

/// Open a position at the bar's close with a fixed-offset stop.
pub fn open_position(
    index: usize,
    bar: &Bar,
    params: &SimulationParams,
) -> Result<Position, TradesimError> {
    let entry_price = bar.close;
    let stop_loss = entry_price - params.stop_offset;
    let take_profit = take_profit_price(entry_price, stop_loss, params.reward_ratio);
    let size = position_size(params.risk_per_trade, entry_price, stop_loss)?;

    Ok(Position {
        entry_index: index,
        entry_time: bar.timestamp,
        entry_price,
        stop_loss,
        take_profit,
        position_size: size,
    })
}

/// Run the default cadence/holding-period simulation.
pub fn simulate(bars: &[Bar], params: &SimulationParams) -> Result<Ledger, TradesimError> {
    let entry = CadenceEntry {
        every: params.entry_cadence,
    };
    let exit = HoldingPeriodExit {
        bars: params.holding_period,
    };
    simulate_with(bars, params, &entry, &exit)
}

/// Run the scan with caller-supplied entry and exit rules.
///
/// Fails with `InsufficientData` when the series is shorter than
/// `params.min_bars`. A position still open when the bars run out is dropped
/// without producing a trade.
pub fn simulate_with<E, X>(
    bars: &[Bar],
    params: &SimulationParams,
    entry: &E,
    exit: &X,
) -> Result<Ledger, TradesimError>
where
    E: EntryPredicate + ?Sized,
    X: ExitPredicate + ?Sized,
{
    if bars.len() < params.min_bars {
        return Err(TradesimError::too_few_bars(bars.len(), params.min_bars));
    }

    info!(
        bars = bars.len(),
        warmup = params.warmup_bars,
        reward_ratio = params.reward_ratio,
        risk_per_trade = params.risk_per_trade,
        "running simulation"
    );

    let (state, ledger) = bars.iter().enumerate().skip(params.warmup_bars).try_fold(
        (ScanState::Flat, Ledger::new()),
        |(state, mut ledger), (index, bar)| {
            let (next, closed) = state.step(index, bar, params, entry, exit)?;
            if let Some(trade) = closed {
                ledger.push(trade);
            }
            Ok::<_, TradesimError>((next, ledger))
        },
    )?;

    if let Some(pos) = state.position() {
        warn!(
            entry_index = pos.entry_index,
            entry_time = %pos.entry_time,
            "position still open at end of data, discarded"
        );
    }

    info!(trades = ledger.len(), "simulation complete");
    Ok(ledger)
}
