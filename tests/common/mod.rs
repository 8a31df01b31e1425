#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use tradesim::domain::bar::Bar;
use tradesim::domain::error::TradesimError;
use tradesim::domain::ledger::Ledger;
use tradesim::domain::simulator::SimulationParams;
use tradesim::ports::price_source::PriceSource;
use tradesim::ports::report_port::{ReportPort, SessionInfo};

pub struct MockPriceSource {
    pub data: HashMap<(String, NaiveDate), Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, session: NaiveDate, bars: Vec<Bar>) -> Self {
        self.data.insert((symbol.to_string(), session), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_bars(&self, symbol: &str, session: NaiveDate) -> Result<Vec<Bar>, TradesimError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TradesimError::SourceUnavailable {
                reason: reason.clone(),
            });
        }
        self.data
            .get(&(symbol.to_string(), session))
            .cloned()
            .ok_or_else(|| TradesimError::SourceUnavailable {
                reason: format!("no file for {symbol} on {session}"),
            })
    }
}

/// Records what the pipeline hands to the reporter.
pub struct RecordingReport {
    pub calls: RefCell<Vec<(Ledger, SessionInfo, String)>>,
}

impl RecordingReport {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for RecordingReport {
    fn write(
        &self,
        ledger: &Ledger,
        _params: &SimulationParams,
        session: &SessionInfo,
        output_path: &str,
    ) -> Result<(), TradesimError> {
        self.calls
            .borrow_mut()
            .push((ledger.clone(), session.clone(), output_path.to_string()));
        Ok(())
    }
}

pub fn session_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 8).unwrap()
}

pub fn session_open() -> NaiveDateTime {
    session_date().and_hms_opt(9, 30, 0).unwrap()
}

/// One bar per minute from the open, with the given closes.
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar::new(session_open() + Duration::minutes(i as i64), close))
        .collect()
}

/// `count` bars at `base`, with selected indices overridden.
pub fn bars_with(count: usize, base: f64, overrides: &[(usize, f64)]) -> Vec<Bar> {
    let mut closes = vec![base; count];
    for &(i, close) in overrides {
        closes[i] = close;
    }
    make_bars(&closes)
}

pub fn write_csv(dir: &std::path::Path, name: &str, bars: &[Bar]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "date,open,high,low,close,volume").unwrap();
    for bar in bars {
        writeln!(
            file,
            "{}-04:00,{:.2},{:.2},{:.2},{:.2},1000",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.close,
            bar.close + 0.5,
            bar.close - 0.5,
            bar.close
        )
        .unwrap();
    }
    path
}

pub fn default_params() -> SimulationParams {
    SimulationParams::default()
}
