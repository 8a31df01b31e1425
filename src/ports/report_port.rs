//! Report generation port trait.

use crate::domain::error::TradesimError;
use crate::domain::ledger::Ledger;
use crate::domain::simulator::SimulationParams;
use chrono::NaiveDate;

/// What a report describes besides the ledger itself.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub symbol: String,
    pub session: Option<NaiveDate>,
    pub bars: usize,
}

/// Port for writing simulation reports.
pub trait ReportPort {
    fn write(
        &self,
        ledger: &Ledger,
        params: &SimulationParams,
        session: &SessionInfo,
        output_path: &str,
    ) -> Result<(), TradesimError>;
}
