//! Price series access port trait.

use crate::domain::bar::Bar;
use crate::domain::error::TradesimError;
use chrono::NaiveDate;

pub trait PriceSource {
    /// Bars for one symbol's session, ordered by timestamp.
    fn fetch_bars(&self, symbol: &str, session: NaiveDate) -> Result<Vec<Bar>, TradesimError>;
}
