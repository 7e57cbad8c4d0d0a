//! Price data provider port.
//!
//! `Ok(None)` means the provider has nothing for the symbol (unknown,
//! delisted, empty); callers treat it as missing input rather than a failure.

use crate::domain::error::StockpulseError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::period::LookbackPeriod;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Daily history ending at the newest available bar.
    fn fetch_history(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> Result<Option<PriceSeries>, StockpulseError>;

    /// Daily history within `[start, end]`, used for benchmark series.
    fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<PriceSeries>, StockpulseError>;

    fn list_symbols(&self) -> Result<Vec<String>, StockpulseError>;
}
