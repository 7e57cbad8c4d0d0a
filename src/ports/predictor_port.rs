//! Next-day price predictor port.
//!
//! Implementations wrap an externally hosted model; nothing in this crate
//! trains or evaluates a network.

use crate::domain::enricher::IndicatorRow;
use crate::domain::error::StockpulseError;

pub trait PredictorPort {
    /// Predicted close for the trading day after the last row.
    fn predict_next_close(&self, rows: &[IndicatorRow]) -> Result<f64, StockpulseError>;
}
