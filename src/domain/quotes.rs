//! Latest-close quotes: price plus the move from the previous close.

use crate::domain::error::StockpulseError;
use crate::domain::ohlcv::{PriceSeries, validate_bars};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

/// Quote from the last two closes; `None` when fewer than two bars exist.
pub fn quote(series: &PriceSeries) -> Result<Option<Quote>, StockpulseError> {
    let [.., previous, latest] = series.bars.as_slice() else {
        return Ok(None);
    };
    validate_bars(&series.bars)?;

    let change = latest.close - previous.close;
    Ok(Some(Quote {
        symbol: series.symbol.clone(),
        price: latest.close,
        change,
        change_percent: change / previous.close * 100.0,
    }))
}

/// Quotes in input order, skipping symbols with too little history.
pub fn quotes(inputs: &[PriceSeries]) -> Result<Vec<Quote>, StockpulseError> {
    let mut out = Vec::with_capacity(inputs.len());
    for input in inputs {
        match quote(input)? {
            Some(q) => out.push(q),
            None => warn!(
                symbol = %input.symbol,
                bars = input.bars.len(),
                "skipping symbol without two closes"
            ),
        }
    }
    Ok(out)
}
