//! Relative performance of several instruments on a common scale.

use crate::domain::error::StockpulseError;
use crate::domain::ohlcv::{PriceSeries, validate_bars};
use chrono::NaiveDate;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub symbol: String,
    /// Percentage growth from the first close: (close / first - 1) * 100.
    pub performance_pct: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Dates of the first usable series.
    pub dates: Vec<NaiveDate>,
    pub series: Vec<NormalizedSeries>,
}

pub fn normalize(series: &PriceSeries) -> Result<NormalizedSeries, StockpulseError> {
    validate_bars(&series.bars)?;
    let first = series
        .bars
        .first()
        .map(|b| b.close)
        .ok_or_else(|| StockpulseError::DataUnavailable {
            symbol: series.symbol.clone(),
        })?;

    Ok(NormalizedSeries {
        symbol: series.symbol.clone(),
        performance_pct: series
            .bars
            .iter()
            .map(|b| (b.close / first - 1.0) * 100.0)
            .collect(),
    })
}

pub fn compare(inputs: &[PriceSeries]) -> Result<Comparison, StockpulseError> {
    let mut dates = Vec::new();
    let mut series = Vec::with_capacity(inputs.len());

    for input in inputs {
        if input.bars.is_empty() {
            warn!(symbol = %input.symbol, "skipping symbol with no data");
            continue;
        }
        let normalized = normalize(input)?;
        if dates.is_empty() {
            dates = input.bars.iter().map(|b| b.date).collect();
        }
        series.push(normalized);
    }

    if series.is_empty() {
        let symbols: Vec<&str> = inputs.iter().map(|s| s.symbol.as_str()).collect();
        return Err(StockpulseError::DataUnavailable {
            symbol: symbols.join(","),
        });
    }

    Ok(Comparison { dates, series })
}
