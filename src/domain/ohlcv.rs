//! Daily OHLCV bars and price series.

use crate::domain::error::StockpulseError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Percentage change of this bar's close relative to `prev_close`.
    pub fn pct_change(&self, prev_close: f64) -> f64 {
        (self.close - prev_close) / prev_close
    }
}

/// Bars for one instrument, as delivered by a price data provider.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Checks the ordering and price invariants every computation relies on:
/// dates strictly increasing and every close positive and finite.
pub fn validate_bars(bars: &[PriceBar]) -> Result<(), StockpulseError> {
    for (i, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(StockpulseError::InvalidSeries {
                reason: format!("bar {} ({}) has non-positive close {}", i, bar.date, bar.close),
            });
        }
        if i > 0 && bars[i - 1].date >= bar.date {
            return Err(StockpulseError::InvalidSeries {
                reason: format!(
                    "bar {} ({}) is not after bar {} ({})",
                    i,
                    bar.date,
                    i - 1,
                    bars[i - 1].date
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn pct_change() {
        let b = bar("2024-01-02", 110.0);
        assert!((b.pct_change(100.0) - 0.10).abs() < 1e-12);
    }

    #[test]
    fn validate_accepts_sorted_positive_bars() {
        let bars = vec![bar("2024-01-01", 10.0), bar("2024-01-02", 11.0)];
        assert!(validate_bars(&bars).is_ok());
    }

    #[test]
    fn validate_accepts_empty() {
        assert!(validate_bars(&[]).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_dates() {
        let bars = vec![bar("2024-01-01", 10.0), bar("2024-01-01", 11.0)];
        assert!(matches!(
            validate_bars(&bars),
            Err(StockpulseError::InvalidSeries { .. })
        ));
    }

    #[test]
    fn validate_rejects_unsorted_dates() {
        let bars = vec![bar("2024-01-02", 10.0), bar("2024-01-01", 11.0)];
        assert!(validate_bars(&bars).is_err());
    }

    #[test]
    fn validate_rejects_zero_close() {
        let bars = vec![bar("2024-01-01", 10.0), bar("2024-01-02", 0.0)];
        let err = validate_bars(&bars).unwrap_err();
        assert!(err.to_string().contains("bar 1"));
    }

    #[test]
    fn series_accessors() {
        let series = PriceSeries::new(
            "AAPL",
            vec![bar("2024-01-01", 10.0), bar("2024-01-03", 12.0)],
        );
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3));
    }
}
