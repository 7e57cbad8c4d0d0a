//! Technical indicator implementations.
//!
//! Each calculator returns a full-length `IndicatorSeries` aligned with its
//! input bars; warm-up points are kept but flagged `valid = false`. The
//! enricher in [`crate::domain::enricher`] decides which rows survive.

pub mod ema;
pub mod macd;
pub mod rsi;

pub use macd::calculate_macd;
pub use rsi::calculate_rsi;

use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd { line: f64, signal: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Simple value at `index`, `None` during warm-up.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Simple(v),
                ..
            }) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_at_skips_invalid_points() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Rsi(2),
            values: vec![
                IndicatorPoint {
                    date,
                    valid: false,
                    value: IndicatorValue::Simple(0.0),
                },
                IndicatorPoint {
                    date: date.succ_opt().unwrap(),
                    valid: true,
                    value: IndicatorValue::Simple(5.0),
                },
            ],
        };
        assert_eq!(series.simple_at(0), None);
        assert_eq!(series.simple_at(1), Some(5.0));
        assert_eq!(series.simple_at(2), None);
    }
}
