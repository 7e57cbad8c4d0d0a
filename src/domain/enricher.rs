//! Indicator enrichment: raw bars in, indicator rows out.
//!
//! Every emitted row carries RSI(14), the MACD(12,26,9) line and its signal
//! line. The first `WARMUP_BARS` rows are dropped rather than null-filled, so
//! the output is exactly `WARMUP_BARS` shorter than the input.

use crate::domain::error::StockpulseError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::rsi::DEFAULT_PERIOD as RSI_PERIOD;
use crate::domain::indicator::{IndicatorValue, calculate_macd, calculate_rsi};
use crate::domain::ohlcv::{PriceBar, validate_bars};
use std::fmt;
use tracing::debug;

/// Longest window any indicator needs: the slow EMA plus the signal EMA.
pub const WARMUP_BARS: usize = DEFAULT_SLOW + DEFAULT_SIGNAL;

/// A price bar plus its derived indicators.
///
/// Fields are optional so rows assembled elsewhere (deserialized, hand-built
/// in tests) can be checked by the backtester; `enrich` always fills them.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub bar: PriceBar,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

impl IndicatorRow {
    pub fn date(&self) -> chrono::NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }
}

impl fmt::Display for IndicatorRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<f64>| v.map_or_else(|| "none".to_string(), |x| format!("{:.4}", x));
        write!(
            f,
            "date={} close={} rsi={} macd={} macd_signal={}",
            self.bar.date,
            self.bar.close,
            opt(self.rsi),
            opt(self.macd),
            opt(self.macd_signal)
        )
    }
}

pub fn enrich(bars: &[PriceBar]) -> Result<Vec<IndicatorRow>, StockpulseError> {
    if bars.len() < WARMUP_BARS {
        return Err(StockpulseError::insufficient(
            "indicator enrichment",
            bars.len(),
            WARMUP_BARS,
        ));
    }
    validate_bars(bars)?;

    let rsi = calculate_rsi(bars, RSI_PERIOD);
    let macd = calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);

    let rows: Vec<IndicatorRow> = bars
        .iter()
        .enumerate()
        .skip(WARMUP_BARS)
        .map(|(i, bar)| {
            let (line, signal) = match &macd.values[i] {
                point if point.valid => match point.value {
                    IndicatorValue::Macd { line, signal } => (Some(line), Some(signal)),
                    IndicatorValue::Simple(_) => (None, None),
                },
                _ => (None, None),
            };
            IndicatorRow {
                bar: bar.clone(),
                rsi: rsi.simple_at(i),
                macd: line,
                macd_signal: signal,
            }
        })
        .collect();

    debug!(
        input = bars.len(),
        output = rows.len(),
        warmup = WARMUP_BARS,
        "enriched price series"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(n: usize) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + 10.0 * ((i as f64) * 0.4).sin() + i as f64 * 0.1;
                PriceBar {
                    date: start + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10_000.0,
                }
            })
            .collect()
    }

    #[test]
    fn warmup_constant() {
        assert_eq!(WARMUP_BARS, 35);
    }

    #[test]
    fn too_short_series_is_insufficient() {
        let err = enrich(&make_bars(34)).unwrap_err();
        match err {
            StockpulseError::InsufficientData {
                available,
                required,
                ..
            } => {
                assert_eq!(available, 34);
                assert_eq!(required, 35);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn exactly_warmup_yields_empty() {
        let rows = enrich(&make_bars(35)).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn output_is_input_minus_warmup() {
        let bars = make_bars(120);
        let rows = enrich(&bars).unwrap();
        assert_eq!(rows.len(), 120 - WARMUP_BARS);
        assert_eq!(rows[0].bar, bars[WARMUP_BARS]);
        assert_eq!(rows.last().unwrap().bar, bars[119]);
    }

    #[test]
    fn every_row_is_fully_populated() {
        let rows = enrich(&make_bars(80)).unwrap();
        for row in &rows {
            let rsi = row.rsi.expect("rsi");
            assert!((0.0..=100.0).contains(&rsi));
            assert!(row.macd.is_some());
            assert!(row.macd_signal.is_some());
        }
    }

    #[test]
    fn invalid_series_is_rejected() {
        let mut bars = make_bars(40);
        bars[10].close = -1.0;
        assert!(matches!(
            enrich(&bars),
            Err(StockpulseError::InvalidSeries { .. })
        ));
    }

    #[test]
    fn display_includes_indicator_values() {
        let rows = enrich(&make_bars(36)).unwrap();
        let text = rows[0].to_string();
        assert!(text.contains("rsi="));
        assert!(text.contains("macd_signal="));

        let mut row = rows[0].clone();
        row.macd = None;
        assert!(row.to_string().contains("macd=none"));
    }
}
