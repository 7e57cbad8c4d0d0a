//! RSI (Relative Strength Index) with Wilder's smoothing.
//!
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are invalid (need n price changes to compute initial average).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let mut values: Vec<IndicatorPoint> = bars
        .iter()
        .map(|b| IndicatorPoint {
            date: b.date,
            valid: false,
            value: IndicatorValue::Simple(0.0),
        })
        .collect();

    if period == 0 || bars.len() <= period {
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values,
        };
    }

    let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();
    let gain = |c: f64| if c > 0.0 { c } else { 0.0 };
    let loss = |c: f64| if c < 0.0 { -c } else { 0.0 };

    let mut avg_gain = changes[..period].iter().map(|&c| gain(c)).sum::<f64>() / period as f64;
    let mut avg_loss = changes[..period].iter().map(|&c| loss(c)).sum::<f64>() / period as f64;

    values[period].valid = true;
    values[period].value = IndicatorValue::Simple(rsi_from_averages(avg_gain, avg_loss));

    for i in (period + 1)..bars.len() {
        let change = changes[i - 1];
        avg_gain = (avg_gain * (period - 1) as f64 + gain(change)) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss(change)) / period as f64;
        values[i].valid = true;
        values[i].value = IndicatorValue::Simple(rsi_from_averages(avg_gain, avg_loss));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
