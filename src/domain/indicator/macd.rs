//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, seeded with the SMA of its first
//! `signal` valid values
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow) - 1 + signal - 1 bars

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if bars.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let macd_line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    // The signal EMA runs over the valid tail of the MACD line only.
    let line_start = macd_line.iter().position(Option::is_some).unwrap_or(bars.len());
    let valid_line: Vec<f64> = macd_line[line_start..].iter().flatten().copied().collect();
    let mut signal_line: Vec<Option<f64>> = vec![None; line_start];
    signal_line.extend(ema_values(&valid_line, signal_period));

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let line = macd_line[i];
            let signal = signal_line[i];
            IndicatorPoint {
                date: bar.date,
                valid: line.is_some() && signal.is_some(),
                value: IndicatorValue::Macd {
                    line: line.unwrap_or(0.0),
                    signal: signal.unwrap_or(0.0),
                },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
