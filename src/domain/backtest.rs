//! Single-position strategy backtests over enriched indicator rows.
//!
//! The replay is a fold: an [`Account`] accumulator is threaded through the
//! rows and each step returns the next account plus an optional [`Signal`].
//! Entries invest all capital at the signal bar's close; exits liquidate all
//! shares at the signal bar's close. No costs, no slippage, no partial fills.

use crate::domain::enricher::IndicatorRow;
use crate::domain::error::StockpulseError;
use crate::domain::strategy::{RsiThresholds, Strategy};
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, info};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Buy,
    Sell,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => f.write_str("BUY"),
            SignalKind::Sell => f.write_str("SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub date: NaiveDate,
    pub kind: SignalKind,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Flat,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Account {
    pub capital: f64,
    pub shares: f64,
    pub position: Position,
}

impl Account {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            capital: initial_capital,
            shares: 0.0,
            position: Position::Flat,
        }
    }

    /// Converts all capital to shares at `price`.
    pub fn enter(self, date: NaiveDate, price: f64) -> (Self, Signal) {
        let next = Account {
            capital: 0.0,
            shares: self.capital / price,
            position: Position::Long,
        };
        let signal = Signal {
            date,
            kind: SignalKind::Buy,
            price,
        };
        (next, signal)
    }

    /// Converts all shares back to capital at `price`.
    pub fn exit(self, date: NaiveDate, price: f64) -> (Self, Signal) {
        let next = Account {
            capital: self.shares * price,
            shares: 0.0,
            position: Position::Flat,
        };
        let signal = Signal {
            date,
            kind: SignalKind::Sell,
            price,
        };
        (next, signal)
    }

    /// Mark-to-market value at `price`.
    pub fn value_at(&self, price: f64) -> f64 {
        self.capital + self.shares * price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestMetrics {
    pub strategy_name: String,
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub signals: Vec<Signal>,
    pub metrics: BacktestMetrics,
    /// Position held after the last row; a `Long` result is marked to market.
    pub final_position: Position,
}

pub type Step = (Account, Option<Signal>);

fn require(
    index: usize,
    row: &IndicatorRow,
    field: &str,
    value: Option<f64>,
) -> Result<f64, StockpulseError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(StockpulseError::DataIntegrity {
            row: index,
            date: row.date(),
            field: field.to_string(),
            content: row.to_string(),
        }),
    }
}

/// One RSI transition: Flat→Long below `oversold`, Long→Flat above `overbought`.
pub fn rsi_step(
    account: Account,
    index: usize,
    row: &IndicatorRow,
    thresholds: RsiThresholds,
) -> Result<Step, StockpulseError> {
    let rsi = require(index, row, "rsi", row.rsi)?;

    let step = match account.position {
        Position::Flat if rsi < thresholds.oversold => {
            let (next, signal) = account.enter(row.date(), row.close());
            (next, Some(signal))
        }
        Position::Long if rsi > thresholds.overbought => {
            let (next, signal) = account.exit(row.date(), row.close());
            (next, Some(signal))
        }
        _ => (account, None),
    };
    Ok(step)
}

/// One MACD transition, comparing `curr` (at `index`) against the row before it.
pub fn macd_step(
    account: Account,
    index: usize,
    prev: &IndicatorRow,
    curr: &IndicatorRow,
) -> Result<Step, StockpulseError> {
    let prev_index = index.saturating_sub(1);
    let prev_line = require(prev_index, prev, "macd", prev.macd)?;
    let prev_signal = require(prev_index, prev, "macd_signal", prev.macd_signal)?;
    let curr_line = require(index, curr, "macd", curr.macd)?;
    let curr_signal = require(index, curr, "macd_signal", curr.macd_signal)?;

    let bullish = prev_line < prev_signal && curr_line > curr_signal;
    let bearish = prev_line > prev_signal && curr_line < curr_signal;

    let step = match account.position {
        Position::Flat if bullish => {
            let (next, signal) = account.enter(curr.date(), curr.close());
            (next, Some(signal))
        }
        Position::Long if bearish => {
            let (next, signal) = account.exit(curr.date(), curr.close());
            (next, Some(signal))
        }
        _ => (account, None),
    };
    Ok(step)
}

pub fn run_backtest(
    rows: &[IndicatorRow],
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, StockpulseError> {
    let initial = Account::new(config.initial_capital);

    let Some(last) = rows.last() else {
        debug!(strategy = %strategy, "no rows to backtest");
        return Ok(BacktestResult {
            signals: Vec::new(),
            metrics: metrics_for(strategy, config.initial_capital, config.initial_capital),
            final_position: Position::Flat,
        });
    };

    let start = (initial, Vec::new());
    let (account, signals) = match strategy {
        Strategy::Rsi(thresholds) => {
            rows.iter()
                .enumerate()
                .try_fold(start, |(account, mut signals), (i, row)| {
                    let (next, signal) = rsi_step(account, i, row, *thresholds)?;
                    signals.extend(signal);
                    Ok::<_, StockpulseError>((next, signals))
                })?
        }
        Strategy::MacdCrossover => {
            // The first row is only ever a "previous" row; check it even when
            // there is nothing to pair it with.
            require(0, &rows[0], "macd", rows[0].macd)?;
            require(0, &rows[0], "macd_signal", rows[0].macd_signal)?;
            rows.windows(2)
                .enumerate()
                .try_fold(start, |(account, mut signals), (i, pair)| {
                    let (next, signal) = macd_step(account, i + 1, &pair[0], &pair[1])?;
                    signals.extend(signal);
                    Ok::<_, StockpulseError>((next, signals))
                })?
        }
    };

    let final_value = account.value_at(last.close());
    let result = BacktestResult {
        signals,
        metrics: metrics_for(strategy, config.initial_capital, final_value),
        final_position: account.position,
    };

    info!(
        strategy = %strategy,
        rows = rows.len(),
        signals = result.signals.len(),
        final_value = result.metrics.final_value,
        "backtest complete"
    );
    Ok(result)
}

fn metrics_for(strategy: &Strategy, initial_capital: f64, final_value: f64) -> BacktestMetrics {
    let total_return_pct = if initial_capital > 0.0 {
        (final_value - initial_capital) / initial_capital * 100.0
    } else {
        0.0
    };
    BacktestMetrics {
        strategy_name: strategy.name(),
        initial_capital,
        final_value,
        total_return_pct,
    }
}
