//! Risk statistics: volatility, beta, Sharpe and Sortino ratios.
//!
//! Returns are day-over-day percentage changes of the close. Ratios are
//! annualized with `sqrt(trading_days)`. When the benchmark is missing,
//! malformed, or shares fewer than two return dates with the stock, beta,
//! Sharpe and Sortino are reported as 0.0 and `benchmark_available` is false.

use crate::domain::error::StockpulseError;
use crate::domain::ohlcv::{PriceBar, validate_bars};
use crate::domain::stats::{mean, sample_covariance, sample_std, sample_variance};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;
pub const DEFAULT_TRADING_DAYS: u32 = 252;

/// Deviations at or below this are treated as zero.
const DEGENERATE_STD: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Annual risk-free rate, compounded daily over `trading_days`.
    pub annual_risk_free_rate: f64,
    pub trading_days: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            annual_risk_free_rate: DEFAULT_RISK_FREE_RATE,
            trading_days: DEFAULT_TRADING_DAYS,
        }
    }
}

impl RiskConfig {
    pub fn daily_risk_free_rate(&self) -> f64 {
        (1.0 + self.annual_risk_free_rate).powf(1.0 / self.trading_days as f64) - 1.0
    }

    fn annualization(&self) -> f64 {
        (self.trading_days as f64).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskMetrics {
    pub daily_volatility_pct: f64,
    pub annualized_volatility_pct: f64,
    pub beta: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// False when beta/Sharpe/Sortino are zero because no benchmark overlap
    /// existed, not because they were computed as zero.
    pub benchmark_available: bool,
}

impl RiskMetrics {
    /// Copy with every figure rounded to 2 decimals for presentation.
    pub fn rounded(&self) -> Self {
        Self {
            daily_volatility_pct: round2(self.daily_volatility_pct),
            annualized_volatility_pct: round2(self.annualized_volatility_pct),
            beta: round2(self.beta),
            sharpe_ratio: round2(self.sharpe_ratio),
            sortino_ratio: round2(self.sortino_ratio),
            benchmark_available: self.benchmark_available,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Daily returns keyed by the date of the later bar.
pub fn daily_returns(bars: &[PriceBar]) -> Vec<(NaiveDate, f64)> {
    bars.windows(2)
        .map(|w| (w[1].date, w[1].pct_change(w[0].close)))
        .collect()
}

/// Stock and market returns on the dates both series share, in stock order.
pub fn align_returns(
    stock: &[(NaiveDate, f64)],
    market: &[(NaiveDate, f64)],
) -> (Vec<f64>, Vec<f64>) {
    let market_by_date: HashMap<NaiveDate, f64> = market.iter().copied().collect();
    stock
        .iter()
        .filter_map(|(date, s)| market_by_date.get(date).map(|m| (*s, *m)))
        .unzip()
}

pub fn analyze_risk(
    bars: &[PriceBar],
    benchmark: Option<&[PriceBar]>,
    config: &RiskConfig,
) -> Result<RiskMetrics, StockpulseError> {
    if bars.len() < 2 {
        return Err(StockpulseError::insufficient("risk analysis", bars.len(), 2));
    }
    validate_bars(bars)?;

    let dated_returns = daily_returns(bars);
    let returns: Vec<f64> = dated_returns.iter().map(|(_, r)| *r).collect();

    let daily_volatility = sample_std(&returns);
    let annualized_volatility = daily_volatility * config.annualization();

    let degraded = RiskMetrics {
        daily_volatility_pct: daily_volatility * 100.0,
        annualized_volatility_pct: annualized_volatility * 100.0,
        beta: 0.0,
        sharpe_ratio: 0.0,
        sortino_ratio: 0.0,
        benchmark_available: false,
    };

    let Some(benchmark) = benchmark else {
        warn!("no benchmark series supplied; beta, sharpe and sortino reported as 0");
        return Ok(degraded);
    };
    if let Err(e) = validate_bars(benchmark) {
        warn!(error = %e, "benchmark series rejected; beta, sharpe and sortino reported as 0");
        return Ok(degraded);
    }

    let (stock_aligned, market_aligned) = align_returns(&dated_returns, &daily_returns(benchmark));
    if stock_aligned.len() < 2 {
        warn!(
            overlap = stock_aligned.len(),
            "no overlapping benchmark data; beta, sharpe and sortino reported as 0"
        );
        return Ok(degraded);
    }
    debug!(
        returns = returns.len(),
        overlap = stock_aligned.len(),
        "aligned stock and benchmark returns"
    );

    let market_variance = sample_variance(&market_aligned);
    let beta = if market_variance > 0.0 {
        sample_covariance(&stock_aligned, &market_aligned) / market_variance
    } else {
        0.0
    };

    let daily_rf = config.daily_risk_free_rate();
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let excess_mean = mean(&excess);

    let excess_std = sample_std(&excess);
    let sharpe_ratio = if excess_std > DEGENERATE_STD {
        excess_mean / excess_std * config.annualization()
    } else {
        0.0
    };

    let downside: Vec<f64> = excess.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_std = sample_std(&downside);
    let sortino_ratio = if downside_std > DEGENERATE_STD {
        excess_mean / downside_std * config.annualization()
    } else {
        0.0
    };

    Ok(RiskMetrics {
        beta,
        sharpe_ratio,
        sortino_ratio,
        benchmark_available: true,
        ..degraded
    })
}
