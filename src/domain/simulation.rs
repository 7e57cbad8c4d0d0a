//! Monte Carlo price-path simulation.
//!
//! Each path starts at the last known close (day 1) and compounds daily
//! shocks drawn from Normal(mean, std) of the historical daily returns.
//! Per-day cross-sectional percentiles give the 90% (5th/95th) and 95%
//! (2.5th/97.5th) bands.

use crate::domain::error::StockpulseError;
use crate::domain::ohlcv::{PriceBar, validate_bars};
use crate::domain::risk::daily_returns;
use crate::domain::stats::{mean, percentile_sorted, sample_std};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::{debug, info};

pub const DEFAULT_HORIZON_DAYS: usize = 90;
pub const DEFAULT_SIMULATIONS: usize = 1000;
/// Upper bound on `simulations * horizon_days`; every path is held in memory.
pub const MAX_SIMULATED_POINTS: usize = 10_000_000;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub horizon_days: usize,
    pub simulations: usize,
    /// Fixed seed for reproducible runs; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            simulations: DEFAULT_SIMULATIONS,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// "Day 1" .. "Day N".
    pub labels: Vec<String>,
    pub lower_90: Vec<f64>,
    pub upper_90: Vec<f64>,
    pub lower_95: Vec<f64>,
    pub upper_95: Vec<f64>,
    pub mean: Vec<f64>,
    /// Path with the highest final-day price.
    pub best_case: Vec<f64>,
    /// Path with the lowest final-day price.
    pub worst_case: Vec<f64>,
    pub start_price: f64,
    pub simulations: usize,
}

impl SimulationResult {
    pub fn horizon_days(&self) -> usize {
        self.labels.len()
    }
}

/// Runs the simulation with a generator built from `config.seed`.
pub fn run_monte_carlo(
    bars: &[PriceBar],
    config: &SimulationConfig,
) -> Result<SimulationResult, StockpulseError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    run_monte_carlo_with_rng(bars, config, &mut rng)
}

pub fn run_monte_carlo_with_rng<R: Rng + ?Sized>(
    bars: &[PriceBar],
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SimulationResult, StockpulseError> {
    if bars.len() < 2 {
        return Err(StockpulseError::insufficient(
            "monte carlo simulation",
            bars.len(),
            2,
        ));
    }
    if config.horizon_days == 0 {
        return Err(StockpulseError::config_invalid(
            "simulation",
            "horizon_days",
            "horizon_days must be at least 1",
        ));
    }
    if config.simulations == 0 {
        return Err(StockpulseError::config_invalid(
            "simulation",
            "simulations",
            "simulations must be at least 1",
        ));
    }
    if config
        .simulations
        .checked_mul(config.horizon_days)
        .is_none_or(|points| points > MAX_SIMULATED_POINTS)
    {
        return Err(StockpulseError::config_invalid(
            "simulation",
            "simulations",
            format!(
                "simulations * horizon_days must not exceed {}",
                MAX_SIMULATED_POINTS
            ),
        ));
    }
    validate_bars(bars)?;

    let returns: Vec<f64> = daily_returns(bars).into_iter().map(|(_, r)| r).collect();
    let mu = mean(&returns);
    let sigma = sample_std(&returns);
    let shock = Normal::new(mu, sigma).map_err(|e| StockpulseError::InvalidSeries {
        reason: format!("cannot build return distribution (mean {mu}, std {sigma}): {e}"),
    })?;

    let start_price = bars[bars.len() - 1].close;
    let days = config.horizon_days;
    debug!(mu, sigma, start_price, days, simulations = config.simulations, "simulating paths");

    let paths: Vec<Vec<f64>> = (0..config.simulations)
        .map(|_| {
            let mut path = Vec::with_capacity(days);
            path.push(start_price);
            for _ in 1..days {
                let prev = path[path.len() - 1];
                path.push(prev * (1.0 + shock.sample(&mut *rng)));
            }
            path
        })
        .collect();

    let mut result = SimulationResult {
        labels: (1..=days).map(|d| format!("Day {}", d)).collect(),
        lower_90: Vec::with_capacity(days),
        upper_90: Vec::with_capacity(days),
        lower_95: Vec::with_capacity(days),
        upper_95: Vec::with_capacity(days),
        mean: Vec::with_capacity(days),
        best_case: Vec::new(),
        worst_case: Vec::new(),
        start_price,
        simulations: config.simulations,
    };

    let mut column = Vec::with_capacity(paths.len());
    for day in 0..days {
        column.clear();
        column.extend(paths.iter().map(|p| p[day]));
        result.mean.push(mean(&column));
        column.sort_by(|a, b| a.total_cmp(b));
        result.lower_95.push(percentile_sorted(&column, 2.5));
        result.lower_90.push(percentile_sorted(&column, 5.0));
        result.upper_90.push(percentile_sorted(&column, 95.0));
        result.upper_95.push(percentile_sorted(&column, 97.5));
    }

    let (best, worst) = extreme_paths(&paths);
    result.best_case = paths[best].clone();
    result.worst_case = paths[worst].clone();

    info!(
        simulations = config.simulations,
        days,
        final_mean = result.mean[days - 1],
        "monte carlo simulation complete"
    );
    Ok(result)
}

/// Indices of the paths with the highest and lowest final price; the first
/// index wins ties.
fn extreme_paths(paths: &[Vec<f64>]) -> (usize, usize) {
    let last = |i: usize| paths[i][paths[i].len() - 1];
    let mut best = 0;
    let mut worst = 0;
    for i in 1..paths.len() {
        if last(i) > last(best) {
            best = i;
        }
        if last(i) < last(worst) {
            worst = i;
        }
    }
    (best, worst)
}
