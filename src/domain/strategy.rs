//! Strategy selection.

use crate::domain::error::StockpulseError;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_RSI_OVERSOLD: f64 = 30.0;
pub const DEFAULT_RSI_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiThresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiThresholds {
    fn default() -> Self {
        Self {
            oversold: DEFAULT_RSI_OVERSOLD,
            overbought: DEFAULT_RSI_OVERBOUGHT,
        }
    }
}

impl RsiThresholds {
    /// Disjoint thresholds guarantee a row can never be both a buy and a sell.
    pub fn new(oversold: f64, overbought: f64) -> Result<Self, StockpulseError> {
        if !(0.0..=100.0).contains(&oversold) || !(0.0..=100.0).contains(&overbought) {
            return Err(StockpulseError::config_invalid(
                "backtest",
                "rsi_oversold",
                "RSI thresholds must lie in [0, 100]",
            ));
        }
        if oversold >= overbought {
            return Err(StockpulseError::config_invalid(
                "backtest",
                "rsi_oversold",
                format!("oversold ({oversold}) must be below overbought ({overbought})"),
            ));
        }
        Ok(Self {
            oversold,
            overbought,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    Rsi(RsiThresholds),
    MacdCrossover,
}

impl Strategy {
    pub fn name(&self) -> String {
        match self {
            Strategy::Rsi(t) => format!("RSI ({}/{})", t.oversold, t.overbought),
            Strategy::MacdCrossover => "MACD Crossover".to_string(),
        }
    }

    /// Short identifier used on the command line and in config files.
    pub fn key(&self) -> &'static str {
        match self {
            Strategy::Rsi(_) => "rsi",
            Strategy::MacdCrossover => "macd",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Strategy {
    type Err = StockpulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rsi" => Ok(Strategy::Rsi(RsiThresholds::default())),
            "macd" => Ok(Strategy::MacdCrossover),
            _ => Err(StockpulseError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}
