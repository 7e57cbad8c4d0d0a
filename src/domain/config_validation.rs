//! Configuration validation.
//!
//! Checks every section the CLI reads before any data is loaded, so a bad
//! value fails fast with the section and key that caused it.

use crate::domain::error::StockpulseError;
use crate::domain::period::LookbackPeriod;
use crate::domain::simulation::{DEFAULT_HORIZON_DAYS, DEFAULT_SIMULATIONS, MAX_SIMULATED_POINTS};
use crate::domain::strategy::{RsiThresholds, Strategy};
use crate::ports::config_port::ConfigPort;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    match config.get_string("data", "directory") {
        Some(s) if !s.trim().is_empty() => {}
        _ => {
            return Err(StockpulseError::ConfigMissing {
                section: "data".to_string(),
                key: "directory".to_string(),
            });
        }
    }
    validate_period(config, "data")?;
    if let Some(benchmark) = config.get_string("data", "benchmark") {
        if benchmark.trim().is_empty() {
            return Err(StockpulseError::config_invalid(
                "data",
                "benchmark",
                "benchmark must not be empty",
            ));
        }
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    validate_initial_capital(config)?;
    validate_strategy(config)?;
    validate_rsi_thresholds(config)?;
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    validate_risk_free_rate(config)?;
    validate_trading_days(config)?;
    validate_period(config, "risk")?;
    Ok(())
}

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    for key in ["horizon_days", "simulations"] {
        if config.get_int("simulation", key, 1) < 1 {
            return Err(StockpulseError::config_invalid(
                "simulation",
                key,
                format!("{} must be at least 1", key),
            ));
        }
    }
    let horizon = config.get_int("simulation", "horizon_days", DEFAULT_HORIZON_DAYS as i64);
    let simulations = config.get_int("simulation", "simulations", DEFAULT_SIMULATIONS as i64);
    if horizon
        .checked_mul(simulations)
        .is_none_or(|points| points > MAX_SIMULATED_POINTS as i64)
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
    if let Some(raw) = config.get_string("simulation", "seed") {
        if config.get_optional_u64("simulation", "seed").is_none() {
            return Err(StockpulseError::config_invalid(
                "simulation",
                "seed",
                format!("seed must be a non-negative integer, got '{}'", raw),
            ));
        }
    }
    Ok(())
}

pub fn validate_quotes_config(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    if let Some(list) = config.get_string("quotes", "symbols") {
        if list.split(',').all(|s| s.trim().is_empty()) {
            return Err(StockpulseError::config_invalid(
                "quotes",
                "symbols",
                "symbols must list at least one symbol",
            ));
        }
    }
    Ok(())
}

/// Runs every section check in the order the CLI consumes them.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    validate_data_config(config)?;
    validate_backtest_config(config)?;
    validate_risk_config(config)?;
    validate_simulation_config(config)?;
    validate_quotes_config(config)?;
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    let value = config.get_double("backtest", "initial_capital", 1.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(StockpulseError::config_invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    if let Some(name) = config.get_string("backtest", "strategy") {
        name.parse::<Strategy>()?;
    }
    Ok(())
}

fn validate_rsi_thresholds(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    let defaults = RsiThresholds::default();
    RsiThresholds::new(
        config.get_double("backtest", "rsi_oversold", defaults.oversold),
        config.get_double("backtest", "rsi_overbought", defaults.overbought),
    )?;
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    let value = config.get_double("risk", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(StockpulseError::config_invalid(
            "risk",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_trading_days(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    let value = config.get_int("risk", "trading_days", 1);
    if value < 1 || value > i64::from(u32::MAX) {
        return Err(StockpulseError::config_invalid(
            "risk",
            "trading_days",
            "trading_days must be a positive integer",
        ));
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort, section: &str) -> Result<(), StockpulseError> {
    if let Some(raw) = config.get_string(section, "period") {
        raw.parse::<LookbackPeriod>()
            .map_err(|_| StockpulseError::config_invalid(
                section,
                "period",
                format!("unrecognised period '{}'", raw),
            ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn full_config_passes() {
        let config = make_config(
            r#"
[data]
directory = ./data
period = 1y
benchmark = ^GSPC

[backtest]
initial_capital = 100000
strategy = macd
rsi_oversold = 25
rsi_overbought = 75

[risk]
period = 5y
risk_free_rate = 0.02
trading_days = 252

[simulation]
horizon_days = 90
simulations = 1000
seed = 42

[quotes]
symbols = AAPL, MSFT, TCS.NS
"#,
        );
        assert!(validate_all(&config).is_ok());
    }

    #[test]
    fn only_data_directory_is_required() {
        let config = make_config("[data]\ndirectory = prices\n");
        assert!(validate_all(&config).is_ok());
    }

    #[test]
    fn missing_directory_fails() {
        let config = make_config("[data]\nperiod = 1y\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, StockpulseError::ConfigMissing { key, .. } if key == "directory"));
    }

    #[test]
    fn bad_data_period_fails() {
        let config = make_config("[data]\ndirectory = d\nperiod = 3w\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(
            err,
            StockpulseError::ConfigInvalid { section, key, .. } if section == "data" && key == "period"
        ));
    }

    #[test]
    fn initial_capital_zero_fails() {
        let config = make_config("[backtest]\ninitial_capital = 0\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, StockpulseError::ConfigInvalid { key, .. } if key == "initial_capital")
        );
    }

    #[test]
    fn unknown_strategy_fails() {
        let config = make_config("[backtest]\nstrategy = bollinger\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, StockpulseError::UnknownStrategy { name } if name == "bollinger"));
    }

    #[test]
    fn inverted_rsi_thresholds_fail() {
        let config = make_config("[backtest]\nrsi_oversold = 80\nrsi_overbought = 20\n");
        assert!(matches!(
            validate_backtest_config(&config),
            Err(StockpulseError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn risk_free_rate_out_of_range_fails() {
        let config = make_config("[risk]\nrisk_free_rate = 1.5\n");
        let err = validate_risk_config(&config).unwrap_err();
        assert!(
            matches!(err, StockpulseError::ConfigInvalid { key, .. } if key == "risk_free_rate")
        );
    }

    #[test]
    fn trading_days_zero_fails() {
        let config = make_config("[risk]\ntrading_days = 0\n");
        let err = validate_risk_config(&config).unwrap_err();
        assert!(matches!(err, StockpulseError::ConfigInvalid { key, .. } if key == "trading_days"));
    }

    #[test]
    fn zero_simulations_fail() {
        let config = make_config("[simulation]\nsimulations = 0\n");
        let err = validate_simulation_config(&config).unwrap_err();
        assert!(matches!(err, StockpulseError::ConfigInvalid { key, .. } if key == "simulations"));
    }

    #[test]
    fn oversized_simulation_fails() {
        let config = make_config("[simulation]\nsimulations = 100000000\n");
        let err = validate_simulation_config(&config).unwrap_err();
        assert!(matches!(err, StockpulseError::ConfigInvalid { key, .. } if key == "simulations"));

        let config = make_config("[simulation]\nhorizon_days = 250\nsimulations = 40000\n");
        assert!(validate_simulation_config(&config).is_ok());
    }

    #[test]
    fn empty_quote_list_fails() {
        let config = make_config("[quotes]\nsymbols = , ,\n");
        let err = validate_quotes_config(&config).unwrap_err();
        assert!(matches!(err, StockpulseError::ConfigInvalid { key, .. } if key == "symbols"));
        assert!(validate_quotes_config(&make_config("[quotes]\nsymbols = AAPL\n")).is_ok());
    }

    #[test]
    fn unparseable_seed_fails() {
        let config = make_config("[simulation]\nseed = -3\n");
        let err = validate_simulation_config(&config).unwrap_err();
        assert!(matches!(err, StockpulseError::ConfigInvalid { key, .. } if key == "seed"));
    }
}
