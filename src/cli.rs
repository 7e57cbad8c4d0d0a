//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

use crate::adapters::chart_json::{
    self, AnalysisPayload, BacktestPayload, ChartData, QuoteJson, RiskPayload,
};
use crate::adapters::csv_adapter::CsvDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::headline_csv_adapter::HeadlineCsvAdapter;
use crate::domain::analysis::analyze;
use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_CAPITAL, run_backtest};
use crate::domain::comparison::compare;
use crate::domain::config_validation::validate_all;
use crate::domain::enricher::{WARMUP_BARS, enrich};
use crate::domain::error::StockpulseError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::period::LookbackPeriod;
use crate::domain::quotes::quotes;
use crate::domain::risk::{DEFAULT_RISK_FREE_RATE, DEFAULT_TRADING_DAYS, RiskConfig, analyze_risk};
use crate::domain::simulation::{
    DEFAULT_HORIZON_DAYS, DEFAULT_SIMULATIONS, SimulationConfig, run_monte_carlo,
};
use crate::domain::strategy::{RsiThresholds, Strategy};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::predictor_port::PredictorPort;
use crate::ports::sentiment_port::SentimentPort;

pub const DEFAULT_DATA_PERIOD: &str = "1y";
pub const DEFAULT_RISK_PERIOD: &str = "5y";
pub const DEFAULT_BENCHMARK: &str = "^GSPC";
pub const DEFAULT_QUOTE_PERIOD: &str = "5d";
pub const DEFAULT_QUOTE_SYMBOLS: [&str; 6] =
    ["AAPL", "MSFT", "GOOGL", "AMZN", "RELIANCE.NS", "TCS.NS"];

#[derive(Parser, Debug)]
#[command(name = "stockpulse", about = "Technical indicators, strategy backtests and risk analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that reads price data.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    /// Overrides `[data] directory`
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Lookback period such as 6mo, 1y, 5y, ytd or max
    #[arg(long)]
    pub period: Option<String>,
    /// Write JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the RSI or MACD crossover strategy on one symbol
    Backtest {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long)]
        symbol: String,
        /// rsi or macd; overrides `[backtest] strategy`
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Risk metrics against the benchmark plus a Monte Carlo forecast
    Risk {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long)]
        symbol: String,
        /// Overrides `[simulation] seed`
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Indicator table and price chart for one symbol
    Analyze {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long)]
        symbol: String,
    },
    /// Relative performance of two to four symbols
    Compare {
        #[command(flatten)]
        data: DataArgs,
        #[arg(required = true, num_args = 2..=4)]
        symbols: Vec<String>,
    },
    /// Latest close and daily change for a list of symbols
    Quotes {
        #[command(flatten)]
        data: DataArgs,
        /// Defaults to `[quotes] symbols`, then a built-in watch list
        symbols: Vec<String>,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            data,
            symbol,
            strategy,
        } => run_backtest_command(&data, &symbol, strategy.as_deref()),
        Command::Risk { data, symbol, seed } => run_risk_command(&data, &symbol, seed),
        Command::Analyze { data, symbol } => run_analyze_command(&data, &symbol),
        Command::Compare { data, symbols } => run_compare_command(&data, &symbols),
        Command::Quotes { data, symbols } => run_quotes_command(&data, &symbols),
        Command::ListSymbols { config, data_dir } => {
            run_list_symbols(config.as_deref(), data_dir.as_deref())
        }
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

fn report_error(e: &StockpulseError) -> ExitCode {
    match e {
        StockpulseError::InsufficientData { .. } => eprintln!("error: not enough history: {e}"),
        StockpulseError::DataIntegrity { .. } => eprintln!("internal error: {e}"),
        _ => eprintln!("error: {e}"),
    }
    e.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StockpulseError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_all(&adapter)?;
    Ok(adapter)
}

/// Config plus the data source it points at.
struct Session {
    config: FileConfigAdapter,
    data: CsvDataAdapter,
}

impl Session {
    fn open(args: &DataArgs) -> Result<Self, StockpulseError> {
        let config = load_config(&args.config)?;
        let dir = resolve_data_dir(args.data_dir.as_deref(), &config)?;
        Ok(Self {
            data: CsvDataAdapter::new(dir),
            config,
        })
    }

    fn pretty(&self) -> bool {
        self.config.get_bool("output", "pretty", false)
    }
}

pub fn resolve_data_dir(
    dir_override: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, StockpulseError> {
    if let Some(dir) = dir_override {
        return Ok(dir.to_path_buf());
    }
    config
        .get_string("data", "directory")
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
        .ok_or_else(|| StockpulseError::ConfigMissing {
            section: "data".into(),
            key: "directory".into(),
        })
}

pub fn resolve_period(
    period_override: Option<&str>,
    config: &dyn ConfigPort,
    section: &str,
    default: &str,
) -> Result<LookbackPeriod, StockpulseError> {
    match period_override {
        Some(p) => p.parse(),
        None => config
            .get_string(section, "period")
            .unwrap_or_else(|| default.to_string())
            .parse(),
    }
}

pub fn resolve_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, StockpulseError> {
    let initial_capital =
        adapter.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(StockpulseError::config_invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(BacktestConfig { initial_capital })
}

pub fn build_strategy(
    strategy_override: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<Strategy, StockpulseError> {
    let name = match strategy_override {
        Some(s) => s.to_string(),
        None => adapter
            .get_string("backtest", "strategy")
            .unwrap_or_else(|| "rsi".to_string()),
    };

    match name.parse::<Strategy>()? {
        Strategy::Rsi(defaults) => Ok(Strategy::Rsi(RsiThresholds::new(
            adapter.get_double("backtest", "rsi_oversold", defaults.oversold),
            adapter.get_double("backtest", "rsi_overbought", defaults.overbought),
        )?)),
        other => Ok(other),
    }
}

pub fn build_risk_config(adapter: &dyn ConfigPort) -> Result<RiskConfig, StockpulseError> {
    let trading_days = adapter.get_int("risk", "trading_days", i64::from(DEFAULT_TRADING_DAYS));
    let trading_days = u32::try_from(trading_days)
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| {
            StockpulseError::config_invalid(
                "risk",
                "trading_days",
                "trading_days must be a positive integer",
            )
        })?;

    Ok(RiskConfig {
        annual_risk_free_rate: adapter.get_double("risk", "risk_free_rate", DEFAULT_RISK_FREE_RATE),
        trading_days,
    })
}

pub fn build_simulation_config(
    seed_override: Option<u64>,
    adapter: &dyn ConfigPort,
) -> Result<SimulationConfig, StockpulseError> {
    let count = |key: &str, default: usize| -> Result<usize, StockpulseError> {
        let value = adapter.get_int("simulation", key, default as i64);
        usize::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| {
                StockpulseError::config_invalid(
                    "simulation",
                    key,
                    format!("{} must be at least 1", key),
                )
            })
    };

    Ok(SimulationConfig {
        horizon_days: count("horizon_days", DEFAULT_HORIZON_DAYS)?,
        simulations: count("simulations", DEFAULT_SIMULATIONS)?,
        seed: seed_override.or_else(|| adapter.get_optional_u64("simulation", "seed")),
    })
}

/// Symbols from `[quotes] symbols` (comma separated), or the built-in list.
pub fn resolve_quote_symbols(overrides: &[String], config: &dyn ConfigPort) -> Vec<String> {
    if !overrides.is_empty() {
        return overrides.iter().map(|s| resolve_symbol(s)).collect();
    }
    match config.get_string("quotes", "symbols") {
        Some(list) => list
            .split(',')
            .map(resolve_symbol)
            .filter(|s| !s.is_empty())
            .collect(),
        None => DEFAULT_QUOTE_SYMBOLS.iter().map(|s| s.to_string()).collect(),
    }
}

/// History for `symbol`, treating an empty series the same as a missing one.
pub fn fetch_required(
    data: &dyn PriceDataPort,
    symbol: &str,
    period: LookbackPeriod,
) -> Result<PriceSeries, StockpulseError> {
    match data.fetch_history(symbol, period)? {
        Some(series) if !series.bars.is_empty() => Ok(series),
        _ => Err(StockpulseError::DataUnavailable {
            symbol: symbol.to_string(),
        }),
    }
}

pub fn backtest_pipeline(
    data: &dyn PriceDataPort,
    symbol: &str,
    period: LookbackPeriod,
    strategy: &Strategy,
    bt_config: &BacktestConfig,
) -> Result<BacktestPayload, StockpulseError> {
    let series = fetch_required(data, symbol, period)?;
    eprintln!("Loaded {} bars for {} ({})", series.bars.len(), symbol, period);

    let rows = enrich(&series.bars)?;
    if rows.is_empty() {
        return Err(StockpulseError::insufficient(
            "backtest",
            series.bars.len(),
            WARMUP_BARS + 1,
        ));
    }

    eprintln!("Running backtest: {} on {} rows", strategy, rows.len());
    let result = run_backtest(&rows, strategy, bt_config)?;
    let m = &result.metrics;

    eprintln!("\n=== Backtest Results: {} ===", symbol);
    eprintln!("Strategy:         {}", m.strategy_name);
    eprintln!("Signals:          {}", result.signals.len());
    eprintln!("Initial Capital:  {:.2}", m.initial_capital);
    eprintln!("Final Value:      {:.2}", m.final_value);
    eprintln!("Total Return:     {:.2}%", m.total_return_pct);
    eprintln!("Final Position:   {:?}", result.final_position);

    Ok(chart_json::backtest_payload(symbol, &result, &rows))
}

pub fn risk_pipeline(
    data: &dyn PriceDataPort,
    symbol: &str,
    period: LookbackPeriod,
    benchmark_symbol: &str,
    risk_config: &RiskConfig,
    sim_config: &SimulationConfig,
) -> Result<RiskPayload, StockpulseError> {
    let series = fetch_required(data, symbol, period)?;
    eprintln!("Loaded {} bars for {} ({})", series.bars.len(), symbol, period);

    let benchmark = match (series.first_date(), series.last_date()) {
        (Some(start), Some(end)) => match data.fetch_range(benchmark_symbol, start, end) {
            Ok(b) => b,
            Err(e) => {
                warn!(benchmark = benchmark_symbol, error = %e, "benchmark unavailable");
                None
            }
        },
        _ => None,
    };

    let metrics = analyze_risk(
        &series.bars,
        benchmark.as_ref().map(|b| b.bars.as_slice()),
        risk_config,
    )?;
    let sim = run_monte_carlo(&series.bars, sim_config)?;

    let shown = metrics.rounded();
    eprintln!("\n=== Risk Analysis: {} ===", symbol);
    eprintln!("Daily Volatility:      {:.2}%", shown.daily_volatility_pct);
    eprintln!("Annualized Volatility: {:.2}%", shown.annualized_volatility_pct);
    if shown.benchmark_available {
        eprintln!("Beta vs {}:        {:.2}", benchmark_symbol, shown.beta);
        eprintln!("Sharpe Ratio:          {:.2}", shown.sharpe_ratio);
        eprintln!("Sortino Ratio:         {:.2}", shown.sortino_ratio);
    } else {
        eprintln!("Benchmark {} unavailable: beta, sharpe and sortino reported as 0", benchmark_symbol);
    }
    if let Some(last) = sim.mean.last() {
        eprintln!(
            "Monte Carlo:           {} paths over {} days, mean final {:.2}",
            sim.simulations,
            sim.horizon_days(),
            last
        );
    }

    Ok(chart_json::risk_payload(symbol, &metrics, &sim))
}

pub fn analysis_pipeline(
    data: &dyn PriceDataPort,
    symbol: &str,
    period: LookbackPeriod,
    predictor: Option<&dyn PredictorPort>,
    sentiment: Option<&dyn SentimentPort>,
) -> Result<AnalysisPayload, StockpulseError> {
    let series = fetch_required(data, symbol, period)?;
    let report = analyze(&series, predictor, sentiment)?;

    eprintln!("\n=== Analysis: {} ===", symbol);
    eprintln!("Rows:             {}", report.rows.len());
    if let Some(last) = report.rows.last() {
        eprintln!("Latest:           {}", last);
    }
    match report.prediction {
        Some(p) => eprintln!("Next close:       {:.2}", p),
        None => eprintln!("Next close:       no prediction"),
    }
    match &report.sentiment {
        Some(s) => eprintln!(
            "Sentiment:        {:.3} over {} headlines",
            s.average_sentiment,
            s.headlines.len()
        ),
        None => eprintln!("Sentiment:        unavailable"),
    }

    Ok(chart_json::analysis_payload(&report))
}

pub fn compare_pipeline(
    data: &dyn PriceDataPort,
    symbols: &[String],
    period: LookbackPeriod,
) -> Result<ChartData, StockpulseError> {
    let mut inputs = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let series = data
            .fetch_history(symbol, period)?
            .unwrap_or_else(|| PriceSeries::new(symbol.as_str(), Vec::new()));
        inputs.push(series);
    }

    let comparison = compare(&inputs)?;
    eprintln!(
        "Compared {} of {} symbols over {} dates",
        comparison.series.len(),
        symbols.len(),
        comparison.dates.len()
    );
    Ok(chart_json::comparison_chart(&comparison))
}

pub fn quotes_pipeline(
    data: &dyn PriceDataPort,
    symbols: &[String],
    period: LookbackPeriod,
) -> Result<Vec<QuoteJson>, StockpulseError> {
    let mut inputs = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        match data.fetch_history(symbol, period)? {
            Some(series) => inputs.push(series),
            None => warn!(symbol = %symbol, "no price data; skipping quote"),
        }
    }

    let quotes = quotes(&inputs)?;
    for q in &quotes {
        eprintln!(
            "{:<12} {:>10.2} {:>+9.2} ({:+.2}%)",
            q.symbol, q.price, q.change, q.change_percent
        );
    }
    eprintln!("{} of {} symbols quoted", quotes.len(), symbols.len());
    Ok(chart_json::quotes_payload(&quotes))
}

fn emit<T: serde::Serialize>(
    payload: &T,
    output: Option<&Path>,
    pretty: bool,
) -> Result<(), StockpulseError> {
    let json = chart_json::to_json(payload, pretty)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("\nJSON written to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_backtest_command(
    args: &DataArgs,
    symbol: &str,
    strategy_override: Option<&str>,
) -> Result<(), StockpulseError> {
    let session = Session::open(args)?;
    let strategy = build_strategy(strategy_override, &session.config)?;
    let bt_config = build_backtest_config(&session.config)?;
    let period = resolve_period(
        args.period.as_deref(),
        &session.config,
        "data",
        DEFAULT_DATA_PERIOD,
    )?;

    let payload = backtest_pipeline(
        &session.data,
        &resolve_symbol(symbol),
        period,
        &strategy,
        &bt_config,
    )?;
    emit(&payload, args.output.as_deref(), session.pretty())
}

fn run_risk_command(
    args: &DataArgs,
    symbol: &str,
    seed: Option<u64>,
) -> Result<(), StockpulseError> {
    let session = Session::open(args)?;
    let risk_config = build_risk_config(&session.config)?;
    let sim_config = build_simulation_config(seed, &session.config)?;
    let period = resolve_period(
        args.period.as_deref(),
        &session.config,
        "risk",
        DEFAULT_RISK_PERIOD,
    )?;
    let benchmark = session
        .config
        .get_string("data", "benchmark")
        .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string());

    let payload = risk_pipeline(
        &session.data,
        &resolve_symbol(symbol),
        period,
        benchmark.trim(),
        &risk_config,
        &sim_config,
    )?;
    emit(&payload, args.output.as_deref(), session.pretty())
}

fn run_analyze_command(args: &DataArgs, symbol: &str) -> Result<(), StockpulseError> {
    let session = Session::open(args)?;
    let period = resolve_period(
        args.period.as_deref(),
        &session.config,
        "data",
        DEFAULT_DATA_PERIOD,
    )?;

    let headlines = session
        .config
        .get_string("data", "headlines_directory")
        .filter(|s| !s.trim().is_empty())
        .map(|dir| HeadlineCsvAdapter::new(PathBuf::from(dir.trim())));

    let payload = analysis_pipeline(
        &session.data,
        &resolve_symbol(symbol),
        period,
        None,
        headlines.as_ref().map(|h| h as &dyn SentimentPort),
    )?;
    emit(&payload, args.output.as_deref(), session.pretty())
}

fn run_quotes_command(args: &DataArgs, symbols: &[String]) -> Result<(), StockpulseError> {
    let session = Session::open(args)?;
    let period: LookbackPeriod = match args.period.as_deref() {
        Some(p) => p.parse()?,
        None => DEFAULT_QUOTE_PERIOD.parse()?,
    };
    let symbols = resolve_quote_symbols(symbols, &session.config);

    let payload = quotes_pipeline(&session.data, &symbols, period)?;
    emit(&payload, args.output.as_deref(), session.pretty())
}

fn run_compare_command(args: &DataArgs, symbols: &[String]) -> Result<(), StockpulseError> {
    let session = Session::open(args)?;
    let period = resolve_period(
        args.period.as_deref(),
        &session.config,
        "data",
        DEFAULT_DATA_PERIOD,
    )?;
    let symbols: Vec<String> = symbols.iter().map(|s| resolve_symbol(s)).collect();

    let chart = compare_pipeline(&session.data, &symbols, period)?;
    emit(&chart, args.output.as_deref(), session.pretty())
}

fn run_list_symbols(
    config_path: Option<&Path>,
    dir_override: Option<&Path>,
) -> Result<(), StockpulseError> {
    let dir = match (dir_override, config_path) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(path)) => resolve_data_dir(None, &load_config(path)?)?,
        (None, None) => {
            return Err(StockpulseError::ConfigMissing {
                section: "data".into(),
                key: "directory".into(),
            });
        }
    };

    let symbols = CsvDataAdapter::new(dir.clone()).list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found in {}", dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), StockpulseError> {
    let config = load_config(config_path)?;
    let strategy = build_strategy(None, &config)?;
    let bt_config = build_backtest_config(&config)?;
    let risk_config = build_risk_config(&config)?;
    let sim_config = build_simulation_config(None, &config)?;
    let data_period = resolve_period(None, &config, "data", DEFAULT_DATA_PERIOD)?;
    let risk_period = resolve_period(None, &config, "risk", DEFAULT_RISK_PERIOD)?;

    eprintln!("\nData directory:   {}", resolve_data_dir(None, &config)?.display());
    eprintln!("Data period:      {}", data_period);
    eprintln!("Strategy:         {}", strategy);
    eprintln!("Initial capital:  {:.2}", bt_config.initial_capital);
    eprintln!("Risk period:      {}", risk_period);
    eprintln!(
        "Risk-free rate:   {:.4} annual, {:.6} daily",
        risk_config.annual_risk_free_rate,
        risk_config.daily_risk_free_rate()
    );
    eprintln!(
        "Simulation:       {} paths x {} days, seed {}",
        sim_config.simulations,
        sim_config.horizon_days,
        sim_config
            .seed
            .map_or_else(|| "random".to_string(), |s| s.to_string())
    );
    eprintln!("\nConfiguration is valid.");
    Ok(())
}
