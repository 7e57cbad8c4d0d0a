#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use stockpulse::domain::enricher::IndicatorRow;
use stockpulse::domain::error::StockpulseError;
pub use stockpulse::domain::ohlcv::{PriceBar, PriceSeries};
use stockpulse::domain::period::LookbackPeriod;
use stockpulse::ports::data_port::PriceDataPort;
use stockpulse::domain::sentiment::Headline;
use stockpulse::ports::predictor_port::PredictorPort;
use stockpulse::ports::sentiment_port::SentimentPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn lookup(
        &self,
        symbol: &str,
        keep: impl Fn(&PriceBar) -> bool,
    ) -> Result<Option<PriceSeries>, StockpulseError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StockpulseError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).map(|bars| {
            PriceSeries::new(symbol, bars.iter().filter(|b| keep(b)).cloned().collect())
        }))
    }
}

impl PriceDataPort for MockDataPort {
    fn fetch_history(
        &self,
        symbol: &str,
        _period: LookbackPeriod,
    ) -> Result<Option<PriceSeries>, StockpulseError> {
        self.lookup(symbol, |_| true)
    }

    fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<PriceSeries>, StockpulseError> {
        self.lookup(symbol, |b| b.date >= start && b.date <= end)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockpulseError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub struct MockPredictor {
    pub result: Result<f64, String>,
}

impl PredictorPort for MockPredictor {
    fn predict_next_close(&self, _rows: &[IndicatorRow]) -> Result<f64, StockpulseError> {
        self.result
            .clone()
            .map_err(|reason| StockpulseError::Prediction { reason })
    }
}

/// Fixed scored headlines, or a failure, for every symbol.
pub struct MockSentiment {
    pub result: Result<Vec<(String, f64)>, String>,
}

impl SentimentPort for MockSentiment {
    fn headlines(&self, _symbol: &str) -> Result<Vec<Headline>, StockpulseError> {
        match &self.result {
            Ok(items) => Ok(items
                .iter()
                .map(|(title, score)| Headline {
                    title: title.clone(),
                    url: format!("https://news.example/{}", title.replace(' ', "-")),
                    score: *score,
                })
                .collect()),
            Err(reason) => Err(StockpulseError::Sentiment {
                reason: reason.clone(),
            }),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64) -> PriceBar {
    PriceBar {
        date,
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000.0,
    }
}

/// Daily bars from `start` with the given closes.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(start + chrono::Duration::days(i as i64), close))
        .collect()
}

/// A gently trending, oscillating series that crosses RSI and MACD thresholds.
pub fn generate_bars(start: NaiveDate, count: usize, start_price: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let t = i as f64;
            start_price + 0.05 * t + 8.0 * (t / 9.0).sin() + 2.0 * (t / 2.5).cos()
        })
        .collect();
    bars_from_closes(start, &closes)
}

/// Hand-built indicator row for driving the backtester directly.
pub fn make_row(
    date: NaiveDate,
    close: f64,
    rsi: Option<f64>,
    macd: Option<f64>,
    macd_signal: Option<f64>,
) -> IndicatorRow {
    IndicatorRow {
        bar: make_bar(date, close),
        rsi,
        macd,
        macd_signal,
    }
}
