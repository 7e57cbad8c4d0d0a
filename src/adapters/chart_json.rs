//! Chart.js-shaped JSON payloads.
//!
//! Every chart is `{ labels, datasets }`; dataset keys use Chart.js's
//! camelCase names so a front end can hand them to the library unchanged.
//! Metrics are rounded to 2 decimals here and nowhere else.

use crate::domain::analysis::AnalysisReport;
use crate::domain::backtest::BacktestResult;
use crate::domain::comparison::Comparison;
use crate::domain::enricher::IndicatorRow;
use crate::domain::error::StockpulseError;
use crate::domain::quotes::Quote;
use crate::domain::risk::{RiskMetrics, round2};
use crate::domain::sentiment::SentimentSummary;
use crate::domain::simulation::SimulationResult;
use chrono::NaiveDate;
use serde::Serialize;

const PRICE_COLOR: &str = "#58a6ff";
const BAND_95_COLOR: &str = "rgba(173, 216, 230, 0.1)";
const BAND_90_COLOR: &str = "rgba(88, 166, 255, 0.2)";
const BEST_COLOR: &str = "#2ecc71";
const WORST_COLOR: &str = "#e74c3c";
const COMPARISON_COLORS: [&str; 4] = ["#3498db", "#e74c3c", "#2ecc71", "#f1c40f"];

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Chart.js `fill` accepts a flag or a target such as `"-1"` / `"start"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Fill {
    Enabled(bool),
    Target(&'static str),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_dash: Option<[u32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<u32>,
    pub fill: Fill,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_gaps: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl Dataset {
    fn line(label: impl Into<String>, data: Vec<f64>, border_color: &'static str) -> Self {
        Self {
            label: label.into(),
            data,
            border_color,
            background_color: None,
            border_width: None,
            border_dash: None,
            point_radius: None,
            fill: Fill::Enabled(false),
            tension: None,
            span_gaps: None,
            order: None,
            hidden: None,
        }
    }

    fn band(label: &str, data: Vec<f64>, color: &'static str, fill: Fill, order: u32) -> Self {
        Self {
            background_color: Some(color),
            point_radius: Some(0),
            fill,
            span_gaps: Some(true),
            order: Some(order),
            ..Self::line(label, data, "transparent")
        }
    }

    fn scenario(label: &str, data: Vec<f64>, color: &'static str, order: u32) -> Self {
        Self {
            border_width: Some(1),
            border_dash: Some([5, 5]),
            point_radius: Some(0),
            order: Some(order),
            hidden: Some(true),
            ..Self::line(label, data, color)
        }
    }
}

fn date_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Closing-price line chart.
pub fn price_chart(points: impl IntoIterator<Item = (NaiveDate, f64)>) -> ChartData {
    let (labels, data): (Vec<String>, Vec<f64>) = points
        .into_iter()
        .map(|(date, close)| (date_label(date), close))
        .unzip();

    ChartData {
        labels,
        datasets: vec![Dataset {
            border_width: Some(2),
            point_radius: Some(0),
            fill: Fill::Enabled(true),
            tension: Some(0.4),
            ..Dataset::line("Closing Price", data, PRICE_COLOR)
        }],
    }
}

#[derive(Debug, Serialize)]
pub struct SignalJson {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct BacktestMetricsJson {
    pub strategy_name: String,
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
}

#[derive(Debug, Serialize)]
pub struct BacktestResultsJson {
    pub signals: Vec<SignalJson>,
    pub metrics: BacktestMetricsJson,
}

#[derive(Debug, Serialize)]
pub struct PricePointJson {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Close")]
    pub close: f64,
}

#[derive(Debug, Serialize)]
pub struct BacktestPayload {
    pub ticker: String,
    pub backtest_results: BacktestResultsJson,
    pub price_data: Vec<PricePointJson>,
}

pub fn backtest_payload(
    symbol: &str,
    result: &BacktestResult,
    rows: &[IndicatorRow],
) -> BacktestPayload {
    let metrics = &result.metrics;
    BacktestPayload {
        ticker: symbol.to_string(),
        backtest_results: BacktestResultsJson {
            signals: result
                .signals
                .iter()
                .map(|s| SignalJson {
                    date: date_label(s.date),
                    kind: s.kind.to_string(),
                    price: s.price,
                })
                .collect(),
            metrics: BacktestMetricsJson {
                strategy_name: metrics.strategy_name.clone(),
                initial_capital: metrics.initial_capital,
                final_value: round2(metrics.final_value),
                total_return_pct: round2(metrics.total_return_pct),
            },
        },
        price_data: rows
            .iter()
            .map(|r| PricePointJson {
                date: date_label(r.date()),
                close: r.close(),
            })
            .collect(),
    }
}

#[derive(Debug, Serialize)]
pub struct RiskMetricsJson {
    pub daily_volatility: f64,
    pub annualized_volatility: f64,
    pub beta: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub benchmark_available: bool,
}

impl From<&RiskMetrics> for RiskMetricsJson {
    fn from(metrics: &RiskMetrics) -> Self {
        let m = metrics.rounded();
        Self {
            daily_volatility: m.daily_volatility_pct,
            annualized_volatility: m.annualized_volatility_pct,
            beta: m.beta,
            sharpe_ratio: m.sharpe_ratio,
            sortino_ratio: m.sortino_ratio,
            benchmark_available: m.benchmark_available,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RiskPayload {
    pub ticker: String,
    pub risk_metrics: RiskMetricsJson,
    pub monte_carlo_chart: ChartData,
}

/// Confidence bands as paired fills, the mean path on top, and the best and
/// worst simulated paths hidden until toggled.
pub fn monte_carlo_chart(sim: &SimulationResult) -> ChartData {
    ChartData {
        labels: sim.labels.clone(),
        datasets: vec![
            Dataset::band(
                "95% Confidence Interval",
                sim.upper_95.clone(),
                BAND_95_COLOR,
                Fill::Target("-1"),
                1,
            ),
            Dataset::band(
                "95% Confidence Interval (Lower)",
                sim.lower_95.clone(),
                BAND_95_COLOR,
                Fill::Target("start"),
                2,
            ),
            Dataset::band(
                "90% Confidence Interval",
                sim.upper_90.clone(),
                BAND_90_COLOR,
                Fill::Target("-1"),
                3,
            ),
            Dataset::band(
                "90% Confidence Interval (Lower)",
                sim.lower_90.clone(),
                BAND_90_COLOR,
                Fill::Target("start"),
                4,
            ),
            Dataset {
                border_width: Some(3),
                point_radius: Some(0),
                order: Some(5),
                ..Dataset::line("Average Expected Path", sim.mean.clone(), PRICE_COLOR)
            },
            Dataset::scenario("Best Case (Simulated)", sim.best_case.clone(), BEST_COLOR, 6),
            Dataset::scenario("Worst Case (Simulated)", sim.worst_case.clone(), WORST_COLOR, 7),
        ],
    }
}

pub fn risk_payload(symbol: &str, metrics: &RiskMetrics, sim: &SimulationResult) -> RiskPayload {
    RiskPayload {
        ticker: symbol.to_string(),
        risk_metrics: metrics.into(),
        monte_carlo_chart: monte_carlo_chart(sim),
    }
}

pub fn comparison_chart(comparison: &Comparison) -> ChartData {
    ChartData {
        labels: comparison.dates.iter().copied().map(date_label).collect(),
        datasets: comparison
            .series
            .iter()
            .zip(COMPARISON_COLORS.iter().cycle())
            .map(|(s, &color)| Dataset {
                tension: Some(0.1),
                ..Dataset::line(
                    format!("{} Performance (%)", s.symbol),
                    s.performance_pct.clone(),
                    color,
                )
            })
            .collect(),
    }
}

#[derive(Debug, Serialize)]
pub struct IndicatorRowJson {
    pub date: String,
    pub close: f64,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct HeadlineJson {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SentimentJson {
    /// Rounded to 3 decimals.
    pub average_sentiment: f64,
    pub headlines: Vec<HeadlineJson>,
}

impl From<&SentimentSummary> for SentimentJson {
    fn from(s: &SentimentSummary) -> Self {
        Self {
            average_sentiment: (s.average_sentiment * 1000.0).round() / 1000.0,
            headlines: s
                .headlines
                .iter()
                .map(|h| HeadlineJson {
                    title: h.title.clone(),
                    url: h.url.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisCharts {
    pub price_chart: ChartData,
}

#[derive(Debug, Serialize)]
pub struct AnalysisPayload {
    pub ticker: String,
    pub last_close: Option<f64>,
    pub prediction: Option<f64>,
    pub sentiment: Option<SentimentJson>,
    pub indicators: Vec<IndicatorRowJson>,
    pub chart_data: AnalysisCharts,
}

pub fn analysis_payload(report: &AnalysisReport) -> AnalysisPayload {
    AnalysisPayload {
        ticker: report.symbol.clone(),
        last_close: report.last_close(),
        prediction: report.prediction.map(round2),
        sentiment: report.sentiment.as_ref().map(SentimentJson::from),
        indicators: report
            .rows
            .iter()
            .map(|r| IndicatorRowJson {
                date: date_label(r.date()),
                close: r.close(),
                rsi: r.rsi,
                macd: r.macd,
                macd_signal: r.macd_signal,
            })
            .collect(),
        chart_data: AnalysisCharts {
            price_chart: price_chart(report.rows.iter().map(|r| (r.date(), r.close()))),
        },
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteJson {
    pub ticker: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

pub fn quotes_payload(quotes: &[Quote]) -> Vec<QuoteJson> {
    quotes
        .iter()
        .map(|q| QuoteJson {
            ticker: q.symbol.clone(),
            price: round2(q.price),
            change: round2(q.change),
            change_percent: round2(q.change_percent),
        })
        .collect()
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, StockpulseError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::{BacktestMetrics, Position, Signal, SignalKind};
    use crate::domain::sentiment::Headline;
    use crate::domain::comparison::NormalizedSeries;
    use crate::domain::ohlcv::PriceBar;
    use serde_json::{Value, json};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn row(day: u32, close: f64) -> IndicatorRow {
        IndicatorRow {
            bar: PriceBar {
                date: d(day),
                open: close,
                high: close,
                low: close,
                close,
                volume: 10.0,
            },
            rsi: Some(45.0),
            macd: Some(0.5),
            macd_signal: Some(0.25),
        }
    }

    fn value<T: Serialize>(v: &T) -> Value {
        serde_json::from_str(&to_json(v, false).unwrap()).unwrap()
    }

    #[test]
    fn price_chart_uses_chartjs_keys() {
        let chart = price_chart([(d(1), 10.0), (d(2), 11.5)]);
        let v = value(&chart);
        assert_eq!(v["labels"], json!(["2024-05-01", "2024-05-02"]));
        let ds = &v["datasets"][0];
        assert_eq!(ds["label"], "Closing Price");
        assert_eq!(ds["data"], json!([10.0, 11.5]));
        assert_eq!(ds["borderColor"], PRICE_COLOR);
        assert_eq!(ds["pointRadius"], 0);
        assert_eq!(ds["fill"], true);
        assert!(ds.get("hidden").is_none());
    }

    #[test]
    fn backtest_payload_rounds_metrics() {
        let result = BacktestResult {
            signals: vec![Signal {
                date: d(3),
                kind: SignalKind::Buy,
                price: 12.5,
            }],
            metrics: BacktestMetrics {
                strategy_name: "RSI (30/70)".into(),
                initial_capital: 100_000.0,
                final_value: 104_321.987,
                total_return_pct: 4.321987,
            },
            final_position: Position::Long,
        };
        let v = value(&backtest_payload("ACME", &result, &[row(3, 12.5)]));

        assert_eq!(v["ticker"], "ACME");
        let results = &v["backtest_results"];
        assert_eq!(results["signals"][0]["type"], "BUY");
        assert_eq!(results["signals"][0]["date"], "2024-05-03");
        assert_eq!(results["metrics"]["final_value"], 104_321.99);
        assert_eq!(results["metrics"]["total_return_pct"], 4.32);
        assert_eq!(v["price_data"][0]["Date"], "2024-05-03");
        assert_eq!(v["price_data"][0]["Close"], 12.5);
    }

    #[test]
    fn risk_payload_carries_bands_and_flag() {
        let metrics = RiskMetrics {
            daily_volatility_pct: 1.23456,
            annualized_volatility_pct: 19.5999,
            beta: 0.0,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            benchmark_available: false,
        };
        let sim = SimulationResult {
            labels: vec!["Day 1".into(), "Day 2".into()],
            lower_90: vec![10.0, 9.5],
            upper_90: vec![10.0, 10.5],
            lower_95: vec![10.0, 9.0],
            upper_95: vec![10.0, 11.0],
            mean: vec![10.0, 10.0],
            best_case: vec![10.0, 11.2],
            worst_case: vec![10.0, 8.8],
            start_price: 10.0,
            simulations: 4,
        };
        let v = value(&risk_payload("ACME", &metrics, &sim));

        assert_eq!(v["risk_metrics"]["daily_volatility"], 1.23);
        assert_eq!(v["risk_metrics"]["annualized_volatility"], 19.6);
        assert_eq!(v["risk_metrics"]["benchmark_available"], false);

        let chart = &v["monte_carlo_chart"];
        assert_eq!(chart["labels"], json!(["Day 1", "Day 2"]));
        let datasets = chart["datasets"].as_array().unwrap();
        assert_eq!(datasets.len(), 7);
        assert_eq!(datasets[0]["fill"], "-1");
        assert_eq!(datasets[1]["fill"], "start");
        assert_eq!(datasets[1]["data"], json!([10.0, 9.0]));
        assert_eq!(datasets[4]["label"], "Average Expected Path");
        assert_eq!(datasets[5]["hidden"], true);
        assert_eq!(datasets[6]["borderDash"], json!([5, 5]));
    }

    #[test]
    fn comparison_cycles_colors() {
        let comparison = Comparison {
            dates: vec![d(1), d(2)],
            series: ["A", "B", "C", "D", "E"]
                .iter()
                .map(|s| NormalizedSeries {
                    symbol: s.to_string(),
                    performance_pct: vec![0.0, 1.0],
                })
                .collect(),
        };
        let v = value(&comparison_chart(&comparison));
        assert_eq!(v["datasets"][0]["label"], "A Performance (%)");
        assert_eq!(v["datasets"][4]["borderColor"], v["datasets"][0]["borderColor"]);
        assert_eq!(v["datasets"][1]["fill"], false);
    }

    #[test]
    fn analysis_payload_lists_indicators() {
        let report = AnalysisReport {
            symbol: "ACME".into(),
            rows: vec![row(1, 20.0), row(2, 21.0)],
            prediction: Some(21.456),
            sentiment: None,
        };
        let v = value(&analysis_payload(&report));
        assert_eq!(v["last_close"], 21.0);
        assert_eq!(v["prediction"], 21.46);
        assert!(v["sentiment"].is_null());
        assert_eq!(v["indicators"][1]["rsi"], 45.0);
        assert_eq!(v["chart_data"]["price_chart"]["labels"][1], "2024-05-02");
    }

    #[test]
    fn analysis_payload_carries_sentiment() {
        let report = AnalysisReport {
            symbol: "ACME".into(),
            rows: vec![row(1, 20.0)],
            prediction: None,
            sentiment: Some(SentimentSummary {
                average_sentiment: 0.12345,
                headlines: vec![Headline {
                    title: "ACME expands".into(),
                    url: "https://news.example/acme".into(),
                    score: 0.12345,
                }],
            }),
        };
        let v = value(&analysis_payload(&report));
        assert_eq!(v["sentiment"]["average_sentiment"], 0.123);
        assert_eq!(v["sentiment"]["headlines"][0]["title"], "ACME expands");
        assert!(v["sentiment"]["headlines"][0].get("score").is_none());
    }

    #[test]
    fn quotes_are_rounded() {
        let v = value(&quotes_payload(&[Quote {
            symbol: "AAPL".into(),
            price: 191.2345,
            change: -1.005,
            change_percent: -0.52271,
        }]));
        assert_eq!(v[0]["ticker"], "AAPL");
        assert_eq!(v[0]["price"], 191.23);
        assert_eq!(v[0]["change_percent"], -0.52);
    }

    #[test]
    fn pretty_output_is_multiline() {
        let chart = price_chart([(d(1), 1.0)]);
        assert!(to_json(&chart, true).unwrap().contains('\n'));
        assert!(!to_json(&chart, false).unwrap().contains('\n'));
    }
}
