//! Single-symbol analysis: enriched rows plus an optional model prediction
//! and news sentiment. Collaborator failures leave their slot empty.

use crate::domain::enricher::{IndicatorRow, enrich};
use crate::domain::error::StockpulseError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::sentiment::{SentimentSummary, summarize};
use crate::ports::predictor_port::PredictorPort;
use crate::ports::sentiment_port::SentimentPort;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub symbol: String,
    pub rows: Vec<IndicatorRow>,
    /// Next-day close from the predictor; `None` when no predictor is
    /// configured or it failed.
    pub prediction: Option<f64>,
    /// `None` when no sentiment source is configured or it failed.
    pub sentiment: Option<SentimentSummary>,
}

impl AnalysisReport {
    pub fn last_close(&self) -> Option<f64> {
        self.rows.last().map(|r| r.close())
    }
}

pub fn analyze(
    series: &PriceSeries,
    predictor: Option<&dyn PredictorPort>,
    sentiment: Option<&dyn SentimentPort>,
) -> Result<AnalysisReport, StockpulseError> {
    let rows = enrich(&series.bars)?;

    let prediction = match predictor {
        Some(p) if !rows.is_empty() => match p.predict_next_close(&rows) {
            Ok(value) if value.is_finite() => Some(value),
            Ok(value) => {
                warn!(symbol = %series.symbol, value, "predictor returned a non-finite value");
                None
            }
            Err(e) => {
                warn!(symbol = %series.symbol, error = %e, "prediction unavailable");
                None
            }
        },
        _ => None,
    };

    let sentiment = sentiment.and_then(|source| match source.headlines(&series.symbol) {
        Ok(headlines) => Some(summarize(headlines)),
        Err(e) => {
            warn!(symbol = %series.symbol, error = %e, "sentiment unavailable");
            None
        }
    });

    Ok(AnalysisReport {
        symbol: series.symbol.clone(),
        rows,
        prediction,
        sentiment,
    })
}
