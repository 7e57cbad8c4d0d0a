//! News sentiment summary for one symbol.

use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub title: String,
    pub url: String,
    /// Compound polarity in [-1, 1] assigned by the scoring service.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSummary {
    /// Mean score of the kept headlines; 0 when there are none.
    pub average_sentiment: f64,
    pub headlines: Vec<Headline>,
}

/// Averages headline scores. Headlines whose score is not a finite number
/// in [-1, 1] are dropped.
pub fn summarize(headlines: Vec<Headline>) -> SentimentSummary {
    let total = headlines.len();
    let headlines: Vec<Headline> = headlines
        .into_iter()
        .filter(|h| h.score.is_finite() && (-1.0..=1.0).contains(&h.score))
        .collect();
    if headlines.len() < total {
        warn!(
            dropped = total - headlines.len(),
            "ignoring headlines with out-of-range scores"
        );
    }

    let average_sentiment = if headlines.is_empty() {
        0.0
    } else {
        headlines.iter().map(|h| h.score).sum::<f64>() / headlines.len() as f64
    };

    SentimentSummary {
        average_sentiment,
        headlines,
    }
}
