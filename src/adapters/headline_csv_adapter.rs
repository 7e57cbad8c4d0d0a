//! Scored headlines from `<SYMBOL>.csv` files with `title,url,score` columns.
//!
//! A missing file means no news for that symbol.

use crate::domain::error::StockpulseError;
use crate::domain::sentiment::Headline;
use crate::ports::sentiment_port::SentimentPort;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

/// Headlines kept per symbol, in file order.
pub const MAX_HEADLINES: usize = 10;

#[derive(Debug, Deserialize)]
struct HeadlineRecord {
    title: String,
    url: String,
    score: f64,
}

pub struct HeadlineCsvAdapter {
    base_path: PathBuf,
}

impl HeadlineCsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

impl SentimentPort for HeadlineCsvAdapter {
    fn headlines(&self, symbol: &str) -> Result<Vec<Headline>, StockpulseError> {
        let path = self.base_path.join(format!("{}.csv", symbol));
        if !path.is_file() {
            debug!(symbol, path = %path.display(), "no headline file");
            return Ok(Vec::new());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| StockpulseError::Sentiment {
                reason: format!("failed to open {}: {}", path.display(), e),
            })?;

        let mut headlines = Vec::new();
        for result in rdr.deserialize().take(MAX_HEADLINES) {
            let record: HeadlineRecord = result.map_err(|e| StockpulseError::Sentiment {
                reason: format!("{}: {}", path.display(), e),
            })?;
            headlines.push(Headline {
                title: record.title,
                url: record.url,
                score: record.score,
            });
        }
        debug!(symbol, count = headlines.len(), "loaded headlines");
        Ok(headlines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reads_scored_headlines() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ACME.csv"),
            "title,url,score\nACME beats estimates,https://n.example/1,0.62\n\"Rockets, anvils recalled\",https://n.example/2,-0.4\n",
        )
        .unwrap();

        let adapter = HeadlineCsvAdapter::new(dir.path().to_path_buf());
        let headlines = adapter.headlines("ACME").unwrap();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[1].title, "Rockets, anvils recalled");
        assert_eq!(headlines[0].score, 0.62);
    }

    #[test]
    fn missing_file_is_no_news() {
        let dir = TempDir::new().unwrap();
        let adapter = HeadlineCsvAdapter::new(dir.path().to_path_buf());
        assert!(adapter.headlines("NONE").unwrap().is_empty());
    }

    #[test]
    fn keeps_at_most_ten() {
        let dir = TempDir::new().unwrap();
        let mut content = String::from("title,url,score\n");
        for i in 0..15 {
            content.push_str(&format!("h{i},https://n.example/{i},0.1\n"));
        }
        fs::write(dir.path().join("ACME.csv"), content).unwrap();

        let adapter = HeadlineCsvAdapter::new(dir.path().to_path_buf());
        let headlines = adapter.headlines("ACME").unwrap();
        assert_eq!(headlines.len(), MAX_HEADLINES);
        assert_eq!(headlines[9].title, "h9");
    }

    #[test]
    fn bad_score_is_sentiment_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ACME.csv"),
            "title,url,score\nA,https://n.example/a,positive\n",
        )
        .unwrap();
        let adapter = HeadlineCsvAdapter::new(dir.path().to_path_buf());
        assert!(matches!(
            adapter.headlines("ACME"),
            Err(StockpulseError::Sentiment { .. })
        ));
    }
}
