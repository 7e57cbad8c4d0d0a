//! CSV file price data adapter.
//!
//! Reads `<SYMBOL>.csv` files with a header row from a base directory.
//! Columns are matched by name, so exports that carry extra columns (such as
//! `Adj Close`) or use different capitalisation load unchanged.

use crate::domain::error::StockpulseError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::domain::period::LookbackPeriod;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// All bars in the symbol's file, oldest first. `None` when the file is
    /// missing or holds no rows.
    fn load(&self, symbol: &str) -> Result<Option<Vec<PriceBar>>, StockpulseError> {
        let path = self.csv_path(symbol);
        if !path.is_file() {
            debug!(symbol, path = %path.display(), "no price file");
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| StockpulseError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr.headers().map_err(|e| StockpulseError::DataSource {
            reason: format!("{}: CSV header error: {}", path.display(), e),
        })?;
        let mut index = [0usize; 6];
        for (slot, name) in index.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| StockpulseError::DataSource {
                    reason: format!("{}: missing {} column", path.display(), name),
                })?;
        }

        let mut bars = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| StockpulseError::DataSource {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;
            let field = |i: usize| record.get(index[i]).unwrap_or("");
            let number = |i: usize| -> Result<f64, StockpulseError> {
                field(i).parse().map_err(|e| StockpulseError::DataSource {
                    reason: format!(
                        "{} row {}: invalid {} value '{}': {}",
                        path.display(),
                        row + 1,
                        COLUMNS[i],
                        field(i),
                        e
                    ),
                })
            };

            let date = NaiveDate::parse_from_str(field(0), "%Y-%m-%d").map_err(|e| {
                StockpulseError::DataSource {
                    reason: format!(
                        "{} row {}: invalid date '{}': {}",
                        path.display(),
                        row + 1,
                        field(0),
                        e
                    ),
                }
            })?;

            bars.push(PriceBar {
                date,
                open: number(1)?,
                high: number(2)?,
                low: number(3)?,
                close: number(4)?,
                volume: number(5)?,
            });
        }

        if bars.is_empty() {
            return Ok(None);
        }
        bars.sort_by_key(|b| b.date);
        Ok(Some(bars))
    }
}

impl PriceDataPort for CsvDataAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> Result<Option<PriceSeries>, StockpulseError> {
        let Some(bars) = self.load(symbol)? else {
            return Ok(None);
        };
        let bars = match bars.last().and_then(|b| period.start_date(b.date)) {
            Some(start) => bars.into_iter().filter(|b| b.date >= start).collect(),
            None => bars,
        };
        debug!(symbol, %period, bars = bars.len(), "loaded history");
        Ok(Some(PriceSeries::new(symbol, bars)))
    }

    fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<PriceSeries>, StockpulseError> {
        let Some(bars) = self.load(symbol)? else {
            return Ok(None);
        };
        let bars: Vec<PriceBar> = bars
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        if bars.is_empty() {
            return Ok(None);
        }
        Ok(Some(PriceSeries::new(symbol, bars)))
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockpulseError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StockpulseError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StockpulseError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if let (true, Some(stem)) = (is_csv, path.file_stem()) {
                symbols.push(stem.to_string_lossy().into_owned());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
