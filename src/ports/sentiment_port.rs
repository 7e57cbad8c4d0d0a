//! News sentiment port.
//!
//! Implementations fetch recent headlines for a symbol with a polarity score
//! already attached; scoring text is outside this crate.

use crate::domain::error::StockpulseError;
use crate::domain::sentiment::Headline;

pub trait SentimentPort {
    /// Most relevant recent headlines for `symbol`. An empty list means no
    /// news was found.
    fn headlines(&self, symbol: &str) -> Result<Vec<Headline>, StockpulseError>;
}
