//! Lookback periods in the vocabulary price data providers use ("1y", "5y").

use crate::domain::error::StockpulseError;
use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackPeriod {
    Days(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl LookbackPeriod {
    /// First date included when the newest available bar is dated `anchor`.
    /// `None` means unbounded, including spans that reach past the calendar.
    pub fn start_date(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        match *self {
            LookbackPeriod::Days(n) => anchor.checked_sub_days(Days::new(n as u64)),
            LookbackPeriod::Months(n) => anchor.checked_sub_months(Months::new(n)),
            LookbackPeriod::Years(n) => n
                .checked_mul(12)
                .and_then(|months| anchor.checked_sub_months(Months::new(months))),
            LookbackPeriod::YearToDate => NaiveDate::from_ymd_opt(anchor.year(), 1, 1),
            LookbackPeriod::Max => None,
        }
    }
}

impl FromStr for LookbackPeriod {
    type Err = StockpulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        let invalid = || StockpulseError::InvalidPeriod {
            value: s.to_string(),
        };

        match value.as_str() {
            "ytd" => return Ok(LookbackPeriod::YearToDate),
            "max" => return Ok(LookbackPeriod::Max),
            _ => {}
        }

        let split = value
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (digits, unit) = value.split_at(split);
        let n: u32 = digits.parse().map_err(|_| invalid())?;
        if n == 0 {
            return Err(invalid());
        }

        match unit {
            "d" => Ok(LookbackPeriod::Days(n)),
            "mo" => Ok(LookbackPeriod::Months(n)),
            "y" => Ok(LookbackPeriod::Years(n)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookbackPeriod::Days(n) => write!(f, "{}d", n),
            LookbackPeriod::Months(n) => write!(f, "{}mo", n),
            LookbackPeriod::Years(n) => write!(f, "{}y", n),
            LookbackPeriod::YearToDate => write!(f, "ytd"),
            LookbackPeriod::Max => write!(f, "max"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_provider_periods() {
        assert_eq!("1d".parse::<LookbackPeriod>().unwrap(), LookbackPeriod::Days(1));
        assert_eq!("5d".parse::<LookbackPeriod>().unwrap(), LookbackPeriod::Days(5));
        assert_eq!("6mo".parse::<LookbackPeriod>().unwrap(), LookbackPeriod::Months(6));
        assert_eq!("1y".parse::<LookbackPeriod>().unwrap(), LookbackPeriod::Years(1));
        assert_eq!("10Y".parse::<LookbackPeriod>().unwrap(), LookbackPeriod::Years(10));
        assert_eq!("ytd".parse::<LookbackPeriod>().unwrap(), LookbackPeriod::YearToDate);
        assert_eq!("max".parse::<LookbackPeriod>().unwrap(), LookbackPeriod::Max);
    }

    #[test]
    fn rejects_unknown_periods() {
        for bad in ["", "y", "0y", "3w", "1yr", "abc", "-1y"] {
            assert!(
                matches!(bad.parse::<LookbackPeriod>(), Err(StockpulseError::InvalidPeriod { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn display_round_trips() {
        for s in ["5d", "3mo", "2y", "ytd", "max"] {
            assert_eq!(s.parse::<LookbackPeriod>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn start_dates() {
        let anchor = d(2024, 3, 31);
        assert_eq!(LookbackPeriod::Days(5).start_date(anchor), Some(d(2024, 3, 26)));
        assert_eq!(LookbackPeriod::Months(1).start_date(anchor), Some(d(2024, 2, 29)));
        assert_eq!(LookbackPeriod::Years(1).start_date(anchor), Some(d(2023, 3, 31)));
        assert_eq!(LookbackPeriod::YearToDate.start_date(anchor), Some(d(2024, 1, 1)));
        assert_eq!(LookbackPeriod::Max.start_date(anchor), None);
    }

    #[test]
    fn huge_spans_are_unbounded() {
        let anchor = d(2024, 1, 2);
        let years: LookbackPeriod = "400000000y".parse().unwrap();
        assert_eq!(years.start_date(anchor), None);
        assert_eq!(LookbackPeriod::Years(u32::MAX).start_date(anchor), None);
        assert_eq!(LookbackPeriod::Months(u32::MAX).start_date(anchor), None);
        assert_eq!(LookbackPeriod::Days(u32::MAX).start_date(anchor), None);
    }
}
