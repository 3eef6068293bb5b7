//! The `range` query parameter and its approximate day-count window.

use std::fmt;
use std::str::FromStr;

/// Day count used for any range string that is not recognised.
pub const DEFAULT_RANGE_DAYS: i64 = 186;

/// Supported history windows. Months are approximated as 31 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl Range {
    pub fn days(self) -> i64 {
        match self {
            Range::OneMonth => 31,
            Range::ThreeMonths => 93,
            Range::SixMonths => 186,
            Range::OneYear => 370,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Range::OneMonth => "1mo",
            Range::ThreeMonths => "3mo",
            Range::SixMonths => "6mo",
            Range::OneYear => "1y",
        }
    }
}

impl FromStr for Range {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1mo" => Ok(Range::OneMonth),
            "3mo" => Ok(Range::ThreeMonths),
            "6mo" => Ok(Range::SixMonths),
            "1y" => Ok(Range::OneYear),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw `range` string to its day count, falling back to the 6mo window.
pub fn range_to_days(range: &str) -> i64 {
    range
        .parse::<Range>()
        .map(Range::days)
        .unwrap_or(DEFAULT_RANGE_DAYS)
}
