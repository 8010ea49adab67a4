//! Explicit parsed-or-invalid date values.
//!
//! Upstream spreadsheets carry free text in date columns (placeholders such
//! as "not yet decided", blanks, typos). Instead of substituting a default
//! date, the planner carries [`ParsedDate::Invalid`] through and routes the
//! demand to the undecided bucket.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::YearMonth;

/// Accepted textual date layouts, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// A date that either parsed or did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsedDate {
    /// A valid calendar date.
    Parsed(NaiveDate),
    /// Missing or unparseable.
    Invalid,
}

impl ParsedDate {
    /// Parses `YYYY-MM-DD`, `YYYY/MM/DD` or `YYYY.MM.DD`.
    ///
    /// Anything else (including empty text and placeholders) is `Invalid`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
            .map_or(Self::Invalid, Self::Parsed)
    }

    /// Creates a parsed date from components; `Invalid` if they don't form a date.
    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        NaiveDate::from_ymd_opt(year, month, day).map_or(Self::Invalid, Self::Parsed)
    }

    /// The date, if valid.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Parsed(d) => Some(*d),
            Self::Invalid => None,
        }
    }

    /// The month containing the date, if valid.
    pub fn month(&self) -> Option<YearMonth> {
        self.date().map(YearMonth::from_date)
    }

    /// Whether the date is valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

impl From<NaiveDate> for ParsedDate {
    fn from(date: NaiveDate) -> Self {
        Self::Parsed(date)
    }
}

impl From<Option<NaiveDate>> for ParsedDate {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map_or(Self::Invalid, Self::Parsed)
    }
}
