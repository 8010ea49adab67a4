//! Calendar month keys and scheduling horizons.
//!
//! All planning happens at month granularity. A [`YearMonth`] is the key
//! used by the resource tables (`YYYY-MM`), and a [`Horizon`] is the
//! inclusive range of months the planner may place work into.
//!
//! # Ordering
//! `YearMonth` orders chronologically (year first, then month), so it can
//! key a `BTreeMap` and iterate in calendar order.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MonthParseError;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a month. Returns `None` if `month` is not in `1..=12` or the
    /// year is outside the supported calendar range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { year, month })
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[inline]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month of year (1..=12).
    #[inline]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        // Construction guarantees the date exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The following calendar month (December rolls into January).
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The month `n` months later.
    pub fn plus_months(&self, n: u32) -> Self {
        let ordinal = self.ordinal() + i64::from(n);
        Self::from_ordinal(ordinal)
    }

    /// Signed number of months from `self` to `other`.
    ///
    /// `2024-10`.months_until(`2025-01`) == 3.
    pub fn months_until(&self, other: YearMonth) -> i64 {
        other.ordinal() - self.ordinal()
    }

    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }
}

/// Adds whole months to a date, clamping to the end of shorter months.
///
/// `2024-01-31` + 1 month = `2024-02-29`.
pub fn add_months(date: NaiveDate, n: u32) -> NaiveDate {
    date.checked_add_months(Months::new(n)).unwrap_or(NaiveDate::MAX)
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| MonthParseError::new(s))?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(MonthParseError::new(s));
        }
        let year: i32 = year.parse().map_err(|_| MonthParseError::new(s))?;
        let month: u32 = month.parse().map_err(|_| MonthParseError::new(s))?;
        Self::new(year, month).ok_or_else(|| MonthParseError::new(s))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// An inclusive range of months `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    /// First schedulable month (inclusive).
    pub start: YearMonth,
    /// Last schedulable month (inclusive).
    pub end: YearMonth,
}

impl Horizon {
    /// Creates a horizon. Returns `None` if `start` is after `end`.
    pub fn new(start: YearMonth, end: YearMonth) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Whether a month falls inside the horizon.
    #[inline]
    pub fn contains(&self, month: YearMonth) -> bool {
        month >= self.start && month <= self.end
    }

    /// Number of months in the horizon.
    pub fn len(&self) -> usize {
        (self.start.months_until(self.end) + 1).max(0) as usize
    }

    /// Whether the horizon contains no months.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All months, in calendar order.
    pub fn months(&self) -> MonthRange {
        self.months_from(self.start)
    }

    /// Months from `from` (clamped to the start) through the end.
    pub fn months_from(&self, from: YearMonth) -> MonthRange {
        MonthRange {
            next: Some(from.max(self.start)),
            end: self.end,
        }
    }
}

/// Iterator over consecutive months, produced by [`Horizon::months`].
#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Option<YearMonth>,
    end: YearMonth,
}

impl Iterator for MonthRange {
    type Item = YearMonth;

    fn next(&mut self) -> Option<YearMonth> {
        let current = self.next.filter(|m| *m <= self.end)?;
        self.next = Some(current.succ());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let m = ym("2024-10");
        assert_eq!(m.year(), 2024);
        assert_eq!(m.month(), 10);
        assert_eq!(m.to_string(), "2024-10");
        assert_eq!(ym("2025-3").to_string(), "2025-03");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("2024".parse::<YearMonth>().is_err());
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("2024-00".parse::<YearMonth>().is_err());
        assert!("24-10".parse::<YearMonth>().is_err());
        assert!("2024-10-01".parse::<YearMonth>().is_err());
        assert!("abcd-10".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_succ_rolls_year() {
        assert_eq!(ym("2024-11").succ(), ym("2024-12"));
        assert_eq!(ym("2024-12").succ(), ym("2025-01"));
    }

    #[test]
    fn test_month_arithmetic() {
        assert_eq!(ym("2024-10").months_until(ym("2025-01")), 3);
        assert_eq!(ym("2025-01").months_until(ym("2024-10")), -3);
        assert_eq!(ym("2024-10").plus_months(15), ym("2026-01"));
    }

    #[test]
    fn test_from_date_and_first_day() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let m = YearMonth::from_date(d);
        assert_eq!(m, ym("2024-02"));
        assert_eq!(m.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_add_months_clamps() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(add_months(d, 1), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_ordering() {
        assert!(ym("2024-12") < ym("2025-01"));
        assert!(ym("2025-02") > ym("2025-01"));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ym("2024-10")).unwrap();
        assert_eq!(json, "\"2024-10\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym("2024-10"));
        assert!(serde_json::from_str::<YearMonth>("\"2024-13\"").is_err());
    }

    #[test]
    fn test_horizon_months() {
        let h = Horizon::new(ym("2024-11"), ym("2025-02")).unwrap();
        let months: Vec<String> = h.months().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert_eq!(h.len(), 4);
        assert!(h.contains(ym("2024-12")));
        assert!(!h.contains(ym("2024-10")));
        assert!(!h.contains(ym("2025-03")));
    }

    #[test]
    fn test_horizon_months_from() {
        let h = Horizon::new(ym("2024-10"), ym("2024-12")).unwrap();
        assert_eq!(h.months_from(ym("2024-12")).count(), 1);
        assert_eq!(h.months_from(ym("2025-01")).count(), 0);
        assert_eq!(h.months_from(ym("2024-01")).count(), 3); // clamped to start
    }

    #[test]
    fn test_horizon_rejects_inverted() {
        assert!(Horizon::new(ym("2025-01"), ym("2024-12")).is_none());
        let single = Horizon::new(ym("2025-01"), ym("2025-01")).unwrap();
        assert_eq!(single.len(), 1);
        assert!(!single.is_empty());
    }
}
