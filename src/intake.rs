//! Demand intake: routing and field derivation.
//!
//! Sits between the caller's table normalizer and the engines:
//!
//! - [`route`] splits demands into schedulable, undecided (no usable date)
//!   and out-of-range (relevant month outside the horizon) buckets.
//! - [`MilestoneDates`] derives a test date from equipment milestones.
//! - [`parse_priority_note`] extracts an explicit rank from a remark.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{add_months, Demand, DemandRef, Horizon, ParsedDate};

/// Demand indices per routing bucket, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Routing {
    /// Demands the engine should place.
    pub schedulable: Vec<usize>,
    /// Demands without a valid date.
    pub undecided: Vec<usize>,
    /// Demands whose relevant month is outside the horizon.
    pub out_of_range: Vec<usize>,
}

impl Routing {
    /// References for the undecided bucket.
    pub fn undecided_refs(&self, demands: &[Demand]) -> Vec<DemandRef> {
        refs(demands, &self.undecided)
    }

    /// References for the out-of-range bucket.
    pub fn out_of_range_refs(&self, demands: &[Demand]) -> Vec<DemandRef> {
        refs(demands, &self.out_of_range)
    }
}

fn refs(demands: &[Demand], indices: &[usize]) -> Vec<DemandRef> {
    indices
        .iter()
        .map(|&i| DemandRef {
            demand_id: demands[i].id.clone(),
            category: demands[i].category.clone(),
        })
        .collect()
}

/// Routes demands by their relevant month.
///
/// The relevant month is the committed month when the demand has one,
/// otherwise its eligible month. No relevant month → undecided; a month
/// outside the inclusive horizon → out-of-range.
pub fn route(demands: &[Demand], horizon: &Horizon) -> Routing {
    let mut routing = Routing::default();
    for (i, demand) in demands.iter().enumerate() {
        match demand.fixed_month().or_else(|| demand.eligible_month()) {
            None => {
                debug!(demand = %demand.id, "no valid date, routed to undecided");
                routing.undecided.push(i);
            }
            Some(month) if !horizon.contains(month) => {
                debug!(demand = %demand.id, %month, "outside horizon, routed to out-of-range");
                routing.out_of_range.push(i);
            }
            Some(_) => routing.schedulable.push(i),
        }
    }
    routing
}

/// Equipment milestones used to derive when testing can happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDates {
    /// Planned release (move-in) date.
    pub release: ParsedDate,
    /// Planned completion of the development test.
    pub dev_test_complete: ParsedDate,
    /// Date the acceptance test was performed, if already done.
    pub acceptance_test: ParsedDate,
}

impl MilestoneDates {
    /// Derives the test date.
    ///
    /// 1. Acceptance test done → one month after it.
    /// 2. Release or development completion unknown → `Invalid`.
    /// 3. Release later than development completion → the release date.
    /// 4. Otherwise → one month after development completion.
    pub fn test_date(&self) -> ParsedDate {
        if let Some(acceptance) = self.acceptance_test.date() {
            return ParsedDate::Parsed(add_months(acceptance, 1));
        }
        match (self.release.date(), self.dev_test_complete.date()) {
            (Some(release), Some(dev)) if release > dev => ParsedDate::Parsed(release),
            (Some(_), Some(dev)) => ParsedDate::Parsed(add_months(dev, 1)),
            _ => ParsedDate::Invalid,
        }
    }
}

/// Eligibility from a planned test date, never earlier than release.
///
/// A missing plan falls back to the release date.
pub fn eligible_from_plan(release: ParsedDate, planned: ParsedDate) -> ParsedDate {
    match (release.date(), planned.date()) {
        (Some(r), Some(p)) => ParsedDate::Parsed(r.max(p)),
        (Some(r), None) => ParsedDate::Parsed(r),
        (None, _) => ParsedDate::Invalid,
    }
}

/// Extracts a rank written after `marker` in a free-text remark.
///
/// `parse_priority_note("early online priority: 2nd", "priority:")` is
/// `Some(2)`: whitespace after the marker is skipped and leading digits
/// are read; any suffix (ordinal, unit) is ignored. Full-width digits
/// (`０`-`９`) count as digits.
pub fn parse_priority_note(note: &str, marker: &str) -> Option<u32> {
    if marker.is_empty() {
        return None;
    }
    let (_, rest) = note.split_once(marker)?;
    let mut digits = rest.trim_start().chars().map_while(digit_value).peekable();
    digits.peek()?;
    digits.try_fold(0u32, |acc, d| acc.checked_mul(10)?.checked_add(d))
}

fn digit_value(c: char) -> Option<u32> {
    match c {
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => c.to_digit(10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearMonth;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn horizon() -> Horizon {
        Horizon::new(ym("2024-10"), ym("2026-03")).unwrap()
    }

    #[test]
    fn test_route_buckets() {
        let demands = vec![
            Demand::new("in", "A").with_eligible(ParsedDate::ymd(2024, 12, 3)),
            Demand::new("tbd", "A"),
            Demand::new("early", "A").with_eligible(ParsedDate::ymd(2024, 9, 30)),
            Demand::new("late", "A").with_eligible(ParsedDate::ymd(2026, 4, 1)),
            Demand::new("edge", "B").with_eligible(ParsedDate::ymd(2026, 3, 31)),
        ];
        let r = route(&demands, &horizon());
        assert_eq!(r.schedulable, vec![0, 4]);
        assert_eq!(r.undecided, vec![1]);
        assert_eq!(r.out_of_range, vec![2, 3]);

        let refs = r.out_of_range_refs(&demands);
        assert_eq!(refs[0].demand_id, "early");
        assert_eq!(r.undecided_refs(&demands)[0].category, "A");
    }

    #[test]
    fn test_route_fixed_month_is_relevant() {
        let demands = vec![
            // Commitment inside the horizon rescues an undecided release date.
            Demand::new("f1", "A").with_fixed(ParsedDate::ymd(2025, 1, 10)),
            // Commitment outside the horizon wins over an in-range release.
            Demand::new("f2", "A")
                .with_eligible(ParsedDate::ymd(2025, 1, 1))
                .with_fixed(ParsedDate::ymd(2026, 6, 1)),
            // Invalid commitment falls back to the release date.
            Demand::new("f3", "A")
                .with_eligible(ParsedDate::ymd(2025, 2, 1))
                .with_fixed(ParsedDate::Invalid),
        ];
        let r = route(&demands, &horizon());
        assert_eq!(r.schedulable, vec![0, 2]);
        assert_eq!(r.out_of_range, vec![1]);
        assert!(r.undecided.is_empty());
    }

    #[test]
    fn test_milestone_acceptance_first() {
        let m = MilestoneDates {
            release: ParsedDate::Invalid,
            dev_test_complete: ParsedDate::Invalid,
            acceptance_test: ParsedDate::ymd(2024, 11, 20),
        };
        assert_eq!(m.test_date(), ParsedDate::ymd(2024, 12, 20));
    }

    #[test]
    fn test_milestone_release_before_dev() {
        let m = MilestoneDates {
            release: ParsedDate::ymd(2024, 10, 1),
            dev_test_complete: ParsedDate::ymd(2024, 12, 15),
            acceptance_test: ParsedDate::Invalid,
        };
        assert_eq!(m.test_date(), ParsedDate::ymd(2025, 1, 15));
    }

    #[test]
    fn test_milestone_release_after_dev() {
        let m = MilestoneDates {
            release: ParsedDate::ymd(2025, 3, 1),
            dev_test_complete: ParsedDate::ymd(2024, 12, 15),
            acceptance_test: ParsedDate::Invalid,
        };
        assert_eq!(m.test_date(), ParsedDate::ymd(2025, 3, 1));
    }

    #[test]
    fn test_milestone_same_day_and_missing() {
        let same = MilestoneDates {
            release: ParsedDate::ymd(2025, 1, 31),
            dev_test_complete: ParsedDate::ymd(2025, 1, 31),
            acceptance_test: ParsedDate::Invalid,
        };
        assert_eq!(same.test_date(), ParsedDate::ymd(2025, 2, 28));

        let missing = MilestoneDates {
            release: ParsedDate::ymd(2025, 1, 31),
            dev_test_complete: ParsedDate::Invalid,
            acceptance_test: ParsedDate::Invalid,
        };
        assert_eq!(missing.test_date(), ParsedDate::Invalid);
    }

    #[test]
    fn test_eligible_from_plan() {
        let release = ParsedDate::ymd(2025, 2, 1);
        assert_eq!(eligible_from_plan(release, ParsedDate::Invalid), release);
        assert_eq!(
            eligible_from_plan(release, ParsedDate::ymd(2025, 5, 1)),
            ParsedDate::ymd(2025, 5, 1)
        );
        assert_eq!(eligible_from_plan(release, ParsedDate::ymd(2024, 5, 1)), release);
        assert_eq!(
            eligible_from_plan(ParsedDate::Invalid, ParsedDate::ymd(2025, 5, 1)),
            ParsedDate::Invalid
        );
    }

    #[test]
    fn test_parse_priority_note() {
        assert_eq!(parse_priority_note("priority: 2nd", "priority:"), Some(2));
        assert_eq!(parse_priority_note("rush; priority:12 (customer)", "priority:"), Some(12));
        assert_eq!(parse_priority_note("先行優先度：3位", "先行優先度："), Some(3));
        assert_eq!(parse_priority_note("no marker here", "priority:"), None);
        assert_eq!(parse_priority_note("priority: high", "priority:"), None);
        assert_eq!(parse_priority_note("priority: 1", ""), None);
        assert_eq!(parse_priority_note("priority: 99999999999", "priority:"), None);
    }

    #[test]
    fn test_parse_priority_note_full_width_digits() {
        let marker = "先行オンライン優先度：";
        assert_eq!(parse_priority_note("先行オンライン優先度：２位", marker), Some(2));
        assert_eq!(parse_priority_note("先行オンライン優先度：１２位", marker), Some(12));
        assert_eq!(parse_priority_note("先行オンライン優先度：　３", marker), Some(3));
        assert_eq!(parse_priority_note("先行オンライン優先度：未定", marker), None);
    }
}
