//! Demand (commissioning test obligation) model.
//!
//! A demand is one piece of equipment that must be tested in some month:
//! it belongs to a priority category, becomes eligible at its release
//! date, may already be committed to a fixed date, and may name the
//! technician whose hours it consumes.
//!
//! # Priority
//! Lower rank = served first. A demand's rank is its explicit override if
//! present, otherwise its category's 1-based position in the
//! [`CategoryOrder`]. Both share one numeric space, so an override of `1`
//! ties with the top category.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{ParsedDate, YearMonth};

/// Default hours a single test consumes from the assignee's budget.
pub const DEFAULT_REQUIRED_HOURS: u32 = 40;

/// A demand to be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    /// Unique demand identifier.
    pub id: String,
    /// Human-readable name (equipment model).
    pub name: String,
    /// Priority category (process area).
    pub category: String,
    /// Hours consumed from the assignee's monthly budget. `None` uses the
    /// configured default.
    pub required_hours: Option<u32>,
    /// Earliest date the demand may be tested.
    pub eligible: ParsedDate,
    /// Committed test date, if any. Overrides greedy placement.
    pub fixed: Option<ParsedDate>,
    /// Explicit priority rank, overriding the category rank.
    pub priority_override: Option<u32>,
    /// Technician whose hours ledger is consulted.
    pub assignee: Option<String>,
    /// Domain-specific metadata (drawing number, unit number, ...).
    pub attributes: HashMap<String, String>,
}

impl Demand {
    /// Creates a demand with an invalid (undecided) eligibility date.
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            category: category.into(),
            required_hours: None,
            eligible: ParsedDate::Invalid,
            fixed: None,
            priority_override: None,
            assignee: None,
            attributes: HashMap::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the eligibility date.
    pub fn with_eligible(mut self, date: impl Into<ParsedDate>) -> Self {
        self.eligible = date.into();
        self
    }

    /// Sets the committed date.
    pub fn with_fixed(mut self, date: impl Into<ParsedDate>) -> Self {
        self.fixed = Some(date.into());
        self
    }

    /// Sets the required hours.
    pub fn with_required_hours(mut self, hours: u32) -> Self {
        self.required_hours = Some(hours);
        self
    }

    /// Sets an explicit priority rank.
    pub fn with_priority(mut self, rank: u32) -> Self {
        self.priority_override = Some(rank);
        self
    }

    /// Sets the assignee.
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Required hours, falling back to `default` when unspecified.
    pub fn required_hours_or(&self, default: u32) -> u32 {
        self.required_hours.unwrap_or(default)
    }

    /// Earliest schedulable month, if the eligibility date is valid.
    pub fn eligible_month(&self) -> Option<YearMonth> {
        self.eligible.month()
    }

    /// Committed month. An invalid committed date counts as no commitment.
    pub fn fixed_month(&self) -> Option<YearMonth> {
        self.fixed.and_then(|d| d.month())
    }

    /// Whether the demand carries a usable commitment.
    pub fn is_fixed(&self) -> bool {
        self.fixed_month().is_some()
    }

    /// Effective priority rank, or `None` if the category is unknown and
    /// no override is set.
    pub fn priority_rank(&self, order: &CategoryOrder) -> Option<u32> {
        self.priority_override.or_else(|| order.rank(&self.category))
    }
}

/// Fixed priority ordering of categories, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryOrder {
    categories: Vec<String>,
}

impl CategoryOrder {
    /// Creates an ordering from names listed highest priority first.
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// 1-based rank of a category.
    pub fn rank(&self, category: &str) -> Option<u32> {
        self.categories
            .iter()
            .position(|c| c == category)
            .map(|i| i as u32 + 1)
    }

    /// Whether the category is part of the ordering.
    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Category names, highest priority first.
    pub fn as_slice(&self) -> &[String] {
        &self.categories
    }

    /// Iterates categories in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the ordering is empty.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
