//! Schedule (solution) model.
//!
//! A schedule is the outcome of one planning run: the ordered month
//! assignments, the demands that could not be placed (with a reason), and
//! the demands that intake routing kept away from the engine.
//!
//! Multiple entries sharing a month and category stay an ordered list
//! ([`Schedule::cells`]); turning them into display text is up to the
//! caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::YearMonth;

/// A complete planning result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Placements, in the order they were made.
    pub entries: Vec<ScheduleEntry>,
    /// Demands the engine tried and failed to place.
    pub unscheduled: Vec<Unscheduled>,
    /// Demands without a valid eligibility date.
    pub undecided: Vec<DemandRef>,
    /// Demands whose relevant month lies outside the horizon.
    pub out_of_range: Vec<DemandRef>,
}

/// A demand placed into a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Assigned month.
    pub month: YearMonth,
    /// Demand category.
    pub category: String,
    /// Assignee whose hours were consumed.
    pub assignee: Option<String>,
    /// Scheduled demand ID.
    pub demand_id: String,
    /// Whether the month came from a commitment rather than greedy search.
    pub fixed: bool,
}

/// Lightweight reference to a demand, used by the routing buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandRef {
    /// Demand ID.
    pub demand_id: String,
    /// Demand category.
    pub category: String,
}

/// A demand the engine could not place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unscheduled {
    /// Demand ID.
    pub demand_id: String,
    /// Demand category.
    pub category: String,
    /// Why placement failed.
    pub reason: UnscheduledReason,
    /// Human-readable diagnostic.
    pub message: String,
}

/// Classification of placement failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    /// No month between eligibility and the horizon end was feasible.
    HorizonExhausted,
    /// The committed month lacks capacity or hours.
    FixedMonthInfeasible,
    /// The assignee has no hours table.
    UnknownAssignee,
    /// A needed month has no row in the resource tables.
    UnknownMonth,
    /// No assignee and the policy requires one.
    MissingAssignee,
    /// Category not in the priority order and no explicit rank.
    UnknownCategory,
}

impl ScheduleEntry {
    /// Creates a greedily placed entry.
    pub fn new(
        month: YearMonth,
        category: impl Into<String>,
        assignee: Option<String>,
        demand_id: impl Into<String>,
    ) -> Self {
        Self {
            month,
            category: category.into(),
            assignee,
            demand_id: demand_id.into(),
            fixed: false,
        }
    }

    /// Marks the entry as coming from a commitment.
    pub fn as_fixed(mut self) -> Self {
        self.fixed = true;
        self
    }
}

impl Unscheduled {
    /// Creates an unscheduled record.
    pub fn new(
        demand_id: impl Into<String>,
        category: impl Into<String>,
        reason: UnscheduledReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            demand_id: demand_id.into(),
            category: category.into(),
            reason,
            message: message.into(),
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    /// Records a placement failure.
    pub fn add_unscheduled(&mut self, unscheduled: Unscheduled) {
        self.unscheduled.push(unscheduled);
    }

    /// Whether every demand that reached the engine was placed.
    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Latest assigned month.
    pub fn completion_month(&self) -> Option<YearMonth> {
        self.entries.iter().map(|e| e.month).max()
    }

    /// Finds the entry for a demand.
    pub fn entry_for_demand(&self, demand_id: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.demand_id == demand_id)
    }

    /// Finds the failure record for a demand.
    pub fn unscheduled_for_demand(&self, demand_id: &str) -> Option<&Unscheduled> {
        self.unscheduled.iter().find(|u| u.demand_id == demand_id)
    }

    /// All entries in a month, in placement order.
    pub fn entries_in_month(&self, month: YearMonth) -> Vec<&ScheduleEntry> {
        self.entries.iter().filter(|e| e.month == month).collect()
    }

    /// All entries consuming an assignee's hours.
    pub fn entries_for_assignee(&self, assignee: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.assignee.as_deref() == Some(assignee))
            .collect()
    }

    /// Entry count per month.
    pub fn load_by_month(&self) -> BTreeMap<YearMonth, usize> {
        let mut load = BTreeMap::new();
        for e in &self.entries {
            *load.entry(e.month).or_insert(0) += 1;
        }
        load
    }

    /// Demand IDs grouped per `(month, category)` cell, in placement order.
    pub fn cells(&self) -> BTreeMap<(YearMonth, String), Vec<String>> {
        let mut cells: BTreeMap<(YearMonth, String), Vec<String>> = BTreeMap::new();
        for e in &self.entries {
            cells
                .entry((e.month, e.category.clone()))
                .or_default()
                .push(e.demand_id.clone());
        }
        cells
    }

    /// Entries sorted by month; placement order is kept within a month.
    pub fn sorted_by_month(&self) -> Vec<&ScheduleEntry> {
        let mut sorted: Vec<&ScheduleEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.month);
        sorted
    }
}
