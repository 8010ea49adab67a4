//! Resource ledger.
//!
//! Two independent decrement-only pools keyed by month:
//!
//! - **capacity**: remaining test slots for the whole shop in a month.
//! - **hours**: remaining labor hours per assignee per month.
//!
//! Callers check before they consume. A decrement past zero, or of a row
//! that does not exist, is a contract violation and returns a
//! [`LedgerError`] without mutating anything.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::YearMonth;
use crate::error::LedgerError;

/// Remaining global capacity and per-assignee hours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    /// Month → remaining test slots.
    capacity: BTreeMap<YearMonth, u32>,
    /// Assignee → month → remaining hours.
    hours: BTreeMap<String, BTreeMap<YearMonth, u32>>,
}

impl ResourceLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger from the two resource tables.
    pub fn from_tables(
        capacity: BTreeMap<YearMonth, u32>,
        hours: BTreeMap<String, BTreeMap<YearMonth, u32>>,
    ) -> Self {
        Self { capacity, hours }
    }

    /// Sets the capacity for a month.
    pub fn with_capacity(mut self, month: YearMonth, slots: u32) -> Self {
        self.capacity.insert(month, slots);
        self
    }

    /// Sets an assignee's hours for a month.
    pub fn with_hours(mut self, assignee: impl Into<String>, month: YearMonth, hours: u32) -> Self {
        self.hours
            .entry(assignee.into())
            .or_default()
            .insert(month, hours);
        self
    }

    /// Remaining slots in a month; `None` if the month has no row.
    pub fn remaining_capacity(&self, month: YearMonth) -> Option<u32> {
        self.capacity.get(&month).copied()
    }

    /// Remaining hours; `None` if the assignee or month has no row.
    pub fn remaining_hours(&self, assignee: &str, month: YearMonth) -> Option<u32> {
        self.hours.get(assignee)?.get(&month).copied()
    }

    /// Whether the month has at least one slot left.
    pub fn has_capacity(&self, month: YearMonth) -> bool {
        self.remaining_capacity(month).is_some_and(|c| c > 0)
    }

    /// Whether the assignee has at least `need` hours left in the month.
    pub fn has_hours(&self, assignee: &str, month: YearMonth, need: u32) -> bool {
        self.remaining_hours(assignee, month).is_some_and(|h| h >= need)
    }

    /// Whether the assignee has any hours table.
    pub fn knows_assignee(&self, assignee: &str) -> bool {
        self.hours.contains_key(assignee)
    }

    /// Whether the month has a capacity row.
    pub fn knows_month(&self, month: YearMonth) -> bool {
        self.capacity.contains_key(&month)
    }

    /// Months with a capacity row, in calendar order.
    pub fn months(&self) -> impl Iterator<Item = YearMonth> + '_ {
        self.capacity.keys().copied()
    }

    /// Assignees with an hours table, in name order.
    pub fn assignees(&self) -> impl Iterator<Item = &str> {
        self.hours.keys().map(String::as_str)
    }

    /// Takes one slot from the month.
    pub fn consume_capacity(&mut self, month: YearMonth) -> Result<(), LedgerError> {
        let slot = self
            .capacity
            .get_mut(&month)
            .ok_or(LedgerError::UnknownMonth(month))?;
        *slot = slot
            .checked_sub(1)
            .ok_or(LedgerError::CapacityUnderflow(month))?;
        Ok(())
    }

    /// Takes `need` hours from the assignee's month.
    pub fn consume_hours(
        &mut self,
        assignee: &str,
        month: YearMonth,
        need: u32,
    ) -> Result<(), LedgerError> {
        let available = self
            .hours
            .get_mut(assignee)
            .and_then(|m| m.get_mut(&month))
            .ok_or_else(|| LedgerError::UnknownAssignee {
                assignee: assignee.to_string(),
                month,
            })?;
        let current = *available;
        *available = current
            .checked_sub(need)
            .ok_or_else(|| LedgerError::HoursUnderflow {
                assignee: assignee.to_string(),
                month,
                available: current,
                requested: need,
            })?;
        Ok(())
    }

    /// Takes one slot and, if an assignee is given, `need` hours, as one step.
    ///
    /// Both pools are checked before either is decremented, so a failure
    /// leaves the ledger unchanged.
    pub fn try_reserve(
        &mut self,
        month: YearMonth,
        assignee: Option<&str>,
        need: u32,
    ) -> Result<(), LedgerError> {
        match self.remaining_capacity(month) {
            None => return Err(LedgerError::UnknownMonth(month)),
            Some(0) => return Err(LedgerError::CapacityUnderflow(month)),
            Some(_) => {}
        }
        if let Some(assignee) = assignee {
            match self.remaining_hours(assignee, month) {
                None => {
                    return Err(LedgerError::UnknownAssignee {
                        assignee: assignee.to_string(),
                        month,
                    })
                }
                Some(h) if h < need => {
                    return Err(LedgerError::HoursUnderflow {
                        assignee: assignee.to_string(),
                        month,
                        available: h,
                        requested: need,
                    })
                }
                Some(_) => {}
            }
            self.consume_hours(assignee, month, need)?;
        }
        self.consume_capacity(month)
    }

    /// Total remaining slots across all months.
    pub fn total_capacity(&self) -> u64 {
        self.capacity.values().map(|&c| u64::from(c)).sum()
    }
}
