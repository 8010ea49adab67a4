//! Error types for planner operations.
//!
//! Per-demand outcomes (no capacity, unknown assignee, exhausted horizon)
//! are not errors: they are reported as
//! [`Unscheduled`](crate::models::Unscheduled) records on the schedule.
//! The types here cover malformed input and broken internal contracts.

use thiserror::Error;

use crate::models::YearMonth;

/// A month key that is not of the form `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month key `{input}`: expected YYYY-MM")]
pub struct MonthParseError {
    /// The rejected input.
    pub input: String,
}

impl MonthParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Ledger contract violations.
///
/// These only surface when a caller decrements without checking first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No capacity row exists for the month.
    #[error("no capacity entry for {0}")]
    UnknownMonth(YearMonth),
    /// The assignee has no hours row for the month (or at all).
    #[error("no hours entry for assignee `{assignee}` in {month}")]
    UnknownAssignee {
        /// Assignee identifier.
        assignee: String,
        /// Month that was looked up.
        month: YearMonth,
    },
    /// Global capacity would drop below zero.
    #[error("capacity underflow in {0}")]
    CapacityUnderflow(YearMonth),
    /// Assignee hours would drop below zero.
    #[error("hours underflow for `{assignee}` in {month}: {available}h left, {requested}h requested")]
    HoursUnderflow {
        /// Assignee identifier.
        assignee: String,
        /// Month of the attempted decrement.
        month: YearMonth,
        /// Hours remaining before the attempt.
        available: u32,
        /// Hours requested.
        requested: u32,
    },
}

/// Backlog simulation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BacklogError {
    /// Two cumulative samples fall in the same month.
    #[error("duplicate cumulative sample for {0}")]
    DuplicateSample(YearMonth),
    /// Monthly deltas are not in ascending month order.
    #[error("delta for {month} follows delta for {previous}: months must ascend")]
    UnsortedSamples {
        /// Month of the preceding delta.
        previous: YearMonth,
        /// Month that is out of order.
        month: YearMonth,
    },
    /// A count or backlog does not fit the simulator's integer range.
    #[error("unit count for `{category}` in {month} is out of range")]
    CountOverflow {
        /// Category of the oversized count.
        category: String,
        /// Month of the oversized count.
        month: YearMonth,
    },
    /// A cumulative count decreased while negative deltas are rejected.
    #[error("cumulative count for `{category}` decreased by {decrease} in {month}")]
    NegativeDelta {
        /// Category whose count decreased.
        category: String,
        /// Month of the decrease.
        month: YearMonth,
        /// Size of the decrease.
        decrease: u64,
    },
    /// The default monthly quota is zero, so the backlog can never drain.
    #[error("max units per month must be greater than 0")]
    ZeroQuota,
    /// The simulation ran past the configured month limit.
    #[error("backlog not drained after {0} months")]
    MonthLimitExceeded(u32),
}

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors produced by the assignment engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Ledger contract violation (a feasibility check was bypassed).
    #[error("ledger contract violated: {0}")]
    Ledger(#[from] LedgerError),
}
