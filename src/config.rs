//! Planner configuration.
//!
//! Everything a run needs besides the data itself: the category priority
//! order, the backlog quota, and the policies for inputs whose handling
//! varies between sites (decreasing cumulative counts, demands without an
//! assignee).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{CategoryOrder, DEFAULT_REQUIRED_HOURS};

/// How a decrease in a cumulative count is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeDeltaPolicy {
    /// Fail the simulation.
    #[default]
    Reject,
    /// Treat the decrease as zero new units.
    Clamp,
    /// Remove untested units from the backlog, never going below zero.
    Cancel,
}

/// How a demand without an assignee is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAssigneePolicy {
    /// Only global capacity is checked.
    #[default]
    ExemptFromHours,
    /// The demand is reported unscheduled.
    Reject,
}

/// Final ordering between demands with equal rank and eligibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreaker {
    /// Keep input order (stable sort).
    #[default]
    InputOrder,
    /// Lexicographic by demand ID.
    ById,
}

/// Backlog simulator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklogConfig {
    /// Units testable per month unless overridden.
    pub max_units_per_month: u32,
    /// Handling of decreasing cumulative counts.
    pub negative_delta: NegativeDeltaPolicy,
    /// Upper bound on simulated months.
    pub max_months: u32,
}

/// Assignment engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Hours per test when a caller does not specify them.
    pub default_required_hours: u32,
    /// Handling of demands without an assignee.
    pub missing_assignee: MissingAssigneePolicy,
    /// Final tie breaker for flexible demands.
    pub tie_breaker: TieBreaker,
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Categories, highest priority first.
    pub categories: CategoryOrder,
    /// Backlog simulator settings.
    #[serde(default)]
    pub backlog: BacklogConfig,
    /// Assignment engine settings.
    #[serde(default)]
    pub assignment: AssignmentConfig,
}

impl Default for BacklogConfig {
    fn default() -> Self {
        Self {
            max_units_per_month: 3,
            negative_delta: NegativeDeltaPolicy::Reject,
            max_months: 1200,
        }
    }
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            default_required_hours: DEFAULT_REQUIRED_HOURS,
            missing_assignee: MissingAssigneePolicy::ExemptFromHours,
            tie_breaker: TieBreaker::InputOrder,
        }
    }
}

impl BacklogConfig {
    /// Validate backlog settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_units_per_month == 0 {
            return Err(ConfigError::Invalid(
                "max_units_per_month must be greater than 0".into(),
            ));
        }
        if self.max_months == 0 {
            return Err(ConfigError::Invalid("max_months must be greater than 0".into()));
        }
        Ok(())
    }
}

impl AssignmentConfig {
    /// Validate assignment settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_required_hours == 0 {
            return Err(ConfigError::Invalid(
                "default_required_hours must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

impl PlannerConfig {
    /// Creates a configuration with default settings for the given order.
    pub fn new(categories: CategoryOrder) -> Self {
        Self {
            categories,
            ..Default::default()
        }
    }

    /// Validate all sections and the category order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one category must be defined".into(),
            ));
        }
        let slice = self.categories.as_slice();
        for (i, name) in slice.iter().enumerate() {
            if slice[..i].contains(name) {
                return Err(ConfigError::Invalid(format!("duplicate category `{name}`")));
            }
        }
        self.backlog
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("backlog: {e}")))?;
        self.assignment
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("assignment: {e}")))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: PlannerConfig = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
