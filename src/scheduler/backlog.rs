//! Month-by-month backlog draining.
//!
//! # Algorithm
//!
//! 1. Convert cumulative per-category counts into monthly deltas (the
//!    first sample is taken verbatim).
//! 2. Starting at the first sample's month, for each calendar month:
//!    add that month's deltas to the category backlogs, then test up to
//!    the month's quota, visiting categories in priority order.
//! 3. Stop once every backlog is empty and every delta has arrived.
//!
//! A higher-priority category is drained as far as the quota allows before
//! any lower-priority category is touched.
//!
//! # Termination
//! With a positive default quota and finite input the total backlog
//! shrinks every month after the last delta arrives. `max_months` bounds
//! the loop regardless.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::{BacklogConfig, NegativeDeltaPolicy, PlannerConfig};
use crate::error::BacklogError;
use crate::models::{CategoryOrder, YearMonth};

/// Category name used by [`simulate_carry_over`].
pub const CARRY_OVER_CATEGORY: &str = "units";

/// Cumulative units per category as of a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeSample {
    /// Sample month.
    pub month: YearMonth,
    /// Category → cumulative count. Missing categories count as 0.
    pub counts: BTreeMap<String, u64>,
}

/// New units per category arriving in a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaSample {
    /// Arrival month.
    pub month: YearMonth,
    /// Category → change in units. May be negative after a data correction.
    pub deltas: BTreeMap<String, i64>,
}

/// Units that become testable in a month, with an optional month limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyIntake {
    /// Month.
    pub month: YearMonth,
    /// Newly testable units.
    pub testable: u64,
    /// Test limit for this month; `None` uses the default.
    pub limit: Option<u32>,
}

/// One simulated month. Vectors are aligned with the report's categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogRow {
    /// Simulated month.
    pub month: YearMonth,
    /// Quota in effect.
    pub quota: u32,
    /// Net change applied to each backlog before testing.
    pub added: Vec<i64>,
    /// Units tested per category.
    pub tested: Vec<u64>,
    /// Backlog per category at month end.
    pub backlog: Vec<u64>,
}

impl BacklogRow {
    /// Units tested across all categories.
    pub fn total_tested(&self) -> u64 {
        self.tested.iter().sum()
    }

    /// Month-end backlog across all categories.
    pub fn total_backlog(&self) -> u64 {
        self.backlog.iter().sum()
    }
}

/// Result of a backlog simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogReport {
    /// Categories in priority order; row vectors follow this order.
    pub categories: CategoryOrder,
    /// One row per simulated month, in calendar order.
    pub rows: Vec<BacklogRow>,
}

impl BacklogReport {
    /// Month in which the last unit was tested (the final simulated month).
    pub fn completion_month(&self) -> Option<YearMonth> {
        self.rows.last().map(|r| r.month)
    }

    /// Units tested over the whole run.
    pub fn total_tested(&self) -> u64 {
        self.rows.iter().map(BacklogRow::total_tested).sum()
    }

    /// Row for a month.
    pub fn row(&self, month: YearMonth) -> Option<&BacklogRow> {
        self.rows.iter().find(|r| r.month == month)
    }

    /// Units of `category` tested in `month`.
    pub fn tested_in(&self, month: YearMonth, category: &str) -> Option<u64> {
        let idx = self.index_of(category)?;
        self.row(month).map(|r| r.tested[idx])
    }

    /// Month-end backlog of `category` in `month`.
    pub fn backlog_at(&self, month: YearMonth, category: &str) -> Option<u64> {
        let idx = self.index_of(category)?;
        self.row(month).map(|r| r.backlog[idx])
    }

    fn index_of(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }
}

/// Converts cumulative samples into monthly deltas.
///
/// Samples are ordered by month first (stable). The first sample's counts
/// are its deltas; later deltas are the difference to the previous sample.
/// Categories outside `order` are ignored.
pub fn deltas_from_cumulative(
    samples: &[CumulativeSample],
    order: &CategoryOrder,
) -> Result<Vec<DeltaSample>, BacklogError> {
    let mut sorted: Vec<&CumulativeSample> = samples.iter().collect();
    sorted.sort_by_key(|s| s.month);

    let mut deltas = Vec::with_capacity(sorted.len());
    let mut previous: Option<&CumulativeSample> = None;
    for sample in sorted {
        if let Some(prev) = previous {
            if prev.month == sample.month {
                return Err(BacklogError::DuplicateSample(sample.month));
            }
        }
        let mut row = BTreeMap::new();
        for category in order.iter() {
            let current = count(sample, category)?;
            let before = match previous {
                Some(p) => count(p, category)?,
                None => 0,
            };
            row.insert(category.to_string(), current - before);
        }
        deltas.push(DeltaSample {
            month: sample.month,
            deltas: row,
        });
        previous = Some(sample);
    }
    Ok(deltas)
}

fn count(sample: &CumulativeSample, category: &str) -> Result<i64, BacklogError> {
    let raw = sample.counts.get(category).copied().unwrap_or(0);
    i64::try_from(raw).map_err(|_| BacklogError::CountOverflow {
        category: category.to_string(),
        month: sample.month,
    })
}

/// Priority-ordered backlog simulator.
///
/// # Example
///
/// ```
/// use u_commission::config::BacklogConfig;
/// use u_commission::models::CategoryOrder;
/// use u_commission::scheduler::{BacklogSimulator, CumulativeSample};
///
/// let order = CategoryOrder::new(["A", "B"]);
/// let sim = BacklogSimulator::new(order, BacklogConfig::default());
/// let samples = vec![CumulativeSample {
///     month: "2024-10".parse().unwrap(),
///     counts: [("A".to_string(), 4)].into_iter().collect(),
/// }];
/// let report = sim.simulate_cumulative(&samples).unwrap();
/// assert_eq!(report.completion_month().unwrap().to_string(), "2024-11");
/// ```
#[derive(Debug, Clone)]
pub struct BacklogSimulator {
    categories: CategoryOrder,
    config: BacklogConfig,
    quota_overrides: BTreeMap<YearMonth, u32>,
}

impl BacklogSimulator {
    /// Creates a simulator.
    pub fn new(categories: CategoryOrder, config: BacklogConfig) -> Self {
        Self {
            categories,
            config,
            quota_overrides: BTreeMap::new(),
        }
    }

    /// Creates a simulator from the planner configuration.
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.categories.clone(), config.backlog.clone())
    }

    /// Replaces the default quota for one month.
    pub fn with_quota_override(mut self, month: YearMonth, limit: u32) -> Self {
        self.quota_overrides.insert(month, limit);
        self
    }

    /// Quota in effect for a month.
    pub fn quota_for(&self, month: YearMonth) -> u32 {
        self.quota_overrides
            .get(&month)
            .copied()
            .unwrap_or(self.config.max_units_per_month)
    }

    /// Runs the simulation from cumulative samples.
    pub fn simulate_cumulative(
        &self,
        samples: &[CumulativeSample],
    ) -> Result<BacklogReport, BacklogError> {
        let deltas = deltas_from_cumulative(samples, &self.categories)?;
        self.simulate(&deltas)
    }

    /// Runs the simulation from monthly deltas (ascending, one per month).
    pub fn simulate(&self, deltas: &[DeltaSample]) -> Result<BacklogReport, BacklogError> {
        if self.config.max_units_per_month == 0 {
            return Err(BacklogError::ZeroQuota);
        }
        for pair in deltas.windows(2) {
            if pair[0].month == pair[1].month {
                return Err(BacklogError::DuplicateSample(pair[1].month));
            }
            if pair[0].month > pair[1].month {
                return Err(BacklogError::UnsortedSamples {
                    previous: pair[0].month,
                    month: pair[1].month,
                });
            }
        }

        let mut report = BacklogReport {
            categories: self.categories.clone(),
            rows: Vec::new(),
        };
        let Some(first) = deltas.first() else {
            return Ok(report);
        };

        let n = self.categories.len();
        let mut backlog = vec![0u64; n];
        let mut cursor = 0;
        let mut month = first.month;

        loop {
            if report.rows.len() >= self.config.max_months as usize {
                return Err(BacklogError::MonthLimitExceeded(self.config.max_months));
            }

            let mut added = vec![0i64; n];
            if let Some(sample) = deltas.get(cursor).filter(|s| s.month == month) {
                for (idx, category) in self.categories.iter().enumerate() {
                    let delta = sample.deltas.get(category).copied().unwrap_or(0);
                    added[idx] = self.apply_delta(&mut backlog[idx], delta, category, month)?;
                }
                cursor += 1;
            }

            let quota = self.quota_for(month);
            let mut remaining = u64::from(quota);
            let mut tested = vec![0u64; n];
            for idx in 0..n {
                if remaining == 0 {
                    break;
                }
                let take = remaining.min(backlog[idx]);
                tested[idx] = take;
                backlog[idx] -= take;
                remaining -= take;
            }

            debug!(
                %month,
                quota,
                tested = tested.iter().sum::<u64>(),
                backlog = backlog.iter().sum::<u64>(),
                "backlog month simulated"
            );
            report.rows.push(BacklogRow {
                month,
                quota,
                added,
                tested,
                backlog: backlog.clone(),
            });

            if cursor >= deltas.len() && backlog.iter().all(|&b| b == 0) {
                break;
            }
            month = month.succ();
        }

        info!(
            months = report.rows.len(),
            tested = report.total_tested(),
            completion = ?report.completion_month().map(|m| m.to_string()),
            "backlog drained"
        );
        Ok(report)
    }

    /// Applies one delta under the configured policy; returns the net change.
    fn apply_delta(
        &self,
        backlog: &mut u64,
        delta: i64,
        category: &str,
        month: YearMonth,
    ) -> Result<i64, BacklogError> {
        if delta >= 0 {
            *backlog = backlog
                .checked_add(delta.unsigned_abs())
                .ok_or_else(|| BacklogError::CountOverflow {
                    category: category.to_string(),
                    month,
                })?;
            return Ok(delta);
        }
        let decrease = delta.unsigned_abs();
        match self.config.negative_delta {
            NegativeDeltaPolicy::Reject => Err(BacklogError::NegativeDelta {
                category: category.to_string(),
                month,
                decrease,
            }),
            NegativeDeltaPolicy::Clamp => Ok(0),
            NegativeDeltaPolicy::Cancel => {
                let removed = decrease.min(*backlog);
                *backlog -= removed;
                Ok(-(removed as i64))
            }
        }
    }
}

/// Single-pool carry-over simulation with per-month test limits.
///
/// Each intake row adds its testable units; months after the last row use
/// `default_limit` until the carry-over reaches zero.
pub fn simulate_carry_over(
    intake: &[MonthlyIntake],
    default_limit: u32,
    max_months: u32,
) -> Result<BacklogReport, BacklogError> {
    let config = BacklogConfig {
        max_units_per_month: default_limit,
        negative_delta: NegativeDeltaPolicy::Reject,
        max_months,
    };
    let mut sim = BacklogSimulator::new(CategoryOrder::new([CARRY_OVER_CATEGORY]), config);

    let mut deltas = Vec::with_capacity(intake.len());
    for row in intake {
        if let Some(limit) = row.limit {
            sim = sim.with_quota_override(row.month, limit);
        }
        let units = i64::try_from(row.testable).map_err(|_| BacklogError::CountOverflow {
            category: CARRY_OVER_CATEGORY.to_string(),
            month: row.month,
        })?;
        deltas.push(DeltaSample {
            month: row.month,
            deltas: [(CARRY_OVER_CATEGORY.to_string(), units)]
                .into_iter()
                .collect(),
        });
    }
    deltas.sort_by_key(|d| d.month);
    sim.simulate(&deltas)
}
