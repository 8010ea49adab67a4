//! Schedule quality metrics (KPIs).
//!
//! Computes placement indicators from a completed assignment run, its input
//! demands, and the ledger as it stood before the run.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Placement Rate | entries / (entries + unscheduled) |
//! | Completion Month | Latest assigned month |
//! | Total Delay | Sum of (assigned - eligible) months over flexible entries |
//! | Maximum Delay | Largest single delay |
//! | Utilization | Slots used / initial slots, per month |
//!
//! Undecided and out-of-range demands never reach the ledger and are
//! counted separately.

use std::collections::{BTreeMap, HashMap};

use crate::models::{Demand, ResourceLedger, Schedule, YearMonth};

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleKpi {
    /// Demands placed.
    pub scheduled: usize,
    /// Demands routed to the engine but not placed.
    pub unscheduled: usize,
    /// Demands without a usable date.
    pub undecided: usize,
    /// Demands whose relevant month lies outside the horizon.
    pub out_of_range: usize,
    /// Fraction of engine-routed demands that were placed (0.0..1.0).
    pub placement_rate: f64,
    /// Latest assigned month.
    pub completion_month: Option<YearMonth>,
    /// Sum of flexible delays, in months.
    pub total_delay_months: i64,
    /// Largest flexible delay, in months.
    pub max_delay_months: i64,
    /// Slots used / initial slots per month. Months with no initial slots
    /// report 0.0.
    pub utilization_by_month: BTreeMap<YearMonth, f64>,
    /// Mean of `utilization_by_month` over months with initial slots.
    pub avg_utilization: f64,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its inputs.
    ///
    /// # Arguments
    /// * `schedule` - The result of an assignment run.
    /// * `demands` - The demands passed to that run (for eligibility).
    /// * `initial` - The ledger before the run.
    pub fn calculate(schedule: &Schedule, demands: &[Demand], initial: &ResourceLedger) -> Self {
        let by_id: HashMap<&str, &Demand> = demands.iter().map(|d| (d.id.as_str(), d)).collect();

        let mut total_delay = 0i64;
        let mut max_delay = 0i64;
        for entry in schedule.entries.iter().filter(|e| !e.fixed) {
            let eligible = by_id
                .get(entry.demand_id.as_str())
                .and_then(|d| d.eligible_month());
            if let Some(eligible) = eligible {
                let delay = eligible.months_until(entry.month).max(0);
                total_delay += delay;
                max_delay = max_delay.max(delay);
            }
        }

        let load = schedule.load_by_month();
        let mut utilization_by_month = BTreeMap::new();
        let mut util_sum = 0.0;
        let mut util_months = 0usize;
        for month in initial.months() {
            let slots = initial.remaining_capacity(month).unwrap_or(0);
            let used = load.get(&month).copied().unwrap_or(0);
            let util = if slots == 0 {
                0.0
            } else {
                util_sum += used as f64 / slots as f64;
                util_months += 1;
                used as f64 / slots as f64
            };
            utilization_by_month.insert(month, util);
        }

        let scheduled = schedule.entries.len();
        let unscheduled = schedule.unscheduled.len();
        let placement_rate = if scheduled + unscheduled == 0 {
            1.0
        } else {
            scheduled as f64 / (scheduled + unscheduled) as f64
        };
        let avg_utilization = if util_months == 0 {
            0.0
        } else {
            util_sum / util_months as f64
        };

        Self {
            scheduled,
            unscheduled,
            undecided: schedule.undecided.len(),
            out_of_range: schedule.out_of_range.len(),
            placement_rate,
            completion_month: schedule.completion_month(),
            total_delay_months: total_delay,
            max_delay_months: max_delay,
            utilization_by_month,
            avg_utilization,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_delay_months: i64, min_placement_rate: f64) -> bool {
        self.max_delay_months <= max_delay_months && self.placement_rate >= min_placement_rate
    }
}
