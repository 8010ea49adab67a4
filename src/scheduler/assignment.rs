//! Greedy month assignment for discrete demands.
//!
//! # Algorithm
//!
//! 1. Route demands: undecided and out-of-range ones never reach the ledger.
//! 2. Place committed (fixed) demands in their committed month only, by
//!    `(priority rank, committed month)`. An infeasible commitment is
//!    reported, never moved.
//! 3. Sort flexible demands by `(priority rank, eligible month)`.
//! 4. For each flexible demand, scan from its eligible month to the horizon
//!    end and take the first month with a free slot and (if it has an
//!    assignee) enough assignee hours.
//!
//! Capacity and hours are decremented together through
//! [`ResourceLedger::try_reserve`], so a demand is never half-assigned.
//!
//! # Complexity
//! O(n log n + n * h) where n = demands, h = horizon months.

use tracing::{debug, info, warn};

use crate::config::{AssignmentConfig, MissingAssigneePolicy, PlannerConfig};
use crate::error::EngineError;
use crate::intake::route;
use crate::models::{
    CategoryOrder, Demand, DemandRef, Horizon, ResourceLedger, Schedule, ScheduleEntry,
    Unscheduled, UnscheduledReason, YearMonth,
};

use super::ordering::ProcessingOrder;

/// Greedy capacity-constrained assignment engine.
///
/// Owns the resource ledger for the duration of a run; each successful
/// placement decrements it.
///
/// # Example
///
/// ```
/// use u_commission::models::{CategoryOrder, Demand, Horizon, ParsedDate, ResourceLedger};
/// use u_commission::scheduler::AssignmentEngine;
///
/// let oct = "2024-10".parse().unwrap();
/// let nov = "2024-11".parse().unwrap();
/// let ledger = ResourceLedger::new()
///     .with_capacity(oct, 5)
///     .with_capacity(nov, 5)
///     .with_hours("T1", oct, 20)
///     .with_hours("T1", nov, 40);
///
/// let demands = vec![Demand::new("D1", "X")
///     .with_eligible(ParsedDate::ymd(2024, 10, 1))
///     .with_required_hours(40)
///     .with_assignee("T1")];
///
/// let mut engine = AssignmentEngine::new(ledger, CategoryOrder::new(["X"]));
/// let schedule = engine.run(&demands, &Horizon::new(oct, nov).unwrap()).unwrap();
///
/// assert_eq!(schedule.entries[0].month, nov);
/// assert_eq!(engine.ledger().remaining_hours("T1", nov), Some(0));
/// assert_eq!(engine.ledger().remaining_capacity(nov), Some(4));
/// ```
#[derive(Debug, Clone)]
pub struct AssignmentEngine {
    ledger: ResourceLedger,
    categories: CategoryOrder,
    config: AssignmentConfig,
}

impl AssignmentEngine {
    /// Creates an engine with default settings.
    pub fn new(ledger: ResourceLedger, categories: CategoryOrder) -> Self {
        Self {
            ledger,
            categories,
            config: AssignmentConfig::default(),
        }
    }

    /// Creates an engine from the planner configuration.
    pub fn from_config(config: &PlannerConfig, ledger: ResourceLedger) -> Self {
        Self {
            ledger,
            categories: config.categories.clone(),
            config: config.assignment.clone(),
        }
    }

    /// Replaces the assignment settings.
    pub fn with_config(mut self, config: AssignmentConfig) -> Self {
        self.config = config;
        self
    }

    /// Current ledger state.
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Consumes the engine, returning the ledger after all placements.
    pub fn into_ledger(self) -> ResourceLedger {
        self.ledger
    }

    /// Routes and places all demands within the horizon.
    ///
    /// Per-demand failures end up in [`Schedule::unscheduled`]. An `Err` is
    /// returned only if the ledger rejects a decrement that passed the
    /// feasibility check.
    pub fn run(&mut self, demands: &[Demand], horizon: &Horizon) -> Result<Schedule, EngineError> {
        let routing = route(demands, horizon);
        let mut schedule = Schedule::new();
        schedule.undecided = routing.undecided_refs(demands);
        schedule.out_of_range = routing.out_of_range_refs(demands);

        let order = ProcessingOrder::build(
            demands,
            &routing.schedulable,
            &self.categories,
            self.config.tie_breaker,
        );

        for &i in &order.fixed {
            self.place_fixed(&demands[i], &mut schedule)?;
        }

        for &i in &order.unranked {
            let demand = &demands[i];
            self.reject(
                &mut schedule,
                demand,
                UnscheduledReason::UnknownCategory,
                format!(
                    "category '{}' has no priority rank and no explicit priority is set",
                    demand.category
                ),
            );
        }

        for &i in &order.flexible {
            let demand = &demands[i];
            match demand.eligible_month() {
                Some(start) => self.place_flexible(demand, start, horizon, &mut schedule)?,
                None => schedule.undecided.push(DemandRef {
                    demand_id: demand.id.clone(),
                    category: demand.category.clone(),
                }),
            }
        }

        info!(
            scheduled = schedule.entries.len(),
            unscheduled = schedule.unscheduled.len(),
            undecided = schedule.undecided.len(),
            out_of_range = schedule.out_of_range.len(),
            "assignment run complete"
        );
        Ok(schedule)
    }

    /// Places a committed demand in its committed month or reports it.
    fn place_fixed(&mut self, demand: &Demand, schedule: &mut Schedule) -> Result<(), EngineError> {
        let Some(month) = demand.fixed_month() else {
            return Ok(());
        };
        let Some(assignee) = self.resolve_assignee(demand, schedule) else {
            return Ok(());
        };
        let hours = demand.required_hours_or(self.config.default_required_hours);

        let hours_row_missing = assignee
            .is_some_and(|a| self.ledger.remaining_hours(a, month).is_none());
        if !self.ledger.knows_month(month) || hours_row_missing {
            self.reject(
                schedule,
                demand,
                UnscheduledReason::UnknownMonth,
                format!("committed month {month} has no entry in the resource tables"),
            );
            return Ok(());
        }

        if !self.is_feasible(month, assignee, hours) {
            self.reject(
                schedule,
                demand,
                UnscheduledReason::FixedMonthInfeasible,
                format!(
                    "committed month {month}: {} slot(s) left, {}",
                    self.ledger.remaining_capacity(month).unwrap_or(0),
                    self.hours_summary(assignee, month, hours)
                ),
            );
            return Ok(());
        }

        self.commit(demand, month, assignee, hours, true, schedule)
    }

    /// Places a flexible demand in the earliest feasible month.
    fn place_flexible(
        &mut self,
        demand: &Demand,
        start: YearMonth,
        horizon: &Horizon,
        schedule: &mut Schedule,
    ) -> Result<(), EngineError> {
        let Some(assignee) = self.resolve_assignee(demand, schedule) else {
            return Ok(());
        };
        let hours = demand.required_hours_or(self.config.default_required_hours);

        let mut known_months = 0usize;
        for month in horizon.months_from(start) {
            // Months missing from a table offer no capacity.
            let row_missing = !self.ledger.knows_month(month)
                || assignee.is_some_and(|a| self.ledger.remaining_hours(a, month).is_none());
            if row_missing {
                continue;
            }
            known_months += 1;
            if self.is_feasible(month, assignee, hours) {
                return self.commit(demand, month, assignee, hours, false, schedule);
            }
        }

        if known_months == 0 {
            self.reject(
                schedule,
                demand,
                UnscheduledReason::UnknownMonth,
                format!(
                    "no month between {start} and {} has an entry in the resource tables",
                    horizon.end
                ),
            );
        } else {
            self.reject(
                schedule,
                demand,
                UnscheduledReason::HorizonExhausted,
                format!("no feasible month between {start} and {}", horizon.end),
            );
        }
        Ok(())
    }

    /// Resolves which hours ledger to use.
    ///
    /// `Some(None)` = no hours check; `None` = the demand was rejected.
    fn resolve_assignee<'d>(
        &self,
        demand: &'d Demand,
        schedule: &mut Schedule,
    ) -> Option<Option<&'d str>> {
        match demand.assignee.as_deref() {
            None => match self.config.missing_assignee {
                MissingAssigneePolicy::ExemptFromHours => Some(None),
                MissingAssigneePolicy::Reject => {
                    self.reject(
                        schedule,
                        demand,
                        UnscheduledReason::MissingAssignee,
                        "no assignee and assignees are required".to_string(),
                    );
                    None
                }
            },
            Some(a) if !self.ledger.knows_assignee(a) => {
                self.reject(
                    schedule,
                    demand,
                    UnscheduledReason::UnknownAssignee,
                    format!("assignee '{a}' has no available-hours table"),
                );
                None
            }
            Some(a) => Some(Some(a)),
        }
    }

    fn is_feasible(&self, month: YearMonth, assignee: Option<&str>, hours: u32) -> bool {
        self.ledger.has_capacity(month)
            && assignee.map_or(true, |a| self.ledger.has_hours(a, month, hours))
    }

    fn hours_summary(&self, assignee: Option<&str>, month: YearMonth, hours: u32) -> String {
        match assignee {
            Some(a) => format!(
                "'{a}' has {}h of {hours}h needed",
                self.ledger.remaining_hours(a, month).unwrap_or(0)
            ),
            None => "no hours check".to_string(),
        }
    }

    fn commit(
        &mut self,
        demand: &Demand,
        month: YearMonth,
        assignee: Option<&str>,
        hours: u32,
        fixed: bool,
        schedule: &mut Schedule,
    ) -> Result<(), EngineError> {
        self.ledger.try_reserve(month, assignee, hours)?;
        debug!(demand = %demand.id, %month, assignee = ?assignee, fixed, "demand placed");

        let entry = ScheduleEntry::new(
            month,
            demand.category.clone(),
            assignee.map(str::to_string),
            demand.id.clone(),
        );
        schedule.add_entry(if fixed { entry.as_fixed() } else { entry });
        Ok(())
    }

    fn reject(
        &self,
        schedule: &mut Schedule,
        demand: &Demand,
        reason: UnscheduledReason,
        message: String,
    ) {
        warn!(demand = %demand.id, ?reason, "{message}");
        schedule.add_unscheduled(Unscheduled::new(
            demand.id.clone(),
            demand.category.clone(),
            reason,
            message,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TieBreaker;
    use crate::models::ParsedDate;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn order() -> CategoryOrder {
        CategoryOrder::new(["SubBE", "EPI", "WP-F", "WP-B"])
    }

    fn horizon(start: &str, end: &str) -> Horizon {
        Horizon::new(ym(start), ym(end)).unwrap()
    }

    /// Capacity and T1/T2 hours for every month of the horizon.
    fn uniform_ledger(h: &Horizon, slots: u32, hours: u32) -> ResourceLedger {
        h.months().fold(ResourceLedger::new(), |l, m| {
            l.with_capacity(m, slots)
                .with_hours("T1", m, hours)
                .with_hours("T2", m, hours)
        })
    }

    fn flexible(id: &str, category: &str, y: i32, m: u32) -> Demand {
        Demand::new(id, category)
            .with_eligible(ParsedDate::ymd(y, m, 1))
            .with_required_hours(40)
            .with_assignee("T1")
    }

    #[test]
    fn test_skips_month_without_hours() {
        let ledger = ResourceLedger::new()
            .with_capacity(ym("2024-10"), 5)
            .with_capacity(ym("2024-11"), 5)
            .with_hours("T1", ym("2024-10"), 20)
            .with_hours("T1", ym("2024-11"), 40);
        let demands = vec![flexible("D1", "EPI", 2024, 10)];

        let mut engine = AssignmentEngine::new(ledger, order());
        let schedule = engine.run(&demands, &horizon("2024-10", "2024-11")).unwrap();

        assert_eq!(schedule.entry_count(), 1);
        let e = schedule.entry_for_demand("D1").unwrap();
        assert_eq!(e.month, ym("2024-11"));
        assert_eq!(e.assignee.as_deref(), Some("T1"));
        assert!(!e.fixed);
        assert_eq!(engine.ledger().remaining_hours("T1", ym("2024-11")), Some(0));
        assert_eq!(engine.ledger().remaining_capacity(ym("2024-11")), Some(4));
        assert_eq!(engine.ledger().remaining_capacity(ym("2024-10")), Some(5));
        assert_eq!(engine.ledger().remaining_hours("T1", ym("2024-10")), Some(20));
    }

    #[test]
    fn test_priority_wins_scarce_capacity() {
        let h = horizon("2024-10", "2024-10");
        let ledger = uniform_ledger(&h, 1, 200);
        let demands = vec![flexible("low", "WP-B", 2024, 10), flexible("high", "SubBE", 2024, 10)];

        let mut engine = AssignmentEngine::new(ledger, order());
        let schedule = engine.run(&demands, &h).unwrap();

        assert!(schedule.entry_for_demand("high").is_some());
        let u = schedule.unscheduled_for_demand("low").unwrap();
        assert_eq!(u.reason, UnscheduledReason::HorizonExhausted);
    }

    #[test]
    fn test_spill_to_next_month() {
        let h = horizon("2024-10", "2024-12");
        let ledger = uniform_ledger(&h, 1, 200);
        let demands = vec![
            flexible("a", "EPI", 2024, 10),
            flexible("b", "EPI", 2024, 10),
            flexible("c", "EPI", 2024, 10),
        ];
        let mut engine = AssignmentEngine::new(ledger, order());
        let schedule = engine.run(&demands, &h).unwrap();
        let months: Vec<String> = ["a", "b", "c"]
            .iter()
            .map(|id| schedule.entry_for_demand(id).unwrap().month.to_string())
            .collect();
        assert_eq!(months, vec!["2024-10", "2024-11", "2024-12"]);
        assert_eq!(engine.ledger().total_capacity(), 0);
    }

    #[test]
    fn test_eligibility_is_respected() {
        let h = horizon("2024-10", "2025-03");
        let ledger = uniform_ledger(&h, 5, 200);
        let demands = vec![flexible("D1", "SubBE", 2025, 2)];
        let mut engine = AssignmentEngine::new(ledger, order());
        let schedule = engine.run(&demands, &h).unwrap();
        assert_eq!(schedule.entries[0].month, ym("2025-02"));
    }

    #[test]
    fn test_fixed_honored_before_flexible() {
        let h = horizon("2024-10", "2024-11");
        let ledger = uniform_ledger(&h, 1, 200);
        let demands = vec![
            flexible("flex", "SubBE", 2024, 10).with_priority(1),
            flexible("fixed", "WP-B", 2024, 10).with_fixed(ParsedDate::ymd(2024, 10, 20)),
        ];
        let mut engine = AssignmentEngine::new(ledger, order());
        let schedule = engine.run(&demands, &h).unwrap();

        let fixed = schedule.entry_for_demand("fixed").unwrap();
        assert_eq!(fixed.month, ym("2024-10"));
        assert!(fixed.fixed);
        assert_eq!(schedule.entry_for_demand("flex").unwrap().month, ym("2024-11"));
        // Fixed entries are emitted first.
        assert_eq!(schedule.entries[0].demand_id, "fixed");
    }

    #[test]
    fn test_fixed_infeasible_does_not_spill() {
        let h = horizon("2024-10", "2024-12");
        let ledger = uniform_ledger(&h, 1, 30);
        let demands = vec![
            flexible("f", "EPI", 2024, 10).with_fixed(ParsedDate::ymd(2024, 11, 1)),
        ];
        let mut engine = AssignmentEngine::new(ledger.clone(), order());
        let schedule = engine.run(&demands, &h).unwrap();

        assert_eq!(schedule.entry_count(), 0);
        let u = schedule.unscheduled_for_demand("f").unwrap();
        assert_eq!(u.reason, UnscheduledReason::FixedMonthInfeasible);
        assert!(u.message.contains("2024-11"));
        assert_eq!(engine.ledger(), &ledger);
    }

    #[test]
    fn test_fixed_capacity_exhausted_by_earlier_fixed() {
        let h = horizon("2024-10", "2024-10");
        let ledger = uniform_ledger(&h, 1, 400);
        let demands = vec![
            flexible("f1", "EPI", 2024, 10).with_fixed(ParsedDate::ymd(2024, 10, 3)),
            flexible("f2", "EPI", 2024, 10).with_fixed(ParsedDate::ymd(2024, 10, 9)),
        ];
        let mut engine = AssignmentEngine::new(ledger, order());
        let schedule = engine.run(&demands, &h).unwrap();
        assert!(schedule.entry_for_demand("f1").is_some());
        assert_eq!(
            schedule.unscheduled_for_demand("f2").unwrap().reason,
            UnscheduledReason::FixedMonthInfeasible
        );
    }

    #[test]
    fn test_contested_fixed_slot_goes_to_higher_priority() {
        let h = horizon("2024-10", "2024-10");
        let ledger = uniform_ledger(&h, 1, 400);
        let demands = vec![
            flexible("low", "WP-B", 2024, 10).with_fixed(ParsedDate::ymd(2024, 10, 2)),
            flexible("high", "SubBE", 2024, 10).with_fixed(ParsedDate::ymd(2024, 10, 28)),
        ];
        let mut engine = AssignmentEngine::new(ledger, order());
        let schedule = engine.run(&demands, &h).unwrap();

        let placed: Vec<&str> = schedule.entries.iter().map(|e| e.demand_id.as_str()).collect();
        assert_eq!(placed, vec!["high"]);
        assert_eq!(
            schedule.unscheduled_for_demand("low").unwrap().reason,
            UnscheduledReason::FixedMonthInfeasible
        );
    }

    #[test]
    fn test_unknown_assignee() {
        let h = horizon("2024-10", "2024-12");
        let ledger = uniform_ledger(&h, 5, 200);
        let demands = vec![
            flexible("D1", "EPI", 2024, 10).with_assignee("ghost"),
            flexible("D2", "EPI", 2024, 10),
        ];
        let mut engine = AssignmentEngine::new(ledger, order());
        let schedule = engine.run(&demands, &h).unwrap();
        assert_eq!(
            schedule.unscheduled_for_demand("D1").unwrap().reason,
            UnscheduledReason::UnknownAssignee
        );
        // Processing continues for the rest.
        assert!(schedule.entry_for_demand("D2").is_some());
    }

    #[test]
    fn test_unknown_months() {
        let h = horizon("2024-10", "2024-12");
        // Capacity table covers only October; T1 only has hours in November.
        let ledger = ResourceLedger::new()
            .with_capacity(ym("2024-10"), 5)
            .with_hours("T1", ym("2024-11"), 80);
        let demands = vec![
            flexible("flex", "EPI", 2024, 10),
            flexible("fixed", "EPI", 2024, 10).with_fixed(ParsedDate::ymd(2024, 12, 1)),
        ];
        let mut engine = AssignmentEngine::new(ledger, order());
        let schedule = engine.run(&demands, &h).unwrap();
        assert_eq!(
            schedule.unscheduled_for_demand("flex").unwrap().reason,
            UnscheduledReason::UnknownMonth
        );
        assert_eq!(
            schedule.unscheduled_for_demand("fixed").unwrap().reason,
            UnscheduledReason::UnknownMonth
        );
    }

    #[test]
    fn test_missing_month_rows_are_skipped() {
        let h = horizon("2024-10", "2024-12");
        let ledger = ResourceLedger::new()
            .with_capacity(ym("2024-10"), 5)
            .with_capacity(ym("2024-12"), 5)
            .with_hours("T1", ym("2024-10"), 0)
            .with_hours("T1", ym("2024-12"), 40);
        let demands = vec![flexible("D1", "EPI", 2024, 10)];
        let mut engine = AssignmentEngine::new(ledger, order());
        let schedule = engine.run(&demands, &h).unwrap();
        assert_eq!(schedule.entries[0].month, ym("2024-12"));
    }

    #[test]
    fn test_missing_assignee_policies() {
        let h = horizon("2024-10", "2024-10");
        let demands = vec![Demand::new("D1", "EPI").with_eligible(ParsedDate::ymd(2024, 10, 1))];

        let mut exempt = AssignmentEngine::new(uniform_ledger(&h, 1, 0), order());
        let schedule = exempt.run(&demands, &h).unwrap();
        let e = schedule.entry_for_demand("D1").unwrap();
        assert_eq!(e.assignee, None);
        assert_eq!(exempt.ledger().remaining_capacity(ym("2024-10")), Some(0));

        let mut reject = AssignmentEngine::new(uniform_ledger(&h, 1, 0), order()).with_config(
            AssignmentConfig {
                missing_assignee: MissingAssigneePolicy::Reject,
                ..Default::default()
            },
        );
        let schedule = reject.run(&demands, &h).unwrap();
        assert_eq!(
            schedule.unscheduled_for_demand("D1").unwrap().reason,
            UnscheduledReason::MissingAssignee
        );
        assert_eq!(reject.ledger().remaining_capacity(ym("2024-10")), Some(1));
    }

    #[test]
    fn test_default_required_hours_from_config() {
        let h = horizon("2024-10", "2024-11");
        let ledger = uniform_ledger(&h, 5, 30);
        let demands = vec![Demand::new("D1", "EPI")
            .with_eligible(ParsedDate::ymd(2024, 10, 1))
            .with_assignee("T1")];

        // Default 40h does not fit in 30h months.
        let mut strict = AssignmentEngine::new(ledger.clone(), order());
        let schedule = strict.run(&demands, &h).unwrap();
        assert_eq!(schedule.entry_count(), 0);

        let mut relaxed = AssignmentEngine::new(ledger, order()).with_config(AssignmentConfig {
            default_required_hours: 24,
            ..Default::default()
        });
        let schedule = relaxed.run(&demands, &h).unwrap();
        assert_eq!(schedule.entries[0].month, ym("2024-10"));
        assert_eq!(relaxed.ledger().remaining_hours("T1", ym("2024-10")), Some(6));
    }

    #[test]
    fn test_routing_buckets_in_schedule() {
        let h = horizon("2024-10", "2024-12");
        let ledger = uniform_ledger(&h, 5, 200);
        let demands = vec![
            Demand::new("tbd", "EPI").with_assignee("T1"),
            flexible("past", "EPI", 2024, 9),
            flexible("future", "EPI", 2025, 1),
            flexible("ok", "EPI", 2024, 12),
            flexible("mystery", "EDS", 2024, 10),
        ];
        let mut engine = AssignmentEngine::new(ledger, order());
        let schedule = engine.run(&demands, &h).unwrap();

        assert_eq!(schedule.undecided[0].demand_id, "tbd");
        let out: Vec<&str> = schedule.out_of_range.iter().map(|d| d.demand_id.as_str()).collect();
        assert_eq!(out, vec!["past", "future"]);
        assert_eq!(schedule.entry_count(), 1);
        assert_eq!(
            schedule.unscheduled_for_demand("mystery").unwrap().reason,
            UnscheduledReason::UnknownCategory
        );
    }

    #[test]
    fn test_from_config() {
        let config = PlannerConfig::from_json_str(
            r#"{ "categories": ["SubBE", "EPI"], "assignment": { "tie_breaker": "by_id" } }"#,
        )
        .unwrap();
        let h = horizon("2024-10", "2024-10");
        let mut engine = AssignmentEngine::from_config(&config, uniform_ledger(&h, 1, 200));
        let demands = vec![flexible("z", "EPI", 2024, 10), flexible("a", "EPI", 2024, 10)];
        let schedule = engine.run(&demands, &h).unwrap();
        assert_eq!(schedule.entries[0].demand_id, "a");
        assert_eq!(engine.config.tie_breaker, TieBreaker::ById);
    }

    #[test]
    fn test_into_ledger() {
        let h = horizon("2024-10", "2024-10");
        let mut engine = AssignmentEngine::new(uniform_ledger(&h, 2, 200), order());
        engine.run(&[flexible("D1", "EPI", 2024, 10)], &h).unwrap();
        let ledger = engine.into_ledger();
        assert_eq!(ledger.remaining_capacity(ym("2024-10")), Some(1));
        assert_eq!(ledger.remaining_hours("T1", ym("2024-10")), Some(160));
    }

    fn random_case(rng: &mut StdRng, h: &Horizon) -> (Vec<Demand>, ResourceLedger) {
        let categories = ["SubBE", "EPI", "WP-F", "WP-B"];
        let assignees = ["T1", "T2", "T3"];
        let mut ledger = ResourceLedger::new();
        for m in h.months() {
            ledger = ledger.with_capacity(m, rng.random_range(0..=3));
            for a in assignees {
                ledger = ledger.with_hours(a, m, rng.random_range(0..=3) * 20);
            }
        }
        let mut demands = Vec::new();
        for i in 0..rng.random_range(1..=30) {
            let month = h.start.plus_months(rng.random_range(0..h.len() as u32));
            let mut d = Demand::new(format!("D{i}"), categories[rng.random_range(0..4)])
                .with_eligible(month.first_day())
                .with_required_hours(rng.random_range(1..=3) * 20);
            if rng.random_bool(0.8) {
                d = d.with_assignee(assignees[rng.random_range(0..3)]);
            }
            if rng.random_bool(0.2) {
                let fixed = h.start.plus_months(rng.random_range(0..h.len() as u32));
                d = d.with_fixed(fixed.first_day());
            }
            if rng.random_bool(0.1) {
                d = d.with_priority(rng.random_range(1..=4));
            }
            demands.push(d);
        }
        (demands, ledger)
    }

    #[test]
    fn test_randomized_invariants() {
        let mut rng = StdRng::seed_from_u64(42);
        let h = horizon("2024-10", "2025-09");
        for _ in 0..50 {
            let (demands, initial) = random_case(&mut rng, &h);
            let mut engine = AssignmentEngine::new(initial.clone(), order());
            let schedule = engine.run(&demands, &h).unwrap();

            // Determinism.
            let mut again = AssignmentEngine::new(initial.clone(), order());
            assert_eq!(again.run(&demands, &h).unwrap(), schedule);

            // Every demand is accounted for exactly once.
            let mut seen = HashSet::new();
            for id in schedule
                .entries
                .iter()
                .map(|e| &e.demand_id)
                .chain(schedule.unscheduled.iter().map(|u| &u.demand_id))
                .chain(schedule.undecided.iter().map(|d| &d.demand_id))
                .chain(schedule.out_of_range.iter().map(|d| &d.demand_id))
            {
                assert!(seen.insert(id.clone()), "{id} reported twice");
            }
            assert_eq!(seen.len(), demands.len());

            // Ledger arithmetic matches the entries and never underflows.
            let ledger = engine.ledger();
            for m in h.months() {
                let used = schedule.entries_in_month(m).len() as u32;
                assert_eq!(
                    ledger.remaining_capacity(m).unwrap() + used,
                    initial.remaining_capacity(m).unwrap()
                );
                for a in ["T1", "T2", "T3"] {
                    let spent: u32 = schedule
                        .entries_in_month(m)
                        .iter()
                        .filter(|e| e.assignee.as_deref() == Some(a))
                        .map(|e| {
                            let d = demands.iter().find(|d| d.id == e.demand_id).unwrap();
                            d.required_hours.unwrap()
                        })
                        .sum();
                    assert_eq!(
                        ledger.remaining_hours(a, m).unwrap() + spent,
                        initial.remaining_hours(a, m).unwrap()
                    );
                }
            }

            // Flexible entries never precede eligibility; fixed ones sit on their commitment.
            for e in &schedule.entries {
                let d = demands.iter().find(|d| d.id == e.demand_id).unwrap();
                if e.fixed {
                    assert_eq!(Some(e.month), d.fixed_month());
                } else {
                    assert!(Some(e.month) >= d.eligible_month());
                }
            }
        }
    }

    #[test]
    fn test_fixed_placed_before_flexible_demands() {
        let h = horizon("2024-10", "2024-12");
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let (mut demands, ledger) = random_case(&mut rng, &h);
            demands.retain(|d| !d.is_fixed());
            let committed = Demand::new("commit", "WP-B")
                .with_fixed(ParsedDate::ymd(2024, 11, 5))
                .with_required_hours(20)
                .with_assignee("T9");
            let ledger = ledger
                .with_capacity(ym("2024-11"), 1)
                .with_hours("T9", ym("2024-11"), 20);
            // Listed last, still placed before every flexible demand.
            demands.push(committed);

            let mut engine = AssignmentEngine::new(ledger, order());
            let schedule = engine.run(&demands, &h).unwrap();
            let e = schedule.entry_for_demand("commit").unwrap();
            assert_eq!(e.month, ym("2024-11"));
            assert!(e.fixed);
        }
    }
}
