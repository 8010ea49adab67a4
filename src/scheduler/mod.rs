//! Planning engines and KPI evaluation.
//!
//! # Backlog simulation
//!
//! `BacklogSimulator` projects how fast aggregate per-category backlogs
//! drain under a fixed monthly test quota, serving categories in strict
//! priority order.
//!
//! # Assignment
//!
//! `AssignmentEngine` places individual demands into months with a greedy,
//! priority-driven, earliest-feasible-month heuristic against a shared
//! resource ledger. It is not optimal, but it is fast and deterministic.
//!
//! # KPI
//!
//! `ScheduleKpi` summarizes an assignment run: placement rate, delay,
//! completion month, and utilization.

mod assignment;
mod backlog;
mod kpi;
mod ordering;

pub use assignment::AssignmentEngine;
pub use backlog::{
    deltas_from_cumulative, simulate_carry_over, BacklogReport, BacklogRow, BacklogSimulator,
    CumulativeSample, DeltaSample, MonthlyIntake, CARRY_OVER_CATEGORY,
};
pub use kpi::ScheduleKpi;
pub use ordering::ProcessingOrder;
