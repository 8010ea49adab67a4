//! Monthly planning for equipment commissioning tests.
//!
//! Given per-month test capacity, per-technician available hours, and a
//! list of equipment awaiting tests, this crate answers two questions:
//! how fast the aggregate backlog drains under a monthly quota, and which
//! month each individual piece of equipment is tested in.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `YearMonth`, `Horizon`, `ParsedDate`,
//!   `Demand`, `CategoryOrder`, `ResourceLedger`, `Schedule`
//! - **`intake`**: Routing of demands by date, milestone-derived test dates
//! - **`scheduler`**: `BacklogSimulator`, `AssignmentEngine`, `ScheduleKpi`
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown
//!   categories, capacity gaps)
//! - **`config`**: JSON planner configuration
//! - **`error`**: Error types
//! - **`telemetry`**: `tracing` subscriber setup
//!
//! # Example
//!
//! ```
//! use u_commission::config::PlannerConfig;
//! use u_commission::models::{Demand, Horizon, ParsedDate, ResourceLedger};
//! use u_commission::scheduler::{AssignmentEngine, ScheduleKpi};
//!
//! let config = PlannerConfig::from_json_str(r#"{ "categories": ["SubBE", "EPI"] }"#).unwrap();
//! let oct = "2024-10".parse().unwrap();
//! let horizon = Horizon::new(oct, oct).unwrap();
//! let ledger = ResourceLedger::new().with_capacity(oct, 1);
//!
//! let demands = vec![
//!     Demand::new("D1", "EPI").with_eligible(ParsedDate::ymd(2024, 10, 2)),
//!     Demand::new("D2", "SubBE").with_eligible(ParsedDate::ymd(2024, 10, 9)),
//! ];
//!
//! let mut engine = AssignmentEngine::from_config(&config, ledger.clone());
//! let schedule = engine.run(&demands, &horizon).unwrap();
//! assert_eq!(schedule.entries[0].demand_id, "D2");
//!
//! let kpi = ScheduleKpi::calculate(&schedule, &demands, &ledger);
//! assert_eq!(kpi.unscheduled, 1);
//! ```

pub mod config;
pub mod error;
pub mod intake;
pub mod models;
pub mod scheduler;
pub mod telemetry;
pub mod validation;
