//! Planning domain models.
//!
//! Provides the data types shared by both planning modes: month keys and
//! horizons, demands and their priority ordering, the resource ledger,
//! and the schedule produced by a run.
//!
//! # Domain Mappings
//!
//! | u-commission | Commissioning | Field service |
//! |--------------|---------------|---------------|
//! | Demand | Equipment awaiting online test | Site visit |
//! | Category | Process area | Region |
//! | Assignee | Test engineer | Technician |
//! | ResourceLedger | Monthly test slots + engineer hours | Van slots + shift hours |

mod date;
mod demand;
mod ledger;
mod month;
mod schedule;

pub use date::ParsedDate;
pub use demand::{CategoryOrder, Demand, DEFAULT_REQUIRED_HOURS};
pub use ledger::ResourceLedger;
pub use month::{add_months, Horizon, MonthRange, YearMonth};
pub use schedule::{DemandRef, Schedule, ScheduleEntry, Unscheduled, UnscheduledReason};
