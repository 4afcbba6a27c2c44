//! Scheduling of scrape cycles
//!
//! The scheduler keeps exactly one pending timer for the scrape job and
//! re-arms it after every cycle using the delay the policy picks.

mod policy;
mod scheduler;

pub use policy::SchedulePolicy;
pub use scheduler::{AdaptiveScheduler, CycleRunner, SchedulerState};
