//! Time-based job execution

pub mod job;
pub mod schedule;
pub mod scheduler;

pub use job::{JobFn, ScheduledJob};
pub use schedule::Schedule;
pub use scheduler::Scheduler;
