use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::Schedule;
use crate::application::errors::BotError;

/// Scheduled job function type
pub type JobFn = dyn Fn() -> Result<(), BotError> + Send + Sync;

/// A function bound to a schedule
#[derive(Clone)]
pub struct ScheduledJob {
    name: String,
    schedule: Schedule,
    func: Arc<JobFn>,
    next_run: DateTime<Utc>,
}

impl ScheduledJob {
    pub fn new<F>(name: impl Into<String>, schedule: Schedule, func: F) -> Self
    where
        F: Fn() -> Result<(), BotError> + Send + Sync + 'static,
    {
        Self::starting_at(name, schedule, func, Utc::now())
    }

    /// A job whose first run is computed from `now`.
    pub fn starting_at<F>(name: impl Into<String>, schedule: Schedule, func: F, now: DateTime<Utc>) -> Self
    where
        F: Fn() -> Result<(), BotError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            schedule,
            func: Arc::new(func),
            next_run: schedule.next_run_after(now, now),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn next_run(&self) -> DateTime<Utc> {
        self.next_run
    }

    pub fn should_run(&self, now: DateTime<Utc>) -> bool {
        self.next_run <= now
    }

    /// Run the function, logging any failure or panic.
    ///
    /// Returns whether the function succeeded.
    pub fn execute(&self) -> bool {
        match catch_unwind(AssertUnwindSafe(|| (self.func)())) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!("Scheduled job {} failed: {}", self.name, e);
                false
            }
            Err(_) => {
                tracing::error!("Scheduled job {} panicked", self.name);
                false
            }
        }
    }

    /// Recompute the next run from `now`.
    pub fn reschedule(&mut self, now: DateTime<Utc>) {
        self.next_run = self.schedule.next_run_after(now, now);
    }

    /// Execute, then reschedule from `now` whatever the outcome.
    pub fn run(&mut self, now: DateTime<Utc>) -> bool {
        let ok = self.execute();
        self.reschedule(now);
        ok
    }
}

impl fmt::Debug for ScheduledJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledJob")
            .field("name", &self.name)
            .field("schedule", &self.schedule)
            .field("next_run", &self.next_run)
            .finish_non_exhaustive()
    }
}
