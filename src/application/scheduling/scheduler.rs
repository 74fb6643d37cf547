use chrono::{DateTime, Utc};

use super::ScheduledJob;
use crate::application::errors::ScheduleError;

/// A store for scheduled jobs
#[derive(Debug, Default)]
pub struct Scheduler {
    jobs: Vec<ScheduledJob>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a job. Schedules that would not advance after a run, such as an
    /// empty interval or an anchor without a day offset, are refused.
    pub fn add_job(&mut self, job: ScheduledJob) -> Result<(), ScheduleError> {
        job.schedule().validate()?;
        tracing::debug!("Schedule {} added, first run at {}", job.name(), job.next_run());
        self.jobs.push(job);
        Ok(())
    }

    pub fn jobs(&self) -> &[ScheduledJob] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Run every due job. Each job is rescheduled from the clock time after it
    /// finished. Returns the number of jobs run.
    pub fn run_pending(&mut self) -> usize {
        self.run_due(Utc::now(), Utc::now)
    }

    /// Run every job due at `now` and reschedule them from `now`.
    pub fn run_pending_at(&mut self, now: DateTime<Utc>) -> usize {
        self.run_due(now, || now)
    }

    fn run_due(&mut self, now: DateTime<Utc>, clock: impl Fn() -> DateTime<Utc>) -> usize {
        let mut ran = 0;
        for job in self.jobs.iter_mut().filter(|job| job.should_run(now)) {
            tracing::debug!("Running scheduled job {}", job.name());
            job.execute();
            job.reschedule(clock());
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::BotError;
    use crate::application::scheduling::Schedule;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_job(name: &str, schedule: Schedule, now: DateTime<Utc>, counter: &Arc<AtomicUsize>) -> ScheduledJob {
        let counter = Arc::clone(counter);
        ScheduledJob::starting_at(
            name,
            schedule,
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            now,
        )
    }

    #[test]
    fn runs_only_due_jobs_and_advances_them() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let fast = Arc::new(AtomicUsize::new(0));
        let slow = Arc::new(AtomicUsize::new(0));

        let mut scheduler = Scheduler::new();
        scheduler.add_job(counting_job("fast", Schedule::new().seconds(10), start, &fast)).unwrap();
        scheduler.add_job(counting_job("slow", Schedule::new().hour(), start, &slow)).unwrap();

        assert_eq!(scheduler.run_pending_at(start + Duration::seconds(5)), 0);

        let now = start + Duration::seconds(10);
        let before: Vec<_> = scheduler.jobs().iter().map(ScheduledJob::next_run).collect();
        assert_eq!(scheduler.run_pending_at(now), 1);
        assert_eq!(fast.load(Ordering::SeqCst), 1);
        assert_eq!(slow.load(Ordering::SeqCst), 0);

        let after: Vec<_> = scheduler.jobs().iter().map(ScheduledJob::next_run).collect();
        assert!(after[0] > before[0]);
        assert_eq!(after[0], now + Duration::seconds(10));
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn failing_jobs_still_advance() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut scheduler = Scheduler::new();
        scheduler
            .add_job(ScheduledJob::starting_at(
                "broken",
                Schedule::new().minute(),
                || Err(BotError::handler("nope")),
                start,
            ))
            .unwrap();
        scheduler
            .add_job(ScheduledJob::starting_at(
                "panics",
                Schedule::new().minute(),
                || panic!("job blew up"),
                start,
            ))
            .unwrap();

        let now = start + Duration::minutes(1);
        assert_eq!(scheduler.run_pending_at(now), 2);
        assert!(scheduler.jobs().iter().all(|job| job.next_run() == now + Duration::minutes(1)));
        assert_eq!(scheduler.run_pending_at(now), 0);
    }

    #[test]
    fn anchored_job_first_run() {
        let ten_am = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let job = counting_job("noon", Schedule::new().day().at(12, 0).unwrap(), ten_am, &counter);
        assert_eq!(job.next_run(), Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn anchor_broken_by_later_setters_is_refused() {
        let mut scheduler = Scheduler::new();
        let no_days = Schedule::new().day().at(12, 0).unwrap().days(0).seconds(1);
        assert_eq!(
            scheduler.add_job(ScheduledJob::new("no-days", no_days, || Ok(()))),
            Err(ScheduleError::AtWithoutDays)
        );
        let with_hours = Schedule::new().day().at(12, 0).unwrap().hours(3);
        assert_eq!(
            scheduler.add_job(ScheduledJob::new("hours", with_hours, || Ok(()))),
            Err(ScheduleError::AtWithSubDayOffset)
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn anchored_job_advances_after_running() {
        let one_pm = Utc.with_ymd_and_hms(2024, 6, 1, 13, 0, 0).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        let schedule = Schedule::new().day().at(12, 0).unwrap().seconds(1);
        scheduler.add_job(counting_job("noon", schedule, one_pm, &counter)).unwrap();

        let first = scheduler.jobs()[0].next_run();
        assert!(first > one_pm);
        assert_eq!(scheduler.run_pending_at(first), 1);
        assert!(scheduler.jobs()[0].next_run() > first);
        assert_eq!(scheduler.run_pending_at(first), 0);
    }

    #[test]
    fn empty_schedule_is_refused() {
        let mut scheduler = Scheduler::new();
        let job = ScheduledJob::new("spin", Schedule::new(), || Ok(()));
        assert_eq!(scheduler.add_job(job), Err(ScheduleError::EmptyInterval));
        assert!(scheduler.is_empty());
    }
}
