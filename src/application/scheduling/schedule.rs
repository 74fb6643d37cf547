//! Relative and time-of-day anchored schedules

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

use crate::application::errors::ScheduleError;

/// The relative time until something should next happen.
///
/// ```
/// use phial::Schedule;
///
/// let hourly = Schedule::new().every().hour();
/// let daily_at_noon = Schedule::new().every().day().at(12, 0).unwrap();
/// # let _ = (hourly, daily_at_noon);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Schedule {
    days: u32,
    hours: u32,
    minutes: u32,
    seconds: u32,
    at: Option<NaiveTime>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads better in a chain: `Schedule::new().every().day()`.
    pub fn every(self) -> Self {
        self
    }

    pub fn day(self) -> Self {
        self.days(1)
    }

    pub fn days(mut self, value: u32) -> Self {
        self.days = value;
        self
    }

    pub fn hour(self) -> Self {
        self.hours(1)
    }

    pub fn hours(mut self, value: u32) -> Self {
        self.hours = value;
        self
    }

    pub fn minute(self) -> Self {
        self.minutes(1)
    }

    pub fn minutes(mut self, value: u32) -> Self {
        self.minutes = value;
        self
    }

    pub fn second(self) -> Self {
        self.seconds(1)
    }

    pub fn seconds(mut self, value: u32) -> Self {
        self.seconds = value;
        self
    }

    /// Anchor a day-based schedule to a time of day (UTC).
    pub fn at(self, hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        self.at_hms(hour, minute, 0)
    }

    pub fn at_hms(mut self, hour: u32, minute: u32, second: u32) -> Result<Self, ScheduleError> {
        if self.hours != 0 || self.minutes != 0 {
            return Err(ScheduleError::AtWithSubDayOffset);
        }
        if self.days == 0 {
            return Err(ScheduleError::AtWithoutDays);
        }
        if self.at.is_some() {
            return Err(ScheduleError::AtAlreadySet);
        }
        let time =
            NaiveTime::from_hms_opt(hour, minute, second).ok_or(ScheduleError::InvalidTime { hour, minute, second })?;
        self.at = Some(time);
        Ok(self)
    }

    pub fn anchor(&self) -> Option<NaiveTime> {
        self.at
    }

    /// Check the whole schedule. Setters called after `at` can leave the
    /// anchor without a day offset or next to an hour or minute offset.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.is_empty() {
            return Err(ScheduleError::EmptyInterval);
        }
        if self.at.is_some() {
            if self.hours != 0 || self.minutes != 0 {
                return Err(ScheduleError::AtWithSubDayOffset);
            }
            if self.days == 0 {
                return Err(ScheduleError::AtWithoutDays);
            }
        }
        Ok(())
    }

    /// True when no offset is configured at all.
    pub fn is_empty(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    fn offset(&self) -> Duration {
        Duration::days(i64::from(self.days))
            + Duration::hours(i64::from(self.hours))
            + Duration::minutes(i64::from(self.minutes))
            + Duration::seconds(i64::from(self.seconds))
    }

    /// Next run after `last_run`, judged against the current time.
    pub fn next_run_time(&self, last_run: DateTime<Utc>) -> DateTime<Utc> {
        self.next_run_after(last_run, Utc::now())
    }

    /// Next run after `last_run`, judged against `now`.
    ///
    /// An anchored schedule lands on the anchor time of `last_run`'s day, or
    /// the configured number of days later when that instant is not after
    /// `now`. Otherwise the offset is simply added to `last_run`.
    pub fn next_run_after(&self, last_run: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.at {
            Some(at) => {
                let anchored = Utc.from_utc_datetime(&last_run.date_naive().and_time(at));
                if anchored <= now {
                    anchored + Duration::days(i64::from(self.days))
                } else {
                    anchored
                }
            }
            None => last_run + self.offset(),
        }
    }
}
