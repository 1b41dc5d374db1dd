use chrono::{DateTime, Duration, Utc};

use crate::config::ScheduleConfig;

use super::PipelineError;

/// Fixed-interval run schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    start: DateTime<Utc>,
    interval: Duration,
}

impl Schedule {
    /// Runs at `start`, `start + interval`, `start + 2 * interval`, ...
    pub fn new(start: DateTime<Utc>, interval: Duration) -> Result<Self, PipelineError> {
        if interval <= Duration::zero() {
            return Err(PipelineError::InvalidSchedule(format!(
                "interval must be positive, got {}",
                interval
            )));
        }
        Ok(Self { start, interval })
    }

    /// Schedule from configuration.
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, PipelineError> {
        Self::new(config.start, Duration::days(i64::from(config.interval_days)))
    }

    /// First scheduled run.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Time between runs.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// First scheduled run strictly after `now`.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if now < self.start {
            return self.start;
        }
        let elapsed = (now - self.start).num_seconds();
        let periods = elapsed / self.interval.num_seconds().max(1) + 1;
        self.start + Duration::seconds(self.interval.num_seconds() * periods)
    }

    /// The next `count` scheduled runs after `now`.
    pub fn upcoming(&self, now: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        let mut runs = Vec::with_capacity(count);
        let mut next = self.next_run_after(now);
        for _ in 0..count {
            runs.push(next);
            next = next + self.interval;
        }
        runs
    }
}
