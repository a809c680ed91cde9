//! When a periodic task runs.

use chrono_tz::Tz;
use rand::Rng;
use std::time::Duration;

/// Crontab-style schedule evaluated in a named time zone.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    pub expression: String,
    pub timezone: Tz,
    /// Run once immediately, before the first cron tick.
    pub run_on_start: bool,
}

impl CronSchedule {
    /// Creates a schedule that doesn't run on start.
    ///
    /// # Arguments
    /// - `expression` - Either a five-field crontab expression
    ///   (`min hour day month weekday`), which runs at second `0`, or a six-field
    ///   expression with seconds FIRST (`sec min hour day month weekday`).
    ///   Six-field strings written seconds-last, as some cron libraries accept,
    ///   must be reordered before they are passed here.
    /// - `timezone` - Zone the expression's wall-clock fields are read in
    pub fn new(expression: impl Into<String>, timezone: Tz) -> Self {
        Self {
            expression: expression.into(),
            timezone,
            run_on_start: false,
        }
    }

    pub fn run_on_start(mut self) -> Self {
        self.run_on_start = true;
        self
    }

    /// Expression in the seconds-first form the cron scheduler expects.
    ///
    /// Five-field crontab expressions get a leading `0` seconds field; anything
    /// else is passed through for the scheduler to validate.
    pub fn normalized_expression(&self) -> String {
        let expression = self.expression.trim();
        if expression.split_whitespace().count() == 5 {
            format!("0 {}", expression)
        } else {
            expression.to_string()
        }
    }
}

/// Pause between the end of one run and the start of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepSpec {
    /// Always sleep this many seconds.
    Fixed(u64),
    /// Sleep a uniformly random number of seconds in `[min, max]`.
    Between(u64, u64),
}

impl SleepSpec {
    pub fn next_delay(&self) -> Duration {
        match *self {
            SleepSpec::Fixed(secs) => Duration::from_secs(secs),
            SleepSpec::Between(a, b) => {
                let (min, max) = if a <= b { (a, b) } else { (b, a) };
                Duration::from_secs(rand::rng().random_range(min..=max))
            }
        }
    }
}

/// Either variant of periodic schedule.
#[derive(Debug, Clone)]
pub enum Schedule {
    Cron(CronSchedule),
    Interval(SleepSpec),
}
