use chrono::{DateTime, Duration, Utc};

/// Tracks a recurring alert cadence by time elapsed since the last fire,
/// independent of wall-clock alignment.
///
/// Passed into the pipeline's tick rather than held as process-global state
/// so tick behavior is testable with explicit timestamps.
#[derive(Debug, Clone, Copy)]
pub struct RecurringSchedule {
    interval: Duration,
    last_fired: Option<DateTime<Utc>>,
}

impl RecurringSchedule {
    /// A schedule that has never fired; due at the first opportunity.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now.signed_duration_since(last) >= self.interval,
        }
    }

    pub fn mark_fired(&mut self, now: DateTime<Utc>) {
        self.last_fired = Some(now);
    }

    pub fn last_fired(&self) -> Option<DateTime<Utc>> {
        self.last_fired
    }
}
