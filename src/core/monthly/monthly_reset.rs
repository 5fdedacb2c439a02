// Month-boundary detection for the leaderboard reset.
//
// Instead of matching "day 1, 00:00" exactly (which silently skips a whole month
// if the bot happens to be down during that minute), we remember the last month
// we processed and fire as soon as the calendar month changes.

use chrono::{DateTime, Datelike, Utc};
use std::sync::Mutex;

/// A calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(time: DateTime<Utc>) -> Self {
        Self {
            year: time.year(),
            month: time.month(),
        }
    }
}

/// Remembers the last processed month and reports each new one exactly once.
pub struct MonthlyResetTracker {
    last_processed: Mutex<MonthKey>,
}

impl MonthlyResetTracker {
    /// Seed the tracker with the month the process started in.
    /// Nothing is persisted, so a fresh process has nothing to reset yet.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            last_processed: Mutex::new(MonthKey::of(now)),
        }
    }

    /// Returns `true` the first time it sees a month later than the last processed one.
    /// A clock stepping back into an earlier month is ignored.
    pub fn check(&self, now: DateTime<Utc>) -> bool {
        let current = MonthKey::of(now);
        // A poisoned lock only means another check panicked mid-compare; the key is still valid.
        let mut last = self
            .last_processed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if current <= *last {
            return false;
        }

        tracing::info!(
            previous_year = last.year,
            previous_month = last.month,
            year = current.year,
            month = current.month,
            "New month detected"
        );
        *last = current;
        true
    }

    pub fn last_processed(&self) -> MonthKey {
        *self
            .last_processed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn same_month_never_fires() {
        let tracker = MonthlyResetTracker::starting_at(at(2026, 5, 1, 0, 0));

        assert!(!tracker.check(at(2026, 5, 1, 0, 0)));
        assert!(!tracker.check(at(2026, 5, 31, 23, 59)));
    }

    #[test]
    fn first_minute_of_month_fires_once() {
        let tracker = MonthlyResetTracker::starting_at(at(2026, 5, 20, 8, 30));

        assert!(tracker.check(at(2026, 6, 1, 0, 0)));
        assert!(!tracker.check(at(2026, 6, 1, 0, 1)));
        assert_eq!(tracker.last_processed(), MonthKey { year: 2026, month: 6 });
    }

    #[test]
    fn missed_minute_still_fires_later_in_month() {
        let tracker = MonthlyResetTracker::starting_at(at(2026, 5, 31, 23, 58));

        // Process was down from 23:59 until 00:07.
        assert!(tracker.check(at(2026, 6, 1, 0, 7)));
    }

    #[test]
    fn clock_stepping_back_does_not_reset_again() {
        let tracker = MonthlyResetTracker::starting_at(at(2026, 5, 31, 23, 58));
        assert!(tracker.check(at(2026, 6, 1, 0, 0)));

        // NTP correction drags the clock back into May, then forward again.
        assert!(!tracker.check(at(2026, 5, 31, 23, 59)));
        assert!(!tracker.check(at(2026, 6, 1, 0, 1)));
        assert_eq!(tracker.last_processed(), MonthKey { year: 2026, month: 6 });

        assert!(tracker.check(at(2026, 7, 1, 0, 0)));
    }

    #[test]
    fn year_rollover_counts_as_new_month() {
        let tracker = MonthlyResetTracker::starting_at(at(2025, 12, 31, 23, 59));

        assert!(tracker.check(at(2026, 1, 1, 0, 0)));
        assert_eq!(tracker.last_processed(), MonthKey { year: 2026, month: 1 });
    }
}
