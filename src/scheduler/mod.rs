//! Daily trigger scheduling.
//!
//! One cooperative loop: the cycle runs once at startup, then the process
//! sleeps until the next fixed UTC wall-clock time. Cycles never overlap
//! because the next trigger is only computed after the previous cycle
//! returns.

use crate::config::ScheduleConfig;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

/// A fixed once-per-day trigger time in UTC.
#[derive(Debug, Clone, Copy)]
pub struct DailySchedule {
    hour: u32,
    minute: u32,
}

impl DailySchedule {
    /// Build from a validated schedule config.
    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self {
            hour: config.run_hour,
            minute: config.run_minute,
        }
    }

    /// Next trigger strictly after `now`.
    ///
    /// A trigger landing exactly on `now` counts as already fired; the cycle
    /// at startup covers it.
    pub fn next_trigger(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now
            .date_naive()
            .and_hms_opt(self.hour, self.minute, 0)
            .expect("trigger time validated at startup")
            .and_utc();

        if today > now {
            today
        } else {
            today + Duration::days(1)
        }
    }

    /// Sleep until the next trigger and return its timestamp.
    pub async fn wait_for_next(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = self.next_trigger(now);
        let wait = (next - now).to_std().unwrap_or_default();

        info!(next = %next, wait_secs = wait.as_secs(), "Sleeping until next trigger");
        tokio::time::sleep(wait).await;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn schedule(hour: u32, minute: u32) -> DailySchedule {
        DailySchedule { hour, minute }
    }

    #[test]
    fn test_trigger_later_same_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();
        let next = schedule(23, 0).next_trigger(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 10, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_trigger_rolls_to_next_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();
        let next = schedule(0, 0).next_trigger(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_trigger_at_exact_time_is_tomorrow() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let next = schedule(0, 0).next_trigger(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_trigger_crosses_month_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        let next = schedule(0, 0).next_trigger(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }
}
