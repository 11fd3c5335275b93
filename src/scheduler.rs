//! Reminder scheduler — fires the duty reminder on a cron schedule.
//!
//! The scheduler owns no state and performs no mutation: on each fire it
//! pushes a `ReminderTick` into the event queue, and the router reads the
//! current head of every queue.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Local};
use cron::Schedule;
use tokio::sync::mpsc;

use crate::error::ConfigError;
use crate::router::Event;

/// How long until the schedule next fires after `now`.
pub fn delay_until_next(schedule: &Schedule, now: DateTime<Local>) -> Option<Duration> {
    let next = schedule.after(&now).next()?;
    (next - now).to_std().ok()
}

/// Parse the configured cron expression.
pub fn parse_schedule(expr: &str) -> Result<Schedule, ConfigError> {
    Schedule::from_str(expr).map_err(|e| ConfigError::InvalidValue {
        key: "reminder_cron".to_string(),
        message: e.to_string(),
    })
}

/// Spawn the reminder ticker background task.
pub fn spawn_reminder_ticker(
    schedule: Schedule,
    events: mpsc::Sender<Event>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let Some(delay) = delay_until_next(&schedule, Local::now()) else {
                tracing::warn!("Reminder schedule has no upcoming fire time; ticker stopping");
                return;
            };
            tracing::debug!(?delay, "Next duty reminder scheduled");
            tokio::time::sleep(delay).await;

            if events.send(Event::ReminderTick).await.is_err() {
                tracing::info!("Event queue closed, reminder ticker stopping");
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn daily_schedule_parses() {
        assert!(parse_schedule("0 0 9 * * *").is_ok());
        assert!(parse_schedule("not a cron").is_err());
    }

    #[test]
    fn delay_to_daily_fire_is_under_a_day() {
        let schedule = parse_schedule("0 0 9 * * *").unwrap();
        let delay = delay_until_next(&schedule, Local::now()).unwrap();
        assert!(delay <= Duration::from_secs(24 * 60 * 60));
    }

    #[test]
    fn delay_is_exact_for_a_known_instant() {
        let schedule = parse_schedule("0 0 9 * * *").unwrap();
        // 08:00 local → one hour to the 09:00 fire
        let now = Local.with_ymd_and_hms(2024, 5, 14, 8, 0, 0).unwrap();
        let delay = delay_until_next(&schedule, now).unwrap();
        assert_eq!(delay, Duration::from_secs(3600));
    }

    #[test]
    fn every_second_schedule_fires_soon() {
        let schedule = parse_schedule("* * * * * *").unwrap();
        let delay = delay_until_next(&schedule, Local::now()).unwrap();
        assert!(delay <= Duration::from_secs(1));
    }
}
