use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use std::process::Stdio;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::constants::constants;

/// Schedules the daily learning-reminder notification.
///
/// One background task at a time: scheduling always cancels the previous
/// task first. The task sleeps until the next occurrence of the configured
/// time, posts a desktop notification, and re-arms for the following day.
/// Fire-and-forget: notification failures are logged, never surfaced.
pub struct ReminderScheduler {
  handle: Option<JoinHandle<()>>,
}

impl ReminderScheduler {
  pub fn new() -> Self {
    Self { handle: None }
  }

  pub fn schedule_daily(&mut self, hour: u32, minute: u32) {
    self.cancel_all();
    info!(hour, minute, "scheduling daily reminder");
    let handle = tokio::spawn(async move {
      loop {
        let next = next_occurrence(Local::now(), hour, minute);
        let wait = (next - Local::now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;
        send_notification().await;
      }
    });
    self.handle = Some(handle);
  }

  pub fn cancel_all(&mut self) {
    if let Some(handle) = self.handle.take() {
      handle.abort();
    }
  }
}

/// The next wall-clock occurrence of `hour:minute` strictly after `now`:
/// later today if the time is still ahead, otherwise tomorrow.
pub fn next_occurrence(now: DateTime<Local>, hour: u32, minute: u32) -> DateTime<Local> {
  let Some(naive) = now.date_naive().and_hms_opt(hour, minute, 0) else {
    // Out-of-range hour/minute; fall back to re-checking in a day.
    return now + ChronoDuration::days(1);
  };
  let candidate = Local.from_local_datetime(&naive).earliest().unwrap_or(now);
  if candidate > now { candidate } else { candidate + ChronoDuration::days(1) }
}

async fn send_notification() {
  let c = constants();
  let result = Command::new("notify-send")
    .args([c.reminder_title.as_str(), c.reminder_body.as_str()])
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .status()
    .await;

  match result {
    Ok(status) if status.success() => info!("reminder notification sent"),
    Ok(status) => warn!(code = ?status.code(), "notify-send exited with failure"),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      warn!("notify-send not found. Install it with: apt install libnotify-bin (Linux)");
    }
    Err(e) => warn!(err = %e, "failed to run notify-send"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Timelike;

  fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
  }

  #[test]
  fn time_later_today_stays_today() {
    let now = local(2026, 8, 6, 9, 0);
    let next = next_occurrence(now, 18, 30);
    assert_eq!(next.date_naive(), now.date_naive());
    assert_eq!((next.hour(), next.minute()), (18, 30));
  }

  #[test]
  fn time_already_passed_rolls_to_tomorrow() {
    let now = local(2026, 8, 6, 20, 0);
    let next = next_occurrence(now, 18, 30);
    assert_eq!(next.date_naive(), now.date_naive() + ChronoDuration::days(1));
    assert_eq!((next.hour(), next.minute()), (18, 30));
  }

  #[test]
  fn exact_minute_counts_as_passed() {
    let now = local(2026, 8, 6, 18, 30);
    let next = next_occurrence(now, 18, 30);
    assert_eq!(next.date_naive(), now.date_naive() + ChronoDuration::days(1));
  }

  #[test]
  fn midnight_reminder_wraps() {
    let now = local(2026, 8, 6, 0, 1);
    let next = next_occurrence(now, 0, 0);
    assert_eq!(next.date_naive(), now.date_naive() + ChronoDuration::days(1));
    assert_eq!((next.hour(), next.minute()), (0, 0));
  }
}
