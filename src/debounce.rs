use std::time::{Duration, Instant};

/// A query waiting out its quiet window.
#[derive(Debug, Clone)]
struct Pending {
  query: String,
  deadline: Instant,
}

/// Throttles keystroke-driven searches: only the last query value within a
/// quiet window triggers a fetch.
///
/// The pending deadline is an explicit value replaced atomically
/// (cancel-then-arm) rather than an implicit timer closure, and it is polled
/// from the UI event loop, so there is never more than one live window.
#[derive(Debug)]
pub struct Debouncer {
  delay: Duration,
  pending: Option<Pending>,
}

impl Debouncer {
  pub fn new(delay: Duration) -> Self {
    Self { delay, pending: None }
  }

  /// A keystroke changed the query: cancel any pending window and arm a
  /// fresh one for this value.
  pub fn note_input(&mut self, query: &str, now: Instant) {
    self.pending = Some(Pending { query: query.to_string(), deadline: now + self.delay });
  }

  /// Take the pending query if its quiet window has elapsed. Returns the
  /// query at most once per armed window.
  pub fn due(&mut self, now: Instant) -> Option<String> {
    if self.pending.as_ref().is_some_and(|p| now >= p.deadline) {
      self.pending.take().map(|p| p.query)
    } else {
      None
    }
  }

  /// Drop the pending window without firing. Used by bypass requests
  /// (category jump, clear) that fetch immediately themselves.
  pub fn cancel(&mut self) {
    self.pending = None;
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DELAY: Duration = Duration::from_millis(600);

  fn at(start: Instant, ms: u64) -> Instant {
    start + Duration::from_millis(ms)
  }

  #[test]
  fn quiet_window_fires_last_query_once() {
    // Keystrokes at t=0, 100, 200; window elapses at t=800.
    let start = Instant::now();
    let mut d = Debouncer::new(DELAY);
    d.note_input("r", at(start, 0));
    d.note_input("re", at(start, 100));
    d.note_input("rea", at(start, 200));

    assert_eq!(d.due(at(start, 650)), None);
    assert_eq!(d.due(at(start, 799)), None);
    assert_eq!(d.due(at(start, 800)), Some("rea".to_string()));
    // Fired exactly once
    assert_eq!(d.due(at(start, 900)), None);
  }

  #[test]
  fn keystroke_inside_window_supersedes() {
    let start = Instant::now();
    let mut d = Debouncer::new(DELAY);
    d.note_input("rea", at(start, 200));
    // Arrives before the t=800 deadline, so it replaces the window.
    d.note_input("reac", at(start, 650));

    assert_eq!(d.due(at(start, 800)), None);
    assert_eq!(d.due(at(start, 1250)), Some("reac".to_string()));
    assert_eq!(d.due(at(start, 2000)), None);
  }

  #[test]
  fn cancel_drops_pending_window() {
    let start = Instant::now();
    let mut d = Debouncer::new(DELAY);
    d.note_input("react", at(start, 0));
    assert!(d.is_pending());
    d.cancel();
    assert!(!d.is_pending());
    assert_eq!(d.due(at(start, 1000)), None);
  }

  #[test]
  fn idle_debouncer_never_fires() {
    let mut d = Debouncer::new(DELAY);
    assert_eq!(d.due(Instant::now()), None);
    assert!(!d.is_pending());
  }

  #[test]
  fn rearming_after_fire_works() {
    let start = Instant::now();
    let mut d = Debouncer::new(DELAY);
    d.note_input("rust", at(start, 0));
    assert_eq!(d.due(at(start, 600)), Some("rust".to_string()));

    d.note_input("rust async", at(start, 1000));
    assert_eq!(d.due(at(start, 1599)), None);
    assert_eq!(d.due(at(start, 1600)), Some("rust async".to_string()));
  }
}
