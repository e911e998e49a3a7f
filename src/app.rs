use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::catalog::{self, Category, SortKey, VideoRecord};
use crate::config::{self, Config};
use crate::constants::constants;
use crate::debounce::Debouncer;
use crate::player::{NowPlaying, VideoPlayer};
use crate::reminder::ReminderScheduler;
use crate::theme::THEMES;
use crate::youtube::{VideoStats, YoutubeClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Login,
  Home,
  Search,
  Details,
  Settings,
}

/// In-flight async task receivers.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  /// Catalog aggregation result, tagged with its request generation.
  pub(crate) catalog_rx: Option<oneshot::Receiver<(u64, Vec<Category>)>>,
  /// Statistics backfill for one video id.
  pub(crate) stats_rx: Option<oneshot::Receiver<(String, VideoStats)>>,
}

pub struct App {
  pub screen: Screen,
  /// Stateless guest flag; set by the login screen, never persisted.
  pub guest: bool,
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub theme_index: usize,
  pub sort_key: SortKey,
  /// The aggregated catalog, one entry per configured category term.
  pub categories: Vec<Category>,
  /// Unified search view: filtered, cross-category deduplicated, sorted.
  pub results: Vec<VideoRecord>,
  pub home_state: ListState,
  pub list_state: ListState,
  /// Record shown on the details screen.
  pub selected: Option<VideoRecord>,
  /// Live statistics for `selected`; `None` while the backfill is in flight.
  pub stats: Option<VideoStats>,
  pub player: VideoPlayer,
  pub reminders_enabled: bool,
  pub reminder_time: (u32, u32),
  pub reminder: ReminderScheduler,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  pub info_message: Option<String>,
  pub should_quit: bool,
  pub(crate) debouncer: Debouncer,
  pub(crate) tasks: AsyncTasks,
  client: YoutubeClient,
  /// Monotonic token: only the most recently issued aggregation request may
  /// touch visible state. Stale completions are discarded silently.
  catalog_generation: u64,
  /// Category to jump to right after login (from --category).
  pending_jump: Option<String>,
  /// When the last error was set — used for auto-dismiss after 5 seconds.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(client: YoutubeClient, initial_category: Option<String>) -> Self {
    let config = Config::load();
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name).unwrap_or(0) } else { 0 };
    let reminders_enabled = config.reminders_enabled.unwrap_or(false);
    let reminder_time = config
      .reminder_time
      .as_deref()
      .and_then(config::parse_reminder_time)
      .or_else(|| config::parse_reminder_time(&constants().default_reminder_time))
      .unwrap_or((18, 0));

    let mut app = Self {
      screen: Screen::Login,
      guest: false,
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      theme_index,
      sort_key: SortKey::Latest,
      categories: Vec::new(),
      results: Vec::new(),
      home_state: ListState::default(),
      list_state: ListState::default(),
      selected: None,
      stats: None,
      player: VideoPlayer::new(),
      reminders_enabled,
      reminder_time,
      reminder: ReminderScheduler::new(),
      last_error: None,
      status_message: None,
      info_message: None,
      should_quit: false,
      debouncer: Debouncer::new(Duration::from_millis(constants().debounce_ms)),
      tasks: AsyncTasks::default(),
      client,
      catalog_generation: 0,
      pending_jump: initial_category,
      error_time: None,
    };
    if app.reminders_enabled {
      app.apply_reminder_schedule();
    }
    app
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  /// Clear the current error message and its expiry timer.
  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after 5 seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  fn save_config(&self) {
    let (hour, minute) = self.reminder_time;
    let config = Config {
      theme_name: Some(self.theme().name.to_string()),
      reminders_enabled: Some(self.reminders_enabled),
      reminder_time: Some(format!("{:02}:{:02}", hour, minute)),
    };
    config.save();
  }

  // --- Login ---

  /// "Log in as guest": in-memory flag only, no credentials, no persistence.
  pub fn login(&mut self) {
    self.guest = true;
    info!("guest login");
    if let Some(title) = self.pending_jump.take() {
      self.jump_to_category(title);
    } else {
      self.screen = Screen::Home;
      self.trigger_catalog_refresh();
    }
  }

  // --- Catalog aggregation ---

  /// Issue a fresh aggregation request across all category terms. Any prior
  /// outstanding request is superseded (its result will fail the generation
  /// check and be dropped).
  pub fn trigger_catalog_refresh(&mut self) {
    self.catalog_generation += 1;
    let generation = self.catalog_generation;
    let client = self.client.clone();
    let terms = constants().categories.clone();
    debug!(generation, "catalog refresh");
    // Keep rendering prior state while the fetch is outstanding; only an
    // empty catalog warrants a loading indicator.
    if self.categories.is_empty() {
      self.status_message = Some("Loading videos…".to_string());
    }

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let categories = catalog::load_catalog(client, terms).await;
      let _ = tx.send((generation, categories));
    });
    self.tasks.catalog_rx = Some(rx);
  }

  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.catalog_rx.take() {
      match rx.try_recv() {
        Ok((generation, categories)) => {
          self.status_message = None;
          if generation == self.catalog_generation {
            let total: usize = categories.iter().map(|c| c.records.len()).sum();
            info!(generation, total, "catalog applied");
            self.categories = categories;
            self.recompute_results();
          } else {
            debug!(generation, latest = self.catalog_generation, "discarding stale catalog response");
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.catalog_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.set_error("Video loading task failed.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.stats_rx.take() {
      match rx.try_recv() {
        Ok((video_id, stats)) => {
          catalog::apply_statistics(&mut self.categories, &video_id, stats);
          if let Some(ref mut sel) = self.selected
            && sel.id == video_id
          {
            sel.view_count = stats.view_count;
            sel.like_count = stats.like_count;
            self.stats = Some(stats);
          }
          // Popular ordering may change now that real counts are in.
          self.recompute_results();
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.stats_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          // Same policy as a failed fetch: show zeroed stats, no banner.
          debug!("statistics task dropped, showing zeroed stats");
          self.stats = Some(VideoStats::default());
        }
      }
    }
  }

  // --- Search ---

  /// Rebuild the unified search view from the current catalog, query, and
  /// sort key. Synchronous; remote refreshes arrive via `check_pending`.
  pub fn recompute_results(&mut self) {
    let matches = catalog::search_catalog(&self.categories, &self.input);
    self.results = catalog::sort_records(&matches, self.sort_key);
    if self.results.is_empty() {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      self.list_state.select(Some(sel.min(self.results.len() - 1)));
    }
  }

  /// Home-screen view: categories narrowed by the current query.
  pub fn narrowed_home(&self) -> Vec<Category> {
    catalog::narrow_categories(&self.categories, &self.input)
  }

  /// A keystroke changed the search query: the visible list narrows
  /// immediately, the remote refresh waits out the debounce window.
  pub fn note_search_input(&mut self) {
    self.debouncer.note_input(&self.input, Instant::now());
    self.recompute_results();
  }

  /// Fire the debounced refresh once its quiet window has elapsed.
  pub fn poll_debounce(&mut self, now: Instant) {
    if let Some(query) = self.debouncer.due(now) {
      debug!(query = %query, "debounce window elapsed, refreshing catalog");
      self.trigger_catalog_refresh();
    }
  }

  /// "Show more" on a category: switch to the search view seeded with the
  /// category title. Bypasses the debouncer and fetches immediately.
  pub fn jump_to_category(&mut self, title: String) {
    info!(category = %title, "jump to category");
    self.cursor_position = title.chars().count();
    self.input = title;
    self.input_scroll = 0;
    self.screen = Screen::Search;
    self.debouncer.cancel();
    self.trigger_catalog_refresh();
    self.recompute_results();
  }

  /// Open the search screen fresh: clear the query and fetch immediately.
  pub fn open_search(&mut self) {
    self.input.clear();
    self.cursor_position = 0;
    self.input_scroll = 0;
    self.screen = Screen::Search;
    self.debouncer.cancel();
    self.trigger_catalog_refresh();
    self.recompute_results();
  }

  // --- Details ---

  pub fn open_details(&mut self) {
    let Some(idx) = self.list_state.selected() else { return };
    let Some(record) = self.results.get(idx) else { return };
    let record = record.clone();
    info!(video_id = %record.id, "open details");
    self.stats = None;
    self.screen = Screen::Details;
    self.trigger_stats(record.id.clone());
    self.selected = Some(record);
  }

  fn trigger_stats(&mut self, video_id: String) {
    let client = self.client.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let stats = client.fetch_statistics(&video_id).await;
      let _ = tx.send((video_id, stats));
    });
    self.tasks.stats_rx = Some(rx);
  }

  pub async fn play_selected(&mut self) {
    let Some(ref record) = self.selected else { return };
    let now_playing = NowPlaying {
      title: record.title.clone(),
      channel: record.channel_name.clone(),
      url: format!("https://www.youtube.com/watch?v={}", record.id),
    };
    if let Err(e) = self.player.play(now_playing).await {
      self.set_error(format!("Playback error: {}", e));
      let _ = self.player.stop().await;
    }
  }

  pub async fn close_details(&mut self) {
    if self.player.is_playing() {
      let _ = self.player.stop().await;
    }
    self.selected = None;
    self.stats = None;
    self.screen = Screen::Search;
  }

  // --- Reminders ---

  pub fn toggle_reminders(&mut self) {
    self.reminders_enabled = !self.reminders_enabled;
    info!(enabled = self.reminders_enabled, "reminders toggled");
    self.apply_reminder_schedule();
    self.save_config();
  }

  pub fn adjust_reminder_hour(&mut self, delta: i32) {
    let (hour, minute) = self.reminder_time;
    self.reminder_time = ((hour as i32 + delta).rem_euclid(24) as u32, minute);
    self.apply_reminder_schedule();
    self.save_config();
  }

  pub fn adjust_reminder_minute(&mut self, delta: i32) {
    let (hour, minute) = self.reminder_time;
    self.reminder_time = (hour, (minute as i32 + delta).rem_euclid(60) as u32);
    self.apply_reminder_schedule();
    self.save_config();
  }

  /// Cancel-then-reschedule: at most one daily notification is ever armed.
  fn apply_reminder_schedule(&mut self) {
    self.reminder.cancel_all();
    if self.reminders_enabled {
      let (hour, minute) = self.reminder_time;
      self.reminder.schedule_daily(hour, minute);
    }
  }
}
