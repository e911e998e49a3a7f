//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available —
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // YouTube Data API
  pub api_base_url: String,
  pub search_max_results: u32,

  /// Curated category titles; each one doubles as a remote search term.
  pub categories: Vec<String>,

  // Search input
  pub debounce_ms: u64,

  // Daily learning reminder
  pub reminder_title: String,
  pub reminder_body: String,
  pub default_reminder_time: String,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
