use std::cmp::Reverse;
use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};
use futures::future;
use tracing::debug;

use crate::youtube::{VideoStats, YoutubeClient};

/// Normalized unit of searchable/displayable video metadata.
///
/// Built fresh from each remote query response; identity across lists is by
/// `id` equality only. `view_count`/`like_count` stay 0 until a detail view
/// backfills them from the statistics endpoint.
#[derive(Debug, Clone)]
pub struct VideoRecord {
  pub id: String,
  pub title: String,
  pub channel_name: String,
  pub description: String,
  /// ISO-8601 publish date as returned by the provider; absent or
  /// unparseable means "unknown recency".
  pub published_date: Option<String>,
  pub view_count: u64,
  pub like_count: u64,
  /// Absent ⇒ the UI renders a placeholder block.
  pub thumbnail_url: Option<String>,
}

/// A named grouping of videos; the title doubles as the remote search term.
#[derive(Debug, Clone)]
pub struct Category {
  pub id: String,
  pub title: String,
  pub records: Vec<VideoRecord>,
}

// --- Aggregation & dedup ---

/// Fetch every category concurrently and return them in term order.
///
/// Completion order is irrelevant: `join_all` keeps the input order. A term
/// with zero results (or a failed query, since the adapter fails open)
/// simply yields an empty category.
pub async fn load_catalog(client: YoutubeClient, terms: Vec<String>) -> Vec<Category> {
  let fetches = terms.iter().map(|term| client.search_category(term));
  let results = future::join_all(fetches).await;

  terms
    .into_iter()
    .zip(results)
    .enumerate()
    .map(|(i, (title, records))| Category { id: format!("c{}", i + 1), title, records: dedup_records(records) })
    .collect()
}

/// Remove records sharing an `id`, keeping the first occurrence.
pub fn dedup_records(records: Vec<VideoRecord>) -> Vec<VideoRecord> {
  let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
  records.into_iter().filter(|r| seen.insert(r.id.clone())).collect()
}

/// Backfill live statistics onto every copy of a record in the catalog.
pub fn apply_statistics(categories: &mut [Category], video_id: &str, stats: VideoStats) {
  for category in categories.iter_mut() {
    for record in category.records.iter_mut().filter(|r| r.id == video_id) {
      record.view_count = stats.view_count;
      record.like_count = stats.like_count;
    }
  }
}

// --- Search/filter ---

/// Whether a record matches a free-text query.
///
/// An empty (trimmed) query matches everything; otherwise the query must be
/// a case-insensitive substring of the title, the channel name, or the
/// owning category's title. Plain containment, no tokenizing or scoring.
pub fn record_matches(record: &VideoRecord, category_title: &str, query: &str) -> bool {
  let needle = query.trim().to_lowercase();
  if needle.is_empty() {
    return true;
  }
  record.title.to_lowercase().contains(&needle)
    || record.channel_name.to_lowercase().contains(&needle)
    || category_title.to_lowercase().contains(&needle)
}

/// Unified search view: flatten the catalog in term order, keep matching
/// records, then dedup across categories (first occurrence wins).
pub fn search_catalog(categories: &[Category], query: &str) -> Vec<VideoRecord> {
  let mut matches = Vec::new();
  for category in categories {
    for record in &category.records {
      if record_matches(record, &category.title, query) {
        matches.push(record.clone());
      }
    }
  }
  dedup_records(matches)
}

/// Home-screen narrowing: a category stays visible when its title matches
/// the query or any of its video titles does. A title-level match keeps the
/// whole section; otherwise only the matching videos remain.
pub fn narrow_categories(categories: &[Category], query: &str) -> Vec<Category> {
  let needle = query.trim().to_lowercase();
  if needle.is_empty() {
    return categories.to_vec();
  }
  categories
    .iter()
    .filter_map(|category| {
      if category.title.to_lowercase().contains(&needle) {
        return Some(category.clone());
      }
      let records: Vec<VideoRecord> =
        category.records.iter().filter(|r| r.title.to_lowercase().contains(&needle)).cloned().collect();
      if records.is_empty() { None } else { Some(Category { records, ..category.clone() }) }
    })
    .collect()
}

// --- Sort ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
  Latest,
  Oldest,
  Popular,
}

impl SortKey {
  pub const ALL: [SortKey; 3] = [SortKey::Latest, SortKey::Oldest, SortKey::Popular];

  pub fn label(self) -> &'static str {
    match self {
      SortKey::Latest => "Latest",
      SortKey::Oldest => "Oldest",
      SortKey::Popular => "Popular",
    }
  }

  pub fn next(self) -> Self {
    let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }
}

/// Epoch milliseconds for a record's publish date; 0 when absent or
/// unparseable, so unknown-recency records land at the oldest end.
pub fn published_timestamp(record: &VideoRecord) -> i64 {
  let Some(ref raw) = record.published_date else { return 0 };
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return dt.timestamp_millis();
  }
  // Bare dates ("2024-08-12") show up in older provider payloads.
  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    && let Some(dt) = date.and_hms_opt(0, 0, 0)
  {
    return dt.and_utc().timestamp_millis();
  }
  debug!(date = %raw, "unparseable publish date, treating as unknown");
  0
}

/// Stable, non-mutating sort. `Latest` puts unknown dates last, `Oldest`
/// first; `Popular` breaks view-count ties by input order.
pub fn sort_records(records: &[VideoRecord], key: SortKey) -> Vec<VideoRecord> {
  let mut sorted = records.to_vec();
  match key {
    SortKey::Latest => sorted.sort_by_key(|r| Reverse(published_timestamp(r))),
    SortKey::Oldest => sorted.sort_by_key(published_timestamp),
    SortKey::Popular => sorted.sort_by_key(|r| Reverse(r.view_count)),
  }
  sorted
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(id: &str, title: &str, channel: &str, date: Option<&str>, views: u64) -> VideoRecord {
    VideoRecord {
      id: id.to_string(),
      title: title.to_string(),
      channel_name: channel.to_string(),
      description: String::new(),
      published_date: date.map(str::to_string),
      view_count: views,
      like_count: 0,
      thumbnail_url: None,
    }
  }

  fn ids(records: &[VideoRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
  }

  // --- dedup_records ---

  #[test]
  fn dedup_keeps_first_occurrence() {
    let records = vec![
      record("a", "From React", "c1", None, 0),
      record("b", "From React", "c1", None, 0),
      record("b", "From Typescript", "c2", None, 0),
      record("c", "From Typescript", "c2", None, 0),
    ];
    let deduped = dedup_records(records);
    assert_eq!(ids(&deduped), vec!["a", "b", "c"]);
    // "b" kept from its first source
    assert_eq!(deduped[1].title, "From React");
  }

  #[test]
  fn dedup_without_duplicates_is_identity() {
    let records = vec![record("x", "", "", None, 0), record("y", "", "", None, 0)];
    assert_eq!(ids(&dedup_records(records)), vec!["x", "y"]);
  }

  // --- record_matches / search_catalog ---

  fn sample_catalog() -> Vec<Category> {
    vec![
      Category {
        id: "c1".to_string(),
        title: "React".to_string(),
        records: vec![record("a", "Hooks deep dive", "Fireship", None, 0), record("b", "State basics", "Codevolution", None, 0)],
      },
      Category {
        id: "c2".to_string(),
        title: "Typescript".to_string(),
        records: vec![record("b", "State basics", "Codevolution", None, 0), record("c", "Generics", "Matt Pocock", None, 0)],
      },
    ]
  }

  #[test]
  fn search_empty_query_returns_all_in_order() {
    let catalog = sample_catalog();
    assert_eq!(ids(&search_catalog(&catalog, "")), vec!["a", "b", "c"]);
    assert_eq!(ids(&search_catalog(&catalog, "   ")), vec!["a", "b", "c"]);
  }

  #[test]
  fn search_deduplicates_across_categories() {
    // Spec scenario: "React" yields [a, b], "Typescript" yields [b, c].
    let catalog = sample_catalog();
    let results = search_catalog(&catalog, "");
    assert_eq!(ids(&results), vec!["a", "b", "c"]);
  }

  #[test]
  fn search_is_idempotent() {
    let catalog = sample_catalog();
    let once = search_catalog(&catalog, "basics");
    let again: Vec<VideoRecord> =
      once.iter().filter(|r| record_matches(r, "", "basics")).cloned().collect();
    assert_eq!(ids(&once), ids(&dedup_records(again)));
  }

  #[test]
  fn search_matches_title_case_insensitively() {
    let catalog = sample_catalog();
    assert_eq!(ids(&search_catalog(&catalog, "HOOKS")), vec!["a"]);
  }

  #[test]
  fn search_matches_channel_name() {
    let catalog = sample_catalog();
    assert_eq!(ids(&search_catalog(&catalog, "pocock")), vec!["c"]);
  }

  #[test]
  fn search_matches_category_title() {
    // Matching a category title pulls in everything under it.
    let catalog = sample_catalog();
    assert_eq!(ids(&search_catalog(&catalog, "typescript")), vec!["b", "c"]);
  }

  #[test]
  fn search_trims_query_whitespace() {
    let catalog = sample_catalog();
    assert_eq!(ids(&search_catalog(&catalog, "  generics  ")), vec!["c"]);
  }

  #[test]
  fn search_no_match_is_empty() {
    let catalog = sample_catalog();
    assert!(search_catalog(&catalog, "quantum chromodynamics").is_empty());
  }

  // --- narrow_categories ---

  #[test]
  fn narrow_empty_query_keeps_everything() {
    let catalog = sample_catalog();
    let narrowed = narrow_categories(&catalog, "");
    assert_eq!(narrowed.len(), 2);
    assert_eq!(narrowed[0].records.len(), 2);
  }

  #[test]
  fn narrow_category_title_match_keeps_whole_section() {
    let catalog = sample_catalog();
    let narrowed = narrow_categories(&catalog, "react");
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].records.len(), 2);
  }

  #[test]
  fn narrow_video_title_match_keeps_only_matching_videos() {
    let catalog = sample_catalog();
    let narrowed = narrow_categories(&catalog, "generics");
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].title, "Typescript");
    assert_eq!(ids(&narrowed[0].records), vec!["c"]);
  }

  #[test]
  fn narrow_drops_categories_without_matches() {
    let catalog = sample_catalog();
    assert!(narrow_categories(&catalog, "no such thing").is_empty());
  }

  // --- published_timestamp ---

  #[test]
  fn timestamp_parses_rfc3339() {
    let r = record("a", "", "", Some("2024-08-12T10:30:00Z"), 0);
    assert!(published_timestamp(&r) > 0);
  }

  #[test]
  fn timestamp_parses_bare_date() {
    let r = record("a", "", "", Some("2024-08-12"), 0);
    assert!(published_timestamp(&r) > 0);
  }

  #[test]
  fn timestamp_unparseable_or_absent_is_zero() {
    assert_eq!(published_timestamp(&record("a", "", "", Some("12.08.2024"), 0)), 0);
    assert_eq!(published_timestamp(&record("a", "", "", None, 0)), 0);
  }

  // --- sort_records ---

  #[test]
  fn sort_latest_newest_first_unknown_last() {
    let records = vec![
      record("old", "", "", Some("2023-01-01T00:00:00Z"), 0),
      record("unknown", "", "", Some("not a date"), 0),
      record("new", "", "", Some("2024-06-01T00:00:00Z"), 0),
    ];
    assert_eq!(ids(&sort_records(&records, SortKey::Latest)), vec!["new", "old", "unknown"]);
  }

  #[test]
  fn sort_oldest_unknown_first() {
    let records = vec![
      record("old", "", "", Some("2023-01-01T00:00:00Z"), 0),
      record("unknown", "", "", None, 0),
      record("new", "", "", Some("2024-06-01T00:00:00Z"), 0),
    ];
    assert_eq!(ids(&sort_records(&records, SortKey::Oldest)), vec!["unknown", "old", "new"]);
  }

  #[test]
  fn sort_oldest_of_reverse_equals_reverse_of_latest() {
    // Holds whenever no two dates tie.
    let records = vec![
      record("a", "", "", Some("2022-03-01T00:00:00Z"), 0),
      record("b", "", "", Some("2024-01-15T00:00:00Z"), 0),
      record("c", "", "", Some("2023-07-20T00:00:00Z"), 0),
    ];
    let mut reversed = records.clone();
    reversed.reverse();
    let mut latest = sort_records(&records, SortKey::Latest);
    latest.reverse();
    assert_eq!(ids(&sort_records(&reversed, SortKey::Oldest)), ids(&latest));
  }

  #[test]
  fn sort_popular_descending_views() {
    let records =
      vec![record("a", "", "", None, 10), record("b", "", "", None, 500), record("c", "", "", None, 42)];
    assert_eq!(ids(&sort_records(&records, SortKey::Popular)), vec!["b", "c", "a"]);
  }

  #[test]
  fn sort_popular_ties_keep_input_order() {
    let records = vec![
      record("first", "", "", None, 7),
      record("second", "", "", None, 7),
      record("third", "", "", None, 7),
    ];
    assert_eq!(ids(&sort_records(&records, SortKey::Popular)), vec!["first", "second", "third"]);
  }

  #[test]
  fn sort_does_not_mutate_input() {
    let records = vec![record("b", "", "", None, 1), record("a", "", "", None, 9)];
    let _ = sort_records(&records, SortKey::Popular);
    assert_eq!(ids(&records), vec!["b", "a"]);
  }

  // --- apply_statistics ---

  #[test]
  fn apply_statistics_updates_every_copy() {
    let mut catalog = sample_catalog();
    apply_statistics(&mut catalog, "b", VideoStats { view_count: 1234, like_count: 56 });
    assert_eq!(catalog[0].records[1].view_count, 1234);
    assert_eq!(catalog[1].records[0].view_count, 1234);
    assert_eq!(catalog[1].records[0].like_count, 56);
    // Untouched records stay zeroed
    assert_eq!(catalog[0].records[0].view_count, 0);
  }

  // --- SortKey ---

  #[test]
  fn sort_key_cycles_through_all() {
    assert_eq!(SortKey::Latest.next(), SortKey::Oldest);
    assert_eq!(SortKey::Oldest.next(), SortKey::Popular);
    assert_eq!(SortKey::Popular.next(), SortKey::Latest);
  }
}
