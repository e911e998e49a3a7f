use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::catalog::VideoRecord;
use crate::constants::constants;

/// Live view/like counts for a single video.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoStats {
  pub view_count: u64,
  pub like_count: u64,
}

// --- Provider wire shapes ---
//
// These stay private: the rest of the app only ever sees `VideoRecord` and
// `VideoStats`, never the provider's field names.

#[derive(Debug, Deserialize)]
struct SearchResponse {
  #[serde(default)]
  items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
  id: SearchItemId,
  snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
  video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
  #[serde(default)]
  title: String,
  #[serde(default)]
  channel_title: String,
  #[serde(default)]
  description: String,
  published_at: Option<String>,
  thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
  high: Option<Thumbnail>,
  medium: Option<Thumbnail>,
  default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
  url: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
  #[serde(default)]
  items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
  statistics: Option<RawStatistics>,
}

/// The provider sends counts as strings ("12345") on most surfaces and as
/// bare numbers on some; accept both and let `count_value` normalize.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatistics {
  view_count: Option<Value>,
  like_count: Option<Value>,
}

/// Parse a string-or-int count; anything non-numeric or missing is 0.
fn count_value(value: Option<&Value>) -> u64 {
  match value {
    Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
    Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
    _ => 0,
  }
}

/// An id the provider doesn't recognize comes back with no items; that's
/// zeroed stats, not an error.
fn stats_from_response(body: VideosResponse) -> VideoStats {
  let Some(stats) = body.items.into_iter().next().and_then(|item| item.statistics) else {
    return VideoStats::default();
  };
  VideoStats {
    view_count: count_value(stats.view_count.as_ref()),
    like_count: count_value(stats.like_count.as_ref()),
  }
}

fn normalize_search_item(item: SearchItem) -> Option<VideoRecord> {
  // Non-video hits carry no videoId; skip them.
  let id = item.id.video_id?;
  let snippet = item.snippet.unwrap_or_default();
  let thumbnail_url = snippet.thumbnails.and_then(|t| t.high.or(t.medium).or(t.default)).map(|t| t.url);
  Some(VideoRecord {
    id,
    title: snippet.title,
    channel_name: snippet.channel_title,
    description: snippet.description,
    published_date: snippet.published_at,
    // Search results never carry counts; the detail view backfills them.
    view_count: 0,
    like_count: 0,
    thumbnail_url,
  })
}

// --- Client ---

/// Thin client over the YouTube Data API v3.
///
/// Both operations fail open: any transport or parse error is logged and
/// turned into an empty result, never raised to the caller.
#[derive(Clone)]
pub struct YoutubeClient {
  http: Client,
  api_key: String,
}

impl YoutubeClient {
  pub fn new(api_key: String) -> Self {
    Self { http: Client::new(), api_key }
  }

  /// Search videos for a query term. Counts are 0 at this stage.
  pub async fn search_category(&self, query: &str) -> Vec<VideoRecord> {
    match self.try_search(query).await {
      Ok(records) => records,
      Err(e) => {
        warn!(query = %query, err = %format!("{:#}", e), "search failed, returning no results");
        Vec::new()
      }
    }
  }

  /// Fetch live statistics for one video. Unknown ids and failures both
  /// yield zeroed stats.
  pub async fn fetch_statistics(&self, video_id: &str) -> VideoStats {
    match self.try_statistics(video_id).await {
      Ok(stats) => stats,
      Err(e) => {
        warn!(video_id = %video_id, err = %format!("{:#}", e), "statistics fetch failed, defaulting to zero");
        VideoStats::default()
      }
    }
  }

  async fn try_search(&self, query: &str) -> Result<Vec<VideoRecord>> {
    let url = format!("{}/search", constants().api_base_url);
    let max_results = constants().search_max_results.to_string();
    let resp = self
      .http
      .get(&url)
      .query(&[
        ("part", "snippet"),
        ("maxResults", max_results.as_str()),
        ("q", query),
        ("type", "video"),
        ("key", self.api_key.as_str()),
      ])
      .send()
      .await
      .context("search request failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("search returned {}. Possibly out of quota", resp.status()));
    }

    let body: SearchResponse = resp.json().await.context("malformed search response")?;
    Ok(body.items.into_iter().filter_map(normalize_search_item).collect())
  }

  async fn try_statistics(&self, video_id: &str) -> Result<VideoStats> {
    let url = format!("{}/videos", constants().api_base_url);
    let resp = self
      .http
      .get(&url)
      .query(&[("part", "statistics"), ("id", video_id), ("key", self.api_key.as_str())])
      .send()
      .await
      .context("statistics request failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("statistics returned {}. Possibly out of quota", resp.status()));
    }

    let body: VideosResponse = resp.json().await.context("malformed statistics response")?;
    Ok(stats_from_response(body))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- count_value ---

  #[test]
  fn count_value_parses_strings_and_numbers() {
    assert_eq!(count_value(Some(&Value::String("12345".to_string()))), 12345);
    assert_eq!(count_value(Some(&serde_json::json!(12345))), 12345);
  }

  #[test]
  fn count_value_junk_or_missing_is_zero() {
    assert_eq!(count_value(Some(&Value::String("junk".to_string()))), 0);
    assert_eq!(count_value(Some(&serde_json::json!(-3))), 0);
    assert_eq!(count_value(Some(&Value::Null)), 0);
    assert_eq!(count_value(None), 0);
  }

  // --- search normalization ---

  fn parse_items(json: &str) -> Vec<VideoRecord> {
    let resp: SearchResponse = serde_json::from_str(json).unwrap();
    resp.items.into_iter().filter_map(normalize_search_item).collect()
  }

  #[test]
  fn normalize_maps_snippet_fields() {
    let records = parse_items(
      r#"{
        "items": [{
          "id": {"videoId": "abc123"},
          "snippet": {
            "title": "Rust ownership explained",
            "channelTitle": "Let's Get Rusty",
            "description": "borrow checker",
            "publishedAt": "2024-08-12T10:30:00Z",
            "thumbnails": {"high": {"url": "https://i.ytimg.com/hi.jpg"}}
          }
        }]
      }"#,
    );
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.id, "abc123");
    assert_eq!(r.title, "Rust ownership explained");
    assert_eq!(r.channel_name, "Let's Get Rusty");
    assert_eq!(r.published_date.as_deref(), Some("2024-08-12T10:30:00Z"));
    assert_eq!(r.thumbnail_url.as_deref(), Some("https://i.ytimg.com/hi.jpg"));
    assert_eq!(r.view_count, 0);
    assert_eq!(r.like_count, 0);
  }

  #[test]
  fn normalize_thumbnail_falls_back_through_sizes() {
    let records = parse_items(
      r#"{
        "items": [{
          "id": {"videoId": "a"},
          "snippet": {"title": "t", "channelTitle": "c", "thumbnails": {"medium": {"url": "https://i.ytimg.com/m.jpg"}}}
        }]
      }"#,
    );
    assert_eq!(records[0].thumbnail_url.as_deref(), Some("https://i.ytimg.com/m.jpg"));
  }

  #[test]
  fn normalize_missing_thumbnails_is_none() {
    let records = parse_items(r#"{"items": [{"id": {"videoId": "a"}, "snippet": {"title": "t"}}]}"#);
    assert_eq!(records[0].thumbnail_url, None);
    assert_eq!(records[0].channel_name, "");
    assert_eq!(records[0].published_date, None);
  }

  #[test]
  fn normalize_skips_items_without_video_id() {
    let records = parse_items(
      r#"{"items": [
        {"id": {"channelId": "chan"}, "snippet": {"title": "not a video"}},
        {"id": {"videoId": "keep"}, "snippet": {"title": "a video"}}
      ]}"#,
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "keep");
  }

  #[test]
  fn empty_or_missing_items_parses_to_nothing() {
    assert!(parse_items(r#"{"items": []}"#).is_empty());
    assert!(parse_items(r#"{}"#).is_empty());
  }

  // --- statistics parsing ---

  fn parse_stats(json: &str) -> VideoStats {
    stats_from_response(serde_json::from_str(json).unwrap())
  }

  #[test]
  fn statistics_accepts_string_counts() {
    let stats = parse_stats(r#"{"items": [{"statistics": {"viewCount": "98765", "likeCount": "432"}}]}"#);
    assert_eq!(stats.view_count, 98765);
    assert_eq!(stats.like_count, 432);
  }

  #[test]
  fn statistics_missing_like_count_is_zero() {
    // likeCount is hidden on some videos
    let stats = parse_stats(r#"{"items": [{"statistics": {"viewCount": "10"}}]}"#);
    assert_eq!(stats.view_count, 10);
    assert_eq!(stats.like_count, 0);
  }

  #[test]
  fn statistics_unknown_id_is_zeroed_not_an_error() {
    let stats = parse_stats(r#"{"items": []}"#);
    assert_eq!(stats.view_count, 0);
    assert_eq!(stats.like_count, 0);
  }
}
