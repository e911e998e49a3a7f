use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Persisted user preferences. The store is treated as always-available:
/// loading falls back to defaults and saving swallows errors.
#[derive(Serialize, Deserialize, Default, Debug)]
pub struct Config {
  pub theme_name: Option<String>,
  pub reminders_enabled: Option<bool>,
  /// Daily reminder time as "HH:MM".
  pub reminder_time: Option<String>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "edutube") {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(config_file)
        && let Ok(config) = toml::from_str(&content)
      {
        return config;
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "edutube") {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }
}

/// Parse a "HH:MM" reminder time. Rejects out-of-range values.
pub fn parse_reminder_time(s: &str) -> Option<(u32, u32)> {
  let (h, m) = s.trim().split_once(':')?;
  let hour: u32 = h.parse().ok()?;
  let minute: u32 = m.parse().ok()?;
  if hour > 23 || minute > 59 {
    return None;
  }
  Some((hour, minute))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_reminder_time_valid() {
    assert_eq!(parse_reminder_time("18:00"), Some((18, 0)));
    assert_eq!(parse_reminder_time("07:45"), Some((7, 45)));
    assert_eq!(parse_reminder_time(" 0:05 "), Some((0, 5)));
  }

  #[test]
  fn parse_reminder_time_rejects_out_of_range() {
    assert_eq!(parse_reminder_time("24:00"), None);
    assert_eq!(parse_reminder_time("12:60"), None);
  }

  #[test]
  fn parse_reminder_time_rejects_malformed() {
    assert_eq!(parse_reminder_time("1800"), None);
    assert_eq!(parse_reminder_time("aa:bb"), None);
    assert_eq!(parse_reminder_time(""), None);
  }
}
