use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, Screen};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('g') {
    if matches!(app.screen, Screen::Home | Screen::Search) {
      app.screen = Screen::Settings;
    }
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('o') {
    if app.screen == Screen::Search {
      app.sort_key = app.sort_key.next();
      app.recompute_results();
    }
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
    if app.player.is_playing() {
      app.player.stop().await.context("Failed to stop playback")?;
    }
    return Ok(());
  }

  match app.screen {
    Screen::Login => handle_login_key(app, key),
    Screen::Home => handle_home_key(app, key),
    Screen::Search => handle_search_key(app, key),
    Screen::Details => handle_details_key(app, key).await.context("Failed to handle details key event")?,
    Screen::Settings => handle_settings_key(app, key),
  }
  Ok(())
}

fn handle_login_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => app.login(),
    KeyCode::Esc => app.should_quit = true,
    _ => {}
  }
}

fn handle_home_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    KeyCode::Down => {
      let count = app.narrowed_home().len();
      if count > 0 {
        let i = app.home_state.selected().map_or(0, |i| (i + 1) % count);
        app.home_state.select(Some(i));
      }
    }
    KeyCode::Up => {
      let count = app.narrowed_home().len();
      if count > 0 {
        let i = app.home_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
        app.home_state.select(Some(i));
      }
    }
    KeyCode::Enter => {
      // "Show more": jump to the search view seeded with this category.
      let narrowed = app.narrowed_home();
      if let Some(i) = app.home_state.selected()
        && let Some(category) = narrowed.get(i)
      {
        app.jump_to_category(category.title.clone());
      }
    }
    KeyCode::Tab => {
      app.open_search();
    }
    KeyCode::Esc => {
      if !app.input.is_empty() {
        app.input.clear();
        app.cursor_position = 0;
        app.input_scroll = 0;
      } else {
        app.should_quit = true;
      }
    }
    _ => {}
  }
}

fn handle_search_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
      app.note_search_input();
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        app.note_search_input();
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        app.note_search_input();
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    KeyCode::Down => {
      let count = app.results.len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| (i + 1) % count);
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Up => {
      let count = app.results.len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Enter => {
      app.open_details();
    }
    KeyCode::Tab => {
      app.input.clear();
      app.cursor_position = 0;
      app.input_scroll = 0;
      app.debouncer.cancel();
      app.screen = Screen::Home;
    }
    KeyCode::Esc => {
      if !app.input.is_empty() {
        // Clear request: reset and refetch with the empty query immediately.
        app.open_search();
      } else {
        app.screen = Screen::Home;
      }
    }
    _ => {}
  }
}

async fn handle_details_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  match key.code {
    KeyCode::Enter => {
      app.play_selected().await;
    }
    KeyCode::Char(' ') => {
      if app.player.is_playing()
        && let Err(e) = app.player.toggle_pause().await
      {
        app.set_error(format!("Pause error: {}", e));
      }
    }
    KeyCode::Esc => {
      app.close_details().await;
    }
    _ => {}
  }
  Ok(())
}

fn handle_settings_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Char(' ') => app.toggle_reminders(),
    KeyCode::Up => app.adjust_reminder_hour(1),
    KeyCode::Down => app.adjust_reminder_hour(-1),
    KeyCode::Right => app.adjust_reminder_minute(5),
    KeyCode::Left => app.adjust_reminder_minute(-5),
    KeyCode::Esc => app.screen = Screen::Home,
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0); // 'a'
    assert_eq!(char_to_byte_index(s, 1), 1); // 'é' starts at byte 1
    assert_eq!(char_to_byte_index(s, 2), 3); // '日' starts at byte 3
    assert_eq!(char_to_byte_index(s, 3), 6); // past end
  }

  #[test]
  fn char_to_byte_empty() {
    assert_eq!(char_to_byte_index("", 0), 0);
    assert_eq!(char_to_byte_index("", 5), 0);
  }
}
