use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, Screen};
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

/// Render an ISO date ("2024-08-12T10:30:00Z" or "2024-08-12") as "12.08.2024".
fn format_date(date: Option<&str>) -> String {
  let Some(date) = date else { return String::new() };
  let day_part = date.split('T').next().unwrap_or(date);
  let parts: Vec<&str> = day_part.split('-').collect();
  if parts.len() == 3 { format!("{}.{}.{}", parts[2], parts[1], parts[0]) } else { date.to_string() }
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let has_input = matches!(app.screen, Screen::Home | Screen::Search);
  if has_input {
    let [header_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
      Constraint::Length(1),
      Constraint::Min(3),
      Constraint::Length(1),
      Constraint::Length(3),
      Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, theme, header_area);
    render_main(frame, app, main_area);
    render_status(frame, app, status_area);
    render_input(frame, app, input_area);
    render_footer(frame, app, footer_area);
  } else {
    let [header_area, main_area, status_area, footer_area] =
      Layout::vertical([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)])
        .areas(frame.area());

    render_header(frame, theme, header_area);
    render_main(frame, app, main_area);
    render_status(frame, app, status_area);
    render_footer(frame, app, footer_area);
  }
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
  let left = Line::from(Span::styled(" ▶ edutube ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  match app.screen {
    Screen::Login => render_login(frame, app.theme(), area),
    Screen::Home => render_home(frame, app, area),
    Screen::Search => render_results(frame, app, area),
    Screen::Details => render_details(frame, app, area),
    Screen::Settings => render_settings(frame, app, area),
  }
}

fn render_login(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("▶  edutube", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Welcome to the best YouTube-based learning application.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("Press Enter to log in as guest.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled(
      "By continuing you agree with the Terms and Conditions and Privacy Policy.",
      Style::default().fg(theme.muted),
    )),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
    Block::bordered()
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.border)),
  );
  frame.render_widget(paragraph, area);
}

fn render_home(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let narrowed = app.narrowed_home();

  // Clamp selection to the narrowed range
  if narrowed.is_empty() {
    app.home_state.select(None);
  } else {
    let sel = app.home_state.selected().unwrap_or(0);
    app.home_state.select(Some(sel.min(narrowed.len() - 1)));
  }

  let inner_w = area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = narrowed
    .iter()
    .enumerate()
    .map(|(i, category)| {
      let is_selected = Some(i) == app.home_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let count = format!("{} videos", category.records.len());
      let title_max = inner_w.saturating_sub(count.chars().count() + 2);
      let title = truncate_str(&category.title, title_max);
      let gap = inner_w.saturating_sub(title.chars().count() + count.chars().count());

      let header = Line::from(vec![
        Span::styled(title, Style::default().fg(fg).add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(gap)),
        Span::styled(count, Style::default().fg(theme.muted)),
      ]);
      let preview: Vec<&str> = category.records.iter().take(3).map(|r| r.title.as_str()).collect();
      let preview_line =
        Line::from(Span::styled(truncate_str(&preview.join("  ·  "), inner_w), Style::default().fg(theme.muted)));

      ListItem::new(vec![header, preview_line]).bg(bg)
    })
    .collect();

  let query = app.input.trim();
  let title = if query.is_empty() {
    " Categories ".to_string()
  } else {
    format!(" Categories — {} found for \"{}\" ", narrowed.len(), query)
  };

  let list = List::new(items)
    .block(
      Block::bordered()
        .title(title)
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.home_state);
}

fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .results
    .iter()
    .enumerate()
    .map(|(i, record)| {
      let is_selected = Some(i) == app.list_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let date_str = format_date(record.published_date.as_deref());
      let right = match (!record.channel_name.is_empty(), !date_str.is_empty()) {
        (true, true) => format!("{}  {}", record.channel_name, date_str),
        (true, false) => record.channel_name.clone(),
        (false, true) => date_str.clone(),
        (false, false) => String::new(),
      };

      let line = if right.is_empty() {
        Line::from(Span::styled(truncate_str(&record.title, inner_w), Style::default().fg(fg)))
      } else {
        let right_w = right.chars().count();
        let title_max = inner_w.saturating_sub(right_w + 2);
        let title = truncate_str(&record.title, title_max);
        let gap = inner_w.saturating_sub(title.chars().count() + right_w);
        Line::from(vec![
          Span::styled(title, Style::default().fg(fg)),
          Span::raw(" ".repeat(gap)),
          Span::styled(right, Style::default().fg(theme.muted)),
        ])
      };

      ListItem::new(line).bg(bg)
    })
    .collect();

  let title = format!(" Results · Sort: {} ", app.sort_key.label());
  let list = List::new(items)
    .block(
      Block::bordered()
        .title(title)
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_details(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let [player_area, info_area] = Layout::vertical([Constraint::Percentage(40), Constraint::Min(5)]).areas(area);

  render_player_placeholder(frame, app, theme, player_area);

  let info_block = Block::bordered()
    .title(" Details ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border))
    .padding(Padding::horizontal(1));

  let Some(ref record) = app.selected else {
    frame.render_widget(info_block, info_area);
    return;
  };

  let inner_w = info_area.width.saturating_sub(4) as usize;
  let mut lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      truncate_str(&record.title, inner_w),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(vec![
      Span::styled("Channel   ", Style::default().fg(theme.muted)),
      Span::styled(truncate_str(&record.channel_name, inner_w.saturating_sub(10)), Style::default().fg(theme.fg)),
    ]),
  ];
  let date = format_date(record.published_date.as_deref());
  if !date.is_empty() {
    lines.push(Line::from(vec![
      Span::styled("Published ", Style::default().fg(theme.muted)),
      Span::styled(date, Style::default().fg(theme.fg)),
    ]));
  }
  lines.push(Line::from(""));

  let stats_line = match app.stats {
    Some(stats) => Line::from(vec![
      Span::styled("⛶ ", Style::default().fg(theme.accent)),
      Span::styled(format!("{} views", stats.view_count), Style::default().fg(theme.fg)),
      Span::raw("   "),
      Span::styled("♥ ", Style::default().fg(theme.accent)),
      Span::styled(format!("{} likes", stats.like_count), Style::default().fg(theme.fg)),
    ]),
    None => Line::from(Span::styled("Loading statistics…", Style::default().fg(theme.muted))),
  };
  lines.push(stats_line);
  lines.push(Line::from(""));

  if !record.description.is_empty() {
    lines.push(Line::from(Span::styled("Description", Style::default().fg(theme.muted))));
    lines.push(Line::from(Span::styled(record.description.clone(), Style::default().fg(theme.fg))));
  }

  let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(info_block);
  frame.render_widget(paragraph, info_area);
}

/// The playback surface: mpv owns its own window, so the terminal shows a
/// placeholder block (also what a record without a thumbnail gets).
fn render_player_placeholder(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
  let label = if app.player.is_playing() {
    if app.player.paused { "⏸  Paused" } else { "▶  Playing" }
  } else {
    "▶  Press Enter to play"
  };
  let mut lines = vec![Line::from(""), Line::from(Span::styled(label, Style::default().fg(theme.accent)))];
  if let Some(ref now_playing) = app.player.current {
    lines.push(Line::from(Span::styled(
      format!("{} — {}", now_playing.title, now_playing.channel),
      Style::default().fg(theme.fg),
    )));
  }
  if let Some(ref record) = app.selected {
    // No in-terminal thumbnail: a missing thumbnail_url and a present one
    // both render this placeholder, only the link target differs.
    let url = match record.thumbnail_url {
      Some(_) => format!("https://www.youtube.com/watch?v={}", record.id),
      None => format!("https://www.youtube.com/watch?v={} (no thumbnail)", record.id),
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(url, Style::default().fg(theme.muted).add_modifier(Modifier::UNDERLINED))));
  }
  let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
    Block::bordered()
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.border)),
  );
  frame.render_widget(paragraph, area);
}

fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (hour, minute) = app.reminder_time;
  let toggle = if app.reminders_enabled { "[x] Enabled" } else { "[ ] Disabled" };

  let account = if app.guest { "Guest" } else { "Not logged in" };
  let text = vec![
    Line::from(""),
    Line::from(vec![
      Span::styled("Logged in as  ", Style::default().fg(theme.muted)),
      Span::styled(account, Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
    ]),
    Line::from(""),
    Line::from(Span::styled("Learning reminders", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(vec![
      Span::styled(toggle, Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
      Span::styled("  (Space to toggle)", Style::default().fg(theme.muted)),
    ]),
    Line::from(""),
    Line::from(vec![
      Span::styled("Repeat everyday at:  ", Style::default().fg(theme.fg)),
      Span::styled(format!("{:02}:{:02}", hour, minute), Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
      Span::styled("  (↑/↓ hour, ←/→ minute)", Style::default().fg(theme.muted)),
    ]),
    Line::from(""),
    Line::from(Span::styled(
      "You will receive a friendly reminder to remember to study.",
      Style::default().fg(theme.muted),
    )),
  ];

  let paragraph = Paragraph::new(text).block(
    Block::bordered()
      .title(" Settings ")
      .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.border))
      .padding(Padding::horizontal(1)),
  );
  frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(info) = &app.info_message {
    (format!(" ℹ  {}", info), Style::default().fg(theme.muted))
  } else if app.screen == Screen::Search && app.debouncer.is_pending() {
    (" ⏳ Searching…".to_string(), Style::default().fg(theme.status))
  } else if app.screen == Screen::Search && !app.input.trim().is_empty() {
    (format!(" {} results for \"{}\"", app.results.len(), app.input.trim()), Style::default().fg(theme.muted))
  } else {
    match app.player.get_last_mpv_status() {
      Some(status) => (format!(" ♪ {}", status), Style::default().fg(theme.status)),
      None => (" Ready".to_string(), Style::default().fg(theme.muted)),
    }
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let title = match app.screen {
    Screen::Home => " Narrow categories ",
    _ => " Search videos ",
  };
  let input_block = Block::bordered()
    .title(title)
    .title_style(Style::default().fg(theme.accent))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.accent))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  let cursor_x = area.x + 2 + (cursor_col - app.input_scroll) as u16;
  frame.set_cursor_position((cursor_x, area.y + 1));
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let is_playing = app.player.is_playing();
  let keys: Vec<(&str, &str)> = match app.screen {
    Screen::Login => vec![("Enter", "Log in as guest"), ("^t", "Theme"), ("Esc", "Quit")],
    Screen::Home => vec![
      ("↓/↑", "Categories"),
      ("Enter", "Show more"),
      ("Tab", "Search"),
      ("^g", "Settings"),
      ("^t", "Theme"),
      ("Esc", "Quit"),
    ],
    Screen::Search => vec![
      ("↓/↑", "Navigate"),
      ("Enter", "Details"),
      ("^o", "Sort"),
      ("Tab", "Home"),
      ("Esc", "Clear/Back"),
    ],
    Screen::Details => {
      let mut k = vec![("Enter", "Play")];
      if is_playing {
        let pause_label = if app.player.paused { "Resume" } else { "Pause" };
        k.push(("Space", pause_label));
        k.push(("^s", "Stop"));
      }
      k.push(("Esc", "Back"));
      k
    }
    Screen::Settings => vec![("Space", "Toggle"), ("↑/↓", "Hour"), ("←/→", "Minute"), ("Esc", "Back")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
