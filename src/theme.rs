use ratatui::style::Color;

/// A named UI color scheme. Cycled with Ctrl+T and persisted by name.
pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub status: Color,
  pub error: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 3] = [
  // The app's signature palette: space-cadet ink on paper.
  Theme {
    name: "paper",
    bg: Color::Rgb(0xed, 0xf2, 0xf4),
    fg: Color::Rgb(0x2b, 0x2d, 0x42),
    accent: Color::Rgb(0x2b, 0x2d, 0x42),
    muted: Color::Rgb(0x8d, 0x99, 0xae),
    border: Color::Rgb(0x8d, 0x99, 0xae),
    status: Color::Rgb(0x2b, 0x2d, 0x42),
    error: Color::Rgb(0xd9, 0x04, 0x29),
    highlight_fg: Color::Rgb(0xed, 0xf2, 0xf4),
    highlight_bg: Color::Rgb(0x2b, 0x2d, 0x42),
    stripe_bg: Color::Rgb(0xe1, 0xe4, 0xe8),
    key_fg: Color::Rgb(0xff, 0xff, 0xff),
    key_bg: Color::Rgb(0x8d, 0x99, 0xae),
  },
  Theme {
    name: "cadet",
    bg: Color::Rgb(0x2b, 0x2d, 0x42),
    fg: Color::Rgb(0xed, 0xf2, 0xf4),
    accent: Color::Rgb(0xef, 0x23, 0x3c),
    muted: Color::Rgb(0x8d, 0x99, 0xae),
    border: Color::Rgb(0x8d, 0x99, 0xae),
    status: Color::Rgb(0xed, 0xf2, 0xf4),
    error: Color::Rgb(0xef, 0x23, 0x3c),
    highlight_fg: Color::Rgb(0x2b, 0x2d, 0x42),
    highlight_bg: Color::Rgb(0xed, 0xf2, 0xf4),
    stripe_bg: Color::Rgb(0x35, 0x38, 0x52),
    key_fg: Color::Rgb(0x2b, 0x2d, 0x42),
    key_bg: Color::Rgb(0x8d, 0x99, 0xae),
  },
  Theme {
    name: "mono",
    bg: Color::Black,
    fg: Color::Gray,
    accent: Color::White,
    muted: Color::DarkGray,
    border: Color::DarkGray,
    status: Color::Gray,
    error: Color::Red,
    highlight_fg: Color::Black,
    highlight_bg: Color::Gray,
    stripe_bg: Color::Black,
    key_fg: Color::Black,
    key_bg: Color::DarkGray,
  },
];
