use ratatui::style::Color;

pub const BORDER: Color = Color::DarkGray;
pub const BORDER_FOCUSED: Color = Color::Cyan;
pub const BORDER_TITLE: Color = Color::Blue;
pub const TEXT: Color = Color::White;
pub const TEXT_DIM: Color = Color::DarkGray;
pub const ACCENT: Color = Color::Magenta;
pub const ALBUM: Color = Color::Yellow;
pub const TRACK_DURATION: Color = Color::Gray;
pub const SELECTED_TEXT: Color = Color::Black;
pub const ERROR: Color = Color::Red;
pub const PLAYING: Color = Color::Green;
