use std::time::{SystemTime, UNIX_EPOCH};

use ratatui::{
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::app::ui::theme;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Everything the header shows, gathered before drawing
#[derive(Debug, Clone, Default)]
pub struct HeaderInfo<'a> {
    pub server: &'a str,
    pub loaded: bool,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub filter: Option<char>,
    pub busy: bool,
    pub now_playing: Option<String>,
}

/// Page indicator with arrows only where navigation is possible.
/// Hidden until a library is loaded.
pub fn page_label(info: &HeaderInfo<'_>) -> Option<String> {
    if !info.loaded {
        return None;
    }
    let prev = if info.has_prev { "◀ " } else { "  " };
    let next = if info.has_next { " ▶" } else { "  " };
    Some(format!(
        "{}Page {}/{}{}",
        prev, info.current_page, info.total_pages, next
    ))
}

fn spinner_frame() -> &'static str {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    SPINNER_FRAMES[(millis / 100) as usize % SPINNER_FRAMES.len()]
}

pub fn create_top_box<'a>(info: &HeaderInfo<'a>) -> Paragraph<'a> {
    let mut spans = vec![
        Span::styled(" ", Style::default()),
        Span::styled(info.server.to_string(), Style::default().fg(theme::TEXT_DIM)),
    ];

    if let Some(label) = page_label(info) {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(label, Style::default().fg(theme::TEXT)));
    }

    if let Some(letter) = info.filter {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(
            format!("Filter: {}", letter),
            Style::default().fg(theme::ACCENT).bold(),
        ));
    }

    if info.busy {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(spinner_frame(), Style::default().fg(theme::ACCENT)));
    }

    if let Some(title) = &info.now_playing {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled("▶ ", Style::default().fg(theme::PLAYING)));
        spans.push(Span::styled(title.clone(), Style::default().fg(theme::TEXT).bold()));
    }

    Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::BORDER))
            .title(Line::from(" mulise ").fg(theme::BORDER_TITLE)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_label_hidden_before_load() {
        let info = HeaderInfo {
            current_page: 1,
            total_pages: 1,
            ..Default::default()
        };
        assert_eq!(page_label(&info), None);
    }

    #[test]
    fn test_page_label_arrows_follow_navigation() {
        let info = HeaderInfo {
            loaded: true,
            current_page: 1,
            total_pages: 3,
            has_next: true,
            ..Default::default()
        };
        assert_eq!(page_label(&info).as_deref(), Some("  Page 1/3 ▶"));

        let last = HeaderInfo {
            current_page: 3,
            has_prev: true,
            has_next: false,
            ..info
        };
        assert_eq!(page_label(&last).as_deref(), Some("◀ Page 3/3  "));
    }
}
