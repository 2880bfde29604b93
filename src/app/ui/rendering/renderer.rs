use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::app::app::{LoadState, MessageType, StatusMessage};
use crate::app::ui::rendering::utils::{center_area, truncate_by_width};
use crate::app::ui::theme;
use crate::app::ui::views::library::render_library_view;
use crate::app::ui::widgets::create_top_box;
use crate::app::ui::widgets::top_box::HeaderInfo;

/// Placeholder shown until the first successful library load
fn render_not_loaded(frame: &mut Frame, load_state: &LoadState, area: Rect) {
    let (text, color) = match load_state {
        LoadState::NotLoaded => (
            "Library not loaded. Press r to load.".to_string(),
            theme::TEXT_DIM,
        ),
        LoadState::Loading => ("Loading library…".to_string(), theme::TEXT_DIM),
        LoadState::Failed(message) => (format!("{}. Press r to retry.", message), theme::ERROR),
        LoadState::Loaded => (String::new(), theme::TEXT_DIM),
    };
    let width = (text.width() as u16).min(area.width);
    let text_area = center_area(area, Constraint::Length(width), Constraint::Length(1));
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(color)),
        text_area,
    );
}

fn render_status_line(frame: &mut Frame, status: Option<&StatusMessage>, area: Rect) {
    let Some(status) = status else {
        let hint = " q quit · r reload · Tab panel · h/l page · A-Z filter · Esc clear · s stop";
        frame.render_widget(
            Paragraph::new(truncate_by_width(hint, area.width as usize))
                .style(Style::default().fg(theme::TEXT_DIM)),
            area,
        );
        return;
    };
    let color = match status.kind {
        MessageType::Info => theme::TEXT,
        MessageType::Error => theme::ERROR,
    };
    let text = truncate_by_width(&format!(" {}", status.text), area.width as usize);
    frame.render_widget(Paragraph::new(text).style(Style::default().fg(color)), area);
}

/// Render config warnings popup centered on screen
fn render_config_warnings_popup(frame: &mut Frame, warnings: &[String]) {
    let area = frame.area();

    let title = " Unknown Config Options ";
    let footer = "Press any key to close";

    let max_content_width = warnings
        .iter()
        .map(|w| w.width())
        .max()
        .unwrap_or(20)
        .max(title.width())
        .max(footer.width());

    // Content, 2 columns of padding and the borders on each side
    let popup_width = (max_content_width + 6).min(area.width.saturating_sub(4) as usize) as u16;
    let text_width = popup_width.saturating_sub(4) as usize;

    // Warnings, blank lines around them, footer and borders
    let popup_height = (warnings.len() + 5).min(area.height.saturating_sub(4) as usize) as u16;

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let mut lines: Vec<Line> = vec![Line::from("")];
    for warning in warnings {
        let display_warning = if warning.width() > text_width {
            format!("{}...", truncate_by_width(warning, text_width.saturating_sub(3)))
        } else {
            warning.clone()
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", display_warning),
            Style::default().fg(theme::TEXT),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(footer, Style::default().fg(theme::ACCENT))).centered());

    let popup_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::BORDER_FOCUSED))
        .title(Line::from(title).fg(theme::BORDER_TITLE))
        .style(Style::default().bg(ratatui::style::Color::Black));

    frame.render_widget(
        Paragraph::new(lines)
            .block(popup_block)
            .alignment(Alignment::Left),
        popup_area,
    );
}

/// Renders the user interface.
pub fn render(frame: &mut Frame<'_>, app: &mut App) {
    let [header_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let now_playing = app
        .playback
        .now_playing()
        .map(|playing| (playing.song_hash.clone(), playing.content_type.clone()));
    let now_playing_hash = now_playing.as_ref().map(|(hash, _)| hash.clone());
    let now_playing_title = now_playing.map(|(hash, content_type)| {
        let title = app
            .store
            .song_by_hash(&hash)
            .map(|song| format!("{} · {}", song.title, song.artists()))
            .unwrap_or(hash);
        match content_type {
            Some(content_type) => format!("{} [{}]", title, content_type),
            None => title,
        }
    });

    let header = HeaderInfo {
        server: &app.config.server.base_url,
        loaded: app.store.is_loaded(),
        current_page: app.pager.current_page(),
        total_pages: app.pager.total_pages(),
        has_prev: app.pager.has_prev_page(),
        has_next: app.pager.has_next_page(),
        filter: app.pager.filter(),
        busy: app.is_busy(),
        now_playing: now_playing_title,
    };
    frame.render_widget(create_top_box(&header), header_area);

    if app.store.is_loaded() {
        render_library_view(frame, app, body_area, now_playing_hash.as_deref());
    } else {
        render_not_loaded(frame, &app.load_state, body_area);
    }

    render_status_line(frame, app.current_status(), status_area);

    if app.show_config_warnings_popup && !app.config_warnings.is_empty() {
        render_config_warnings_popup(frame, &app.config_warnings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::api::ApiClient;
    use crate::app::api::transport::TransportResponse;
    use crate::app::api::transport::mock::MockTransport;
    use crate::app::config::Config;
    use crate::app::constructor::AppConstructor;
    use ratatui::{Terminal, backend::TestBackend};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_placeholder_before_load_hides_pages() {
        let transport = MockTransport::new(|_, _, _| Ok(TransportResponse::status(200)));
        let mut app = App::new_with_config(
            Config::default(),
            ApiClient::new(transport, "token"),
            Vec::new(),
        );
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();

        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Library not loaded"));
        assert!(!text.contains("Page"));
    }

    #[test]
    fn test_warnings_popup_lists_warnings() {
        let transport = MockTransport::new(|_, _, _| Ok(TransportResponse::status(200)));
        let mut app = App::new_with_config(
            Config::default(),
            ApiClient::new(transport, "token"),
            vec!["Unknown config section: [sever]".to_string()],
        );
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();

        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        assert!(buffer_text(&terminal).contains("Unknown config section: [sever]"));
    }
}
