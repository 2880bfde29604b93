use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
};

use crate::app::App;
use crate::app::app::PanelFocus;
use crate::app::navigation::DisplayItem;
use crate::app::song::{Artist, LibrarySnapshot, Song};
use crate::app::ui::rendering::utils::{spread_line, truncate_by_width};
use crate::app::ui::theme;
use crate::app::ui::widgets::{create_song_widget, render_cover_widget};

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        theme::BORDER_FOCUSED
    } else {
        theme::BORDER
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Line::from(title).fg(theme::BORDER_TITLE))
        .border_style(Style::default().fg(border))
}

fn highlight(focused: bool) -> Style {
    if focused {
        Style::default().fg(theme::SELECTED_TEXT).bg(theme::BORDER_FOCUSED)
    } else {
        Style::default()
    }
}

fn display_row(
    snapshot: &LibrarySnapshot,
    item: &DisplayItem,
    width: usize,
    now_playing: Option<&str>,
) -> ListItem<'static> {
    match item {
        DisplayItem::Album { hash } => {
            let Some(album) = snapshot.album_by_hash(hash) else {
                return ListItem::new("");
            };
            let duration = Song::format_duration(snapshot.album_duration(album));
            let text = spread_line(
                &format!(" {} ", album.name),
                &format!(" {}", duration),
                width,
                '-',
            );
            ListItem::new(Line::from(text).style(Style::default().fg(theme::ALBUM)))
        }
        DisplayItem::Song { hash, .. } => {
            let Some(song) = snapshot.song_by_hash(hash) else {
                return ListItem::new("");
            };
            let marker = if now_playing == Some(hash.as_str()) { "▶" } else { " " };
            let left = format!(" {} {:>2} {}", marker, song.track_number, song.title);
            let text = spread_line(&left, &Song::format_duration(song.duration()), width, ' ');
            let color = if marker == "▶" { theme::PLAYING } else { theme::TEXT };
            ListItem::new(Line::from(text).style(Style::default().fg(color)))
        }
    }
}

/// Albums panel title: artist name, song count and genres
fn artist_title(artist: &Artist) -> String {
    let mut title = format!(" {} · {} songs", artist.name, artist.songs.len());
    if artist.play_count > 0 {
        title.push_str(&format!(" · {} plays", artist.play_count));
    }
    if !artist.genres.is_empty() {
        title.push_str(&format!(" · {}", artist.genres.join(", ")));
    }
    title.push(' ');
    title
}

/// Artists of the current page, the selected artist's albums and tracks,
/// and the focused album's cover with details
pub fn render_library_view(
    frame: &mut Frame<'_>,
    app: &mut App,
    area: Rect,
    now_playing: Option<&str>,
) {
    let Some(snapshot) = app.snapshot() else {
        return;
    };
    let display_items = app.display_list();
    let selected_item = app.selected_display_item();
    let cover_loading = app
        .focused_cover_hash()
        .is_some_and(|hash| app.covers_in_flight.contains(&hash));

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
    let [artists_area, albums_area] =
        Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).areas(left);
    let [image_area, info_area] =
        Layout::vertical([Constraint::Percentage(100), Constraint::Length(6)]).areas(right);

    let artists_focused = app.panel_focus == PanelFocus::Artists;
    let artists_title = format!(" Artists ({}) ", app.pager.filtered_len());
    let artist_width = artists_area.width.saturating_sub(4) as usize;
    let artists: Vec<ListItem> = app
        .pager
        .visible_artists(&snapshot)
        .iter()
        .map(|artist| ListItem::new(truncate_by_width(&artist.name, artist_width)))
        .collect();

    if artists.is_empty() {
        let message = match app.pager.filter() {
            Some(letter) => format!("No artists starting with {}", letter),
            None => "Library is empty".to_string(),
        };
        frame.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(theme::TEXT_DIM))
                .block(panel_block(artists_title, artists_focused)),
            artists_area,
        );
    } else {
        let list = List::new(artists)
            .block(panel_block(artists_title, artists_focused))
            .highlight_style(highlight(artists_focused));
        frame.render_stateful_widget(list, artists_area, &mut app.artist_list_state);
    }

    let albums_focused = app.panel_focus == PanelFocus::Albums;
    let albums_title = app
        .selected_artist_index()
        .and_then(|index| snapshot.artists().get(index))
        .map(artist_title)
        .unwrap_or_else(|| " Albums ".to_string());
    let album_width = albums_area.width.saturating_sub(4) as usize;
    let rows: Vec<ListItem> = display_items
        .iter()
        .map(|item| display_row(&snapshot, item, album_width, now_playing))
        .collect();
    let albums = List::new(rows)
        .block(panel_block(albums_title, albums_focused))
        .highlight_style(highlight(albums_focused));
    frame.render_stateful_widget(albums, albums_area, &mut app.album_list_state);

    render_cover_widget(frame, app.cover_image.as_mut(), image_area, cover_loading);

    let song = match &selected_item {
        Some(DisplayItem::Song { hash, .. }) => snapshot.song_by_hash(hash),
        _ => None,
    };
    let album = selected_item
        .as_ref()
        .and_then(|item| snapshot.album_by_hash(item.album_hash()))
        .map(|album| (album, Song::format_duration(snapshot.album_duration(album))));
    frame.render_widget(create_song_widget(song, album), info_area);
}
