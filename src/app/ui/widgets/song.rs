use ratatui::{
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::app::song::{Album, Song};
use crate::app::ui::theme;

/// Second detail line: year, format and bitrate, whichever are known
pub fn technical_summary(song: &Song) -> String {
    let mut parts = Vec::new();
    if song.release_year > 0 {
        parts.push(song.release_year.to_string());
    }
    if !song.format.is_empty() {
        parts.push(song.format.to_uppercase());
    }
    if song.bitrate > 0 {
        parts.push(format!("{} kbps", song.bitrate));
    }
    if song.file_size > 0 {
        parts.push(format!("{:.1} MiB", song.file_size as f64 / (1024.0 * 1024.0)));
    }
    if song.explicit {
        parts.push("explicit".to_string());
    }
    parts.join(" · ")
}

/// Play counts and loudness, whichever the server reported
pub fn listening_summary(song: &Song) -> String {
    let mut parts = Vec::new();
    if song.play_count > 0 {
        parts.push(format!("{} plays", song.play_count));
    }
    if song.lastfm_playcount > 0 {
        parts.push(format!("{} last.fm", song.lastfm_playcount));
    }
    if song.loudness != 0.0 {
        parts.push(format!("{:.1} LUFS, peak {:.2}", song.loudness, song.peak));
    }
    parts.join(" · ")
}

/// Album artist followed by any other credited artists
fn album_credits(album: &Album) -> String {
    let mut names = vec![album.album_artist.as_str()];
    names.extend(
        album
            .artists
            .iter()
            .map(String::as_str)
            .filter(|name| *name != album.album_artist),
    );
    names.join(", ")
}

/// Details of the selected track, or of the focused album when no track is
/// selected
pub fn create_song_widget<'a>(
    song: Option<&Song>,
    album: Option<(&Album, String)>,
) -> Paragraph<'a> {
    let lines = match (song, album) {
        (Some(song), _) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    song.title.clone(),
                    Style::default().fg(theme::TEXT).bold(),
                )),
                Line::from(Span::styled(song.artists(), Style::default().fg(theme::ACCENT))),
                Line::from(Span::styled(
                    technical_summary(song),
                    Style::default().fg(theme::TEXT_DIM),
                )),
            ];
            let listening = listening_summary(song);
            if !listening.is_empty() {
                lines.push(Line::from(Span::styled(
                    listening,
                    Style::default().fg(theme::TEXT_DIM),
                )));
            }
            let tags: Vec<&str> = song
                .genres
                .iter()
                .chain(&song.lastfm_tags)
                .map(String::as_str)
                .collect();
            if !tags.is_empty() {
                lines.push(Line::from(Span::styled(
                    tags.join(", "),
                    Style::default().fg(theme::TEXT_DIM).italic(),
                )));
            }
            lines
        }
        (None, Some((album, duration))) => {
            let mut header = vec![Span::styled(
                album.name.clone(),
                Style::default().fg(theme::ALBUM).bold(),
            )];
            if album.release_year > 0 {
                header.push(Span::styled(
                    format!(" ({})", album.release_year),
                    Style::default().fg(theme::TEXT_DIM),
                ));
            }
            let mut stats = format!("{} tracks · {}", album.songs.len(), duration);
            if album.play_count > 0 {
                stats.push_str(&format!(" · {} plays", album.play_count));
            }
            vec![
                Line::from(header),
                Line::from(Span::styled(album_credits(album), Style::default().fg(theme::ACCENT))),
                Line::from(Span::styled(stats, Style::default().fg(theme::TEXT_DIM))),
            ]
        }
        (None, None) => Vec::new(),
    };

    Paragraph::new(lines).centered().block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::BORDER)),
    )
}
