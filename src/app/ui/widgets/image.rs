use image::imageops::FilterType;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Style, Stylize},
    widgets::Paragraph,
};
use ratatui_image::{Resize, StatefulImage};

use crate::app::app::CoverImage;
use crate::app::ui::rendering::utils::{center_area, center_image};

/// Draw the focused album's cover, or a one-line placeholder
pub fn render_cover_widget(
    frame: &mut Frame<'_>,
    cover: Option<&mut CoverImage>,
    image_area: Rect,
    loading: bool,
) {
    if let Some(protocol) = cover.and_then(|c| c.protocol.as_mut()) {
        let resize = Resize::Scale(Some(FilterType::Lanczos3));
        let img_rect = protocol.size_for(resize.clone(), image_area);
        let centered_area = center_image(img_rect, image_area);

        let image = StatefulImage::default().resize(resize);
        frame.render_stateful_widget(image, centered_area, protocol);
        return;
    }

    let text = if loading { "Loading cover" } else { "No album art" };
    let placeholder_area = center_area(
        image_area,
        Constraint::Length(text.len() as u16),
        Constraint::Length(1),
    );
    frame.render_widget(
        Paragraph::new(text).style(Style::default().dark_gray()),
        placeholder_area,
    );
}
