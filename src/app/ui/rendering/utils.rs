use ratatui::layout::{Constraint, Flex, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate a string to fit within the given display width, handling Unicode properly
pub fn truncate_by_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for ch in s.chars() {
        let char_width = ch.width().unwrap_or(0);
        if current_width + char_width > max_width {
            break;
        }
        result.push(ch);
        current_width += char_width;
    }

    result
}

/// `left`, a filler, then `right` flush against `width` columns.
/// `left` is truncated first when the line does not fit.
pub fn spread_line(left: &str, right: &str, width: usize, filler: char) -> String {
    let right_width = right.width();
    let max_left = width.saturating_sub(right_width + 1);
    let left = truncate_by_width(left, max_left);
    let fill = width.saturating_sub(left.width() + right_width);
    let mut line = left;
    line.extend(std::iter::repeat_n(filler, fill));
    line.push_str(right);
    line
}

/// Helper function to center a rect within another rect
pub fn center_area(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
    let [area] = Layout::horizontal([horizontal])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
    area
}

pub fn center_image(image_dimensions: Rect, available_area: Rect) -> Rect {
    let width = image_dimensions.width.min(available_area.width);
    let height = image_dimensions.height.min(available_area.height);
    Rect {
        x: available_area.x + (available_area.width - width) / 2,
        y: available_area.y + (available_area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_by_width_counts_wide_chars() {
        assert_eq!(truncate_by_width("hello", 3), "hel");
        assert_eq!(truncate_by_width("日本語", 5), "日本");
        assert_eq!(truncate_by_width("ok", 10), "ok");
    }

    #[test]
    fn test_spread_line_right_aligns() {
        assert_eq!(spread_line("Arrival", "38:01", 16, '-'), "Arrival----38:01");
        assert_eq!(spread_line("A very long album name", "1:00", 10, ' '), "A ver 1:00");
        assert_eq!(spread_line("x", "toolongtext", 4, ' '), "toolongtext");
    }

    #[test]
    fn test_center_image() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(center_image(Rect::new(0, 0, 10, 4), area), Rect::new(5, 3, 10, 4));
        assert_eq!(center_image(Rect::new(0, 0, 40, 40), area), area);
    }
}
