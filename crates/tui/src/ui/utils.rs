use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Helper function to create a centered rectangle within a given area.
///
/// # Arguments
///
/// * `percent_x` - Width of the rectangle as a percentage of the container
/// * `percent_y` - Height of the rectangle as a percentage of the container
/// * `r` - The container rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);
    area[1]
}

/// Clamp a scroll offset so the last page of `line_count` lines stays in view.
pub fn clamp_scroll(offset: u16, line_count: usize, viewport_height: u16) -> u16 {
    let max = line_count.saturating_sub(viewport_height as usize);
    offset.min(u16::try_from(max).unwrap_or(u16::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_inside_container() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 50, outer);
        assert_eq!(inner.width, 50);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 25);
    }

    #[test]
    fn scroll_never_passes_the_last_page() {
        assert_eq!(clamp_scroll(50, 30, 10), 20);
        assert_eq!(clamp_scroll(5, 3, 10), 0);
        assert_eq!(clamp_scroll(4, 30, 10), 4);
    }
}
