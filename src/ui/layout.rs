//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Layer header on top, the bordered tree pane, and a status bar.
pub struct AppLayout {
    pub header_area: Rect,
    pub tree_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // layer header
                Constraint::Min(3),    // tree pane
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            header_area: chunks[0],
            tree_area: chunks[1],
            status_area: chunks[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_pane_takes_the_remaining_rows() {
        let layout = AppLayout::from_area(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.header_area, Rect::new(0, 0, 80, 1));
        assert_eq!(layout.tree_area, Rect::new(0, 1, 80, 22));
        assert_eq!(layout.status_area, Rect::new(0, 23, 80, 1));
    }
}
