use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Three-pane studio layout
pub struct AppLayout {
    pub chat_area: Rect,
    pub versions_area: Rect,
    pub question_area: Rect,
    pub input_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Create the studio layout:
    /// - Chat: 30% width (left)
    /// - Version stack: 30% width (centre)
    /// - Focused question: 40% width (right)
    /// - Instruction input: 3 rows, full width
    /// - Status bar: bottom row
    pub fn new(area: Rect) -> Self {
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Panes (at least 3 rows)
                Constraint::Length(3), // Input box (bordered, 1 text row)
                Constraint::Length(1), // Status bar (1 row)
            ])
            .split(area);

        let horizontal_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(30),
                Constraint::Percentage(40),
            ])
            .split(vertical_chunks[0]);

        Self {
            chat_area: horizontal_chunks[0],
            versions_area: horizontal_chunks[1],
            question_area: horizontal_chunks[2],
            input_area: vertical_chunks[1],
            status_area: vertical_chunks[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_splits_correctly() {
        let area = Rect::new(0, 0, 100, 30);
        let layout = AppLayout::new(area);

        // Status bar is the bottom row, input box sits above it
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.status_area.y, 29);
        assert_eq!(layout.input_area.height, 3);
        assert_eq!(layout.input_area.y, 26);

        // Panes share the remaining rows
        assert_eq!(layout.chat_area.height, 26);
        assert_eq!(layout.versions_area.height, 26);
        assert_eq!(layout.question_area.height, 26);

        assert_eq!(layout.chat_area.width, 30);
        assert_eq!(layout.versions_area.width, 30);
        assert_eq!(layout.question_area.width, 40);
        assert_eq!(layout.versions_area.x, 30);
    }

    #[test]
    fn test_layout_minimum_height() {
        let area = Rect::new(0, 0, 100, 7);
        let layout = AppLayout::new(area);

        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.input_area.height, 3);
        assert_eq!(layout.chat_area.height, 3);
    }
}
