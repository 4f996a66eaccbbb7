use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub sidebar_area: Rect,
    pub main_area: Rect,
    pub search_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum inner dimensions: sidebar (20) + tasks (20) wide,
    /// one task row plus search box and status line high
    pub const MIN_WIDTH: u16 = 40;
    pub const MIN_HEIGHT: u16 = 8;

    pub fn calculate(size: Rect, sidebar_width_percent: u16) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        // Sidebar between 20 columns and 40%, leaving the task pane at least 20
        let requested = (inner_area.width * sidebar_width_percent) / 100;
        let sidebar_width = requested
            .max(20)
            .min((inner_area.width * 40) / 100)
            .min(inner_area.width.saturating_sub(20));

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Sidebar + tasks
                Constraint::Length(3), // Search box
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        let horizontal = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(1)])
            .split(vertical[0]);

        Self {
            inner_area,
            sidebar_area: horizontal[0],
            main_area: horizontal[1],
            search_area: vertical[1],
            status_area: vertical[2],
        }
    }
}
