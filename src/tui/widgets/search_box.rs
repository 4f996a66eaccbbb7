use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::tui::widgets::color::parse_color;

pub fn render_search_box(
    f: &mut Frame,
    area: Rect,
    query: &str,
    editing: bool,
    match_count: usize,
    config: &Config,
) {
    let fg_color = parse_color(&config.theme.fg);
    let bg_color = parse_color(&config.theme.bg);
    let highlight_bg = parse_color(&config.theme.highlight_bg);

    let title = if query.is_empty() {
        "Search".to_string()
    } else {
        format!("Search ({} matches)", match_count)
    };
    let border_style = if editing {
        Style::default().fg(highlight_bg)
    } else {
        Style::default().fg(fg_color)
    };
    let text_style = if query.is_empty() && !editing {
        Style::default().fg(fg_color).add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(fg_color)
    };
    let shown = if query.is_empty() && !editing {
        format!("press {} to filter", config.key_bindings.search)
    } else {
        query.to_string()
    };

    let paragraph = Paragraph::new(shown).style(text_style.bg(bg_color)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(paragraph, area);

    if editing {
        let x = area.x + 1 + query.chars().count() as u16;
        let max_x = area.x + area.width.saturating_sub(2);
        f.set_cursor_position(Position::new(x.min(max_x), area.y + 1));
    }
}
