use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Scrollbar, ScrollbarOrientation, ScrollbarState,
};

use crate::Config;
use crate::tui::app::Row;
use crate::tui::widgets::color::parse_color;

pub fn render_task_list(
    f: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[Row],
    list_state: &mut ListState,
    config: &Config,
) {
    let fg_color = parse_color(&config.theme.fg);
    let bg_color = parse_color(&config.theme.bg);
    let highlight_bg = parse_color(&config.theme.highlight_bg);
    let highlight_fg = parse_color(&config.theme.highlight_fg);
    let max_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = rows.iter().map(|row| row_item(row, max_width, config)).collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    f.render_stateful_widget(list, area, list_state);

    // Scrollbar only when rows overflow the pane
    let inner_height = area.height.saturating_sub(2) as usize;
    if rows.len() > inner_height {
        let mut scrollbar_state =
            ScrollbarState::new(rows.len()).position(list_state.selected().unwrap_or(0));
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn row_item<'a>(row: &Row, max_width: usize, config: &Config) -> ListItem<'a> {
    let indent = "  ".repeat(row.depth);
    let fold = match (row.child_count, row.expanded) {
        (0, _) => "  ",
        (_, true) => "▾ ",
        (_, false) => "▸ ",
    };
    let check = if row.completed { "✓ " } else { "○ " };
    let subtasks = if row.child_count > 0 && !row.expanded {
        format!(" (+{})", row.child_count)
    } else {
        String::new()
    };
    let suffix = format!("{}  {}", subtasks, row.time);

    let prefix_len = indent.chars().count() + 6; // fold + check + dot
    let content_width = max_width.saturating_sub(prefix_len + suffix.chars().count());
    let mut content = row.content.clone();
    if content.chars().count() > content_width {
        content = content.chars().take(content_width.saturating_sub(1)).collect::<String>() + "…";
    }

    let content_style = if row.completed {
        Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
    } else {
        Style::default()
    };
    let dot_color = parse_color(config.theme.category_color(row.category));

    ListItem::new(Line::from(vec![
        Span::raw(indent),
        Span::raw(fold),
        Span::raw(check),
        Span::styled("● ", Style::default().fg(dot_color)),
        Span::styled(content, content_style),
        Span::styled(suffix, Style::default().add_modifier(Modifier::DIM)),
    ]))
}
