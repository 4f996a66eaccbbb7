use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::Config;
use crate::store::ListSummary;
use crate::tui::widgets::color::parse_color;

/// Lists with their progress; the active list is highlighted
pub fn render_list_sidebar(f: &mut Frame, area: Rect, summaries: &[ListSummary], config: &Config) {
    let fg_color = parse_color(&config.theme.fg);
    let bg_color = parse_color(&config.theme.bg);
    let highlight_bg = parse_color(&config.theme.highlight_bg);
    let highlight_fg = parse_color(&config.theme.highlight_fg);
    let max_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = summaries
        .iter()
        .map(|summary| {
            let counts = format!(" {}/{}", summary.completed_count, summary.total_count);
            let name_width = max_width.saturating_sub(counts.chars().count());
            let mut name = summary.name.clone();
            if name.chars().count() > name_width {
                name = name.chars().take(name_width.saturating_sub(1)).collect::<String>() + "…";
            }
            ListItem::new(Line::from(vec![
                Span::raw(name),
                Span::styled(counts, Style::default().add_modifier(Modifier::DIM)),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(summaries.iter().position(|summary| summary.active));

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Lists ({})", summaries.len())),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    f.render_stateful_widget(list, area, &mut state);
}
