use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Config;
use crate::models::Category;
use crate::tui::app::InputKind;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area_fixed_height;

pub fn input_title(kind: &InputKind) -> &'static str {
    match kind {
        InputKind::NewTask => "New Task",
        InputKind::NewSubtask { .. } => "New Subtask",
        InputKind::NewList => "New List",
        InputKind::RenameList { .. } => "Rename List",
    }
}

/// Single-line text entry; tasks also show the category picked with Tab
pub fn render_input_popup(
    f: &mut Frame,
    area: Rect,
    kind: &InputKind,
    draft: &str,
    category: Category,
    config: &Config,
) {
    let fg_color = parse_color(&config.theme.fg);
    let bg_color = parse_color(&config.theme.bg);
    let base = Style::default().fg(fg_color).bg(bg_color);
    let with_category = matches!(kind, InputKind::NewTask | InputKind::NewSubtask { .. });

    let popup = popup_area_fixed_height(area, 60, if with_category { 6 } else { 5 });
    f.render_widget(Clear, popup);

    let mut lines = vec![Line::from(Span::styled(draft.to_string(), base))];
    if with_category {
        let spans: Vec<Span> = Category::ALL
            .iter()
            .flat_map(|c| {
                let color = parse_color(config.theme.category_color(*c));
                let style = if *c == category {
                    Style::default().fg(color).add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(color)
                };
                [Span::styled(format!(" {} ", c), style), Span::raw(" ")]
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(spans));
    }

    let hint = if with_category {
        " Enter: save • Tab: category • Esc: cancel "
    } else {
        " Enter: save • Esc: cancel "
    };
    let paragraph = Paragraph::new(lines).style(base).block(
        Block::default()
            .borders(Borders::ALL)
            .title(input_title(kind))
            .title_alignment(Alignment::Center)
            .title_bottom(Line::from(hint).centered())
            .style(base),
    );
    f.render_widget(paragraph, popup);

    let x = popup.x + 1 + draft.chars().count() as u16;
    let max_x = popup.x + popup.width.saturating_sub(2);
    f.set_cursor_position(Position::new(x.min(max_x), popup.y + 1));
}
