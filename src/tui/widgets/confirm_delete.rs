use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::Config;
use crate::tui::app::DeleteTarget;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;

pub fn render_confirm_delete(f: &mut Frame, area: Rect, target: &DeleteTarget, config: &Config) {
    let fg_color = parse_color(&config.theme.fg);
    let bg_color = parse_color(&config.theme.bg);
    let base = Style::default().fg(fg_color).bg(bg_color);

    let popup_area = popup_area(area, 50, 35);
    f.render_widget(Clear, popup_area);

    let (question, name) = match target {
        DeleteTarget::Task { content, .. } => ("Delete this task and all its subtasks?", content),
        DeleteTarget::List { name, .. } => ("Delete this list and all its tasks?", name),
    };

    let lines = vec![
        Line::from(Span::styled(question, base)),
        Line::from(""),
        Line::from(Span::styled(name.as_str(), base.add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("y / Enter: delete    n / Esc: cancel", base)),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm Delete")
                .title_alignment(Alignment::Center)
                .style(base),
        )
        .style(base)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
