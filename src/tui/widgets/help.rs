use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as display;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let fg_color = parse_color(&config.theme.fg);
    let bg_color = parse_color(&config.theme.bg);

    let popup_area = popup_area(area, 60, 70);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn build_help_text(config: &Config) -> String {
    let keys = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!(
        "  {} / {} or arrows: Move selection\n",
        display(&keys.list_up),
        display(&keys.list_down)
    ));
    text.push_str(&format!(
        "  {} / {}: Next / previous list\n",
        display(&keys.next_list),
        display(&keys.prev_list)
    ));
    text.push_str(&format!("  {}: Show/hide subtasks\n", display(&keys.expand)));
    text.push('\n');

    text.push_str("Tasks:\n");
    text.push_str(&format!("  {}: New task\n", display(&keys.new_task)));
    text.push_str(&format!("  {}: New subtask of selected\n", display(&keys.new_subtask)));
    text.push_str(&format!("  {}: Toggle done\n", display(&keys.toggle_task)));
    text.push_str(&format!("  {}: Delete task\n", display(&keys.delete)));
    #[cfg(target_os = "macos")]
    {
        text.push_str("  Opt+↑ / Opt+↓: Reorder top-level task\n");
    }
    #[cfg(not(target_os = "macos"))]
    {
        text.push_str("  Ctrl+↑ / Ctrl+↓: Reorder top-level task\n");
    }
    text.push_str(&format!("  {}: Search (Enter keeps, Esc clears)\n", display(&keys.search)));
    text.push('\n');

    text.push_str("Lists:\n");
    text.push_str(&format!("  {}: New list\n", display(&keys.new_list)));
    text.push_str(&format!("  {}: Rename list\n", display(&keys.rename_list)));
    text.push_str(&format!("  {}: Delete list\n", display(&keys.delete_list)));
    text.push('\n');

    text.push_str("Input:\n");
    text.push_str("  Tab: Cycle category\n");
    text.push_str("  Enter: Save    Esc: Cancel\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", display(&keys.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", display(&keys.help)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_configured_keys() {
        let mut config = Config::default();
        config.key_bindings.new_task = "a".to_string();
        let text = build_help_text(&config);
        assert!(text.contains("  a: New task\n"));
        assert!(text.contains("Rename list"));
    }
}
