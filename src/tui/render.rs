use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::persistence::PersistenceGateway;
use crate::tui::app::{App, Mode};
use crate::tui::layout::Layout;
use crate::tui::widgets::{
    color::parse_color, confirm_delete::render_confirm_delete, help::render_help,
    input_popup::render_input_popup, list_sidebar::render_list_sidebar,
    search_box::render_search_box, status_bar::render_status_bar, task_list::render_task_list,
};
use crate::utils::format_key_binding_for_display as display;

pub fn render<G: PersistenceGateway>(f: &mut Frame, app: &mut App<G>, layout: &Layout) {
    let fg_color = parse_color(&app.config.theme.fg);
    let bg_color = parse_color(&app.config.theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("TDL")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    let summaries = app.store.list_summaries();
    render_list_sidebar(f, layout.sidebar_area, &summaries, &app.config);

    let rows = app.rows();
    let title = match summaries.iter().find(|summary| summary.active) {
        Some(active) => format!("{} ({})", active.name, active.top_level_count),
        None => "No list".to_string(),
    };
    render_task_list(f, layout.main_area, &title, &rows, &mut app.list_state, &app.config);

    let match_count = rows.iter().filter(|row| row.visible_index.is_some()).count();
    render_search_box(
        f,
        layout.search_area,
        app.store.search_query(),
        app.mode == Mode::Search,
        match_count,
        &app.config,
    );

    let hints = key_hints(app);
    render_status_bar(
        f,
        layout.status_area,
        app.status_message.as_deref(),
        &hints,
        &app.config,
    );

    // Overlays go last so they sit above the panes
    match &app.mode {
        Mode::Help => render_help(f, layout.inner_area, &app.config),
        Mode::Input(kind) => render_input_popup(
            f,
            layout.inner_area,
            kind,
            &app.draft,
            app.draft_category,
            &app.config,
        ),
        Mode::ConfirmDelete(target) => {
            render_confirm_delete(f, layout.inner_area, target, &app.config)
        }
        Mode::Normal | Mode::Search => {}
    }
}

fn key_hints<G: PersistenceGateway>(app: &App<G>) -> Vec<String> {
    let keys = &app.config.key_bindings;
    match app.mode {
        Mode::Search => vec![
            "Type to filter".to_string(),
            "Enter: Keep".to_string(),
            "Esc: Clear".to_string(),
        ],
        Mode::Normal => vec![
            format!("{}: New", display(&keys.new_task)),
            format!("{}: Subtask", display(&keys.new_subtask)),
            format!("{}: Done", display(&keys.toggle_task)),
            format!("{}: Delete", display(&keys.delete)),
            format!("{}: Search", display(&keys.search)),
            format!("{}: Lists", display(&keys.next_list)),
            format!("{}: Help", display(&keys.help)),
            format!("{}: Quit", display(&keys.quit)),
        ],
        Mode::Input(_) | Mode::ConfirmDelete(_) | Mode::Help => Vec::new(),
    }
}
