use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;
use std::time::Duration;

use crate::persistence::PersistenceGateway;
use crate::tui::app::{App, InputKind, Mode};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::utils::has_primary_modifier;

/// Guard that restores the terminal even on panic.
/// After `restore` it does nothing on drop.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Errors are ignored here, we're already cleaning up
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop<G: PersistenceGateway>(mut app: App<G>) -> Result<(), TuiError> {
    // Checked before entering the alternate screen so the message stays visible
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::TooSmall {
            width,
            height,
            min_width,
            min_height,
        });
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    log::info!("tui started");

    loop {
        app.check_status_message_timeout();

        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(area, app.config.sidebar_width_percent);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only Press events, Release would double-process on Windows
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event) {
                    break;
                }
            }
        }
    }

    if let Err(e) = app.store.flush() {
        log::error!("final save failed: {}", e);
    }
    guard.restore()?;
    log::info!("tui stopped");

    Ok(())
}

/// Dispatch a key press by mode. Returns true when the app should quit.
pub fn handle_key_event<G: PersistenceGateway>(app: &mut App<G>, key_event: KeyEvent) -> bool {
    // Ctrl+C always quits
    if key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match app.mode.clone() {
        Mode::Help => {
            if key_event.code == KeyCode::Esc || app.keys.help.matches(&key_event) {
                app.exit_help_mode();
            }
            false
        }
        Mode::Search => {
            handle_search_mode(app, key_event);
            false
        }
        Mode::Input(kind) => {
            handle_input_mode(app, &kind, key_event);
            false
        }
        Mode::ConfirmDelete(_) => {
            match key_event.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            false
        }
        Mode::Normal => handle_normal_mode(app, key_event),
    }
}

fn handle_search_mode<G: PersistenceGateway>(app: &mut App<G>, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc => app.exit_search_mode(),
        KeyCode::Enter => app.accept_search(),
        KeyCode::Backspace => app.remove_from_search(),
        KeyCode::Char(c) => app.add_to_search(c),
        _ => {}
    }
}

fn handle_input_mode<G: PersistenceGateway>(app: &mut App<G>, kind: &InputKind, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => {
            app.draft.pop();
        }
        // Lists have no category
        KeyCode::Tab if matches!(kind, InputKind::NewTask | InputKind::NewSubtask { .. }) => {
            app.cycle_draft_category();
        }
        KeyCode::Char(c) => app.draft.push(c),
        _ => {}
    }
}

fn handle_normal_mode<G: PersistenceGateway>(app: &mut App<G>, key_event: KeyEvent) -> bool {
    let ctrl = has_primary_modifier(key_event.modifiers);

    // Reordering is primary-modifier+arrow and not configurable
    match key_event.code {
        KeyCode::Up if ctrl => {
            app.move_selected(true);
            return false;
        }
        KeyCode::Down if ctrl => {
            app.move_selected(false);
            return false;
        }
        KeyCode::Up => {
            app.move_selection_up();
            return false;
        }
        KeyCode::Down => {
            app.move_selection_down();
            return false;
        }
        KeyCode::Esc if !app.store.search_query().is_empty() => {
            app.exit_search_mode();
            return false;
        }
        _ => {}
    }

    let keys = app.keys.clone();
    if keys.quit.matches(&key_event) {
        return true;
    }

    if keys.list_up.matches(&key_event) {
        app.move_selection_up();
    } else if keys.list_down.matches(&key_event) {
        app.move_selection_down();
    } else if keys.toggle_task.matches(&key_event) {
        app.toggle_selected();
    } else if keys.expand.matches(&key_event) {
        app.toggle_expanded();
    } else if keys.new_task.matches(&key_event) {
        app.begin_input(InputKind::NewTask);
    } else if keys.new_subtask.matches(&key_event) {
        app.begin_new_subtask();
    } else if keys.new_list.matches(&key_event) {
        app.begin_input(InputKind::NewList);
    } else if keys.rename_list.matches(&key_event) {
        app.begin_rename_list();
    } else if keys.delete.matches(&key_event) {
        app.request_delete_task();
    } else if keys.delete_list.matches(&key_event) {
        app.request_delete_list();
    } else if keys.search.matches(&key_event) {
        app.enter_search_mode();
    } else if keys.next_list.matches(&key_event) {
        app.cycle_list(true);
    } else if keys.prev_list.matches(&key_event) {
        app.cycle_list(false);
    } else if keys.help.matches(&key_event) {
        app.enter_help_mode();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::BlobGateway;
    use crate::storage::MemoryStore;
    use crate::store::TaskStore;
    use crate::Config;

    fn press(app: &mut App<BlobGateway<MemoryStore>>, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> App<BlobGateway<MemoryStore>> {
        App::new(
            Config::default(),
            TaskStore::open(BlobGateway::new(MemoryStore::new())),
        )
    }

    #[test]
    fn typing_a_new_task_adds_it() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        for c in "buy milk".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        let contents: Vec<String> = app.rows().into_iter().map(|r| r.content).collect();
        assert_eq!(contents, vec!["work out", "Design team meeting", "buy milk"]);
        assert_eq!(app.selected_row().unwrap().content, "buy milk");
    }

    #[test]
    fn space_toggles_and_quit_key_quits() {
        let mut app = app();
        assert!(app.selected_row().unwrap().completed);
        assert!(!press(&mut app, KeyCode::Char(' ')));
        assert!(!app.selected_row().unwrap().completed);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn search_keys_edit_the_filter() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('w'));
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.store.search_query(), "wo");
        assert_eq!(app.rows().len(), 1);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.store.search_query(), "");
        assert_eq!(app.rows().len(), 2);
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.rows().len(), 2);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.rows().len(), 1);
    }
}
