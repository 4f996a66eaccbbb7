use ratatui::widgets::ListState;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::config::KeyBindings;
use crate::models::Category;
use crate::persistence::PersistenceGateway;
use crate::store::{NoOp, TaskStore};
use crate::utils::{ParsedKeyBinding, current_time_label, parse_key_binding};
use crate::Config;

const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    NewTask,
    NewSubtask { parent_id: String },
    NewList,
    RenameList { list_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Task { id: String, content: String },
    List { id: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Search,
    Input(InputKind),
    ConfirmDelete(DeleteTarget),
    Help,
}

/// One rendered line of the task pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub task_id: String,
    pub content: String,
    pub time: String,
    pub category: Category,
    pub completed: bool,
    pub depth: usize,
    /// Position in the filtered top-level view; `None` for subtasks
    pub visible_index: Option<usize>,
    pub child_count: usize,
    pub expanded: bool,
}

/// Key bindings parsed once from config
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub quit: ParsedKeyBinding,
    pub new_task: ParsedKeyBinding,
    pub new_subtask: ParsedKeyBinding,
    pub new_list: ParsedKeyBinding,
    pub rename_list: ParsedKeyBinding,
    pub delete: ParsedKeyBinding,
    pub delete_list: ParsedKeyBinding,
    pub toggle_task: ParsedKeyBinding,
    pub expand: ParsedKeyBinding,
    pub search: ParsedKeyBinding,
    pub next_list: ParsedKeyBinding,
    pub prev_list: ParsedKeyBinding,
    pub list_up: ParsedKeyBinding,
    pub list_down: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
}

impl KeyMap {
    /// Parse configured bindings; unparsable ones fall back to the default and are reported
    pub fn from_config(bindings: &KeyBindings) -> (Self, Vec<String>) {
        let defaults = KeyBindings::default();
        let mut errors = Vec::new();
        let mut parse = |configured: &str, fallback: &str| match parse_key_binding(configured) {
            Ok(binding) => binding,
            Err(e) => {
                errors.push(e);
                parse_key_binding(fallback).unwrap_or(ParsedKeyBinding {
                    key_code: crossterm::event::KeyCode::Null,
                    requires_ctrl: false,
                })
            }
        };

        let map = Self {
            quit: parse(&bindings.quit, &defaults.quit),
            new_task: parse(&bindings.new_task, &defaults.new_task),
            new_subtask: parse(&bindings.new_subtask, &defaults.new_subtask),
            new_list: parse(&bindings.new_list, &defaults.new_list),
            rename_list: parse(&bindings.rename_list, &defaults.rename_list),
            delete: parse(&bindings.delete, &defaults.delete),
            delete_list: parse(&bindings.delete_list, &defaults.delete_list),
            toggle_task: parse(&bindings.toggle_task, &defaults.toggle_task),
            expand: parse(&bindings.expand, &defaults.expand),
            search: parse(&bindings.search, &defaults.search),
            next_list: parse(&bindings.next_list, &defaults.next_list),
            prev_list: parse(&bindings.prev_list, &defaults.prev_list),
            list_up: parse(&bindings.list_up, &defaults.list_up),
            list_down: parse(&bindings.list_down, &defaults.list_down),
            help: parse(&bindings.help, &defaults.help),
        };
        (map, errors)
    }
}

pub struct App<G: PersistenceGateway> {
    pub store: TaskStore<G>,
    pub config: Config,
    pub keys: KeyMap,
    pub mode: Mode,
    /// Text being typed in an input popup
    pub draft: String,
    pub draft_category: Category,
    /// Tasks whose subtasks are shown; UI-only, never persisted
    pub expanded: HashSet<String>,
    pub selected: usize,
    pub list_state: ListState,
    pub status_message: Option<String>,
    status_message_time: Option<Instant>,
}

impl<G: PersistenceGateway> App<G> {
    pub fn new(config: Config, store: TaskStore<G>) -> Self {
        let (keys, errors) = KeyMap::from_config(&config.key_bindings);
        let draft_category = config.default_category;
        let mut app = Self {
            store,
            config,
            keys,
            mode: Mode::Normal,
            draft: String::new(),
            draft_category,
            expanded: HashSet::new(),
            selected: 0,
            list_state: ListState::default(),
            status_message: None,
            status_message_time: None,
        };
        if !errors.is_empty() {
            log::warn!("invalid key bindings in config: {}", errors.join("; "));
            app.set_status_message(format!("Invalid key bindings: {}", errors.join("; ")));
        }
        app.sync_list_state();
        app
    }

    // ---- rows and selection --------------------------------------------

    /// Visible tasks of the active list, with expanded subtasks flattened in
    pub fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        let (Some(list_id), Some(tree)) = (self.store.active_list_id(), self.store.active_tree())
        else {
            return rows;
        };

        let roots = tree.roots();
        let visible = self.store.visible_indices(list_id, self.store.search_query());
        for (visible_index, underlying) in visible.into_iter().enumerate() {
            self.push_rows(&roots[underlying], Some(visible_index), &mut rows);
        }
        rows
    }

    fn push_rows(&self, task_id: &str, visible_index: Option<usize>, rows: &mut Vec<Row>) {
        let Some(tree) = self.store.active_tree() else {
            return;
        };
        let Some(task) = tree.get(task_id) else {
            return;
        };
        let expanded = self.expanded.contains(task_id);
        rows.push(Row {
            task_id: task_id.to_string(),
            content: task.content.to_string(),
            time: task.time.to_string(),
            category: task.category,
            completed: task.completed,
            depth: task.depth,
            visible_index,
            child_count: task.child_count,
            expanded,
        });
        if expanded {
            for child in tree.children(task_id).unwrap_or(&[]) {
                self.push_rows(child, None, rows);
            }
        }
    }

    pub fn selected_row(&self) -> Option<Row> {
        self.rows().into_iter().nth(self.selected)
    }

    pub fn sync_list_state(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(len - 1);
            self.list_state.select(Some(self.selected));
        }
    }

    pub fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.sync_list_state();
    }

    pub fn move_selection_down(&mut self) {
        self.selected = self.selected.saturating_add(1);
        self.sync_list_state();
    }

    fn select_task(&mut self, task_id: &str) {
        if let Some(index) = self.rows().iter().position(|row| row.task_id == task_id) {
            self.selected = index;
        }
        self.sync_list_state();
    }

    // ---- status --------------------------------------------------------

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
        self.status_message_time = None;
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(shown_at) = self.status_message_time {
            if shown_at.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.clear_status_message();
            }
        }
    }

    /// Show a skipped command in the status bar, or a save failure if one happened
    fn report<T>(&mut self, result: Result<T, NoOp>, applied: impl FnOnce(T) -> String) {
        match result {
            Ok(value) => {
                let message = match self.store.last_save_error() {
                    Some(e) => format!("Not saved: {}", e),
                    None => applied(value),
                };
                self.set_status_message(message);
            }
            Err(skipped) => self.set_status_message(skipped.to_string()),
        }
    }

    // ---- task actions --------------------------------------------------

    pub fn toggle_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let result = self.store.toggle_task(&row.task_id);
        self.report(result, |done| {
            if done { "Marked done".to_string() } else { "Marked not done".to_string() }
        });
    }

    pub fn toggle_expanded(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !self.expanded.remove(&row.task_id) {
            self.expanded.insert(row.task_id);
        }
        self.sync_list_state();
    }

    /// Move the selected top-level task one position in the visible order
    pub fn move_selected(&mut self, up: bool) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let Some(from) = row.visible_index else {
            self.set_status_message("Only top-level tasks can be moved".to_string());
            return;
        };
        let to = if up {
            match from.checked_sub(1) {
                Some(to) => to,
                None => return,
            }
        } else {
            from + 1
        };
        let visible_len = self.rows().iter().filter(|r| r.visible_index.is_some()).count();
        if to >= visible_len {
            return;
        }

        let result = self.store.reorder_visible(from, to);
        if let Err(skipped) = result {
            self.set_status_message(skipped.to_string());
            return;
        }
        if let Some(e) = self.store.last_save_error() {
            let message = format!("Not saved: {}", e);
            self.set_status_message(message);
        }
        self.select_task(&row.task_id);
    }

    pub fn request_delete_task(&mut self) {
        if let Some(row) = self.selected_row() {
            self.mode = Mode::ConfirmDelete(DeleteTarget::Task {
                id: row.task_id,
                content: row.content,
            });
        }
    }

    pub fn request_delete_list(&mut self) {
        let Some(list_id) = self.store.active_list_id() else {
            self.set_status_message("No list is active".to_string());
            return;
        };
        if let Some(list) = self.store.list(list_id) {
            self.mode = Mode::ConfirmDelete(DeleteTarget::List {
                id: list.id,
                name: list.name,
            });
        }
    }

    pub fn confirm_delete(&mut self) {
        let Mode::ConfirmDelete(target) = std::mem::replace(&mut self.mode, Mode::Normal) else {
            return;
        };
        match target {
            DeleteTarget::Task { id, .. } => {
                let result = self.store.delete_task(&id);
                self.expanded.remove(&id);
                self.report(result, |removed| match removed {
                    1 => "Task deleted".to_string(),
                    n => format!("Task and {} subtasks deleted", n - 1),
                });
            }
            DeleteTarget::List { id, .. } => {
                let result = self.store.delete_list(&id);
                self.report(result, |_| "List deleted".to_string());
                self.selected = 0;
            }
        }
        self.sync_list_state();
    }

    pub fn cancel_delete(&mut self) {
        self.mode = Mode::Normal;
    }

    // ---- lists ---------------------------------------------------------

    /// Activate the next (or previous) list, wrapping around
    pub fn cycle_list(&mut self, forward: bool) {
        let ids: Vec<String> = self.store.list_ids().into_iter().map(str::to_string).collect();
        if ids.is_empty() {
            return;
        }
        let current = self
            .store
            .active_list_id()
            .and_then(|active| ids.iter().position(|id| id == active))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % ids.len()
        } else {
            (current + ids.len() - 1) % ids.len()
        };
        if let Err(skipped) = self.store.set_active_list(&ids[next]) {
            self.set_status_message(skipped.to_string());
        }
        self.selected = 0;
        self.sync_list_state();
    }

    // ---- input popup ---------------------------------------------------

    pub fn begin_input(&mut self, kind: InputKind) {
        self.draft = match &kind {
            InputKind::RenameList { list_id } => self
                .store
                .list(list_id)
                .map(|list| list.name)
                .unwrap_or_default(),
            _ => String::new(),
        };
        self.draft_category = self.config.default_category;
        self.mode = Mode::Input(kind);
    }

    pub fn begin_new_subtask(&mut self) {
        match self.selected_row() {
            Some(row) => self.begin_input(InputKind::NewSubtask {
                parent_id: row.task_id,
            }),
            None => self.set_status_message("Select a task first".to_string()),
        }
    }

    pub fn begin_rename_list(&mut self) {
        match self.store.active_list_id() {
            Some(id) => {
                let list_id = id.to_string();
                self.begin_input(InputKind::RenameList { list_id });
            }
            None => self.set_status_message("No list is active".to_string()),
        }
    }

    pub fn cycle_draft_category(&mut self) {
        self.draft_category = self.draft_category.next();
    }

    pub fn cancel_input(&mut self) {
        self.draft.clear();
        self.mode = Mode::Normal;
    }

    pub fn submit_input(&mut self) {
        let Mode::Input(kind) = std::mem::replace(&mut self.mode, Mode::Normal) else {
            return;
        };
        let draft = std::mem::take(&mut self.draft);
        let time = current_time_label();

        match kind {
            InputKind::NewTask => {
                let result = self.store.add_task(&draft, self.draft_category, &time, None);
                let added = result.clone().ok();
                self.report(result, |_| "Task added".to_string());
                if let Some(id) = added {
                    self.select_task(&id);
                }
            }
            InputKind::NewSubtask { parent_id } => {
                let result =
                    self.store
                        .add_task(&draft, self.draft_category, &time, Some(&parent_id));
                if result.is_ok() {
                    self.expanded.insert(parent_id);
                }
                self.report(result, |_| "Subtask added".to_string());
            }
            InputKind::NewList => {
                let result = self.store.create_list(&draft);
                if let Ok(id) = &result {
                    let switched = self.store.set_active_list(id);
                    if let Err(skipped) = switched {
                        log::warn!("could not switch to new list: {}", skipped);
                    }
                    self.selected = 0;
                }
                self.report(result, |_| "List created".to_string());
            }
            InputKind::RenameList { list_id } => {
                let result = self.store.rename_list(&list_id, &draft);
                self.report(result, |_| "List renamed".to_string());
            }
        }
        self.sync_list_state();
    }

    // ---- search --------------------------------------------------------

    pub fn enter_search_mode(&mut self) {
        self.mode = Mode::Search;
    }

    /// Keep the filter and return to normal mode
    pub fn accept_search(&mut self) {
        self.mode = Mode::Normal;
    }

    /// Drop the filter and return to normal mode
    pub fn exit_search_mode(&mut self) {
        self.store.set_search_query("");
        self.mode = Mode::Normal;
        self.sync_list_state();
    }

    pub fn add_to_search(&mut self, ch: char) {
        let mut query = self.store.search_query().to_string();
        query.push(ch);
        self.store.set_search_query(&query);
        self.selected = 0;
        self.sync_list_state();
    }

    pub fn remove_from_search(&mut self) {
        let mut query = self.store.search_query().to_string();
        query.pop();
        self.store.set_search_query(&query);
        self.selected = 0;
        self.sync_list_state();
    }

    pub fn enter_help_mode(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.mode = Mode::Normal;
    }
}
