use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::models::{Category, Task};
use crate::persistence::{BlobGateway, PersistenceError, PersistenceGateway};
use crate::storage::BlobStore;
use crate::store::{NoOp, TaskStore};
use crate::utils::current_time_label;

#[derive(Parser)]
#[command(name = "tdl")]
#[command(about = "To-do lists with categories, subtasks and search")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/storage)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Show all lists with task counts
    Lists,
    /// Show the tasks of a list (the active list by default)
    Show {
        /// List id
        #[arg(long)]
        list: Option<String>,
        /// Only top-level tasks whose content contains this text
        #[arg(long)]
        search: Option<String>,
        /// Print task ids
        #[arg(long)]
        ids: bool,
    },
    /// Create a new list
    NewList {
        /// List name
        name: String,
    },
    /// Make a list the active one
    UseList {
        /// List id
        id: String,
    },
    /// Rename a list
    RenameList {
        /// List id
        id: String,
        /// New name
        name: String,
    },
    /// Delete a list and all its tasks
    DeleteList {
        /// List id
        id: String,
    },
    /// Add a task to the active list
    Add {
        /// Task content
        content: String,
        /// personal, freelance or work
        #[arg(long)]
        category: Option<Category>,
        /// Time label (defaults to the current time, e.g. "9:05 am")
        #[arg(long)]
        time: Option<String>,
        /// Add as a subtask of this task id
        #[arg(long)]
        parent: Option<String>,
    },
    /// Flip a task between done and not done
    Toggle {
        /// Task id
        id: String,
    },
    /// Delete a task and its subtasks
    Delete {
        /// Task id
        id: String,
    },
    /// Move a top-level task of the active list to another position
    Move {
        /// Current position (0-based)
        from: usize,
        /// New position (0-based)
        to: usize,
    },
    /// Print the stored document as JSON
    Export,
    /// Forget all saved lists; the next start uses the starter lists
    Reset,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Persistence error: {0}")]
    PersistenceError(#[from] PersistenceError),
    #[error("Export failed: {0}")]
    ExportError(#[from] CodecError),
}

/// Outcome line for a command that may be skipped
fn report<T>(result: Result<T, NoOp>, applied: impl FnOnce(T) -> String) {
    match result {
        Ok(value) => println!("{}", applied(value)),
        Err(skipped) => println!("Nothing changed: {}", skipped),
    }
}

fn warn_if_unsaved<G: PersistenceGateway>(store: &TaskStore<G>) {
    if let Some(e) = store.last_save_error() {
        eprintln!("Warning: changes were not saved: {}", e);
    }
}

/// Handle the lists command
pub fn handle_lists<G: PersistenceGateway>(store: &TaskStore<G>) {
    let summaries = store.list_summaries();
    if summaries.is_empty() {
        println!("No lists. Create one with `tdl new-list <NAME>`.");
        return;
    }
    for summary in summaries {
        let marker = if summary.active { "*" } else { " " };
        println!(
            "{} {}  {}  ({} tasks, {}/{} done)",
            marker,
            summary.id,
            summary.name,
            summary.top_level_count,
            summary.completed_count,
            summary.total_count
        );
    }
}

/// Handle the show command
pub fn handle_show<G: PersistenceGateway>(
    store: &TaskStore<G>,
    list: Option<String>,
    search: Option<String>,
    ids: bool,
) {
    let list_id = match list.as_deref().or(store.active_list_id()) {
        Some(id) => id.to_string(),
        None => {
            println!("No active list.");
            return;
        }
    };
    let Some(todo_list) = store.list(&list_id) else {
        println!("List not found: {}", list_id);
        return;
    };

    let query = search.unwrap_or_default();
    let tasks = store.visible_tasks(&list_id, &query);
    println!("{} ({} of {} tasks)", todo_list.name, tasks.len(), todo_list.tasks.len());
    for (position, task) in tasks.iter().enumerate() {
        print_task(task, Some(position), 0, ids);
    }
}

fn print_task(task: &Task, position: Option<usize>, depth: usize, ids: bool) {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let prefix = match position {
        Some(position) => format!("{:>3}.", position),
        None => "    ".to_string(),
    };
    let id = if ids { format!("  <{}>", task.id) } else { String::new() };
    println!(
        "{}{} {} {}  ({}, {}){}",
        prefix,
        "  ".repeat(depth),
        check,
        task.content,
        task.category,
        task.time,
        id
    );
    for sub in &task.subtasks {
        print_task(sub, None, depth + 1, ids);
    }
}

/// Handle the new-list command
pub fn handle_new_list<G: PersistenceGateway>(store: &mut TaskStore<G>, name: String) {
    report(store.create_list(&name), |id| format!("List created successfully (ID: {})", id));
    warn_if_unsaved(store);
}

/// Handle the use-list command
pub fn handle_use_list<G: PersistenceGateway>(store: &mut TaskStore<G>, id: String) {
    report(store.set_active_list(&id), |_| format!("Active list: {}", id));
    warn_if_unsaved(store);
}

/// Handle the rename-list command
pub fn handle_rename_list<G: PersistenceGateway>(store: &mut TaskStore<G>, id: String, name: String) {
    report(store.rename_list(&id, &name), |_| format!("List {} renamed", id));
    warn_if_unsaved(store);
}

/// Handle the delete-list command
pub fn handle_delete_list<G: PersistenceGateway>(store: &mut TaskStore<G>, id: String) {
    report(store.delete_list(&id), |_| format!("List {} deleted", id));
    warn_if_unsaved(store);
}

/// Handle the add command
pub fn handle_add<G: PersistenceGateway>(
    store: &mut TaskStore<G>,
    content: String,
    category: Category,
    time: Option<String>,
    parent: Option<String>,
) {
    let time = time.unwrap_or_else(current_time_label);
    report(
        store.add_task(&content, category, &time, parent.as_deref()),
        |id| format!("Task created successfully (ID: {})", id),
    );
    warn_if_unsaved(store);
}

/// Handle the toggle command
pub fn handle_toggle<G: PersistenceGateway>(store: &mut TaskStore<G>, id: String) {
    report(store.toggle_task(&id), |completed| {
        if completed {
            format!("Task {} marked done", id)
        } else {
            format!("Task {} marked not done", id)
        }
    });
    warn_if_unsaved(store);
}

/// Handle the delete command
pub fn handle_delete<G: PersistenceGateway>(store: &mut TaskStore<G>, id: String) {
    report(store.delete_task(&id), |removed| match removed {
        1 => format!("Task {} deleted", id),
        n => format!("Task {} deleted with {} subtasks", id, n - 1),
    });
    warn_if_unsaved(store);
}

/// Handle the move command
pub fn handle_move<G: PersistenceGateway>(store: &mut TaskStore<G>, from: usize, to: usize) {
    report(store.reorder_tasks(from, to), |_| format!("Task moved from {} to {}", from, to));
    warn_if_unsaved(store);
}

/// Handle the export command
pub fn handle_export<G: PersistenceGateway>(store: &TaskStore<G>) -> Result<(), CliError> {
    println!("{}", codec::encode_pretty(&store.snapshot())?);
    Ok(())
}

/// Handle the reset command
pub fn handle_reset<S: BlobStore>(gateway: &mut BlobGateway<S>) -> Result<(), CliError> {
    gateway.clear()?;
    println!("Saved lists removed ('{}')", gateway.key());
    Ok(())
}
