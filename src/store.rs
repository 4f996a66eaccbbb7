//! The task store: sole owner of list and task state.
//!
//! Every command is a synchronous transition that either applies fully and
//! is followed by one save through the persistence gateway, or returns a
//! [`NoOp`] and leaves the state untouched. Save failures are logged and
//! recorded in [`TaskStore::last_save_error`], never returned from commands.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Category, Task, TodoList, TodoState};
use crate::persistence::{PersistenceError, PersistenceGateway};
use crate::tree::{TaskTree, TreeError};

/// Why a command was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoOp {
    #[error("List name must not be blank")]
    BlankName,
    #[error("Task content must not be blank")]
    BlankContent,
    #[error("No list is active")]
    NoActiveList,
    #[error("List not found: {0}")]
    UnknownList(String),
    #[error("Task not found: {0}")]
    UnknownTask(String),
    #[error("Parent task not found: {0}")]
    UnknownParent(String),
    #[error("Task id already in use: {0}")]
    DuplicateTaskId(String),
    #[error("Index {index} out of range for {len} tasks")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Subtasks cannot be nested deeper than {max} levels")]
    TooDeep { max: usize },
}

impl From<TreeError> for NoOp {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::DuplicateTaskId(id) => NoOp::DuplicateTaskId(id),
            TreeError::ParentNotFound(id) => NoOp::UnknownParent(id),
            TreeError::TaskNotFound(id) => NoOp::UnknownTask(id),
            TreeError::IndexOutOfRange { index, len } => NoOp::IndexOutOfRange { index, len },
            TreeError::TooDeep { max } => NoOp::TooDeep { max },
        }
    }
}

/// A state that cannot be loaded into the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("Duplicate list id: {0}")]
    DuplicateListId(String),
    #[error("Invalid task tree in list '{list_id}': {source}")]
    InvalidTree {
        list_id: String,
        #[source]
        source: TreeError,
    },
}

/// Per-list counts for sidebars and `lists` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSummary {
    pub id: String,
    pub name: String,
    pub top_level_count: usize,
    pub total_count: usize,
    pub completed_count: usize,
    pub active: bool,
}

#[derive(Debug, Clone)]
struct ListEntry {
    id: String,
    name: String,
    tree: TaskTree,
}

pub struct TaskStore<G: PersistenceGateway> {
    lists: Vec<ListEntry>,
    active_list_id: Option<String>,
    search_query: String,
    gateway: G,
    last_save_error: Option<String>,
}

impl<G: PersistenceGateway> TaskStore<G> {
    /// Load the saved document, or start from the seeded default when there is none
    pub fn open(mut gateway: G) -> Self {
        let loaded = gateway.load();
        let state = match loaded {
            Some(state) => state,
            None => {
                log::info!("no saved document, starting from seeded default");
                TodoState::seeded()
            }
        };

        match Self::from_state(state, gateway) {
            Ok(store) => store,
            Err((e, gateway)) => {
                log::warn!("saved document rejected ({}), starting from seeded default", e);
                Self::from_state(TodoState::seeded(), gateway)
                    .unwrap_or_else(|(_, gateway)| Self::empty(gateway))
            }
        }
    }

    /// Build a store around an existing state. The gateway is handed back on failure.
    pub fn from_state(state: TodoState, gateway: G) -> Result<Self, (StateError, G)> {
        let mut lists: Vec<ListEntry> = Vec::with_capacity(state.lists.len());
        for list in state.lists {
            if lists.iter().any(|entry| entry.id == list.id) {
                return Err((StateError::DuplicateListId(list.id), gateway));
            }
            let tree = match TaskTree::from_tasks(list.tasks) {
                Ok(tree) => tree,
                Err(source) => {
                    return Err((
                        StateError::InvalidTree {
                            list_id: list.id,
                            source,
                        },
                        gateway,
                    ));
                }
            };
            lists.push(ListEntry {
                id: list.id,
                name: list.name,
                tree,
            });
        }

        // A dangling active id would make every task command a silent no-op
        let active_list_id = state
            .active_list_id
            .filter(|id| lists.iter().any(|entry| &entry.id == id))
            .or_else(|| lists.first().map(|entry| entry.id.clone()));

        Ok(Self {
            lists,
            active_list_id,
            search_query: state.search_query,
            gateway,
            last_save_error: None,
        })
    }

    fn empty(gateway: G) -> Self {
        Self {
            lists: Vec::new(),
            active_list_id: None,
            search_query: String::new(),
            gateway,
            last_save_error: None,
        }
    }

    // ---- commands -------------------------------------------------------

    /// Append a new empty list; it becomes active if no list was
    pub fn create_list(&mut self, name: &str) -> Result<String, NoOp> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NoOp::BlankName);
        }

        let id = fresh_id(|candidate| self.list_index(candidate).is_some());
        self.lists.push(ListEntry {
            id: id.clone(),
            name: name.to_string(),
            tree: TaskTree::new(),
        });
        if self.active_list_id.is_none() {
            self.active_list_id = Some(id.clone());
        }

        log::debug!("created list {} '{}'", id, name);
        self.persist();
        Ok(id)
    }

    pub fn set_active_list(&mut self, list_id: &str) -> Result<(), NoOp> {
        if self.list_index(list_id).is_none() {
            return Err(NoOp::UnknownList(list_id.to_string()));
        }
        self.active_list_id = Some(list_id.to_string());

        log::debug!("active list set to {}", list_id);
        self.persist();
        Ok(())
    }

    /// Remove a list; if it was active the first remaining list takes over
    pub fn delete_list(&mut self, list_id: &str) -> Result<(), NoOp> {
        let index = self
            .list_index(list_id)
            .ok_or_else(|| NoOp::UnknownList(list_id.to_string()))?;
        self.lists.remove(index);

        if self.active_list_id.as_deref() == Some(list_id) {
            self.active_list_id = self.lists.first().map(|entry| entry.id.clone());
        }

        log::debug!("deleted list {}, {} remaining", list_id, self.lists.len());
        self.persist();
        Ok(())
    }

    pub fn rename_list(&mut self, list_id: &str, name: &str) -> Result<(), NoOp> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NoOp::BlankName);
        }
        let index = self
            .list_index(list_id)
            .ok_or_else(|| NoOp::UnknownList(list_id.to_string()))?;
        self.lists[index].name = name.to_string();

        log::debug!("renamed list {} to '{}'", list_id, name);
        self.persist();
        Ok(())
    }

    /// Add a task to the active list, at top level or under `parent_task_id`
    pub fn add_task(
        &mut self,
        content: &str,
        category: Category,
        time: &str,
        parent_task_id: Option<&str>,
    ) -> Result<String, NoOp> {
        let content = content.trim();
        if content.is_empty() {
            return Err(NoOp::BlankContent);
        }

        let tree = self.active_tree_mut()?;
        if let Some(parent) = parent_task_id {
            if !tree.contains(parent) {
                return Err(NoOp::UnknownParent(parent.to_string()));
            }
        }

        let id = fresh_id(|candidate| tree.contains(candidate));
        tree.insert(
            parent_task_id,
            id.clone(),
            content.to_string(),
            time.to_string(),
            category,
        )?;

        log::debug!("added task {} (parent {:?})", id, parent_task_id);
        self.persist();
        Ok(id)
    }

    /// Flip a task's completion flag and return the new value
    pub fn toggle_task(&mut self, task_id: &str) -> Result<bool, NoOp> {
        let completed = self.active_tree_mut()?.toggle(task_id)?;

        log::debug!("task {} completed={}", task_id, completed);
        self.persist();
        Ok(completed)
    }

    /// Delete a task with all its descendants, returning how many tasks went away
    pub fn delete_task(&mut self, task_id: &str) -> Result<usize, NoOp> {
        let removed = self.active_tree_mut()?.remove(task_id)?;

        log::debug!("deleted task {} ({} tasks removed)", task_id, removed);
        self.persist();
        Ok(removed)
    }

    /// Move a top-level task of the active list. Indices are unfiltered positions.
    pub fn reorder_tasks(
        &mut self,
        source_index: usize,
        destination_index: usize,
    ) -> Result<(), NoOp> {
        self.active_tree_mut()?.move_root(source_index, destination_index)?;

        log::debug!("moved task {} -> {}", source_index, destination_index);
        self.persist();
        Ok(())
    }

    /// Reorder using positions in the view filtered by the current search query
    pub fn reorder_visible(&mut self, from_visible: usize, to_visible: usize) -> Result<(), NoOp> {
        let list_id = self.active_list_id.clone().ok_or(NoOp::NoActiveList)?;
        let visible = self.visible_indices(&list_id, &self.search_query);
        let lookup = |index: usize| {
            visible
                .get(index)
                .copied()
                .ok_or(NoOp::IndexOutOfRange {
                    index,
                    len: visible.len(),
                })
        };
        let source = lookup(from_visible)?;
        let destination = lookup(to_visible)?;
        self.reorder_tasks(source, destination)
    }

    /// Replace the session-only filter text. Not persisted.
    pub fn set_search_query(&mut self, text: &str) {
        self.search_query = text.to_string();
    }

    /// Save the current document again, e.g. at shutdown
    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        let document = self.document();
        let result = self.gateway.save(&document);
        self.record_save(&result);
        result
    }

    // ---- queries --------------------------------------------------------

    pub fn active_list_id(&self) -> Option<&str> {
        self.active_list_id.as_deref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    pub fn list_ids(&self) -> Vec<&str> {
        self.lists.iter().map(|entry| entry.id.as_str()).collect()
    }

    pub fn list_summaries(&self) -> Vec<ListSummary> {
        self.lists
            .iter()
            .map(|entry| ListSummary {
                id: entry.id.clone(),
                name: entry.name.clone(),
                top_level_count: entry.tree.roots().len(),
                total_count: entry.tree.len(),
                completed_count: entry.tree.completed_count(),
                active: self.active_list_id.as_deref() == Some(entry.id.as_str()),
            })
            .collect()
    }

    pub fn list(&self, list_id: &str) -> Option<TodoList> {
        let entry = &self.lists[self.list_index(list_id)?];
        Some(TodoList {
            id: entry.id.clone(),
            name: entry.name.clone(),
            tasks: entry.tree.to_tasks(),
        })
    }

    pub fn tree(&self, list_id: &str) -> Option<&TaskTree> {
        self.list_index(list_id).map(|index| &self.lists[index].tree)
    }

    pub fn active_tree(&self) -> Option<&TaskTree> {
        self.tree(self.active_list_id.as_deref()?)
    }

    /// Underlying top-level positions of the tasks whose content contains
    /// `query`, case-insensitively. Subtasks are not searched.
    pub fn visible_indices(&self, list_id: &str, query: &str) -> Vec<usize> {
        let Some(tree) = self.tree(list_id) else {
            return Vec::new();
        };
        let needle = query.to_lowercase();
        tree.roots()
            .iter()
            .enumerate()
            .filter(|(_, id)| {
                needle.is_empty()
                    || tree
                        .get(id)
                        .is_some_and(|task| task.content.to_lowercase().contains(&needle))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Top-level tasks matching `query`, in list order, with their subtrees
    pub fn visible_tasks(&self, list_id: &str, query: &str) -> Vec<Task> {
        let Some(tree) = self.tree(list_id) else {
            return Vec::new();
        };
        self.visible_indices(list_id, query)
            .into_iter()
            .filter_map(|index| tree.task(&tree.roots()[index]))
            .collect()
    }

    pub fn visible_index_to_underlying(
        &self,
        list_id: &str,
        query: &str,
        visible_index: usize,
    ) -> Option<usize> {
        self.visible_indices(list_id, query).get(visible_index).copied()
    }

    /// Full snapshot, including the transient search query
    pub fn snapshot(&self) -> TodoState {
        TodoState {
            search_query: self.search_query.clone(),
            ..self.document()
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    // ---- internals ------------------------------------------------------

    fn list_index(&self, list_id: &str) -> Option<usize> {
        self.lists.iter().position(|entry| entry.id == list_id)
    }

    fn active_tree_mut(&mut self) -> Result<&mut TaskTree, NoOp> {
        let active = self.active_list_id.as_deref().ok_or(NoOp::NoActiveList)?;
        let index = self.list_index(active).ok_or(NoOp::NoActiveList)?;
        Ok(&mut self.lists[index].tree)
    }

    /// The persisted part of the state
    fn document(&self) -> TodoState {
        TodoState {
            lists: self
                .lists
                .iter()
                .map(|entry| TodoList {
                    id: entry.id.clone(),
                    name: entry.name.clone(),
                    tasks: entry.tree.to_tasks(),
                })
                .collect(),
            active_list_id: self.active_list_id.clone(),
            search_query: String::new(),
        }
    }

    fn persist(&mut self) {
        let document = self.document();
        let result = self.gateway.save(&document);
        self.record_save(&result);
    }

    fn record_save(&mut self, result: &Result<(), PersistenceError>) {
        match result {
            Ok(()) => self.last_save_error = None,
            Err(e) => {
                log::warn!("failed to save document: {}", e);
                self.last_save_error = Some(e.to_string());
            }
        }
    }
}

fn fresh_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !taken(&id) {
            return id;
        }
    }
}
