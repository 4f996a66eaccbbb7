//! Id-indexed task tree for a single list.
//!
//! Tasks live in a flat map keyed by id. Each node keeps its parent id and
//! the ordered ids of its children; top-level order is kept in `roots`.
//! Lookups are O(1) and a subtree removal touches only the removed nodes.
//!
//! Invariants:
//! - every id appears exactly once in the map
//! - every id in `roots` has no parent, every id in a `children` vector has
//!   that node as parent
//! - `to_tasks()` yields depth-first document order
//! - `insert` never creates a task deeper than `MAX_TASK_DEPTH` levels, so every
//!   tree it builds stays within serde_json's decode nesting limit

use std::collections::HashMap;
use thiserror::Error;

use crate::models::{Category, Task};

/// Nesting levels a task may sit at (top-level tasks are level 1).
/// A task at the deepest level nests 2 JSON containers per level plus 4 for
/// the document, well under serde_json's limit of 128.
pub const MAX_TASK_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),
    #[error("Parent task not found: {0}")]
    ParentNotFound(String),
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error("Index {index} out of range for {len} top-level tasks")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Subtasks cannot be nested deeper than {max} levels")]
    TooDeep { max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    content: String,
    time: String,
    category: Category,
    completed: bool,
    parent: Option<String>,
    children: Vec<String>,
}

/// Borrowed view of a single task without its subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRef<'a> {
    pub id: &'a str,
    pub content: &'a str,
    pub time: &'a str,
    pub category: Category,
    pub completed: bool,
    pub parent: Option<&'a str>,
    pub depth: usize,
    pub child_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTree {
    nodes: HashMap<String, Node>,
    roots: Vec<String>,
}

impl TaskTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from the nested document form
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        for task in tasks {
            let id = task.id.clone();
            tree.adopt(None, task)?;
            tree.roots.push(id);
        }
        Ok(tree)
    }

    fn adopt(&mut self, parent: Option<&str>, task: Task) -> Result<(), TreeError> {
        if self.nodes.contains_key(&task.id) {
            return Err(TreeError::DuplicateTaskId(task.id));
        }

        let Task {
            id,
            content,
            time,
            category,
            completed,
            subtasks,
        } = task;

        let children: Vec<String> = subtasks.iter().map(|sub| sub.id.clone()).collect();
        self.nodes.insert(
            id.clone(),
            Node {
                content,
                time,
                category,
                completed,
                parent: parent.map(str::to_string),
                children,
            },
        );

        for sub in subtasks {
            self.adopt(Some(id.as_str()), sub)?;
        }
        Ok(())
    }

    /// Materialize the nested document form, in document order
    pub fn to_tasks(&self) -> Vec<Task> {
        self.roots.iter().filter_map(|id| self.materialize(id)).collect()
    }

    fn materialize(&self, id: &str) -> Option<Task> {
        let node = self.nodes.get(id)?;
        Some(Task {
            id: id.to_string(),
            content: node.content.clone(),
            time: node.time.clone(),
            category: node.category,
            completed: node.completed,
            subtasks: node
                .children
                .iter()
                .filter_map(|child| self.materialize(child))
                .collect(),
        })
    }

    /// Owned copy of one task and its subtree
    pub fn task(&self, id: &str) -> Option<Task> {
        self.materialize(id)
    }

    pub fn get(&self, id: &str) -> Option<TaskRef<'_>> {
        let (key, node) = self.nodes.get_key_value(id)?;
        Some(TaskRef {
            id: key.as_str(),
            content: &node.content,
            time: &node.time,
            category: node.category,
            completed: node.completed,
            parent: node.parent.as_deref(),
            depth: self.depth_of(id).unwrap_or(0),
            child_count: node.children.len(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Total number of tasks at every depth
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn children(&self, id: &str) -> Option<&[String]> {
        self.nodes.get(id).map(|node| node.children.as_slice())
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.nodes.get(id)?.parent.as_deref()
    }

    /// Zero for top-level tasks
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        let mut node = self.nodes.get(id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent.as_deref() {
            depth += 1;
            node = self.nodes.get(parent)?;
        }
        Some(depth)
    }

    pub fn completed_count(&self) -> usize {
        self.nodes.values().filter(|node| node.completed).count()
    }

    /// Ids in depth-first document order: parent before children,
    /// children before the next sibling
    pub fn walk(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&str> = self.roots.iter().rev().map(String::as_str).collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(id) {
                stack.extend(node.children.iter().rev().map(String::as_str));
            }
        }
        out
    }

    /// Append a new task, either at top level or as the last subtask of `parent`
    pub fn insert(
        &mut self,
        parent: Option<&str>,
        id: String,
        content: String,
        time: String,
        category: Category,
    ) -> Result<(), TreeError> {
        if self.nodes.contains_key(&id) {
            return Err(TreeError::DuplicateTaskId(id));
        }

        match parent {
            Some(parent_id) => {
                let parent_depth = self
                    .depth_of(parent_id)
                    .ok_or_else(|| TreeError::ParentNotFound(parent_id.to_string()))?;
                if parent_depth + 1 >= MAX_TASK_DEPTH {
                    return Err(TreeError::TooDeep {
                        max: MAX_TASK_DEPTH,
                    });
                }
                let parent_node = self
                    .nodes
                    .get_mut(parent_id)
                    .ok_or_else(|| TreeError::ParentNotFound(parent_id.to_string()))?;
                parent_node.children.push(id.clone());
            }
            None => self.roots.push(id.clone()),
        }

        self.nodes.insert(
            id,
            Node {
                content,
                time,
                category,
                completed: false,
                parent: parent.map(str::to_string),
                children: Vec::new(),
            },
        );
        Ok(())
    }

    /// Flip the completion flag and return the new value
    pub fn toggle(&mut self, id: &str) -> Result<bool, TreeError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::TaskNotFound(id.to_string()))?;
        node.completed = !node.completed;
        Ok(node.completed)
    }

    /// Remove a task and its entire subtree, returning how many tasks were removed
    pub fn remove(&mut self, id: &str) -> Result<usize, TreeError> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::TaskNotFound(id.to_string()))?;

        // Detach from the parent (or the root sequence) first
        let siblings = match node.parent.clone() {
            Some(parent) => match self.nodes.get_mut(&parent) {
                Some(parent_node) => &mut parent_node.children,
                None => return Err(TreeError::ParentNotFound(parent)),
            },
            None => &mut self.roots,
        };
        siblings.retain(|sibling| sibling != id);

        let mut removed = 0;
        let mut pending = vec![id.to_string()];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                removed += 1;
                pending.extend(node.children);
            }
        }
        Ok(removed)
    }

    /// Move the top-level task at `from` to position `to`, shifting the tasks between
    pub fn move_root(&mut self, from: usize, to: usize) -> Result<(), TreeError> {
        let len = self.roots.len();
        for index in [from, to] {
            if index >= len {
                return Err(TreeError::IndexOutOfRange { index, len });
            }
        }
        if from != to {
            let id = self.roots.remove(from);
            self.roots.insert(to, id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, subtasks: Vec<Task>) -> Task {
        let mut task = Task::new(
            id.to_string(),
            format!("task {}", id),
            "9:00 am".to_string(),
            Category::Work,
        );
        task.subtasks = subtasks;
        task
    }

    #[test]
    fn walk_is_depth_first_document_order() {
        let tree = TaskTree::from_tasks(vec![
            task("a", vec![task("a1", vec![task("a1x", vec![])]), task("a2", vec![])]),
            task("b", vec![]),
        ])
        .unwrap();

        assert_eq!(tree.walk(), vec!["a", "a1", "a1x", "a2", "b"]);
        assert_eq!(tree.depth_of("a1x"), Some(2));
        assert_eq!(tree.parent_of("a2"), Some("a"));
    }

    #[test]
    fn duplicate_ids_at_different_depths_are_rejected() {
        let err = TaskTree::from_tasks(vec![task("a", vec![task("b", vec![])]), task("b", vec![])])
            .unwrap_err();
        assert_eq!(err, TreeError::DuplicateTaskId("b".to_string()));
    }

    #[test]
    fn insert_stops_at_max_depth() {
        let mut tree = TaskTree::new();
        let mut parent: Option<String> = None;
        for level in 0..MAX_TASK_DEPTH {
            let id = format!("t{}", level);
            tree.insert(
                parent.as_deref(),
                id.clone(),
                id.clone(),
                "9:00 am".to_string(),
                Category::Work,
            )
            .unwrap();
            parent = Some(id);
        }
        assert_eq!(tree.depth_of("t31"), Some(MAX_TASK_DEPTH - 1));

        let err = tree
            .insert(
                Some("t31"),
                "too deep".to_string(),
                "x".to_string(),
                "9:00 am".to_string(),
                Category::Work,
            )
            .unwrap_err();
        assert_eq!(err, TreeError::TooDeep { max: MAX_TASK_DEPTH });
        assert_eq!(tree.len(), MAX_TASK_DEPTH);
    }

    #[test]
    fn remove_nested_task_detaches_it_from_parent() {
        let mut tree =
            TaskTree::from_tasks(vec![task("a", vec![task("a1", vec![]), task("a2", vec![])])])
                .unwrap();

        assert_eq!(tree.remove("a1"), Ok(1));
        assert_eq!(tree.children("a"), Some(&["a2".to_string()][..]));
        assert_eq!(tree.len(), 2);
    }
}
