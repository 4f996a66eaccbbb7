//! Persisted document format.
//!
//! Version 1 is the only shape written:
//!
//! ```json
//! { "version": 1, "lists": [...], "activeListId": "default" }
//! ```
//!
//! Unversioned documents (version 0) keep the active list under
//! `activeList`, may carry a `searchQuery` and may omit `subtasks`. They are
//! migrated in memory on decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use crate::models::{TodoList, TodoState};
use crate::tree::{TaskTree, TreeError};

/// Version written by `encode`
pub const CURRENT_DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Document root must be an object")]
    NotAnObject,
    #[error("Document version must be a non-negative integer")]
    InvalidVersion,
    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(u64),
    #[error("Duplicate list id: {0}")]
    DuplicateListId(String),
    #[error("Invalid task tree in list '{list_id}': {source}")]
    InvalidTree {
        list_id: String,
        #[source]
        source: TreeError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentV1 {
    lists: Vec<TodoList>,
    #[serde(default)]
    active_list_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentV1Ref<'a> {
    version: u32,
    lists: &'a [TodoList],
    active_list_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentV0 {
    lists: Vec<TodoList>,
    #[serde(default, alias = "activeListId")]
    active_list: Option<String>,
    // `searchQuery` may be present; unknown fields are ignored
}

/// Serialize a state snapshot. The search query is never written.
pub fn encode(state: &TodoState) -> Result<String, CodecError> {
    let doc = DocumentV1Ref {
        version: CURRENT_DOCUMENT_VERSION,
        lists: &state.lists,
        active_list_id: state.active_list_id.as_deref(),
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Pretty form of `encode`, for export
pub fn encode_pretty(state: &TodoState) -> Result<String, CodecError> {
    let doc = DocumentV1Ref {
        version: CURRENT_DOCUMENT_VERSION,
        lists: &state.lists,
        active_list_id: state.active_list_id.as_deref(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parse, migrate and validate a stored document
pub fn decode(blob: &str) -> Result<TodoState, CodecError> {
    let value: Value = serde_json::from_str(blob)?;
    let object = value.as_object().ok_or(CodecError::NotAnObject)?;

    let version = match object.get("version") {
        None => 0,
        Some(v) => v.as_u64().ok_or(CodecError::InvalidVersion)?,
    };

    let (lists, active_list_id) = match version {
        0 => {
            let doc: DocumentV0 = serde_json::from_value(value)?;
            log::info!(
                "migrating unversioned document ({} lists) to version {}",
                doc.lists.len(),
                CURRENT_DOCUMENT_VERSION
            );
            (doc.lists, doc.active_list)
        }
        1 => {
            let doc: DocumentV1 = serde_json::from_value(value)?;
            (doc.lists, doc.active_list_id)
        }
        other => return Err(CodecError::UnsupportedVersion(other)),
    };

    validate(TodoState {
        lists,
        active_list_id,
        search_query: String::new(),
    })
}

fn validate(mut state: TodoState) -> Result<TodoState, CodecError> {
    let mut seen = HashSet::new();
    for list in &state.lists {
        if !seen.insert(list.id.as_str()) {
            return Err(CodecError::DuplicateListId(list.id.clone()));
        }
        // Tree construction enforces per-list id uniqueness at every depth
        TaskTree::from_tasks(list.tasks.clone()).map_err(|source| CodecError::InvalidTree {
            list_id: list.id.clone(),
            source,
        })?;
    }

    let dangling = match state.active_list_id.as_deref() {
        Some(id) => !seen.contains(id),
        None => false,
    };
    if dangling {
        let repaired = state.lists.first().map(|list| list.id.clone());
        log::warn!(
            "active list {:?} not found in document, falling back to {:?}",
            state.active_list_id,
            repaired
        );
        state.active_list_id = repaired;
    }

    Ok(state)
}
