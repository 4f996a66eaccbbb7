use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Id of the list in the seeded default document
pub const DEFAULT_LIST_ID: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Personal,
    Freelance,
    Work,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Personal, Category::Freelance, Category::Work];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Freelance => "freelance",
            Category::Work => "work",
        }
    }

    /// Next category in display order, wrapping around
    pub fn next(self) -> Self {
        match self {
            Category::Personal => Category::Freelance,
            Category::Freelance => Category::Work,
            Category::Work => Category::Personal,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(Category::Personal),
            "freelance" => Ok(Category::Freelance),
            "work" => Ok(Category::Work),
            other => Err(format!(
                "unknown category '{}' (expected personal, freelance or work)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
    pub time: String, // display label captured at creation, e.g. "9:00 am"
    pub category: Category,
    pub completed: bool,
    #[serde(default)]
    pub subtasks: Vec<Task>,
}

impl Task {
    pub fn new(id: String, content: String, time: String, category: Category) -> Self {
        Self {
            id,
            content,
            time,
            category,
            completed: false,
            subtasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TodoList {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            tasks: Vec::new(),
        }
    }
}

/// Full state snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoState {
    pub lists: Vec<TodoList>,
    pub active_list_id: Option<String>,
    /// Session-only filter text, never persisted
    #[serde(default, skip_serializing)]
    pub search_query: String,
}

impl TodoState {
    /// Built-in starter document used when nothing was saved yet
    pub fn seeded() -> Self {
        let mut workout = Task::new(
            "1".to_string(),
            "work out".to_string(),
            "8:00 am".to_string(),
            Category::Personal,
        );
        workout.completed = true;

        let meeting = Task::new(
            "2".to_string(),
            "Design team meeting".to_string(),
            "2:00 pm".to_string(),
            Category::Freelance,
        );

        Self {
            lists: vec![TodoList {
                id: DEFAULT_LIST_ID.to_string(),
                name: "Today Tasks".to_string(),
                tasks: vec![workout, meeting],
            }],
            active_list_id: Some(DEFAULT_LIST_ID.to_string()),
            search_query: String::new(),
        }
    }
}

impl Default for TodoState {
    fn default() -> Self {
        Self::seeded()
    }
}
