pub mod cli;
pub mod codec;
pub mod config;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod storage;
pub mod store;
pub mod tree;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use models::{Category, Task, TodoList, TodoState};
pub use persistence::{BlobGateway, PersistenceGateway};
pub use storage::{BlobStore, Database, MemoryStore};
pub use store::{NoOp, TaskStore};
pub use utils::Profile;
