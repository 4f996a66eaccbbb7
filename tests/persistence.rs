use tempfile::TempDir;

use tdl::models::DEFAULT_LIST_ID;
use tdl::tree::MAX_TASK_DEPTH;
use tdl::{
    BlobGateway, BlobStore, Category, Database, MemoryStore, NoOp, PersistenceGateway, TaskStore,
};

#[test]
fn database_set_get_remove() {
    let mut db = Database::open_in_memory().unwrap();
    assert_eq!(db.get("todoState").unwrap(), None);

    db.set("todoState", "{}").unwrap();
    db.set("todoState", "{\"version\":1}").unwrap();
    db.set("other", "x").unwrap();
    assert_eq!(db.get("todoState").unwrap().as_deref(), Some("{\"version\":1}"));
    assert_eq!(db.keys().unwrap(), vec!["other".to_string(), "todoState".to_string()]);

    db.remove("todoState").unwrap();
    assert_eq!(db.get("todoState").unwrap(), None);
}

#[test]
fn state_survives_reopening_the_database_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("tdl.db");
    let path = path.to_str().unwrap();

    let task_id = {
        let gateway = BlobGateway::new(Database::new(path).unwrap());
        let mut store = TaskStore::open(gateway);
        let id = store
            .add_task("water plants", Category::Personal, "6:30 pm", Some("2"))
            .unwrap();
        store.toggle_task("1").unwrap();
        assert_eq!(store.last_save_error(), None);
        id
    };

    let store = TaskStore::open(BlobGateway::new(Database::new(path).unwrap()));
    let tree = store.tree(DEFAULT_LIST_ID).unwrap();
    assert_eq!(tree.parent_of(&task_id), Some("2"));
    assert!(!tree.get("1").unwrap().completed);
}

#[test]
fn corrupt_blob_falls_back_to_seed() {
    let gateway = BlobGateway::new(MemoryStore::with_entry("todoState", "{\"lists\": 42"));
    let store = TaskStore::open(gateway);

    assert_eq!(store.active_list_id(), Some(DEFAULT_LIST_ID));
    assert_eq!(store.list(DEFAULT_LIST_ID).unwrap().tasks.len(), 2);
}

#[test]
fn unsupported_version_falls_back_to_seed() {
    let blob = r#"{"version":2,"lists":[{"id":"x","name":"X","tasks":[]}],"activeListId":"x"}"#;
    let mut gateway = BlobGateway::new(MemoryStore::with_entry("todoState", blob));
    assert!(gateway.load().is_none());

    let store = TaskStore::open(gateway);
    assert_eq!(store.list_ids(), vec![DEFAULT_LIST_ID]);
}

#[test]
fn custom_key_keeps_documents_apart() {
    let mut store = TaskStore::open(BlobGateway::with_key(MemoryStore::new(), "work"));
    store.create_list("Sprint").unwrap();

    let memory = store.into_gateway().into_store();
    assert!(memory.get("todoState").unwrap().is_none());
    assert!(memory.get("work").unwrap().is_some());

    let mut gateway = BlobGateway::with_key(memory, "work");
    assert_eq!(gateway.load().unwrap().lists.len(), 2);
    gateway.clear().unwrap();
    assert!(gateway.load().is_none());
}

#[test]
fn deepest_allowed_chain_survives_reload() {
    let mut store = TaskStore::open(BlobGateway::new(MemoryStore::new()));
    let mut parent = "1".to_string();
    let err = loop {
        match store.add_task("step", Category::Work, "9:00 am", Some(&parent)) {
            Ok(id) => parent = id,
            Err(err) => break err,
        }
    };
    assert_eq!(err, NoOp::TooDeep { max: MAX_TASK_DEPTH });
    assert_eq!(store.last_save_error(), None);

    let tree = store.tree(DEFAULT_LIST_ID).unwrap();
    assert_eq!(tree.depth_of(&parent), Some(MAX_TASK_DEPTH - 1));
    let total = tree.len();
    assert_eq!(total, 2 + MAX_TASK_DEPTH - 1);

    let store = TaskStore::open(store.into_gateway());
    let tree = store.tree(DEFAULT_LIST_ID).unwrap();
    assert_eq!(tree.len(), total);
    assert_eq!(tree.depth_of(&parent), Some(MAX_TASK_DEPTH - 1));
}
