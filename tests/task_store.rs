use std::collections::HashSet;

use tdl::models::{DEFAULT_LIST_ID, Task, TodoState};
use tdl::persistence::PersistenceError;
use tdl::storage::StorageError;
use tdl::{BlobGateway, Category, MemoryStore, NoOp, PersistenceGateway, TaskStore};

type Store = TaskStore<BlobGateway<MemoryStore>>;

fn seeded() -> Store {
    TaskStore::open(BlobGateway::new(MemoryStore::new()))
}

fn top_level_contents(store: &Store) -> Vec<String> {
    let list = store.list(store.active_list_id().unwrap()).unwrap();
    list.tasks.into_iter().map(|t| t.content).collect()
}

fn collect_ids(tasks: &[Task], out: &mut Vec<String>) {
    for task in tasks {
        out.push(task.id.clone());
        collect_ids(&task.subtasks, out);
    }
}

/// Gateway whose saves always fail
struct BrokenGateway {
    attempts: usize,
}

impl PersistenceGateway for BrokenGateway {
    fn load(&mut self) -> Option<TodoState> {
        None
    }

    fn save(&mut self, _state: &TodoState) -> Result<(), PersistenceError> {
        self.attempts += 1;
        Err(PersistenceError::Storage(StorageError::Unavailable(
            "quota exceeded".to_string(),
        )))
    }
}

#[test]
fn open_without_document_uses_seed() {
    let store = seeded();
    assert_eq!(store.active_list_id(), Some(DEFAULT_LIST_ID));

    let summaries = store.list_summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "Today Tasks");
    assert_eq!(summaries[0].top_level_count, 2);
    assert!(summaries[0].active);
    // Nothing is written until the first command
    assert!(store.gateway().load_raw().is_none());
}

trait RawBlob {
    fn load_raw(&self) -> Option<String>;
}

impl RawBlob for BlobGateway<MemoryStore> {
    fn load_raw(&self) -> Option<String> {
        use tdl::BlobStore;
        self.store().get(self.key()).unwrap()
    }
}

#[test]
fn scenario_a_add_top_level_task() {
    let mut store = seeded();
    let id = store
        .add_task("Buy milk", Category::Personal, "9:00 am", None)
        .unwrap();

    let list = store.list(DEFAULT_LIST_ID).unwrap();
    assert_eq!(list.tasks.len(), 3);
    let last = list.tasks.last().unwrap();
    assert_eq!(last.id, id);
    assert_eq!(last.content, "Buy milk");
    assert_eq!(last.time, "9:00 am");
    assert!(!last.completed);
    assert!(last.subtasks.is_empty());
}

#[test]
fn scenario_b_add_subtask() {
    let mut store = seeded();
    store
        .add_task("Sub 1", Category::Personal, "9:00 am", Some("1"))
        .unwrap();

    let list = store.list(DEFAULT_LIST_ID).unwrap();
    assert_eq!(list.tasks.len(), 2);
    assert_eq!(list.tasks[0].subtasks.len(), 1);
    assert_eq!(list.tasks[0].subtasks[0].content, "Sub 1");
}

#[test]
fn scenario_c_toggle_is_an_involution() {
    let mut store = seeded();
    let original = store.tree(DEFAULT_LIST_ID).unwrap().get("1").unwrap().completed;

    assert_eq!(store.toggle_task("1"), Ok(!original));
    assert_eq!(store.toggle_task("1"), Ok(original));
}

#[test]
fn scenario_d_delete_only_list() {
    let mut store = seeded();
    store.delete_list(DEFAULT_LIST_ID).unwrap();

    assert!(store.list_ids().is_empty());
    assert_eq!(store.active_list_id(), None);
    assert_eq!(
        store.add_task("orphan", Category::Work, "1:00 pm", None),
        Err(NoOp::NoActiveList)
    );
}

#[test]
fn scenario_e_reorder_twice_restores_order() {
    let mut store = seeded();
    let original = top_level_contents(&store);

    store.reorder_tasks(0, 1).unwrap();
    assert_eq!(top_level_contents(&store), vec!["Design team meeting", "work out"]);
    store.reorder_tasks(0, 1).unwrap();
    assert_eq!(top_level_contents(&store), original);
}

#[test]
fn reorder_same_index_keeps_order() {
    let mut store = seeded();
    let original = top_level_contents(&store);
    assert_eq!(store.reorder_tasks(1, 1), Ok(()));
    assert_eq!(top_level_contents(&store), original);
    assert_eq!(
        store.reorder_tasks(0, 2),
        Err(NoOp::IndexOutOfRange { index: 2, len: 2 })
    );
}

#[test]
fn ids_stay_unique_over_a_command_sequence() {
    let mut store = seeded();
    let second = store.create_list("Groceries").unwrap();
    let mut parents = vec!["1".to_string()];
    for i in 0..20 {
        let parent = if i % 3 == 0 { None } else { parents.last().cloned() };
        let id = store
            .add_task(&format!("task {}", i), Category::Work, "9:00 am", parent.as_deref())
            .unwrap();
        parents.push(id);
    }
    store.delete_task(&parents[4]).unwrap();
    store.set_active_list(&second).unwrap();
    for i in 0..5 {
        store
            .add_task(&format!("item {}", i), Category::Personal, "9:00 am", None)
            .unwrap();
    }

    let state = store.snapshot();
    let list_ids: HashSet<&str> = state.lists.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(list_ids.len(), state.lists.len());
    for list in &state.lists {
        let mut ids = Vec::new();
        collect_ids(&list.tasks, &mut ids);
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len(), "duplicate task id in {}", list.id);
    }
}

#[test]
fn deleting_parent_removes_all_descendants() {
    let mut store = seeded();
    let child = store
        .add_task("child", Category::Work, "9:00 am", Some("1"))
        .unwrap();
    let grandchild = store
        .add_task("grandchild", Category::Work, "9:00 am", Some(&child))
        .unwrap();

    assert_eq!(store.delete_task("1"), Ok(3));
    let tree = store.tree(DEFAULT_LIST_ID).unwrap();
    assert!(!tree.contains(&child));
    assert!(!tree.contains(&grandchild));
    assert_eq!(tree.len(), 1);
}

#[test]
fn search_matches_top_level_content_case_insensitively() {
    let mut store = seeded();
    store
        .add_task("design notes", Category::Work, "9:00 am", Some("1"))
        .unwrap();

    let all = store.visible_tasks(DEFAULT_LIST_ID, "");
    let contents: Vec<&str> = all.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec!["work out", "Design team meeting"]);

    // The subtask of "work out" matches but subtasks are not searched
    let found = store.visible_tasks(DEFAULT_LIST_ID, "DESIGN");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].content, "Design team meeting");

    assert!(store.visible_tasks(DEFAULT_LIST_ID, "zebra").is_empty());
}

#[test]
fn search_query_is_transient() {
    let mut store = seeded();
    store.set_search_query("work");
    assert_eq!(store.snapshot().search_query, "work");

    store.toggle_task("2").unwrap();
    let blob = store.gateway().load_raw().unwrap();
    assert!(!blob.contains("searchQuery"));
}

#[test]
fn reorder_visible_maps_filtered_positions() {
    let mut store = seeded();
    store
        .add_task("meeting notes", Category::Work, "3:00 pm", None)
        .unwrap();
    store.set_search_query("meeting");
    assert_eq!(
        store.visible_index_to_underlying(DEFAULT_LIST_ID, "meeting", 1),
        Some(2)
    );

    store.reorder_visible(1, 0).unwrap();
    assert_eq!(
        top_level_contents(&store),
        vec!["work out", "meeting notes", "Design team meeting"]
    );
    assert_eq!(
        store.reorder_visible(2, 0),
        Err(NoOp::IndexOutOfRange { index: 2, len: 2 })
    );
}

#[test]
fn reorder_visible_moves_forward_past_hidden_tasks() {
    let mut store = seeded();
    let list_id = store.create_list("Errands").unwrap();
    store.set_active_list(&list_id).unwrap();
    for content in ["alpha", "beta", "alpha two", "delta"] {
        store
            .add_task(content, Category::Personal, "9:00 am", None)
            .unwrap();
    }

    store.set_search_query("alpha");
    store.reorder_visible(0, 1).unwrap();
    assert_eq!(
        top_level_contents(&store),
        vec!["beta", "alpha two", "alpha", "delta"]
    );
    let visible: Vec<String> = store
        .visible_tasks(&list_id, "alpha")
        .into_iter()
        .map(|t| t.content)
        .collect();
    assert_eq!(visible, vec!["alpha two", "alpha"]);
}

#[test]
fn skipped_commands_leave_state_untouched() {
    let mut store = seeded();
    let before = store.snapshot();

    assert_eq!(store.create_list("   "), Err(NoOp::BlankName));
    assert_eq!(
        store.add_task("  ", Category::Personal, "9:00 am", None),
        Err(NoOp::BlankContent)
    );
    assert_eq!(
        store.add_task("x", Category::Personal, "9:00 am", Some("ghost")),
        Err(NoOp::UnknownParent("ghost".to_string()))
    );
    assert_eq!(store.toggle_task("ghost"), Err(NoOp::UnknownTask("ghost".to_string())));
    assert_eq!(store.delete_task("ghost"), Err(NoOp::UnknownTask("ghost".to_string())));
    assert_eq!(
        store.set_active_list("ghost"),
        Err(NoOp::UnknownList("ghost".to_string()))
    );
    assert_eq!(store.rename_list(DEFAULT_LIST_ID, ""), Err(NoOp::BlankName));

    assert_eq!(store.snapshot(), before);
    assert!(store.gateway().load_raw().is_none());
}

#[test]
fn list_lifecycle() {
    let mut store = seeded();
    let work = store.create_list("  Work  ").unwrap();
    // An active list already existed
    assert_eq!(store.active_list_id(), Some(DEFAULT_LIST_ID));

    store.rename_list(&work, "Office").unwrap();
    store.set_active_list(&work).unwrap();
    assert_eq!(store.list(&work).unwrap().name, "Office");

    store.delete_list(&work).unwrap();
    assert_eq!(store.active_list_id(), Some(DEFAULT_LIST_ID));

    store.delete_list(DEFAULT_LIST_ID).unwrap();
    let fresh = store.create_list("Fresh start").unwrap();
    assert_eq!(store.active_list_id(), Some(fresh.as_str()));
}

#[test]
fn every_applied_command_is_saved() {
    let mut store = seeded();
    store.add_task("persist me", Category::Work, "9:00 am", None).unwrap();

    let gateway = store.into_gateway();
    let reopened = TaskStore::open(gateway);
    let contents: Vec<String> = reopened
        .list(DEFAULT_LIST_ID)
        .unwrap()
        .tasks
        .into_iter()
        .map(|t| t.content)
        .collect();
    assert_eq!(contents, vec!["work out", "Design team meeting", "persist me"]);
}

#[test]
fn save_failures_are_recorded_not_returned() {
    let mut store = TaskStore::open(BrokenGateway { attempts: 0 });

    let id = store.add_task("offline", Category::Personal, "9:00 am", None);
    assert!(id.is_ok());
    assert!(store.last_save_error().unwrap().contains("quota exceeded"));
    // In-memory state stays authoritative
    assert_eq!(store.list(DEFAULT_LIST_ID).unwrap().tasks.len(), 3);

    assert!(store.flush().is_err());
    assert_eq!(store.gateway().attempts, 2);
}
