use tdl::codec::{self, CodecError};
use tdl::models::{Task, TodoList, TodoState};
use tdl::{BlobGateway, Category, MemoryStore, TaskStore};

fn nested_state() -> TodoState {
    let mut parent = Task::new(
        "p".to_string(),
        "plan trip".to_string(),
        "7:15 pm".to_string(),
        Category::Personal,
    );
    let mut child = Task::new(
        "c".to_string(),
        "book hotel".to_string(),
        "7:16 pm".to_string(),
        Category::Work,
    );
    child.completed = true;
    child.subtasks.push(Task::new(
        "g".to_string(),
        "compare prices".to_string(),
        "7:17 pm".to_string(),
        Category::Freelance,
    ));
    parent.subtasks.push(child);

    TodoState {
        lists: vec![
            TodoList {
                id: "trip".to_string(),
                name: "Trip".to_string(),
                tasks: vec![parent],
            },
            TodoList::new("empty".to_string(), "Empty".to_string()),
        ],
        active_list_id: Some("empty".to_string()),
        search_query: String::new(),
    }
}

#[test]
fn decode_of_encode_is_identity() {
    let state = nested_state();
    let blob = codec::encode(&state).unwrap();
    assert_eq!(codec::decode(&blob).unwrap(), state);

    let pretty = codec::encode_pretty(&state).unwrap();
    assert_eq!(codec::decode(&pretty).unwrap(), state);
}

#[test]
fn reachable_store_state_round_trips() {
    let mut store = TaskStore::open(BlobGateway::new(MemoryStore::new()));
    let list = store.create_list("Errands").unwrap();
    store.set_active_list(&list).unwrap();
    let parent = store
        .add_task("post office", Category::Personal, "11:00 am", None)
        .unwrap();
    store
        .add_task("stamps", Category::Personal, "11:05 am", Some(&parent))
        .unwrap();
    store.toggle_task(&parent).unwrap();
    store.set_search_query("post");

    let snapshot = store.snapshot();
    let decoded = codec::decode(&codec::encode(&snapshot).unwrap()).unwrap();
    assert_eq!(decoded.lists, snapshot.lists);
    assert_eq!(decoded.active_list_id, snapshot.active_list_id);
    assert_eq!(decoded.search_query, "");
}

#[test]
fn unversioned_document_is_migrated() {
    let blob = r#"{
        "lists": [
            {"id": "default", "name": "Today Tasks", "tasks": [
                {"id": "1", "content": "work out", "time": "8:00 am",
                 "category": "personal", "completed": true}
            ]},
            {"id": "l2", "name": "Later", "tasks": []}
        ],
        "activeList": "l2",
        "searchQuery": "work"
    }"#;

    let state = codec::decode(blob).unwrap();
    assert_eq!(state.active_list_id.as_deref(), Some("l2"));
    assert_eq!(state.search_query, "");
    assert!(state.lists[0].tasks[0].subtasks.is_empty());

    let rewritten = codec::encode(&state).unwrap();
    assert!(rewritten.contains("\"version\":1"));
    assert!(rewritten.contains("\"activeListId\":\"l2\""));
    assert!(!rewritten.contains("activeList\""));
}

#[test]
fn version_zero_accepts_active_list_id_key() {
    let blob = r#"{"lists":[{"id":"a","name":"A"}],"activeListId":"a"}"#;
    let state = codec::decode(blob).unwrap();
    assert_eq!(state.active_list_id.as_deref(), Some("a"));
    assert!(state.lists[0].tasks.is_empty());
}

#[test]
fn corrupt_documents_are_rejected() {
    assert!(matches!(codec::decode("not json"), Err(CodecError::Json(_))));
    assert!(matches!(codec::decode("[1, 2]"), Err(CodecError::NotAnObject)));
    assert!(matches!(
        codec::decode(r#"{"version":"one","lists":[]}"#),
        Err(CodecError::InvalidVersion)
    ));
    // Wrong shape: task is missing its category
    assert!(matches!(
        codec::decode(
            r#"{"version":1,"lists":[{"id":"a","name":"A","tasks":[{"id":"1","content":"x","time":"t","completed":false}]}],"activeListId":"a"}"#
        ),
        Err(CodecError::Json(_))
    ));
    assert!(matches!(
        codec::decode(r#"{"version":1,"lists":[{"id":"a","name":"A","tasks":[{"id":"1","content":"x","time":"t","category":"hobby","completed":false}]}]}"#),
        Err(CodecError::Json(_))
    ));
}

#[test]
fn duplicate_ids_are_rejected() {
    let lists = r#"{"version":1,"lists":[{"id":"a","name":"A"},{"id":"a","name":"B"}]}"#;
    assert!(matches!(
        codec::decode(lists),
        Err(CodecError::DuplicateListId(id)) if id == "a"
    ));

    let tasks = r#"{"version":1,"lists":[{"id":"a","name":"A","tasks":[
        {"id":"1","content":"x","time":"t","category":"work","completed":false,
         "subtasks":[{"id":"1","content":"y","time":"t","category":"work","completed":false}]}
    ]}]}"#;
    assert!(matches!(
        codec::decode(tasks),
        Err(CodecError::InvalidTree { list_id, .. }) if list_id == "a"
    ));
}

#[test]
fn empty_document_has_no_active_list() {
    let state = codec::decode(r#"{"version":1,"lists":[],"activeListId":null}"#).unwrap();
    assert!(state.lists.is_empty());
    assert_eq!(state.active_list_id, None);
}
