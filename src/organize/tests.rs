use chrono::Weekday;

use super::*;

type MemoryTaskStore = TaskStore<KvTaskRepository<MemoryStore>>;

fn new_store() -> MemoryTaskStore {
    TaskStore::new(KvTaskRepository::new(MemoryStore::new()))
}

/// Same storage, fresh in-memory state.
fn reopen(store: &MemoryTaskStore) -> MemoryTaskStore {
    TaskStore::open(KvTaskRepository::new(store.repository().store().clone()))
}

fn ids(tasks: &[&Task]) -> Vec<TaskId> {
    tasks.iter().map(|task| task.id().clone()).collect()
}

#[test]
fn test_add_save_reload() {
    let mut store = new_store();
    let id = store.add("Read", "10", Category::Daily).unwrap();

    let reloaded = reopen(&store);
    let today = reloaded.today_tasks(Weekday::Tue);
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].id(), &id);
    assert_eq!(today[0].title(), "Read");
    assert_eq!(today[0].duration(), 10);
    assert_eq!(today[0].category(), Category::Daily);
    assert!(!today[0].is_completed);
}

#[test]
fn test_add_rejects_invalid_input() {
    let mut store = new_store();
    assert!(matches!(store.add("", "10", Category::Daily), Err(StoreError::InvalidTitle)));
    assert!(matches!(store.add("Read", "ten", Category::Daily), Err(StoreError::InvalidDuration(_))));
    assert!(matches!(store.add("Read", "0", Category::Daily), Err(StoreError::InvalidDuration(_))));
    assert!(matches!(store.add("Read", "-3", Category::Daily), Err(StoreError::InvalidDuration(_))));
    assert!(store.is_empty());
    assert_eq!(store.repository().store().keys().count(), 0);
}

#[test]
fn test_complete_survives_reload() {
    let mut store = new_store();
    let id = store.add("Read", "10", Category::Daily).unwrap();
    assert_eq!(store.complete(&id).unwrap(), true);

    let reloaded = reopen(&store);
    assert!(reloaded.get(&id).unwrap().is_completed);
}

#[test]
fn test_remove() {
    let mut store = new_store();
    let keep = store.add("Read", "10", Category::Daily).unwrap();
    let gone = store.add("Gym", "45", Category::Weekly(Weekday::Mon)).unwrap();

    assert_eq!(store.remove(&gone).unwrap(), true);
    assert_eq!(store.remove(&gone).unwrap(), false);
    assert_eq!(store.complete(&gone).unwrap(), false);

    let reloaded = reopen(&store);
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.get(&keep).is_some());
    assert!(reloaded.tasks_in(Category::Weekly(Weekday::Mon)).is_empty());
}

#[test]
fn test_today_view_merges_daily_and_weekday() {
    let mut store = new_store();
    let daily = store.add("Read", "10", Category::Daily).unwrap();
    let monday = store.add("Gym", "45", Category::Weekly(Weekday::Mon)).unwrap();
    let thursday = store.add("Piano", "30", Category::Weekly(Weekday::Thu)).unwrap();

    assert_eq!(ids(&store.today_tasks(Weekday::Mon)), vec![daily.clone(), monday.clone()]);
    assert_eq!(ids(&store.today_tasks(Weekday::Thu)), vec![daily.clone(), thursday.clone()]);
    assert_eq!(ids(&store.today_tasks(Weekday::Sun)), vec![daily]);
    assert_eq!(ids(&store.tasks_in(Category::Weekly(Weekday::Mon))), vec![monday]);
}

#[test]
fn test_save_writes_every_category() {
    let mut store = new_store();
    store.add("Read", "10", Category::Daily).unwrap();

    let keys: Vec<&str> = store.repository().store().keys().collect();
    println!("Keys after add: {keys:?}");
    assert_eq!(keys.len(), 8);
    for category in Category::ALL {
        assert!(keys.contains(&category.storage_key().as_str()));
    }
}

#[test]
fn test_save_clears_stale_partition() {
    let mut store = new_store();
    let id = store.add("Gym", "45", Category::Weekly(Weekday::Sat)).unwrap();
    assert!(store.remove(&id).is_ok());

    let raw = store.repository().store().get("weeklyTasks_Sa").unwrap().unwrap();
    assert!(decode_tasks("weeklyTasks_Sa", &raw).is_empty());
}

#[test]
fn test_round_trip_many_categories() {
    let mut store = new_store();
    for (index, category) in Category::ALL.iter().cycle().take(21).enumerate() {
        let id = store.add(&format!("Task {index}"), &(index + 1).to_string(), *category).unwrap();
        if index % 3 == 0 {
            store.complete(&id).unwrap();
        }
    }

    let reloaded = reopen(&store);
    assert_eq!(reloaded.len(), store.len());
    for category in Category::ALL {
        let before: Vec<Task> = store.tasks_in(category).into_iter().cloned().collect();
        let after: Vec<Task> = reloaded.tasks_in(category).into_iter().cloned().collect();
        assert_eq!(before, after);
    }
}

#[test]
fn test_load_skips_duplicate_ids() {
    let task = Task::new("Read", 10, Category::Daily).unwrap();
    let mut repository = KvTaskRepository::new(MemoryStore::new());
    repository.save(Category::Daily, &[task.clone()]).unwrap();
    repository.save(Category::Weekly(Weekday::Wed), &[task.clone()]).unwrap();

    let store = TaskStore::open(repository);
    assert_eq!(store.len(), 1);
    assert_eq!(store.today_tasks(Weekday::Wed).len(), 1);
}

#[test]
fn test_load_drops_malformed_records() {
    let mut store = MemoryStore::new();
    store.set("dailyTasks", "\
- id: one
  title: Read
  duration: 10
  isCompleted: false
  category: D
- id: two
  title: Walk
  isCompleted: false
  category: D
- id: three
  title: Write
  duration: 15
  isCompleted: true
  category: D
".to_string()).unwrap();

    let store = TaskStore::open(KvTaskRepository::new(store));
    assert_eq!(store.len(), 2);
    assert!(store.get(&TaskId("two".to_string())).is_none());
}

#[test]
fn test_failed_save_is_reported() {
    let mut store = new_store();
    store.repository_mut().store_mut().set_read_only(true);
    assert!(matches!(store.add("Read", "10", Category::Daily), Err(StoreError::Storage(_))));
}

#[test]
fn test_failed_save_leaves_tasks_unchanged() {
    let mut store = new_store();
    let id = store.add("Read", "10", Category::Daily).unwrap();
    store.repository_mut().store_mut().set_read_only(true);

    assert!(store.add("Walk", "20", Category::Daily).is_err());
    assert_eq!(store.len(), 1);
    println!("After failed add: {store:#?}");

    assert!(store.remove(&id).is_err());
    assert!(store.get(&id).is_some());

    assert!(store.complete(&id).is_err());
    assert!(!store.get(&id).unwrap().is_completed);

    store.repository_mut().store_mut().set_read_only(false);
    let walk = store.add("Walk", "20", Category::Daily).unwrap();
    let reloaded = reopen(&store);
    assert_eq!(reloaded.len(), 2);
    assert!(reloaded.get(&walk).is_some());
    assert!(!reloaded.get(&id).unwrap().is_completed);
}

#[test]
fn test_failed_rollover_keeps_completion() {
    let mut store = new_store();
    let id = store.add("Read", "10", Category::Daily).unwrap();
    store.complete(&id).unwrap();

    store.repository_mut().store_mut().set_read_only(true);
    assert!(store.reset_daily(Weekday::Mon).is_err());
    assert!(store.get(&id).unwrap().is_completed);
}

#[test]
fn test_mark_incomplete_unknown_task() {
    let mut store = new_store();
    assert!(!store.mark_incomplete(&TaskId("missing".to_string())));
}

#[test]
fn test_rollover_resets_daily_tasks_only() {
    let mut store = new_store();
    let daily = store.add("Read", "10", Category::Daily).unwrap();
    let monday = store.add("Gym", "45", Category::Weekly(Weekday::Mon)).unwrap();
    let tuesday = store.add("Piano", "30", Category::Weekly(Weekday::Tue)).unwrap();

    assert_eq!(store.activate(Weekday::Mon).unwrap(), RolloverState::Stale);
    for id in [&daily, &monday, &tuesday] {
        store.complete(id).unwrap();
    }

    assert_eq!(store.activate(Weekday::Tue).unwrap(), RolloverState::Stale);
    assert!(!store.get(&daily).unwrap().is_completed);
    assert!(store.get(&monday).unwrap().is_completed);
    assert!(store.get(&tuesday).unwrap().is_completed);

    let reloaded = reopen(&store);
    assert!(!reloaded.get(&daily).unwrap().is_completed);
    assert!(reloaded.get(&monday).unwrap().is_completed);
    assert_eq!(reloaded.repository().last_reset_day(), Some("T".to_string()));
}

#[test]
fn test_rollover_is_idempotent() {
    let mut store = new_store();
    let id = store.add("Read", "10", Category::Daily).unwrap();

    assert_eq!(store.reset_daily(Weekday::Fri).unwrap(), RolloverState::Stale);
    assert_eq!(store.rollover_state(Weekday::Fri), RolloverState::Fresh);
    store.complete(&id).unwrap();

    let snapshot = store.repository().store().clone();
    assert_eq!(store.reset_daily(Weekday::Fri).unwrap(), RolloverState::Fresh);
    assert!(store.get(&id).unwrap().is_completed);
    let after: Vec<(&str, Option<String>)> = snapshot.keys()
        .map(|key| (key, store.repository().store().get(key).unwrap()))
        .collect();
    for (key, value) in after {
        assert_eq!(snapshot.get(key).unwrap(), value);
    }
}

#[test]
fn test_rollover_keeps_marker_when_save_fails() {
    let mut store = new_store();
    let id = store.add("Read", "10", Category::Daily).unwrap();
    store.complete(&id).unwrap();

    store.repository_mut().store_mut().set_read_only(true);
    assert!(store.reset_daily(Weekday::Sat).is_err());
    assert_eq!(store.repository().last_reset_day(), None);

    store.repository_mut().store_mut().set_read_only(false);
    assert_eq!(store.reset_daily(Weekday::Sat).unwrap(), RolloverState::Stale);
    assert_eq!(store.rollover_state(Weekday::Sat), RolloverState::Fresh);
}

#[test]
fn test_category_fixed_through_lifecycle() {
    let mut store = new_store();
    let id = store.add("Gym", "45", Category::Weekly(Weekday::Wed)).unwrap();
    store.complete(&id).unwrap();
    store.reset_daily(Weekday::Thu).unwrap();

    let reloaded = reopen(&store);
    assert_eq!(reloaded.get(&id).unwrap().category(), Category::Weekly(Weekday::Wed));
}

#[test]
fn test_file_backed_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("organize.yaml");

    let mut store = TaskStore::open(KvTaskRepository::new(YamlFileStore::open(&path).unwrap()));
    let id = store.add("Read", "10", Category::Daily).unwrap();
    store.complete(&id).unwrap();
    store.activate(Weekday::Sun).unwrap();

    let reloaded = TaskStore::open(KvTaskRepository::new(YamlFileStore::open(&path).unwrap()));
    println!("Reloaded: {reloaded:#?}");
    assert!(!reloaded.get(&id).unwrap().is_completed);
    assert_eq!(reloaded.rollover_state(Weekday::Sun), RolloverState::Fresh);
}
