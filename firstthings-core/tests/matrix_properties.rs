use chrono::NaiveDate;
use std::collections::HashMap;

use firstthings_core::{
    ListItem, ListKind, MemoryPersistence, Quadrant, Session, Task, TaskDraft, TaskStore,
    apply_quadrant, by_category, by_project, by_quadrant, quadrant_of, sort_for_quadrant,
};

fn due(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Every combination of flags, completion and due date
fn mixed_tasks() -> Vec<Task> {
    let dates = [None, due(2024, 3, 1), due(2024, 2, 1)];
    let lists = ["", "work", "home", "stale"];
    let mut tasks = Vec::new();

    for (n, (urgent, important, completed)) in [
        (true, true, false),
        (true, false, true),
        (false, true, false),
        (false, false, true),
        (true, true, true),
        (false, true, false),
    ]
    .into_iter()
    .enumerate()
    {
        for (d, date) in dates.iter().enumerate() {
            let list = lists[(n + d) % lists.len()];
            tasks.push(
                Task::new(format!("task {n}-{d}"))
                    .with_id(format!("{n}-{d}"))
                    .with_flags(urgent, important)
                    .with_due_date(*date)
                    .with_category(list)
                    .with_project(lists[(n * 3 + d) % lists.len()])
                    .with_complete(completed),
            );
        }
    }

    tasks
}

fn registry_store() -> TaskStore {
    let mut store = TaskStore::new();
    for kind in [ListKind::Category, ListKind::Project] {
        store
            .create_list_item(kind, ListItem::new("work", "Work", "#AEE7B1"))
            .unwrap();
        store
            .create_list_item(kind, ListItem::new("home", "Home", "#ABBEE1"))
            .unwrap();
    }
    store
}

#[test]
fn quadrant_is_determined_by_flags() {
    for urgent in [false, true] {
        for important in [false, true] {
            let task = Task::new("t").with_flags(urgent, important);
            let q = quadrant_of(&task);
            assert!((1..=4).contains(&q.number()));
            assert_eq!(q, Quadrant::classify(urgent, important));
        }
    }
}

#[test]
fn apply_quadrant_round_trips_from_every_start() {
    for start in Quadrant::ALL {
        for target in Quadrant::ALL {
            let mut task = Task::new("t").with_quadrant(start);
            apply_quadrant(&mut task, target);
            assert_eq!(quadrant_of(&task), target);
        }
    }
}

#[test]
fn reference_sort_example() {
    let a = Task::new("A").with_id("A").with_due_date(due(2024, 3, 10));
    let b = Task::new("B").with_id("B");
    let c = Task::new("C").with_id("C").with_due_date(due(2024, 3, 5));
    let d = Task::new("D")
        .with_id("D")
        .with_due_date(due(2024, 3, 1))
        .with_complete(true);

    let mut sorted = vec![&a, &b, &c, &d];
    sort_for_quadrant(&mut sorted);

    let ids: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["C", "A", "B", "D"]);
}

#[test]
fn quadrant_sort_puts_completed_last_and_is_idempotent() {
    let tasks = mixed_tasks();
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sort_for_quadrant(&mut sorted);

    let first_done = sorted.iter().position(|t| t.completed).unwrap();
    assert!(sorted[first_done..].iter().all(|t| t.completed));
    assert!(sorted[..first_done].iter().all(|t| !t.completed));

    let mut again = sorted.clone();
    sort_for_quadrant(&mut again);
    assert!(sorted.iter().zip(&again).all(|(x, y)| std::ptr::eq(*x, *y)));
}

#[test]
fn every_task_lands_in_exactly_one_group_per_projection() {
    let store = registry_store();
    let tasks = mixed_tasks();

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for group in by_quadrant(&tasks) {
        for task in group.tasks {
            assert_eq!(task.quadrant(), group.quadrant);
            *seen.entry(task.id.as_str()).or_default() += 1;
        }
    }
    assert_eq!(seen.len(), tasks.len());
    assert!(seen.values().all(|&n| n == 1));

    for groups in [
        by_category(&tasks, store.categories()),
        by_project(&tasks, store.projects()),
    ] {
        assert!(groups.iter().all(|g| !g.tasks.is_empty()));

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for group in &groups {
            for task in &group.tasks {
                *seen.entry(task.id.as_str()).or_default() += 1;
            }
        }
        assert_eq!(seen.len(), tasks.len());
        assert!(seen.values().all(|&n| n == 1));

        // Stale "stale" references went to the synthetic group
        assert!(groups[0].item.is_none());
    }
}

#[test]
fn deleting_category_clears_three_references() {
    let mut session = Session::open(MemoryPersistence::new());
    let work = session
        .create_list_item(ListKind::Category, ListItem::new("work", "Work", "#AEE7B1"))
        .unwrap();

    let mut ids = Vec::new();
    for title in ["one", "two", "three"] {
        let task = session
            .create_task(TaskDraft::new(title).with_category(&work.id))
            .unwrap();
        ids.push(task.id);
    }

    let (_, cleared) = session
        .delete_list_item(ListKind::Category, &work.id)
        .unwrap()
        .unwrap();

    assert_eq!(cleared, 3);
    assert!(session.store().categories().get(&work.id).is_none());
    for id in &ids {
        assert_eq!(session.store().task(id).unwrap().category, "");
    }

    // The cleared state is what got persisted
    let reloaded = TaskStore::load_from(session.persistence());
    assert!(reloaded.tasks().iter().all(|t| t.category.is_empty()));
}

#[test]
fn reorder_drag_onto_first_item() {
    let mut store = TaskStore::new();
    for id in ["x", "y", "z"] {
        store
            .create_list_item(ListKind::Project, ListItem::new(id, id, "#000000"))
            .unwrap();
    }

    assert!(store.reorder_list_items(ListKind::Project, "y", "x"));

    let order: Vec<&str> = store.projects().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(order, ["y", "x", "z"]);
}

#[test]
fn import_without_projects_yields_empty_projects() {
    let mut store = registry_store();
    let summary = store
        .import_json(r#"{"tasks": [], "categories": [], "settings": {}}"#)
        .unwrap();

    assert_eq!(summary.projects, 0);
    assert!(store.projects().is_empty());
}

#[test]
fn save_then_load_is_identical() {
    let mut session = Session::open(MemoryPersistence::new());
    session
        .create_list_item(ListKind::Category, ListItem::new("b", "B", "#AEE7B1"))
        .unwrap();
    session
        .create_list_item(ListKind::Category, ListItem::new("a", "A", "#ABBEE1"))
        .unwrap();
    session
        .create_task(
            TaskDraft::new("Dated")
                .with_due_date(due(2024, 3, 15))
                .with_category("a")
                .with_notes("line one\nline two"),
        )
        .unwrap();
    let done = session.create_task(TaskDraft::new("Done")).unwrap();
    session.toggle_complete(&done.id).unwrap();
    session.toggle_theme().unwrap();

    let (store, persistence) = session.into_parts();
    let blob = persistence.blob().unwrap().to_string();
    let reopened = Session::open(MemoryPersistence::with_blob(blob.clone()));

    assert_eq!(reopened.store(), &store);
    assert_eq!(reopened.store().to_blob().unwrap(), blob);
}
