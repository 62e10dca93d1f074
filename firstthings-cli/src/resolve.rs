//! Turning command-line arguments into ids, dates and list references

use chrono::NaiveDate;

use firstthings_core::date::{parse_date_relative_to, today};
use firstthings_core::{ListItem, ListKind, Task, TaskStore};

use crate::error::{CliError, Result};

/// Argument value that clears an optional field
pub const NONE_ARG: &str = "none";

fn is_none_arg(arg: &str) -> bool {
    arg.trim().eq_ignore_ascii_case(NONE_ARG)
}

/// Full id for an exact id or a unique prefix of one
pub fn task_id(store: &TaskStore, arg: &str) -> Result<String> {
    if let Some(task) = store.task(arg) {
        return Ok(task.id.clone());
    }

    match store.tasks_with_id_prefix(arg).as_slice() {
        [] => Err(CliError::TaskNotFound(arg.to_string())),
        [task] => Ok(task.id.clone()),
        _ => Err(CliError::AmbiguousId(arg.to_string())),
    }
}

/// List item by id, case-insensitive name, or unique id prefix
pub fn list_item(store: &TaskStore, kind: ListKind, arg: &str) -> Result<ListItem> {
    let registry = store.registry(kind);
    if let Some(item) = registry.find(arg) {
        return Ok(item.clone());
    }

    let matches: Vec<&ListItem> = registry.iter().filter(|i| i.id.starts_with(arg)).collect();
    match matches.as_slice() {
        [item] if !arg.is_empty() => Ok((*item).clone()),
        _ => Err(CliError::ListItemNotFound {
            kind,
            id: arg.to_string(),
        }),
    }
}

/// New value for a task's category/project: unchanged, cleared, or resolved
pub fn reference(
    store: &TaskStore,
    kind: ListKind,
    arg: Option<&str>,
    current: &str,
) -> Result<String> {
    match arg {
        None => Ok(current.to_string()),
        Some(arg) if is_none_arg(arg) => Ok(String::new()),
        Some(arg) => Ok(list_item(store, kind, arg)?.id),
    }
}

/// New value for an optional date: unchanged, cleared, or parsed
pub fn date(arg: Option<&str>, current: Option<NaiveDate>) -> Result<Option<NaiveDate>> {
    date_relative_to(arg, current, today())
}

pub fn date_relative_to(
    arg: Option<&str>,
    current: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<Option<NaiveDate>> {
    match arg {
        None => Ok(current),
        Some(arg) if is_none_arg(arg) => Ok(None),
        Some(arg) => Ok(Some(parse_date_relative_to(arg, today)?)),
    }
}

/// The id a task holds for the given list kind
pub fn task_reference(task: &Task, kind: ListKind) -> &str {
    match kind {
        ListKind::Category => &task.category,
        ListKind::Project => &task.project,
    }
}

/// Number of tasks pointing at a list item
pub fn usage_count(store: &TaskStore, kind: ListKind, id: &str) -> usize {
    store
        .tasks()
        .iter()
        .filter(|t| task_reference(t, kind) == id)
        .count()
}
