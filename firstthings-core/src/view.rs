//! Read-only groupings of the task list
//!
//! Every projection borrows the tasks it is given and places each task in
//! exactly one group. Nothing here mutates the store.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

use crate::list::{ListItem, ListKind, ListRegistry};
use crate::quadrant::Quadrant;
use crate::sort::{sort_completed_last, sort_for_quadrant};
use crate::task::Task;

/// The three ways of looking at the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewKind {
    #[default]
    Quadrant,
    Category,
    Project,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quadrant => f.write_str("quadrant"),
            Self::Category => f.write_str("category"),
            Self::Project => f.write_str("project"),
        }
    }
}

/// Tasks of one quadrant in display order
#[derive(Debug, Clone)]
pub struct QuadrantGroup<'a> {
    pub quadrant: Quadrant,
    pub tasks: Vec<&'a Task>,
}

/// Tasks sharing a category or project
///
/// `item` is `None` for the synthetic "Uncategorized" / "No Project" group.
#[derive(Debug, Clone)]
pub struct ListGroup<'a> {
    pub kind: ListKind,
    pub item: Option<&'a ListItem>,
    pub tasks: Vec<&'a Task>,
}

impl ListGroup<'_> {
    pub fn name(&self) -> &str {
        match self.item {
            Some(item) => &item.name,
            None => self.kind.none_label(),
        }
    }

    /// Id of the list item, empty for the synthetic group
    pub fn key(&self) -> &str {
        self.item.map(|i| i.id.as_str()).unwrap_or("")
    }

    pub fn color(&self) -> Option<&str> {
        self.item.map(|i| i.color.as_str())
    }
}

/// Four groups, one per quadrant in order 1-4, each sorted for display.
/// Empty quadrants are kept.
pub fn by_quadrant(tasks: &[Task]) -> [QuadrantGroup<'_>; 4] {
    Quadrant::ALL.map(|quadrant| {
        let mut members: Vec<&Task> = tasks.iter().filter(|t| t.quadrant() == quadrant).collect();
        sort_for_quadrant(&mut members);
        QuadrantGroup {
            quadrant,
            tasks: members,
        }
    })
}

/// Group by category, "Uncategorized" first, then registry order
pub fn by_category<'a>(tasks: &'a [Task], categories: &'a ListRegistry) -> Vec<ListGroup<'a>> {
    group_by_list(tasks, categories, ListKind::Category, |t| &t.category)
}

/// Group by project, "No Project" first, then registry order
pub fn by_project<'a>(tasks: &'a [Task], projects: &'a ListRegistry) -> Vec<ListGroup<'a>> {
    group_by_list(tasks, projects, ListKind::Project, |t| &t.project)
}

fn group_by_list<'a>(
    tasks: &'a [Task],
    registry: &'a ListRegistry,
    kind: ListKind,
    reference: fn(&Task) -> &str,
) -> Vec<ListGroup<'a>> {
    // Slot 0 is the synthetic group. An item with an empty id can never be
    // referenced, since an empty reference means "none".
    let slots: HashMap<&str, usize> = registry
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.id.is_empty())
        .map(|(i, item)| (item.id.as_str(), i + 1))
        .collect();

    let mut buckets: Vec<Vec<&Task>> = vec![Vec::new(); registry.len() + 1];
    for task in tasks {
        let slot = slots.get(reference(task)).copied().unwrap_or(0);
        buckets[slot].push(task);
    }

    let items = std::iter::once(None).chain(registry.iter().map(Some));

    items
        .zip(buckets)
        .filter(|(_, members)| !members.is_empty())
        .map(|(item, mut members)| {
            sort_completed_last(&mut members);
            ListGroup {
                kind,
                item,
                tasks: members,
            }
        })
        .collect()
}

/// A display tag attached to a rendered task
#[derive(Debug, Clone, PartialEq)]
pub enum Badge<'a> {
    Due { date: NaiveDate, overdue: bool },
    Urgent,
    Important,
    List { kind: ListKind, item: &'a ListItem },
    Recurring,
}

/// Which badges a task shows in a given view.
///
/// The quadrant view already conveys urgency, so it shows both list tags
/// instead. The list views show the flags plus the other list's tag.
/// References that no longer resolve produce no tag.
pub fn badges<'a>(
    task: &Task,
    view: ViewKind,
    categories: &'a ListRegistry,
    projects: &'a ListRegistry,
    today: NaiveDate,
) -> Vec<Badge<'a>> {
    let mut out = Vec::new();

    if let Some(date) = task.due_date {
        out.push(Badge::Due {
            date,
            overdue: task.is_overdue_on(today),
        });
    }

    let category = task
        .has_category()
        .then(|| categories.get(&task.category))
        .flatten()
        .map(|item| Badge::List {
            kind: ListKind::Category,
            item,
        });
    let project = task
        .has_project()
        .then(|| projects.get(&task.project))
        .flatten()
        .map(|item| Badge::List {
            kind: ListKind::Project,
            item,
        });

    match view {
        ViewKind::Quadrant => {
            out.extend(category);
            out.extend(project);
        }
        ViewKind::Category | ViewKind::Project => {
            if task.urgent {
                out.push(Badge::Urgent);
            }
            if task.important {
                out.push(Badge::Important);
            }
            if view == ViewKind::Category {
                out.extend(project);
            } else {
                out.extend(category);
            }
        }
    }

    if task.recurring {
        out.push(Badge::Recurring);
    }

    out
}
