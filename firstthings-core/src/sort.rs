//! Ordering of tasks inside a group
//!
//! Both orderings are stable: `slice::sort_by` never reorders elements that
//! compare equal, which is what keeps insertion order for ties.

use std::cmp::Ordering;

use crate::task::Task;

/// Quadrant ordering: open before done, dated before undated, earlier
/// due date first. Completed tasks tie with each other.
pub fn quadrant_order(a: &Task, b: &Task) -> Ordering {
    match (a.completed, b.completed) {
        (false, true) => return Ordering::Less,
        (true, false) => return Ordering::Greater,
        (true, true) => return Ordering::Equal,
        (false, false) => {}
    }

    match (a.due_date, b.due_date) {
        (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort tasks for display inside a quadrant
pub fn sort_for_quadrant(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| quadrant_order(a, b));
}

/// Move completed tasks to the end, otherwise keep the given order
pub fn sort_completed_last(tasks: &mut [&Task]) {
    tasks.sort_by_key(|t| t.completed);
}
