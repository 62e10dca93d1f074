//! Task domain model
//!
//! Pure domain logic for tasks with no I/O operations. Timestamps are
//! passed in by the caller so every mutation is reproducible in tests.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::date;
use crate::error::{CoreError, Result};
use crate::quadrant::{self, Quadrant};

/// Mint a fresh opaque identifier for a task or list item
pub fn mint_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A single task
///
/// `category` and `project` hold the referenced list item id, or an empty
/// string when unset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub important: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub project: String,
    #[serde(default, with = "date::optional_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Task {
    /// Create a new open task in quadrant 4 with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: mint_id(),
            title: title.into(),
            notes: String::new(),
            urgent: false,
            important: false,
            category: String::new(),
            project: String::new(),
            due_date: None,
            recurring: false,
            completed: false,
            created_at: now,
            modified_at: now,
            completed_at: None,
        }
    }

    /// Build a task from validated draft fields
    pub fn from_draft(id: impl Into<String>, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        let mut task = Self {
            id: id.into(),
            title: String::new(),
            notes: String::new(),
            urgent: false,
            important: false,
            category: String::new(),
            project: String::new(),
            due_date: None,
            recurring: false,
            completed: false,
            created_at: now,
            modified_at: now,
            completed_at: None,
        };
        task.apply_draft(draft, now);
        task
    }

    /// Builder method to set task ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder method to set notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Builder method to set the urgent/important flags
    pub fn with_flags(mut self, urgent: bool, important: bool) -> Self {
        self.urgent = urgent;
        self.important = important;
        self
    }

    /// Builder method to place the task in a quadrant
    pub fn with_quadrant(mut self, q: Quadrant) -> Self {
        quadrant::apply_quadrant(&mut self, q);
        self
    }

    /// Builder method to set the category reference
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Builder method to set the project reference
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Builder method to set the due date
    pub fn with_due_date(mut self, due: Option<NaiveDate>) -> Self {
        self.due_date = due;
        self
    }

    /// Builder method to set the recurring flag
    pub fn with_recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }

    /// Builder method to set completion status, stamping `completed_at`
    pub fn with_complete(mut self, complete: bool) -> Self {
        let at = self.modified_at;
        self.set_completed(complete, at);
        self
    }

    pub fn quadrant(&self) -> Quadrant {
        quadrant::quadrant_of(self)
    }

    pub fn has_category(&self) -> bool {
        !self.category.is_empty()
    }

    pub fn has_project(&self) -> bool {
        !self.project.is_empty()
    }

    /// Check if task is overdue relative to the given local day
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        date::is_overdue(self.due_date, self.completed, today)
    }

    /// Check if task is overdue today
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(date::today())
    }

    /// Refresh `modified_at`, never letting it fall behind `created_at`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.modified_at = now.max(self.created_at);
    }

    /// Set completion status while keeping `completed_at` consistent.
    ///
    /// A task that is already complete keeps its original completion time.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        match (self.completed, completed) {
            (false, true) => self.completed_at = Some(now),
            (true, true) => {
                self.completed_at.get_or_insert(now);
            }
            (_, false) => self.completed_at = None,
        }
        self.completed = completed;
    }

    /// Toggle completion status
    pub fn toggle_complete(&mut self, now: DateTime<Utc>) {
        self.set_completed(!self.completed, now);
        self.touch(now);
    }

    /// Overwrite the editable fields from a draft
    pub fn apply_draft(&mut self, draft: TaskDraft, now: DateTime<Utc>) {
        self.title = draft.title.trim().to_string();
        self.notes = draft.notes.trim().to_string();
        self.urgent = draft.urgent;
        self.important = draft.important;
        self.category = draft.category;
        self.project = draft.project;
        self.due_date = draft.due_date;
        self.recurring = draft.recurring;
        self.set_completed(draft.completed, now);
        self.touch(now);
    }

    /// Repair invariant violations found in loaded or imported data.
    ///
    /// Returns true when anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;

        if self.modified_at < self.created_at {
            self.modified_at = self.created_at;
            changed = true;
        }

        if self.completed && self.completed_at.is_none() {
            self.completed_at = Some(self.modified_at);
            changed = true;
        } else if !self.completed && self.completed_at.is_some() {
            self.completed_at = None;
            changed = true;
        }

        changed
    }
}

/// The user-editable fields of a task
///
/// Used for both create and edit so the caller states its intent by the
/// operation it calls, not by whether an id is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub notes: String,
    pub urgent: bool,
    pub important: bool,
    pub category: String,
    pub project: String,
    pub due_date: Option<NaiveDate>,
    pub recurring: bool,
    pub completed: bool,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Snapshot the editable fields of an existing task
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            notes: task.notes.clone(),
            urgent: task.urgent,
            important: task.important,
            category: task.category.clone(),
            project: task.project.clone(),
            due_date: task.due_date,
            recurring: task.recurring,
            completed: task.completed,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_flags(mut self, urgent: bool, important: bool) -> Self {
        self.urgent = urgent;
        self.important = important;
        self
    }

    pub fn with_quadrant(mut self, q: Quadrant) -> Self {
        (self.urgent, self.important) = q.flags();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_due_date(mut self, due: Option<NaiveDate>) -> Self {
        self.due_date = due;
        self
    }

    pub fn with_recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }

    pub fn with_complete(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// A task needs a non-blank title
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("title", "Task title must not be empty"));
        }
        Ok(())
    }
}
