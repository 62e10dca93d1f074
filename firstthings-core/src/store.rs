//! In-memory task graph
//!
//! `TaskStore` owns tasks, categories, projects and settings. It is a pure
//! domain model: persistence goes through the [`Persistence`] trait and
//! always moves the whole graph at once.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::list::{ListItem, ListKind, ListRegistry, Upsert};
use crate::persist::Persistence;
use crate::quadrant::{Quadrant, apply_quadrant};
use crate::settings::Settings;
use crate::task::{Task, TaskDraft, mint_id};

/// Version tag written into export documents
pub const EXPORT_VERSION: &str = "1.0";

/// The full data graph
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    categories: ListRegistry,
    projects: ListRegistry,
    settings: Settings,
}

/// Export document: the graph plus metadata that import ignores
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    #[serde(flatten)]
    pub store: &'a TaskStore,
    pub export_date: String,
    pub version: &'static str,
}

/// Shape accepted by import; every top-level field is optional
#[derive(Deserialize, Debug)]
struct ImportDocument {
    tasks: Option<Vec<Task>>,
    categories: Option<Vec<ListItem>>,
    projects: Option<Vec<ListItem>>,
    settings: Option<Settings>,
}

/// What an import replaced the graph with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub tasks: usize,
    pub categories: usize,
    pub projects: usize,
    pub settings_replaced: bool,
}

impl TaskStore {
    /// Create an empty store with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get or return error if task not found
    pub fn task_or_err(&self, id: &str) -> Result<&Task> {
        self.task(id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))
    }

    fn task_mut_or_err(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))
    }

    pub fn categories(&self) -> &ListRegistry {
        &self.categories
    }

    pub fn projects(&self) -> &ListRegistry {
        &self.projects
    }

    pub fn registry(&self, kind: ListKind) -> &ListRegistry {
        match kind {
            ListKind::Category => &self.categories,
            ListKind::Project => &self.projects,
        }
    }

    fn registry_mut(&mut self, kind: ListKind) -> &mut ListRegistry {
        match kind {
            ListKind::Category => &mut self.categories,
            ListKind::Project => &mut self.projects,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Count completed tasks
    pub fn count_completed(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Count tasks overdue as of the given local day
    pub fn count_overdue(&self, today: NaiveDate) -> usize {
        self.tasks.iter().filter(|t| t.is_overdue_on(today)).count()
    }

    /// Tasks whose id starts with `prefix`
    pub fn tasks_with_id_prefix(&self, prefix: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.id.starts_with(prefix)).collect()
    }

    // Tasks

    /// Add a new task with a freshly minted id
    pub fn create_task(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> Result<&Task> {
        draft.validate()?;
        self.validate_reference(ListKind::Category, &draft.category)?;
        self.validate_reference(ListKind::Project, &draft.project)?;
        let task = Task::from_draft(mint_id(), draft, now);
        debug!(id = %task.id, quadrant = %task.quadrant(), "task created");
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Overwrite the editable fields of an existing task.
    ///
    /// Only references the edit changes are checked, so a task holding a
    /// stale category or project stays editable.
    pub fn update_task(&mut self, id: &str, draft: TaskDraft, now: DateTime<Utc>) -> Result<&Task> {
        draft.validate()?;
        let current = self.task_or_err(id)?;
        if draft.category != current.category {
            self.validate_reference(ListKind::Category, &draft.category)?;
        }
        if draft.project != current.project {
            self.validate_reference(ListKind::Project, &draft.project)?;
        }

        let task = self.task_mut_or_err(id)?;
        task.apply_draft(draft, now);
        debug!(id = %task.id, "task updated");
        Ok(&*task)
    }

    /// Remove a task. Unknown ids are a no-op.
    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        debug!(id, "task deleted");
        Some(self.tasks.remove(index))
    }

    /// Move a task into another quadrant
    pub fn move_task(&mut self, id: &str, quadrant: Quadrant, now: DateTime<Utc>) -> Result<&Task> {
        let task = self.task_mut_or_err(id)?;
        apply_quadrant(task, quadrant);
        task.touch(now);
        debug!(id, %quadrant, "task moved");
        Ok(&*task)
    }

    /// Flip the completion state of a task
    pub fn toggle_complete(&mut self, id: &str, now: DateTime<Utc>) -> Result<&Task> {
        let task = self.task_mut_or_err(id)?;
        task.toggle_complete(now);
        Ok(&*task)
    }

    /// An empty reference is always fine; anything else must exist
    fn validate_reference(&self, kind: ListKind, id: &str) -> Result<()> {
        if id.is_empty() || self.registry(kind).contains(id) {
            return Ok(());
        }
        Err(CoreError::validation(
            kind.as_str(),
            format!("No {} with id '{}'", kind.as_str(), id),
        ))
    }

    // Categories and projects

    pub fn create_list_item(&mut self, kind: ListKind, item: ListItem) -> Result<&ListItem> {
        let created = self.registry_mut(kind).create(item)?;
        debug!(%kind, id = %created.id, "list item created");
        Ok(created)
    }

    pub fn update_list_item(&mut self, kind: ListKind, item: ListItem) -> Result<&ListItem> {
        self.registry_mut(kind).update(kind, item)
    }

    /// Insert-or-replace by id
    pub fn upsert_list_item(&mut self, kind: ListKind, item: ListItem) -> Upsert {
        self.registry_mut(kind).upsert(item)
    }

    /// Remove a list item and clear every task reference to it.
    ///
    /// Returns the removed item and how many tasks were cleared, or `None`
    /// when the id is unknown.
    pub fn delete_list_item(&mut self, kind: ListKind, id: &str) -> Option<(ListItem, usize)> {
        let removed = self.registry_mut(kind).remove(id)?;

        let mut cleared = 0;
        for task in &mut self.tasks {
            let reference = match kind {
                ListKind::Category => &mut task.category,
                ListKind::Project => &mut task.project,
            };
            if *reference == id {
                reference.clear();
                cleared += 1;
            }
        }

        debug!(%kind, id, cleared, "list item deleted");
        Some((removed, cleared))
    }

    /// Move `moved_id` to where `target_id` sits now
    pub fn reorder_list_items(&mut self, kind: ListKind, moved_id: &str, target_id: &str) -> bool {
        self.registry_mut(kind).reorder(moved_id, target_id)
    }

    /// Drop every task, list item and setting, theme included
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    // Serialization

    /// Serialize the whole graph
    pub fn to_blob(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CoreError::parse_with_source("Failed to serialize task graph", e))
    }

    /// Parse a stored graph, repairing task invariants
    pub fn from_blob(blob: &str) -> Result<Self> {
        let mut store: Self = serde_json::from_str(blob)
            .map_err(|e| CoreError::parse_with_source("Stored data is not a valid task graph", e))?;
        store.normalize();
        Ok(store)
    }

    /// Load from persistence, falling back to an empty store when the blob
    /// is missing, unreadable or corrupt
    pub fn load_from(persistence: &impl Persistence) -> Self {
        let blob = match persistence.read_blob() {
            Ok(Some(blob)) => blob,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!(error = %e, "could not read stored data, starting empty");
                return Self::default();
            }
        };

        match Self::from_blob(&blob) {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "stored data is corrupt, starting empty");
                Self::default()
            }
        }
    }

    /// Write the whole graph through persistence
    pub fn save_to(&self, persistence: &mut impl Persistence) -> Result<()> {
        let blob = self.to_blob()?;
        persistence
            .write_blob(&blob)
            .map_err(|e| CoreError::storage_with_source("Failed to save task graph", e))
    }

    pub fn export_document(&self, now: DateTime<Utc>) -> ExportDocument<'_> {
        ExportDocument {
            store: self,
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: EXPORT_VERSION,
        }
    }

    /// Pretty-printed export document
    pub fn export_json(&self, now: DateTime<Utc>) -> Result<String> {
        serde_json::to_string_pretty(&self.export_document(now))
            .map_err(|e| CoreError::parse_with_source("Failed to serialize export", e))
    }

    /// Replace the whole graph with an imported document.
    ///
    /// Missing collections become empty; missing settings keep the current
    /// ones. If the document does not parse, nothing changes.
    pub fn import_json(&mut self, json: &str) -> Result<ImportSummary> {
        let doc: ImportDocument = serde_json::from_str(json)
            .map_err(|e| CoreError::parse_with_source("Import file is not a valid export", e))?;
        doc.check_ids()?;

        let settings_replaced = doc.settings.is_some();
        self.tasks = doc.tasks.unwrap_or_default();
        self.categories = ListRegistry::from_items(doc.categories.unwrap_or_default());
        self.projects = ListRegistry::from_items(doc.projects.unwrap_or_default());
        if let Some(settings) = doc.settings {
            self.settings = settings;
        }
        self.normalize();

        let summary = ImportSummary {
            tasks: self.tasks.len(),
            categories: self.categories.len(),
            projects: self.projects.len(),
            settings_replaced,
        };
        debug!(?summary, "import applied");
        Ok(summary)
    }

    fn normalize(&mut self) {
        let mut repaired = 0;
        for task in &mut self.tasks {
            if task.normalize() {
                repaired += 1;
            }
        }
        if repaired > 0 {
            warn!(repaired, "repaired tasks with inconsistent timestamps");
        }

        let reassigned = reassign_ids(self.tasks.iter_mut().map(|t| &mut t.id))
            + reassign_ids(self.categories.ids_mut())
            + reassign_ids(self.projects.ids_mut());
        if reassigned > 0 {
            warn!(reassigned, "gave fresh ids to records with empty or duplicate ids");
        }
    }
}

impl ImportDocument {
    /// Every id must be non-empty and unique within its collection
    fn check_ids(&self) -> Result<()> {
        let collections = [
            ("task", self.tasks.iter().flatten().map(|t| t.id.as_str()).collect::<Vec<_>>()),
            ("category", self.categories.iter().flatten().map(|i| i.id.as_str()).collect()),
            ("project", self.projects.iter().flatten().map(|i| i.id.as_str()).collect()),
        ];

        for (what, ids) in collections {
            if let Some(bad) = first_bad_id(ids) {
                return Err(CoreError::validation(
                    "id",
                    format!("Empty or duplicate {} id '{}'", what, bad),
                ));
            }
        }
        Ok(())
    }
}

fn first_bad_id<'a>(ids: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    ids.into_iter().find(|id| id.is_empty() || !seen.insert(*id))
}

/// Mint a new id for every empty id and every repeat of an earlier one
fn reassign_ids<'a>(ids: impl Iterator<Item = &'a mut String>) -> usize {
    let mut seen = HashSet::new();
    let mut reassigned = 0;
    for id in ids {
        if id.is_empty() || seen.contains(id.as_str()) {
            *id = mint_id();
            reassigned += 1;
        }
        seen.insert(id.clone());
    }
    reassigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryPersistence;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
    }

    fn store_with_category() -> TaskStore {
        let mut store = TaskStore::new();
        store
            .create_list_item(ListKind::Category, ListItem::new("work", "Work", "#AEE7B1"))
            .unwrap();
        store
    }

    #[test]
    fn test_create_task_validates_title() {
        let mut store = TaskStore::new();
        let err = store.create_task(TaskDraft::new("  "), now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_task_rejects_unknown_references() {
        let mut store = store_with_category();
        assert!(store
            .create_task(TaskDraft::new("t").with_category("home"), now())
            .is_err());
        assert!(store
            .create_task(TaskDraft::new("t").with_project("launch"), now())
            .is_err());
        assert!(store
            .create_task(TaskDraft::new("t").with_category("work"), now())
            .is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_missing_task_is_not_found() {
        let mut store = TaskStore::new();
        let err = store
            .update_task("gone", TaskDraft::new("x"), now())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_missing_task_is_noop() {
        let mut store = TaskStore::new();
        store.create_task(TaskDraft::new("keep"), now()).unwrap();
        assert!(store.delete_task("gone").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_move_task_sets_flags_and_touches() {
        let mut store = TaskStore::new();
        let id = store.create_task(TaskDraft::new("t"), now()).unwrap().id.clone();
        let later = now() + chrono::Duration::minutes(5);

        let task = store.move_task(&id, Quadrant::Delegate, later).unwrap();

        assert!(task.urgent);
        assert!(!task.important);
        assert_eq!(task.modified_at, later);
    }

    #[test]
    fn test_delete_category_cascades() {
        let mut store = store_with_category();
        for title in ["a", "b", "c"] {
            store
                .create_task(TaskDraft::new(title).with_category("work"), now())
                .unwrap();
        }
        store.create_task(TaskDraft::new("loose"), now()).unwrap();

        let (removed, cleared) = store.delete_list_item(ListKind::Category, "work").unwrap();

        assert_eq!(removed.id, "work");
        assert_eq!(cleared, 3);
        assert!(store.categories().is_empty());
        assert!(store.tasks().iter().all(|t| t.category.is_empty()));
    }

    #[test]
    fn test_delete_project_leaves_categories_alone() {
        let mut store = store_with_category();
        store
            .create_list_item(ListKind::Project, ListItem::new("work", "Work", "#000000"))
            .unwrap();
        store
            .create_task(
                TaskDraft::new("t").with_category("work").with_project("work"),
                now(),
            )
            .unwrap();

        store.delete_list_item(ListKind::Project, "work").unwrap();

        assert_eq!(store.tasks()[0].category, "work");
        assert_eq!(store.tasks()[0].project, "");
    }

    #[test]
    fn test_blob_round_trip_preserves_order() {
        let mut store = store_with_category();
        store
            .create_list_item(ListKind::Category, ListItem::new("home", "Home", "#ABBEE1"))
            .unwrap();
        store.reorder_list_items(ListKind::Category, "home", "work");
        store.create_task(TaskDraft::new("first"), now()).unwrap();
        store
            .create_task(TaskDraft::new("second").with_complete(true), now())
            .unwrap();

        let mut persistence = MemoryPersistence::new();
        store.save_to(&mut persistence).unwrap();
        let loaded = TaskStore::load_from(&persistence);

        assert_eq!(loaded, store);
        assert_eq!(loaded.categories().items()[0].id, "home");
    }

    #[test]
    fn test_load_tolerates_corrupt_blob() {
        let persistence = MemoryPersistence::with_blob("{ not json");
        assert_eq!(TaskStore::load_from(&persistence), TaskStore::default());

        let empty = MemoryPersistence::new();
        assert_eq!(TaskStore::load_from(&empty), TaskStore::default());
    }

    #[test]
    fn test_save_failure_is_storage_error() {
        let store = TaskStore::new();
        let mut persistence = MemoryPersistence::failing();
        let err = store.save_to(&mut persistence).unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }));
    }

    #[test]
    fn test_export_has_metadata() {
        let store = store_with_category();
        let json = store.export_json(now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["exportDate"], "2024-03-15T09:30:00.000Z");
        assert_eq!(value["categories"][0]["name"], "Work");
        assert!(value["settings"]["q1"].is_object());
    }

    #[test]
    fn test_import_missing_projects_and_settings() {
        let mut store = TaskStore::new();
        store.settings_mut().toggle_theme();
        let doc = r#"{
            "tasks": [{"id": "1", "title": "Imported", "urgent": true, "important": true,
                       "createdAt": "2024-03-01T00:00:00Z", "modifiedAt": "2024-03-01T00:00:00Z"}],
            "categories": [],
            "exportDate": "2024-03-01T00:00:00Z",
            "version": "0.9"
        }"#;

        let summary = store.import_json(doc).unwrap();

        assert_eq!(summary.tasks, 1);
        assert!(!summary.settings_replaced);
        assert!(store.projects().is_empty());
        assert_eq!(store.settings().theme, crate::settings::Theme::Light);
        assert_eq!(store.tasks()[0].quadrant(), Quadrant::Do);
    }

    #[test]
    fn test_import_malformed_changes_nothing() {
        let mut store = store_with_category();
        store.create_task(TaskDraft::new("keep"), now()).unwrap();
        let before = store.clone();

        assert!(store.import_json("{\"tasks\": [").is_err());
        assert!(store.import_json(r#"{"tasks": [{"title": "no id"}]}"#).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_import_replaces_instead_of_merging() {
        let mut store = store_with_category();
        store.create_task(TaskDraft::new("old"), now()).unwrap();

        store.import_json(r#"{"tasks": []}"#).unwrap();

        assert!(store.is_empty());
        assert!(store.categories().is_empty());
    }

    #[test]
    fn test_import_normalizes_completed_at() {
        let mut store = TaskStore::new();
        store
            .import_json(
                r#"{"tasks": [{"id": "1", "title": "Done", "completed": true,
                    "createdAt": "2024-03-01T00:00:00Z", "modifiedAt": "2024-03-02T00:00:00Z"}]}"#,
            )
            .unwrap();

        let task = &store.tasks()[0];
        assert_eq!(task.completed_at, Some(task.modified_at));
    }

    #[test]
    fn test_clear_all_resets_theme() {
        let mut store = store_with_category();
        store.settings_mut().toggle_theme();
        store.clear_all();
        assert_eq!(store, TaskStore::default());
    }

    #[test]
    fn test_stale_reference_does_not_block_edit() {
        let mut store = TaskStore::new();
        store
            .import_json(
                r#"{"tasks": [{"id": "1", "title": "Old", "category": "gone",
                    "createdAt": "2024-03-01T00:00:00Z", "modifiedAt": "2024-03-01T00:00:00Z"}]}"#,
            )
            .unwrap();

        let mut draft = TaskDraft::from_task(store.task("1").unwrap());
        draft.title = "Renamed".to_string();
        let task = store.update_task("1", draft, now()).unwrap();

        assert_eq!(task.title, "Renamed");
        assert_eq!(task.category, "gone");
    }

    #[test]
    fn test_edit_to_unknown_reference_is_rejected() {
        let mut store = store_with_category();
        let id = store.create_task(TaskDraft::new("t"), now()).unwrap().id.clone();

        let draft = TaskDraft::new("t").with_project("launch");
        let err = store.update_task(&id, draft, now()).unwrap_err();

        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "project"));
        assert_eq!(store.task(&id).unwrap().project, "");
    }

    #[test]
    fn test_import_rejects_duplicate_and_empty_ids() {
        let mut store = store_with_category();
        store.create_task(TaskDraft::new("keep"), now()).unwrap();
        let before = store.clone();

        let duplicate_tasks = r#"{"tasks": [{"id": "1", "title": "a"}, {"id": "1", "title": "b"}]}"#;
        let empty_category = r##"{"categories": [{"id": "", "name": "Work", "color": "#AEE7B1"}]}"##;
        let duplicate_projects = r##"{"projects": [
            {"id": "p", "name": "A", "color": "#AEE7B1"},
            {"id": "p", "name": "B", "color": "#ABBEE1"}]}"##;

        for doc in [duplicate_tasks, empty_category, duplicate_projects] {
            let err = store.import_json(doc).unwrap_err();
            assert!(matches!(err, CoreError::Validation { .. }));
        }
        assert_eq!(store, before);
    }

    #[test]
    fn test_load_reassigns_empty_and_duplicate_ids() {
        let blob = r##"{
            "tasks": [{"id": "1", "title": "a"}, {"id": "1", "title": "b"}, {"id": "", "title": "c"}],
            "categories": [{"id": "", "name": "Work", "color": "#AEE7B1"}]
        }"##;
        let store = TaskStore::from_blob(blob).unwrap();

        let ids: HashSet<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(""));
        assert_eq!(store.tasks()[0].id, "1");
        assert!(!store.categories().items()[0].id.is_empty());
    }
}
