//! Owned session over a task graph
//!
//! A `Session` pairs the in-memory [`TaskStore`] with the [`Persistence`]
//! that backs it. Every method that changes the graph saves the whole graph
//! before returning, so callers never have to remember to persist.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::list::{ListItem, ListKind, Upsert};
use crate::persist::Persistence;
use crate::quadrant::Quadrant;
use crate::settings::{QuadrantStyle, Settings, Theme};
use crate::store::{ImportSummary, TaskStore};
use crate::task::{Task, TaskDraft};

/// Source of "now" for timestamps
pub type Clock = fn() -> DateTime<Utc>;

pub struct Session<P: Persistence> {
    store: TaskStore,
    persistence: P,
    clock: Clock,
}

impl<P: Persistence> Session<P> {
    /// Load whatever the persistence holds; corrupt data yields an empty graph
    pub fn open(persistence: P) -> Self {
        let store = TaskStore::load_from(&persistence);
        Self {
            store,
            persistence,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock, mostly for tests
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn into_parts(self) -> (TaskStore, P) {
        (self.store, self.persistence)
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Full-graph save
    pub fn save(&mut self) -> Result<()> {
        self.store.save_to(&mut self.persistence)
    }

    pub fn create_task(&mut self, draft: TaskDraft) -> Result<Task> {
        let now = self.now();
        let task = self.store.create_task(draft, now)?.clone();
        self.save()?;
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, draft: TaskDraft) -> Result<Task> {
        let now = self.now();
        let task = self.store.update_task(id, draft, now)?.clone();
        self.save()?;
        Ok(task)
    }

    /// Delete a task; `Ok(None)` when it was already gone
    pub fn delete_task(&mut self, id: &str) -> Result<Option<Task>> {
        let Some(task) = self.store.delete_task(id) else {
            return Ok(None);
        };
        self.save()?;
        Ok(Some(task))
    }

    pub fn move_task(&mut self, id: &str, quadrant: Quadrant) -> Result<Task> {
        let now = self.now();
        let task = self.store.move_task(id, quadrant, now)?.clone();
        self.save()?;
        Ok(task)
    }

    pub fn toggle_complete(&mut self, id: &str) -> Result<Task> {
        let now = self.now();
        let task = self.store.toggle_complete(id, now)?.clone();
        self.save()?;
        Ok(task)
    }

    pub fn create_list_item(&mut self, kind: ListKind, item: ListItem) -> Result<ListItem> {
        let item = self.store.create_list_item(kind, item)?.clone();
        self.save()?;
        Ok(item)
    }

    pub fn update_list_item(&mut self, kind: ListKind, item: ListItem) -> Result<ListItem> {
        let item = self.store.update_list_item(kind, item)?.clone();
        self.save()?;
        Ok(item)
    }

    pub fn upsert_list_item(&mut self, kind: ListKind, item: ListItem) -> Result<Upsert> {
        let outcome = self.store.upsert_list_item(kind, item);
        self.save()?;
        Ok(outcome)
    }

    /// Delete a list item and clear task references to it
    pub fn delete_list_item(&mut self, kind: ListKind, id: &str) -> Result<Option<(ListItem, usize)>> {
        let Some(removed) = self.store.delete_list_item(kind, id) else {
            return Ok(None);
        };
        self.save()?;
        Ok(Some(removed))
    }

    /// Returns false, without saving, when the reorder was a no-op
    pub fn reorder_list_items(&mut self, kind: ListKind, moved_id: &str, target_id: &str) -> Result<bool> {
        if !self.store.reorder_list_items(kind, moved_id, target_id) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn set_quadrant_style(&mut self, quadrant: Quadrant, style: QuadrantStyle) -> Result<()> {
        self.store.settings_mut().set_style(quadrant, style)?;
        self.save()
    }

    /// Restore default quadrant styles, keeping the theme
    pub fn reset_settings(&mut self) -> Result<&Settings> {
        self.store.settings_mut().reset();
        self.save()?;
        Ok(self.store.settings())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.store.settings_mut().theme = theme;
        self.save()
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let theme = self.store.settings_mut().toggle_theme();
        self.save()?;
        Ok(theme)
    }

    /// Replace everything with an imported document.
    ///
    /// A document that fails to parse leaves both memory and storage as
    /// they were.
    pub fn import_json(&mut self, json: &str) -> Result<ImportSummary> {
        let summary = self.store.import_json(json)?;
        self.save()?;
        Ok(summary)
    }

    pub fn export_json(&self) -> Result<String> {
        self.store.export_json(self.now())
    }

    /// Wipe all tasks, list items and settings
    pub fn clear_all(&mut self) -> Result<()> {
        self.store.clear_all();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryPersistence;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn session() -> Session<MemoryPersistence> {
        Session::open(MemoryPersistence::new()).with_clock(fixed_now)
    }

    #[test]
    fn test_every_mutation_saves_full_graph() {
        let mut session = session();
        let task = session.create_task(TaskDraft::new("Write tests")).unwrap();
        assert_eq!(session.persistence().writes(), 1);

        session.move_task(&task.id, Quadrant::Do).unwrap();
        session.toggle_complete(&task.id).unwrap();
        assert_eq!(session.persistence().writes(), 3);

        let reloaded = TaskStore::load_from(session.persistence());
        assert_eq!(&reloaded, session.store());
    }

    #[test]
    fn test_noops_do_not_save() {
        let mut session = session();
        assert!(session.delete_task("missing").unwrap().is_none());
        assert!(session.delete_list_item(ListKind::Category, "missing").unwrap().is_none());
        assert!(!session.reorder_list_items(ListKind::Project, "a", "b").unwrap());
        assert_eq!(session.persistence().writes(), 0);
    }

    #[test]
    fn test_validation_failure_does_not_save() {
        let mut session = session();
        assert!(session.create_task(TaskDraft::new("")).is_err());
        assert!(session
            .create_list_item(ListKind::Category, ListItem::new("c", "", "#ffffff"))
            .is_err());
        assert_eq!(session.persistence().writes(), 0);
    }

    #[test]
    fn test_failed_import_leaves_storage_untouched() {
        let mut session = session();
        session.create_task(TaskDraft::new("Keep me")).unwrap();
        let saved = session.persistence().blob().map(str::to_string);

        assert!(session.import_json("not json at all").is_err());

        assert_eq!(session.persistence().blob().map(str::to_string), saved);
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn test_timestamps_come_from_clock() {
        let mut session = session();
        let task = session.create_task(TaskDraft::new("Stamp")).unwrap();
        assert_eq!(task.created_at, fixed_now());
        assert_eq!(task.modified_at, fixed_now());
    }

    #[test]
    fn test_reset_settings_keeps_theme() {
        let mut session = session();
        session
            .set_quadrant_style(Quadrant::Do, QuadrantStyle::new("#000000", "Now"))
            .unwrap();
        session.set_theme(Theme::Light).unwrap();

        let settings = session.reset_settings().unwrap();

        assert_eq!(settings.q1.label, "Do This");
        assert_eq!(settings.theme, Theme::Light);
    }

    #[test]
    fn test_storage_failure_surfaces() {
        let mut session = Session::open(MemoryPersistence::failing());
        let err = session.create_task(TaskDraft::new("Lost?")).unwrap_err();
        assert!(matches!(err, crate::CoreError::Storage { .. }));
        // The in-memory graph keeps the change
        assert_eq!(session.store().len(), 1);
    }
}
