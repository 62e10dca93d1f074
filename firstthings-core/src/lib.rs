//! First Things First core: pure domain logic for an Eisenhower matrix
//!
//! This crate contains no file or terminal I/O. Persistence is handled by
//! adapters in consuming crates through the [`Persistence`] trait.

pub mod date;
pub mod error;
pub mod list;
pub mod persist;
pub mod quadrant;
pub mod session;
pub mod settings;
pub mod sort;
pub mod store;
pub mod task;
pub mod view;

pub use error::{CoreError, Result};
pub use list::{ListItem, ListKind, ListRegistry, Upsert, random_color};
pub use persist::{MemoryPersistence, Persistence};
pub use quadrant::{Quadrant, apply_quadrant, quadrant_of};
pub use session::Session;
pub use settings::{QuadrantStyle, Settings, Theme};
pub use sort::{sort_completed_last, sort_for_quadrant};
pub use store::{EXPORT_VERSION, ExportDocument, ImportSummary, TaskStore};
pub use task::{Task, TaskDraft, mint_id};
pub use view::{Badge, ListGroup, QuadrantGroup, ViewKind, badges, by_category, by_project, by_quadrant};
