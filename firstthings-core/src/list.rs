//! Categories and projects
//!
//! Both are "list items": a named, colored tag a task can point at. The
//! order of a registry is user-controlled and survives save/load.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::date;
use crate::error::{CoreError, Result};

/// Which registry a list item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Category,
    Project,
}

impl ListKind {
    /// Label of the synthetic group for tasks with no (or a stale) reference
    pub fn none_label(self) -> &'static str {
        match self {
            Self::Category => "Uncategorized",
            Self::Project => "No Project",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category => f.write_str("Category"),
            Self::Project => f.write_str("Project"),
        }
    }
}

/// A category or project
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, with = "date::optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "date::optional_date")]
    pub end_date: Option<NaiveDate>,
}

impl ListItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            start_date: None,
            end_date: None,
        }
    }

    /// New item with a freshly minted id
    pub fn create(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self::new(crate::task::mint_id(), name, color)
    }

    /// Builder method to set the active date range
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Name must be non-blank and color a `#RRGGBB` value
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("name", "Name must not be empty"));
        }
        parse_hex_color(&self.color)?;
        Ok(())
    }
}

/// Parse a `#RRGGBB` color (the leading `#` is optional)
pub fn parse_hex_color(color: &str) -> Result<(u8, u8, u8)> {
    let hex = color.trim().trim_start_matches('#');

    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::validation(
            "color",
            format!("'{}' is not a 6-digit hex color", color),
        ));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|e| CoreError::parse_with_source("Invalid color channel", e))
    };

    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// A random `#rrggbb` color for items created without one
pub fn random_color() -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    format!("#{:02x}{:02x}{:02x}", bytes[0], bytes[1], bytes[2])
}

/// Result of the id-driven upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Ordered collection of list items of one kind
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct ListRegistry {
    items: Vec<ListItem>,
}

impl ListRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<ListItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&ListItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub(crate) fn ids_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.items.iter_mut().map(|i| &mut i.id)
    }

    /// Look up an item by exact id, falling back to a case-insensitive name
    pub fn find(&self, id_or_name: &str) -> Option<&ListItem> {
        self.get(id_or_name).or_else(|| {
            self.items
                .iter()
                .find(|i| i.name.eq_ignore_ascii_case(id_or_name.trim()))
        })
    }

    /// Append a new item. Fails on a duplicate id or invalid fields.
    pub fn create(&mut self, item: ListItem) -> Result<&ListItem> {
        item.validate()?;
        if self.contains(&item.id) {
            return Err(CoreError::validation(
                "id",
                format!("'{}' is already in use", item.id),
            ));
        }
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Replace an existing item in place, keeping its position
    pub fn update(&mut self, kind: ListKind, item: ListItem) -> Result<&ListItem> {
        item.validate()?;
        let index = self
            .position(&item.id)
            .ok_or_else(|| CoreError::ListItemNotFound {
                kind,
                id: item.id.clone(),
            })?;
        self.items[index] = item;
        Ok(&self.items[index])
    }

    /// Insert when the id is unknown, otherwise replace in place.
    ///
    /// Does no validation; callers wanting checks use `create`/`update`.
    pub fn upsert(&mut self, item: ListItem) -> Upsert {
        match self.position(&item.id) {
            Some(index) => {
                self.items[index] = item;
                Upsert::Replaced
            }
            None => {
                self.items.push(item);
                Upsert::Inserted
            }
        }
    }

    /// Remove an item. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<ListItem> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// Move `moved_id` to the index `target_id` occupies now.
    ///
    /// Returns false (and changes nothing) when either id is unknown or
    /// both are the same item.
    pub fn reorder(&mut self, moved_id: &str, target_id: &str) -> bool {
        if moved_id == target_id {
            return false;
        }

        let (Some(from), Some(to)) = (self.position(moved_id), self.position(target_id)) else {
            return false;
        };

        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }
}

impl<'a> IntoIterator for &'a ListRegistry {
    type Item = &'a ListItem;
    type IntoIter = std::slice::Iter<'a, ListItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
