//! Immutable name collection.
//!
//! Every change yields a new `NameList`; the previous value stays valid for
//! anyone still holding it. Cloning is an `Arc` bump.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::model::{NameEntry, NameId};

#[derive(Debug, Clone, Default)]
pub struct NameList {
    // Newest-prepended first. Order only matters as the tie-break in `sorted`.
    entries: Arc<Vec<NameEntry>>,
}

impl NameList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NameEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: NameId) -> Option<&NameEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: NameId) -> bool {
        self.get(id).is_some()
    }

    /// New list with `entry` in front.
    pub fn prepend(&self, entry: NameEntry) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(entry);
        entries.extend(self.entries.iter().cloned());
        Self {
            entries: Arc::new(entries),
        }
    }

    /// New list with the entry of the same id swapped for `entry`.
    /// Returns `None` if no such id exists.
    pub fn replace(&self, entry: NameEntry) -> Option<Self> {
        let position = self.entries.iter().position(|e| e.id == entry.id)?;
        let mut entries = self.entries.as_ref().clone();
        entries[position] = entry;
        Some(Self {
            entries: Arc::new(entries),
        })
    }

    /// New list without `id`, plus the removed entry. `None` if absent.
    pub fn without(&self, id: NameId) -> Option<(Self, NameEntry)> {
        let position = self.entries.iter().position(|e| e.id == id)?;
        let mut entries = self.entries.as_ref().clone();
        let removed = entries.remove(position);
        Some((
            Self {
                entries: Arc::new(entries),
            },
            removed,
        ))
    }

    /// Favorites first, then newest `created_at` first.
    pub fn sorted(&self) -> Vec<NameEntry> {
        let mut view: Vec<NameEntry> = self.entries.as_ref().clone();
        // stable: equal timestamps keep prepend order
        view.sort_by(display_order);
        view
    }

    /// True when both values share the same backing storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

fn display_order(a: &NameEntry, b: &NameEntry) -> Ordering {
    b.is_favorite
        .cmp(&a.is_favorite)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn entry(name: &str, minute: i64) -> NameEntry {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        NameEntry::new(name.to_string(), None, base + Duration::minutes(minute))
    }

    #[test]
    fn test_prepend_leaves_old_value_untouched() {
        let empty = NameList::new();
        let one = empty.prepend(entry("Alice", 0));
        let two = one.prepend(entry("Bob", 1));

        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert_eq!(two.len(), 2);
        assert_eq!(two.iter().next().unwrap().name, "Bob");
    }

    #[test]
    fn test_replace_by_id() {
        let alice = entry("Alice", 0);
        let list = NameList::new().prepend(alice.clone());

        let updated = list.replace(alice.with_name("Alicia".to_string())).unwrap();

        assert_eq!(updated.get(alice.id).unwrap().name, "Alicia");
        assert_eq!(list.get(alice.id).unwrap().name, "Alice");
        assert!(!updated.ptr_eq(&list));
    }

    #[test]
    fn test_replace_unknown_id_is_none() {
        let list = NameList::new().prepend(entry("Alice", 0));
        assert!(list.replace(entry("Ghost", 5)).is_none());
    }

    #[test]
    fn test_without_removes_once() {
        let alice = entry("Alice", 0);
        let list = NameList::new().prepend(alice.clone()).prepend(entry("Bob", 1));

        let (after, removed) = list.without(alice.id).unwrap();
        assert_eq!(removed.id, alice.id);
        assert!(!after.contains(alice.id));
        assert_eq!(after.len(), 1);
        assert!(after.without(alice.id).is_none());
    }

    #[test]
    fn test_sorted_favorites_then_newest() {
        let old = entry("Old", 0);
        let mid = entry("Mid", 1);
        let new = entry("New", 2);
        let list = NameList::new()
            .prepend(old.clone())
            .prepend(mid.with_favorite(true))
            .prepend(new.clone());

        let names: Vec<_> = list.sorted().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Mid", "New", "Old"]);
    }

    #[test]
    fn test_sorted_ties_keep_prepend_order() {
        let first = entry("First", 0);
        let second = entry("Second", 0);
        let list = NameList::new().prepend(first).prepend(second);

        let names: Vec<_> = list.sorted().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }
}
