use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use binplan_core::{ItemSummary, UnitId, UnitLayout};

use crate::types::ItemQuery;

/// Typed key of a cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Layout(UnitId),
    Items(ItemQuery),
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Layout(UnitLayout),
    Items(Vec<ItemSummary>),
}

/// Last fetched server state, keyed by query.
///
/// Holds copies only: entries are replaced wholesale by fresh fetches and
/// dropped with [`LayoutCache::invalidate`] once a mutation makes them stale.
#[derive(Debug, Default)]
pub struct LayoutCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self, unit_id: &UnitId) -> Option<UnitLayout> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&CacheKey::Layout(unit_id.clone())) {
            Some(CacheEntry::Layout(layout)) => Some(layout.clone()),
            _ => None,
        }
    }

    pub fn put_layout(&self, layout: UnitLayout) {
        let key = CacheKey::Layout(layout.unit.id.clone());
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, CacheEntry::Layout(layout));
    }

    pub fn items(&self, query: &ItemQuery) -> Option<Vec<ItemSummary>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&CacheKey::Items(query.clone())) {
            Some(CacheEntry::Items(items)) => Some(items.clone()),
            _ => None,
        }
    }

    pub fn put_items(&self, query: ItemQuery, items: Vec<ItemSummary>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(CacheKey::Items(query), CacheEntry::Items(items));
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Drops one entry. Returns whether it was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    /// Drops the unit's layout and every item query scoped to the unit.
    pub fn invalidate_unit(&self, unit_id: &UnitId) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| match key {
            CacheKey::Layout(id) => id != unit_id,
            CacheKey::Items(query) => query.unplaced_in.as_ref() != Some(unit_id),
        });
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
