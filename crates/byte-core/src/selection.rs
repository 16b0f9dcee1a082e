//! Per-bucket selection sets and the aggregated, type-tagged view over them.
//!
//! Selections are keyed by `(kind, id)`. Two buckets may reuse the same raw
//! id, so nothing here ever matches on a bare id across kinds.

use enum_map::EnumMap;

use crate::item::{BucketKind, Item, ItemId};
use crate::store::CollectionStore;

/// Ordered set of selected ids for one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<ItemId>,
}

impl SelectionSet {
    pub fn contains(&self, id: &ItemId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.ids.iter()
    }

    fn insert(&mut self, id: ItemId) {
        if !self.contains(&id) {
            self.ids.push(id);
        }
    }

    fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        self.ids.len() != before
    }

    fn clear(&mut self) {
        self.ids.clear();
    }
}

/// One row of the aggregated selection: a snapshot of the item and its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedEntry {
    pub kind: BucketKind,
    pub item: Item,
}

impl AggregatedEntry {
    pub fn id(&self) -> &ItemId {
        &self.item.id
    }
}

/// Owns the three selection sets and the aggregate derived from them.
///
/// The aggregate is rebuilt from scratch after every mutation, and callers
/// must call [`SelectionAggregator::recompute`] after changing the store.
#[derive(Debug, Default)]
pub struct SelectionAggregator {
    sets: EnumMap<BucketKind, SelectionSet>,
    entries: Vec<AggregatedEntry>,
}

impl SelectionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, kind: BucketKind) -> &SelectionSet {
        &self.sets[kind]
    }

    pub fn is_selected(&self, kind: BucketKind, id: &ItemId) -> bool {
        self.sets[kind].contains(id)
    }

    /// Total ids across the three sets.
    pub fn selected_count(&self) -> usize {
        self.sets.values().map(SelectionSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.values().all(SelectionSet::is_empty)
    }

    /// Posts first, then events, then external events; bucket order within each.
    pub fn entries(&self) -> &[AggregatedEntry] {
        &self.entries
    }

    /// Owned copy of the aggregate, detached from later mutations.
    pub fn snapshot(&self) -> Vec<AggregatedEntry> {
        self.entries.clone()
    }

    /// Flips membership of `id` in the `kind` set.
    ///
    /// Returns whether anything changed. Ids missing from the bucket are ignored.
    pub fn toggle(&mut self, store: &CollectionStore, kind: BucketKind, id: &ItemId) -> bool {
        if !store.bucket(kind).contains(id) {
            tracing::debug!(%kind, %id, "toggle ignored: id not in bucket");
            return false;
        }

        let set = &mut self.sets[kind];
        if !set.remove(id) {
            set.insert(id.clone());
        }
        self.recompute(store);
        true
    }

    /// Removes `id` from the `kind` set only.
    ///
    /// Stale ids (selected but gone from the bucket) are pruned here too.
    pub fn remove(&mut self, store: &CollectionStore, kind: BucketKind, id: &ItemId) -> bool {
        let removed = self.sets[kind].remove(id);
        if removed {
            self.recompute(store);
        }
        removed
    }

    /// Empties all three sets.
    pub fn clear(&mut self) {
        for set in self.sets.values_mut() {
            set.clear();
        }
        self.entries.clear();
    }

    /// Rebuilds the aggregate by joining each set against its bucket.
    pub fn recompute(&mut self, store: &CollectionStore) {
        self.entries = BucketKind::ALL
            .iter()
            .flat_map(|&kind| {
                let set = &self.sets[kind];
                store
                    .bucket(kind)
                    .items()
                    .iter()
                    .filter(move |item| set.contains(&item.id))
                    .map(move |item| AggregatedEntry {
                        kind,
                        item: item.clone(),
                    })
            })
            .collect();
    }
}
