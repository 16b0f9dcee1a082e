//! The three fetched collections and the global loading flag.

use enum_map::EnumMap;

use crate::item::{BucketKind, Item, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct Bucket {
    items: Vec<Item>,
    state: LoadState,
}

impl Bucket {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Finds the id an operator typed for an item in this bucket.
    ///
    /// `#N` picks the item at position `N`, which also reaches records whose
    /// id was synthesized for one load only. Otherwise the token is matched
    /// as a parsed id first, then against each id's printed form, so a text
    /// id such as `"42"` is still reachable.
    pub fn resolve(&self, token: &str) -> Option<&ItemId> {
        let token = token.trim();
        if let Some(position) = token.strip_prefix('#') {
            let index: usize = position.parse().ok()?;
            return self.items.get(index).map(|item| &item.id);
        }
        let Ok(parsed) = token.parse::<ItemId>();
        self.get(&parsed)
            .or_else(|| self.items.iter().find(|item| item.id.to_string() == token))
            .map(|item| &item.id)
    }
}

/// Buckets keyed by kind, plus the `loading` flag of the current load run.
#[derive(Debug, Default)]
pub struct CollectionStore {
    buckets: EnumMap<BucketKind, Bucket>,
    loading: bool,
    runs: u64,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, kind: BucketKind) -> &Bucket {
        &self.buckets[kind]
    }

    pub fn buckets(&self) -> impl Iterator<Item = (BucketKind, &Bucket)> {
        self.buckets.iter()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Number of load runs started so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Replaces a bucket's items and marks it loaded.
    pub fn populate(&mut self, kind: BucketKind, items: Vec<Item>) {
        let bucket = &mut self.buckets[kind];
        bucket.items = items;
        bucket.state = LoadState::Loaded;
    }

    /// Marks a bucket failed; its items are dropped.
    pub fn mark_failed(&mut self, kind: BucketKind) {
        let bucket = &mut self.buckets[kind];
        bucket.items.clear();
        bucket.state = LoadState::Failed;
    }

    /// Empties every bucket back to pending (full reload).
    pub fn reset(&mut self) {
        self.buckets = EnumMap::default();
    }

    /// Starts a load run and returns its number.
    pub fn begin_load(&mut self) -> u64 {
        self.runs += 1;
        self.loading = true;
        self.runs
    }

    /// Ends the current load run. Returns false if no run was active.
    pub fn finish_load(&mut self) -> bool {
        std::mem::replace(&mut self.loading, false)
    }
}
