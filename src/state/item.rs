//! Item bookkeeping for the front end

use std::collections::{HashMap, HashSet};

/// An unread catalog item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Catalog id, stable across pages
    pub id: u64,

    /// Display title from the listing
    pub title: String,

    /// `None` until fetched; `Some("")` when a fetch found nothing
    pub detail: Option<String>,
}

impl Item {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            detail: None,
        }
    }

    /// Returns true if the detail was never fetched or came back empty
    pub fn needs_fetch(&self) -> bool {
        self.detail.as_deref().map_or(true, str::is_empty)
    }
}

/// What selecting an item should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailLookup {
    /// The detail is already loaded
    Cached(String),

    /// A fetch for this item is already running
    Loading,

    /// The caller should start a fetch; the item is now marked in flight
    Fetch,
}

/// Items of the current listing run, in discovery order
///
/// Ids are unique in the list; a listing that repeats an id keeps the
/// first entry and its detail.
#[derive(Debug, Clone, Default)]
pub struct ItemList {
    items: Vec<Item>,
    index: HashMap<u64, usize>,
    in_flight: HashSet<u64>,
}

impl ItemList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every item, as at the start of a new listing run
    ///
    /// Fetches already in flight stay tracked so they are not started twice.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    /// Adds an item; returns false if the id is already listed
    pub fn insert(&mut self, id: u64, title: impl Into<String>) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.items.len());
        self.items.push(Item::new(id, title));
        true
    }

    pub fn get(&self, id: u64) -> Option<&Item> {
        self.index.get(&id).map(|&pos| &self.items[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Decides whether selecting `id` needs a fetch
    ///
    /// A loaded, non-empty detail is returned as is. An unknown id, a
    /// never-fetched detail or an empty one is marked in flight and reported
    /// as `Fetch`, unless a fetch is already running.
    pub fn begin_fetch(&mut self, id: u64) -> DetailLookup {
        if let Some(item) = self.get(id) {
            if !item.needs_fetch() {
                return DetailLookup::Cached(item.detail.clone().unwrap_or_default());
            }
        }
        if !self.in_flight.insert(id) {
            return DetailLookup::Loading;
        }
        DetailLookup::Fetch
    }

    /// Stores the outcome of a fetch and clears the in-flight mark
    ///
    /// `None` records a failed fetch: the detail stays as it was so the
    /// next selection retries.
    pub fn finish_fetch(&mut self, id: u64, detail: Option<String>) {
        self.in_flight.remove(&id);
        if let (Some(text), Some(&pos)) = (detail, self.index.get(&id)) {
            self.items[pos].detail = Some(text);
        }
    }

    /// Returns true if a fetch for `id` is running
    pub fn is_loading(&self, id: u64) -> bool {
        self.in_flight.contains(&id)
    }
}
