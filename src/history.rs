//! View history.
//!
//! Every read through the repository records a copy of the viewed entity.
//! Each id appears at most once; viewing it again moves it to the most recent
//! position. Backed by an id-keyed linked hash map, so add, remove and
//! eviction are O(1).

use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::model::{Entity, TaskId, WorkItem};

/// Default number of entries kept when no limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

pub struct HistoryTracker {
    entries: LruCache<TaskId, Entity>,
    limit: Option<NonZeroUsize>,
}

impl HistoryTracker {
    pub fn unbounded() -> Self {
        Self {
            entries: LruCache::unbounded(),
            limit: None,
        }
    }

    /// Keep at most `limit` entries, evicting the least recently viewed.
    /// A limit of zero means unbounded.
    pub fn bounded(limit: usize) -> Self {
        match NonZeroUsize::new(limit) {
            Some(limit) => Self {
                entries: LruCache::new(limit),
                limit: Some(limit),
            },
            None => Self::unbounded(),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit.map(NonZeroUsize::get)
    }

    /// Record a view. The entity is copied.
    pub fn add(&mut self, entity: &Entity) {
        if let Some((evicted, _)) = self.entries.push(entity.id(), entity.clone()) {
            if evicted != entity.id() {
                tracing::trace!(id = evicted, "history entry evicted");
            }
        }
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Entity> {
        self.entries.pop(&id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.entries.contains(&id)
    }

    /// Entries from least to most recently viewed.
    pub fn history(&self) -> Vec<Entity> {
        self.entries
            .iter()
            .rev()
            .map(|(_, entity)| entity.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for HistoryTracker {
    fn default() -> Self {
        Self::bounded(DEFAULT_HISTORY_LIMIT)
    }
}

impl fmt::Debug for HistoryTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryTracker")
            .field("len", &self.entries.len())
            .field("limit", &self.limit())
            .finish()
    }
}
