// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::record::EpisodeRecord;

/// A point-in-time view of the catalog, newest episode first
pub type Snapshot = Arc<[EpisodeRecord]>;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, EpisodeRecord>,
    sorted: Snapshot,
}

impl Inner {
    fn resort(&mut self) {
        let mut records: Vec<EpisodeRecord> = self.records.values().cloned().collect();
        records.sort_by(|a, b| {
            b.pub_date
                .cmp(&a.pub_date)
                .then_with(|| a.key.cmp(&b.key))
        });
        self.sorted = records.into();
    }
}

/// The set of admitted episodes, keyed by folder name
///
/// Cloning yields another handle to the same store. Every operation takes the
/// lock once, so readers see either the state before a mutation or after it.
#[derive(Debug, Clone, Default)]
pub struct EpisodeStore {
    inner: Arc<RwLock<Inner>>,
}

impl EpisodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `key`
    pub fn upsert(&self, key: &str, record: EpisodeRecord) {
        let mut inner = self.inner.write();
        inner.records.insert(key.to_string(), record);
        inner.resort();
    }

    /// Remove the record for `key`, returning whether one was present
    pub fn remove(&self, key: &str) -> bool {
        let mut inner = self.inner.write();
        let was_present = inner.records.remove(key).is_some();
        if was_present {
            inner.resort();
        }
        was_present
    }

    /// The current catalog, sorted by publish date descending, ties by key
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.inner.read().sorted)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
