use std::sync::Arc;

use quakescope_core::{EventRecord, EventStore};

/// The records currently passing every active predicate.
///
/// Holds the shared original store plus the ordered indices of matching
/// records, so clones are cheap and iteration always follows the original
/// relative order.
#[derive(Clone, Debug)]
pub struct VisibleSet {
    store: EventStore,
    indices: Arc<[usize]>,
}

impl VisibleSet {
    /// Every record of `store`, unfiltered.
    pub fn all(store: &EventStore) -> Self {
        Self {
            store: store.clone(),
            indices: (0..store.len()).collect(),
        }
    }

    /// Records of `store` for which `keep` holds, in store order.
    pub fn filtered<F>(store: &EventStore, mut keep: F) -> Self
    where
        F: FnMut(&EventRecord) -> bool,
    {
        let indices = store
            .iter()
            .enumerate()
            .filter(|(_, r)| keep(*r))
            .map(|(i, _)| i)
            .collect();
        Self {
            store: store.clone(),
            indices,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of records in the unfiltered source.
    pub fn total(&self) -> usize {
        self.store.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn source(&self) -> &EventStore {
        &self.store
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> + '_ {
        self.indices.iter().filter_map(|&i| self.store.get(i))
    }

    pub fn to_records(&self) -> Vec<EventRecord> {
        self.iter().cloned().collect()
    }
}

impl Default for VisibleSet {
    fn default() -> Self {
        Self::all(&EventStore::default())
    }
}

impl PartialEq for VisibleSet {
    fn eq(&self, other: &Self) -> bool {
        self.store.same_source(&other.store) && self.indices == other.indices
    }
}
