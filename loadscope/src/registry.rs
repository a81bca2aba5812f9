//! Weakly-held loader registry
//!
//! Accumulates every distinct loader an observation source reports, keyed by
//! identity. Entries are `Weak` handles: the registry never keeps a loader
//! alive, and loaders the host has released silently drop out of the next
//! snapshot.
//!
//! # Performance
//!
//! - `record()`: O(1) amortized (HashMap lookup/insert under a short mutex)
//! - `snapshot()`: O(n log n) in the number of tracked entries (upgrade, purge, sort)

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::domain::{Loader, LoaderId, LoaderRef};

struct Entry {
    /// First-observation order, used to keep snapshots stable
    seq: u64,
    loader: Weak<dyn Loader>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<LoaderId, Entry>,
    next_seq: u64,
}

/// Identity-keyed set of observed loaders.
///
/// Construct one per process and share it (`Arc<Registry>`) between the
/// observation adapter and the management endpoint.
#[derive(Default)]
pub struct Registry {
    inner: Mutex<Inner>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed loader. No-op when its identity is already tracked.
    ///
    /// An identity whose previous loader has been reclaimed is taken over by
    /// the new observation.
    pub fn record(&self, loader: &LoaderRef) {
        let id = loader.id();
        let mut inner = self.lock();

        if let Some(existing) = inner.entries.get(&id) {
            if existing.loader.strong_count() > 0 {
                if !Weak::ptr_eq(&existing.loader, &Arc::downgrade(loader)) {
                    warn!("Ignoring loader {id} ({}): identity already held by another loader", loader.kind());
                }
                return;
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(id, Entry { seq, loader: Arc::downgrade(loader) });
        debug!("Registering new loader {id} ({})", loader.kind());
    }

    /// Point-in-time copy of every tracked loader that is still alive, in
    /// first-observation order. Reclaimed entries are purged on the way.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let mut live: Vec<(u64, LoaderRef)> = Vec::new();
        {
            let mut inner = self.lock();
            inner.entries.retain(|_, entry| match entry.loader.upgrade() {
                Some(loader) => {
                    live.push((entry.seq, loader));
                    true
                }
                None => false,
            });
        }
        live.sort_unstable_by_key(|(seq, _)| *seq);
        Snapshot { loaders: live.into_iter().map(|(_, loader)| loader).collect() }
    }

    /// Number of tracked entries, including reclaimed ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Entries stay consistent even if a holder panicked mid-insert
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Strong, query-scoped copy of the registry's live loaders.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    loaders: Vec<LoaderRef>,
}

impl Snapshot {
    pub fn iter(&self) -> impl Iterator<Item = &LoaderRef> {
        self.loaders.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<LoaderId> {
        self.loaders.iter().map(|l| l.id()).collect()
    }
}

impl FromIterator<LoaderRef> for Snapshot {
    fn from_iter<I: IntoIterator<Item = LoaderRef>>(iter: I) -> Self {
        Self { loaders: iter.into_iter().collect() }
    }
}
