//! Forest reconstruction from parent links
//!
//! Loaders only know their parent. For every loader in a snapshot the builder
//! walks the parent chain up to the bootstrap level, drops excluded kinds, and
//! inserts what is left root-first, so ancestors that were never observed on
//! their own still show up exactly once.

use log::debug;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use loadscope_common::kinds;

use super::forest::Forest;
use crate::domain::{HierarchyError, LoaderId, LoaderRef};
use crate::registry::Snapshot;

/// Rebuilds a [`Forest`] from a [`Snapshot`].
///
/// Holds the set of excluded kinds; changing it takes effect on the next
/// build without re-observing anything.
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    excluded: HashSet<String>,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::with_excluded(kinds::DEFAULT_EXCLUDED)
    }
}

impl HierarchyBuilder {
    /// Builder excluding the default reflection-support kinds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder excluding exactly `kinds`.
    pub fn with_excluded<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { excluded: kinds.into_iter().map(|k| k.as_ref().to_string()).collect() }
    }

    #[must_use]
    pub fn exclude(mut self, kind: impl Into<String>) -> Self {
        self.excluded.insert(kind.into());
        self
    }

    #[must_use]
    pub fn is_excluded(&self, kind: &str) -> bool {
        self.excluded.contains(kind)
    }

    /// Excluded kinds, sorted.
    #[must_use]
    pub fn excluded_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.excluded.iter().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Reconstruct the forest for `snapshot`.
    ///
    /// # Errors
    /// Fails on a parent chain that loops, or on two distinct loaders sharing
    /// one identity. Both mean the host's loading model is broken.
    pub fn build(&self, snapshot: &Snapshot) -> Result<Forest, HierarchyError> {
        let mut forest = Forest::new();
        let mut seen: HashMap<LoaderId, LoaderRef> = HashMap::new();

        for loader in snapshot.iter() {
            let chain = ancestry(loader, &mut seen)?;

            // Root-first; excluded loaders hand their children to their own parent
            let mut parent = None;
            for ancestor in chain.iter().rev() {
                if self.is_excluded(ancestor.kind()) {
                    continue;
                }
                forest.insert(ancestor, parent);
                parent = Some(ancestor.id());
            }
        }

        debug!("Built forest of {} loaders from {} observed", forest.len(), snapshot.len());
        Ok(forest)
    }
}

/// `loader` followed by each of its ancestors up to the bootstrap level.
fn ancestry(
    loader: &LoaderRef,
    seen: &mut HashMap<LoaderId, LoaderRef>,
) -> Result<Vec<LoaderRef>, HierarchyError> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some(Arc::clone(loader));

    while let Some(link) = current {
        let id = link.id();

        match seen.entry(id) {
            Entry::Occupied(known) => {
                if !Arc::ptr_eq(known.get(), &link) {
                    return Err(HierarchyError::CorruptedIdentity(id));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&link));
            }
        }
        if !visited.insert(id) {
            return Err(HierarchyError::Cycle(id));
        }

        current = link.parent();
        chain.push(link);
    }

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Loader;
    use std::sync::OnceLock;

    struct Node {
        id: u64,
        kind: &'static str,
        parent: OnceLock<LoaderRef>,
    }

    impl Loader for Node {
        fn id(&self) -> LoaderId {
            LoaderId(self.id)
        }
        fn kind(&self) -> &str {
            self.kind
        }
        fn parent(&self) -> Option<LoaderRef> {
            self.parent.get().cloned()
        }
    }

    fn node(id: u64, kind: &'static str, parent: Option<&LoaderRef>) -> LoaderRef {
        let parent_slot = OnceLock::new();
        if let Some(p) = parent {
            let _ = parent_slot.set(Arc::clone(p));
        }
        Arc::new(Node { id, kind, parent: parent_slot })
    }

    fn ids(forest: &Forest) -> Vec<u64> {
        forest.loaders().map(|l| l.id().0).collect()
    }

    #[test]
    fn test_excluded_kind_is_transparent() {
        // A <- B <- C(excluded) <- D
        let a = node(1, "app", None);
        let b = node(2, "app", Some(&a));
        let c = node(3, kinds::REFLECTION_DELEGATE, Some(&b));
        let d = node(4, "app", Some(&c));
        let snapshot: Snapshot = [a, b, c, d].into_iter().collect();

        let forest = HierarchyBuilder::new().build(&snapshot).unwrap();

        assert_eq!(ids(&forest), [1, 2, 4]);
        assert!(!forest.contains(LoaderId(3)));
        assert_eq!(forest.node(LoaderId(4)).unwrap().parent(), Some(LoaderId(2)));
        assert_eq!(forest.node(LoaderId(2)).unwrap().child_count(), 1);
    }

    #[test]
    fn test_excluded_root_attaches_child_to_synthetic_root() {
        let l = node(1, kinds::REFLECTION_SUPPORT, None);
        let c = node(2, "app", Some(&l));
        let snapshot: Snapshot = [Arc::clone(&c), l].into_iter().collect();

        let forest = HierarchyBuilder::new().build(&snapshot).unwrap();

        assert_eq!(ids(&forest), [2]);
        assert_eq!(forest.node(LoaderId(2)).unwrap().parent(), None);
        assert_eq!(forest.root().child_count(), 1);
    }

    #[test]
    fn test_unobserved_ancestors_are_inferred() {
        let system = node(1, "app", None);
        let platform = node(2, "app", Some(&system));
        let plugin = node(3, "app", Some(&platform));
        // Only the leaf was observed
        let snapshot: Snapshot = [plugin].into_iter().collect();

        let forest = HierarchyBuilder::new().build(&snapshot).unwrap();

        assert_eq!(ids(&forest), [1, 2, 3]);
    }

    #[test]
    fn test_no_duplicates_for_redundant_snapshot() {
        let a = node(1, "app", None);
        let b = node(2, "app", Some(&a));
        let c = node(3, "app", Some(&a));
        let snapshot: Snapshot =
            [Arc::clone(&b), Arc::clone(&c), Arc::clone(&a), b, c, a].into_iter().collect();

        let forest = HierarchyBuilder::new().build(&snapshot).unwrap();

        assert_eq!(ids(&forest), [1, 2, 3]);
        assert_eq!(forest.node(LoaderId(1)).unwrap().child_count(), 2);
        assert_eq!(forest.root().child_count(), 1);
    }

    #[test]
    fn test_cycle_is_reported() {
        let a = Arc::new(Node { id: 1, kind: "app", parent: OnceLock::new() });
        let b = Arc::new(Node { id: 2, kind: "app", parent: OnceLock::new() });
        let a_ref: LoaderRef = a.clone();
        let b_ref: LoaderRef = b.clone();
        let _ = a.parent.set(b_ref);
        let _ = b.parent.set(Arc::clone(&a_ref));
        let snapshot: Snapshot = [a_ref].into_iter().collect();

        let err = HierarchyBuilder::new().build(&snapshot).unwrap_err();
        assert_eq!(err, HierarchyError::Cycle(LoaderId(1)));
    }

    #[test]
    fn test_corrupted_identity_is_reported() {
        let a = node(1, "app", None);
        let impostor = node(1, "app", None);
        let snapshot: Snapshot = [a, impostor].into_iter().collect();

        let err = HierarchyBuilder::new().build(&snapshot).unwrap_err();
        assert_eq!(err, HierarchyError::CorruptedIdentity(LoaderId(1)));
    }

    #[test]
    fn test_custom_exclusions() {
        let a = node(1, "app", None);
        let b = node(2, "scratch", Some(&a));
        let c = node(3, kinds::REFLECTION_DELEGATE, Some(&a));
        let snapshot: Snapshot = [a, b, c].into_iter().collect();

        let builder = HierarchyBuilder::with_excluded(["scratch"]);
        assert_eq!(builder.excluded_kinds(), ["scratch"]);

        let forest = builder.build(&snapshot).unwrap();
        assert_eq!(ids(&forest), [1, 3]);
    }

    #[test]
    fn test_exclude_extends_defaults() {
        let a = node(1, "app", None);
        let b = node(2, "scratch", Some(&a));
        let c = node(3, kinds::REFLECTION_DELEGATE, Some(&b));
        let d = node(4, "app", Some(&c));
        let snapshot: Snapshot = [d].into_iter().collect();

        let builder = HierarchyBuilder::new().exclude("scratch");
        assert!(builder.is_excluded(kinds::REFLECTION_DELEGATE));
        assert!(builder.is_excluded("scratch"));

        let forest = builder.build(&snapshot).unwrap();
        assert_eq!(ids(&forest), [1, 4]);
        assert_eq!(forest.node(LoaderId(4)).unwrap().parent(), Some(LoaderId(1)));
    }
}
