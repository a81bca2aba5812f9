//! Forest representation produced by the builder
//!
//! The forest is a flat pre-order sequence: every node comes after its parent
//! and a parent's whole subtree is contiguous. Index 0 is always the synthetic
//! root standing for "no parent".

use log::warn;

use crate::domain::{LoaderId, LoaderRef};

/// One slot in the forest sequence.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// `None` only for the synthetic root
    loader: Option<LoaderRef>,
    /// Effective parent in the forest (excluded kinds skipped), `None` = root
    parent: Option<LoaderId>,
    depth: usize,
    /// Children not yet visited by a renderer
    child_count: usize,
}

impl TreeNode {
    fn root() -> Self {
        Self { loader: None, parent: None, depth: 0, child_count: 0 }
    }

    #[must_use]
    pub fn loader(&self) -> Option<&LoaderRef> {
        self.loader.as_ref()
    }

    /// Identity, `None` for the synthetic root.
    #[must_use]
    pub fn id(&self) -> Option<LoaderId> {
        self.loader.as_ref().map(|l| l.id())
    }

    #[must_use]
    pub fn parent(&self) -> Option<LoaderId> {
        self.parent
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.child_count
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.loader.is_none()
    }

    /// Consume one child slot; `None` once every child has been visited.
    pub(crate) fn take_child(&mut self) -> Option<usize> {
        self.child_count = self.child_count.checked_sub(1)?;
        Some(self.child_count)
    }
}

/// Query-scoped hierarchy of loaders under a synthetic root.
#[derive(Debug, Clone)]
pub struct Forest {
    nodes: Vec<TreeNode>,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    /// Forest holding only the synthetic root.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: vec![TreeNode::root()] }
    }

    /// Full sequence, synthetic root first.
    #[must_use]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [TreeNode] {
        &mut self.nodes
    }

    /// Number of loaders, not counting the synthetic root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loaders in forest order.
    pub fn loaders(&self) -> impl Iterator<Item = &LoaderRef> {
        self.nodes.iter().filter_map(TreeNode::loader)
    }

    #[must_use]
    pub fn find(&self, id: LoaderId) -> Option<&LoaderRef> {
        self.node(id).and_then(TreeNode::loader)
    }

    #[must_use]
    pub fn contains(&self, id: LoaderId) -> bool {
        self.node(id).is_some()
    }

    #[must_use]
    pub fn node(&self, id: LoaderId) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.id() == Some(id))
    }

    #[must_use]
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// Insert `loader` under `parent` (`None` = synthetic root) unless its
    /// identity is already present. Returns whether a node was added.
    ///
    /// The new node goes right after the last node of the parent's subtree,
    /// so siblings keep insertion order and the sequence stays pre-order.
    pub(crate) fn insert(&mut self, loader: &LoaderRef, parent: Option<LoaderId>) -> bool {
        let id = loader.id();

        // Reverse scan: the node, if present, sits in the parent's subtree
        let mut parent_index = None;
        for (index, node) in self.nodes.iter().enumerate().rev() {
            if node.id() == Some(id) {
                return false;
            }
            if node.id() == parent {
                parent_index = Some(index);
                break;
            }
        }

        let (parent_index, parent) = match parent_index {
            Some(index) => (index, parent),
            None => {
                warn!("Parent of loader {id} missing from forest, attaching at root");
                (0, None)
            }
        };

        let parent_depth = self.nodes[parent_index].depth;
        let mut at = parent_index + 1;
        while at < self.nodes.len() && self.nodes[at].depth > parent_depth {
            at += 1;
        }

        self.nodes[parent_index].child_count += 1;
        self.nodes.insert(
            at,
            TreeNode { loader: Some(loader.clone()), parent, depth: parent_depth + 1, child_count: 0 },
        );
        true
    }
}
