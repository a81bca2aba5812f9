//! Text rendering of a forest
//!
//! ```text
//! Bootstrap
//!  |-11 : search-path : platform
//!  | \-12 : service : billing
//!  \-21 : [+] : remote : remote@21
//! ```
//!
//! A single linear pass over the pre-order sequence, keeping a stack of open
//! ancestors. Each visited node consumes one of its parent's child slots; the
//! slot count reaching zero marks the last sibling.

use std::fmt::Write;

use super::forest::Forest;
use crate::domain::HierarchyError;
use crate::inspect::InspectorRegistry;

/// Label of the synthetic root line.
pub const ROOT_LABEL: &str = "Bootstrap";

const BRANCH: &str = "|-";
const LAST_BRANCH: &str = "\\-";
const CONTINUATION: &str = "| ";
const BLANK: &str = "  ";

/// Renders forests, optionally probing remote loaders on the way.
pub struct TreeRenderer<'a> {
    inspectors: &'a InspectorRegistry,
}

impl<'a> TreeRenderer<'a> {
    #[must_use]
    pub fn new(inspectors: &'a InspectorRegistry) -> Self {
        Self { inspectors }
    }

    /// Render `forest`, consuming its child counters.
    ///
    /// With `probe` set, loaders whose inspector supports it get a liveness
    /// marker. Probing does network I/O and has no timeout of its own.
    ///
    /// # Errors
    /// Fails if a node's parent is not an open ancestor or the forest was
    /// already rendered.
    pub fn render(&self, forest: &mut Forest, probe: bool) -> Result<String, HierarchyError> {
        let nodes = forest.nodes_mut();
        let mut out = String::with_capacity(nodes.len() * 64);
        out.push_str(ROOT_LABEL);
        out.push('\n');

        let mut stack: Vec<usize> = Vec::with_capacity(nodes.len() / 2 + 1);
        stack.push(0);
        let mut prefix = String::from(" ");

        for index in 1..nodes.len() {
            let Some(loader) = nodes[index].loader().cloned() else {
                continue;
            };
            let id = loader.id();
            let parent = nodes[index].parent();

            // Close finished subtrees until the parent is on top
            loop {
                let Some(&top) = stack.last() else {
                    return Err(HierarchyError::Orphaned(id));
                };
                if nodes[top].id() == parent {
                    break;
                }
                stack.pop();
                prefix.truncate(prefix.len().saturating_sub(BLANK.len()));
            }

            let top = stack[stack.len() - 1];
            let remaining = nodes[top].take_child().ok_or(HierarchyError::ForestConsumed(id))?;

            out.push_str(&prefix);
            if remaining == 0 {
                prefix.push_str(BLANK);
                out.push_str(LAST_BRANCH);
            } else {
                prefix.push_str(CONTINUATION);
                out.push_str(BRANCH);
            }

            let _ = write!(out, "{id}");
            if probe {
                if let Some(liveness) = self.inspectors.probe(&loader) {
                    let _ = write!(out, " : {liveness}");
                }
            }
            let _ = writeln!(out, " : {} : {}", loader.kind(), loader.value());

            stack.push(index);
        }

        Ok(out)
    }
}
