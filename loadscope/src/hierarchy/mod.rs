//! # Hierarchy Reconstruction and Rendering
//!
//! Loaders only point at their parent, so the tree has to be rebuilt on every
//! query from a registry snapshot:
//!
//! ```text
//! Snapshot ──► HierarchyBuilder::build ──► Forest ──► TreeRenderer::render ──► text
//!                (walk parent chains,        │
//!                 drop excluded kinds)       └──► Forest::find(id) ──► inspectors
//! ```
//!
//! ## Module Structure
//!
//! - **`forest`**: flat pre-order node sequence under a synthetic root, with
//!   per-node child counters
//! - **`builder`**: parent-chain walk, exclusion filter, cycle and identity checks
//! - **`render`**: stack-based indented rendering with branch glyphs and
//!   optional liveness markers
//!
//! A forest belongs to the query that built it. Rendering consumes its child
//! counters, so each render needs a fresh build.

pub mod builder;
pub mod forest;
pub mod render;

pub use builder::HierarchyBuilder;
pub use forest::{Forest, TreeNode};
pub use render::{TreeRenderer, ROOT_LABEL};
