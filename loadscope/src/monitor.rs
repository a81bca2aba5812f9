//! Management operations over an observed loader registry
//!
//! [`LoaderMonitor`] is what a management endpoint exposes: four read-only
//! queries taking primitives and returning plain text. Each query takes its
//! own snapshot and builds its own forest; nothing here mutates the registry.
//!
//! Only invariant violations in the hierarchy (cycles, corrupted identities)
//! fail a query. Unknown identities, failed attribute extraction and failed
//! type resolution come back as text.

use log::{error, warn};
use std::fmt::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::domain::{loader_label, HierarchyError, LoaderId, QueryError, TypeInfo};
use crate::hierarchy::{Forest, HierarchyBuilder, TreeRenderer};
use crate::inspect::InspectorRegistry;
use crate::registry::Registry;

/// Response to a query naming an identity absent from the current forest.
pub const NOT_FOUND: &str = "Loader not found.";

/// Name, description and parameters of one management operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationInfo {
    pub name: &'static str,
    pub description: &'static str,
    /// `(name, description)` per parameter
    pub params: &'static [(&'static str, &'static str)],
}

/// Catalog of the operations [`LoaderMonitor`] exposes.
pub const OPERATIONS: &[OperationInfo] = &[
    OperationInfo {
        name: "show_tree",
        description: "Get tree of loaders in the process",
        params: &[],
    },
    OperationInfo {
        name: "show_tree_with_remote_ping",
        description: "Get tree of loaders in the process. Remote loaders are pinged for liveness.",
        params: &[],
    },
    OperationInfo {
        name: "show_loader_details",
        description: "Get detailed info about a loader. Depending on kind, types or paths are shown.",
        params: &[("loader_id", "Loader identity as printed by show_tree")],
    },
    OperationInfo {
        name: "show_type_details",
        description: "Resolve a type through a loader and show its supertype chain with defining loaders.",
        params: &[
            ("type_name", "Fully qualified type name"),
            ("loader_id", "Loader identity as printed by show_tree"),
        ],
    },
];

/// Read-only query surface over a shared [`Registry`].
pub struct LoaderMonitor {
    registry: Arc<Registry>,
    builder: HierarchyBuilder,
    inspectors: InspectorRegistry,
}

impl LoaderMonitor {
    /// Monitor with default exclusions and the built-in inspectors.
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry, builder: HierarchyBuilder::new(), inspectors: InspectorRegistry::new() }
    }

    #[must_use]
    pub fn with_builder(mut self, builder: HierarchyBuilder) -> Self {
        self.builder = builder;
        self
    }

    #[must_use]
    pub fn with_inspectors(mut self, inspectors: InspectorRegistry) -> Self {
        self.inspectors = inspectors;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    #[must_use]
    pub fn operations() -> &'static [OperationInfo] {
        OPERATIONS
    }

    /// Fresh forest from the current registry contents.
    ///
    /// # Errors
    /// Fails when the observed parent links violate the hierarchy invariants.
    pub fn build_forest(&self) -> Result<Forest, HierarchyError> {
        let snapshot = self.registry.snapshot();
        self.builder
            .build(&snapshot)
            .inspect_err(|e| error!("Aborting hierarchy query: {e}"))
    }

    /// Loader tree without probing.
    ///
    /// # Errors
    /// Fails on hierarchy invariant violations.
    pub fn show_tree(&self) -> Result<String, HierarchyError> {
        self.render(false)
    }

    /// Loader tree with remote loaders probed for liveness.
    ///
    /// Slow and unbounded: wrap the call in a timeout.
    ///
    /// # Errors
    /// Fails on hierarchy invariant violations.
    pub fn show_tree_with_remote_ping(&self) -> Result<String, HierarchyError> {
        self.render(true)
    }

    /// [`Self::show_tree_with_remote_ping`] bounded by `limit`.
    ///
    /// The render runs on its own thread. On timeout that thread is left
    /// behind to finish or hang on its own; nothing waits for it.
    ///
    /// # Errors
    /// Fails on hierarchy invariant violations, when `limit` elapses first,
    /// or when the probing thread cannot be started or dies.
    pub async fn show_tree_with_remote_ping_within(
        self: Arc<Self>,
        limit: Duration,
    ) -> Result<String, QueryError> {
        let (tx, rx) = oneshot::channel();
        thread::Builder::new()
            .name("loadscope-ping".to_string())
            .spawn(move || {
                let _ = tx.send(self.show_tree_with_remote_ping());
            })
            .map_err(QueryError::Spawn)?;

        match tokio::time::timeout(limit, rx).await {
            Ok(Ok(rendered)) => Ok(rendered?),
            Ok(Err(_)) => Err(QueryError::Abandoned),
            Err(_) => {
                warn!("Abandoning probing render after {limit:?}");
                Err(QueryError::TimedOut(limit))
            }
        }
    }

    /// Kind-specific detail of one loader, or [`NOT_FOUND`].
    ///
    /// # Errors
    /// Fails on hierarchy invariant violations.
    pub fn show_loader_details(&self, loader_id: u64) -> Result<String, HierarchyError> {
        let forest = self.build_forest()?;
        Ok(match forest.find(LoaderId(loader_id)) {
            Some(loader) => self.inspectors.describe(loader),
            None => NOT_FOUND.to_string(),
        })
    }

    /// Resolve `type_name` through a loader and describe its supertype chain.
    ///
    /// Resolution failures are returned as text naming the captured error.
    ///
    /// # Errors
    /// Fails on hierarchy invariant violations.
    pub fn show_type_details(&self, type_name: &str, loader_id: u64) -> Result<String, HierarchyError> {
        let forest = self.build_forest()?;
        let Some(loader) = forest.find(LoaderId(loader_id)) else {
            return Ok(NOT_FOUND.to_string());
        };

        Ok(match loader.resolve_type(type_name) {
            Ok(info) => describe_type(&info),
            Err(e) => {
                warn!("Failed to resolve {type_name} through loader {loader_id}: {e}");
                format!("Failed to resolve {type_name} through loader {loader_id}: {e}\n")
            }
        })
    }

    fn render(&self, probe: bool) -> Result<String, HierarchyError> {
        let mut forest = self.build_forest()?;
        TreeRenderer::new(&self.inspectors)
            .render(&mut forest, probe)
            .inspect_err(|e| error!("Aborting tree render: {e}"))
    }
}

/// Human-readable operation catalog.
#[must_use]
pub fn describe_operations() -> String {
    let mut out = String::new();
    for op in OPERATIONS {
        let params: Vec<&str> = op.params.iter().map(|(name, _)| *name).collect();
        let _ = writeln!(out, "{}({})", op.name, params.join(", "));
        let _ = writeln!(out, "    {}", op.description);
        for (name, description) in op.params {
            let _ = writeln!(out, "    {name}: {description}");
        }
    }
    out
}

/// One block per type in the supertype chain:
///
/// ```text
/// com.acme.Order@5001
///   loader:        service@12
///   parent loader: search-path@11
/// ```
fn describe_type(info: &TypeInfo) -> String {
    let mut out = String::new();
    for ty in info.ancestry() {
        let parent = ty.loader.as_ref().map(|l| loader_label(l.parent().as_ref()));
        let _ = writeln!(out, "{}@{}", ty.name, ty.id);
        let _ = writeln!(out, "  loader:        {}", loader_label(ty.loader.as_ref()));
        let _ = writeln!(out, "  parent loader: {}", parent.unwrap_or_default());
    }
    out
}
