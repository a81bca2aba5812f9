//! Kind-specific loader inspection
//!
//! Each recognized loader kind has an [`Inspector`] that knows which of the
//! host's attributes matter for it and, for remote-proxying kinds, how to
//! probe liveness. Kinds without an inspector get a header-only description.
//! Whenever a loader's attributes carry a search path, it is listed ahead of
//! the kind-specific sections.
//!
//! Adding a kind means registering another inspector, never branching on kind
//! names in the core.

pub mod remote;
pub mod search_path;
pub mod service;
pub mod shared_codebase;

use log::error;
use std::collections::HashMap;
use std::fmt::Write;

use loadscope_common::attr;

use crate::domain::{Attributes, Liveness, LoaderRef};

pub use remote::RemoteInspector;
pub use search_path::SearchPathInspector;
pub use service::ServiceInspector;
pub use shared_codebase::SharedCodebaseInspector;

/// Indentation unit for description sections.
pub const INDENT: &str = "  ";

/// Detail extraction for one loader kind.
pub trait Inspector: Send + Sync {
    /// Kind tag this inspector handles.
    fn kind(&self) -> &str;

    /// Append kind-specific sections for `loader` to `out`.
    fn describe(&self, loader: &LoaderRef, attributes: &Attributes, out: &mut String);

    /// Whether `describe` already lists the search path itself.
    fn lists_search_path(&self) -> bool {
        false
    }

    /// Liveness of the loader's remote counterpart, `None` if the kind has none.
    fn probe(&self, loader: &LoaderRef) -> Option<Liveness> {
        let _ = loader;
        None
    }
}

/// Inspectors keyed by kind tag.
pub struct InspectorRegistry {
    inspectors: HashMap<String, Box<dyn Inspector>>,
}

impl Default for InspectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectorRegistry {
    /// Registry with the built-in inspectors.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(SearchPathInspector));
        registry.register(Box::new(ServiceInspector));
        registry.register(Box::new(SharedCodebaseInspector));
        registry.register(Box::new(RemoteInspector));
        registry
    }

    /// Registry where every kind gets the default treatment.
    #[must_use]
    pub fn empty() -> Self {
        Self { inspectors: HashMap::new() }
    }

    /// Register an inspector, returning the one it replaces for the same kind.
    pub fn register(&mut self, inspector: Box<dyn Inspector>) -> Option<Box<dyn Inspector>> {
        self.inspectors.insert(inspector.kind().to_string(), inspector)
    }

    #[must_use]
    pub fn inspector_for(&self, kind: &str) -> Option<&dyn Inspector> {
        self.inspectors.get(kind).map(|inspector| &**inspector)
    }

    /// Describe `loader`: `<kind> : <id>` header plus the inspector's sections.
    ///
    /// Attribute extraction failures are logged and reported inline.
    #[must_use]
    pub fn describe(&self, loader: &LoaderRef) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} : {}", loader.kind(), loader.id());

        let Some(inspector) = self.inspector_for(loader.kind()) else {
            return out;
        };
        match loader.attributes() {
            Ok(attributes) => {
                if !inspector.lists_search_path() {
                    if let Some(locations) = attributes.locations(attr::SEARCH_PATH) {
                        out.push_str("Search path:\n");
                        append_locations(&mut out, Some(locations), INDENT);
                    }
                }
                inspector.describe(loader, &attributes, &mut out);
            }
            Err(e) => {
                error!("Failed to extract attributes of loader {}: {e}", loader.id());
                let _ = writeln!(out, "{INDENT}failed to read attributes: {e}");
            }
        }
        out
    }

    /// Probe `loader` if its kind supports it.
    #[must_use]
    pub fn probe(&self, loader: &LoaderRef) -> Option<Liveness> {
        self.inspector_for(loader.kind())?.probe(loader)
    }
}

/// Append one line per location, or a placeholder when absent.
pub(crate) fn append_locations(out: &mut String, locations: Option<&[String]>, indent: &str) {
    match locations {
        Some(locations) => {
            for location in locations {
                let _ = writeln!(out, "{indent}{location}");
            }
        }
        None => {
            let _ = writeln!(out, "{indent}<unavailable>");
        }
    }
}
