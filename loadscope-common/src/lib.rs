//! # Shared Data Structures (Host Adapters ↔ Core)
//!
//! Value types shared between observation adapters that feed loaders into the
//! registry and the hierarchy/inspection core. Nothing here has behavior beyond
//! formatting and lookup; the `serde` feature enables (de)serialization for
//! adapters that read recorded host descriptions.
//!
//! ## Key Types
//!
//! - [`LoaderId`] - Stable identity of one loader instance
//! - [`Attributes`] - Lazily extracted, kind-dependent detail bag
//! - [`Liveness`] - Three-way outcome of a remote liveness probe
//! - [`kinds`] - Kind tags the built-in inspectors and filters understand

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Kind Tags
// ============================================================================

/// Kind tags recognized by the built-in inspectors and exclusion defaults.
pub mod kinds {
    /// Loader that searches an ordered list of locations.
    pub const SEARCH_PATH: &str = "search-path";

    /// Per-service loader with its own search and native library paths.
    pub const SERVICE: &str = "service";

    /// Loader shared between services, built from codebases and named components.
    pub const SHARED_CODEBASE: &str = "shared-codebase";

    /// Loader that fetches type definitions from a remote code source.
    pub const REMOTE: &str = "remote";

    /// Short-lived loader created to back reflective accessors.
    pub const REFLECTION_DELEGATE: &str = "reflection-delegate";

    /// Trampoline loader used by reflective method invocation.
    pub const REFLECTION_SUPPORT: &str = "reflection-support";

    /// Kinds dropped from the hierarchy unless configured otherwise.
    pub const DEFAULT_EXCLUDED: &[&str] = &[REFLECTION_DELEGATE, REFLECTION_SUPPORT];
}

/// Attribute names used by the built-in inspectors.
pub mod attr {
    pub const SEARCH_PATH: &str = "search_path";
    pub const LIB_PATH: &str = "lib_path";
    pub const SERVICE_NAME: &str = "service_name";
    pub const CODEBASES: &str = "codebases";
    pub const COMPONENTS: &str = "components";
    pub const CONTEXT_TYPES: &str = "context_types";
}

// ============================================================================
// Identity
// ============================================================================

/// Identity of one loader instance.
///
/// Host-supplied and stable for as long as the loader is reachable. Two
/// observations of the same loader compare equal by this value only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct LoaderId(pub u64);

impl fmt::Display for LoaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for LoaderId {
    fn from(id: u64) -> Self {
        LoaderId(id)
    }
}

// ============================================================================
// Liveness
// ============================================================================

/// Outcome of probing a loader's remote code source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum Liveness {
    /// Remote endpoint answered (even if only with "not found")
    Alive,
    /// Remote endpoint could not be reached
    Unreachable,
    /// Probe failed for a reason unrelated to communication
    Indeterminate,
}

impl Liveness {
    /// Inline marker used in rendered trees.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Liveness::Alive => "[+]",
            Liveness::Unreachable => "[-]",
            Liveness::Indeterminate => "[?]",
        }
    }
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// Named component and the locations it was assembled from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Component {
    pub name: String,
    pub locations: Vec<String>,
}

/// Type name bound to the loader that owns it in a remote loading context.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeBinding {
    pub name: String,
    pub owner: LoaderId,
}

/// One value in an [`Attributes`] bag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum AttributeValue {
    Text(String),
    Locations(Vec<String>),
    Components(Vec<Component>),
    Bindings(Vec<TypeBinding>),
}

/// Kind-dependent bag of loader detail.
///
/// Populated on demand by the host; which names are present depends on the
/// loader's kind. Lookups with the wrong shape return `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.0.insert(name.into(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name)? {
            AttributeValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Location list. An empty JSON array deserializes as locations, so empty
    /// component and binding lists are accepted here too.
    #[must_use]
    pub fn locations(&self, name: &str) -> Option<&[String]> {
        match self.0.get(name)? {
            AttributeValue::Locations(locations) => Some(locations),
            _ => None,
        }
    }

    #[must_use]
    pub fn components(&self, name: &str) -> Option<&[Component]> {
        match self.0.get(name)? {
            AttributeValue::Components(components) => Some(components),
            AttributeValue::Locations(empty) if empty.is_empty() => Some(&[]),
            _ => None,
        }
    }

    #[must_use]
    pub fn bindings(&self, name: &str) -> Option<&[TypeBinding]> {
        match self.0.get(name)? {
            AttributeValue::Bindings(bindings) => Some(bindings),
            AttributeValue::Locations(empty) if empty.is_empty() => Some(&[]),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
