//! Structured error types for loadscope
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Only [`HierarchyError`] ever fails a query; the others are collaborator
//! failures that get folded into textual or classified results.

use loadscope_common::LoaderId;
use std::time::Duration;
use thiserror::Error;

/// Invariant violations met while rebuilding or rendering the hierarchy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Parent chain of loader {0} loops back on itself")]
    Cycle(LoaderId),

    #[error("Two distinct loaders report identity {0}")]
    CorruptedIdentity(LoaderId),

    #[error("Loader {0} is not attached under any open ancestor")]
    Orphaned(LoaderId),

    #[error("Forest has already been rendered (child counters exhausted at loader {0})")]
    ForestConsumed(LoaderId),
}

/// Failure of a query run under a caller-side time limit.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error("Probing render timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Failed to start probing thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Probing thread exited without a result")]
    Abandoned,
}

/// Failure of the host's attribute extractor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Attribute {0} is not available")]
    Missing(String),

    #[error("Attribute extraction failed: {0}")]
    Failed(String),
}

/// Failure reported by a remote code source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The endpoint answered that it has no such definition
    #[error("Remote definition not found: {0}")]
    NotFound(String),

    #[error("Remote communication failed: {0}")]
    Communication(String),

    #[error("Remote lookup failed: {0}")]
    Other(String),
}

/// Failure to resolve a type name through a loader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Type {0} not found")]
    NotFound(String),

    #[error("Loader of kind {0} does not resolve types")]
    Unsupported(String),

    #[error("Type resolution failed: {0}")]
    Failed(String),
}
