//! Domain model for loadscope
//!
//! This module contains the host capability traits and errors that provide:
//! - A narrow, typed seam between host loaders and the core
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use loadscope_common::{Attributes, Liveness, LoaderId};
pub use types::{loader_label, Loader, LoaderRef, RemoteCodeSource, TypeInfo};

pub use errors::{ExtractError, HierarchyError, QueryError, RemoteError, ResolutionError};
