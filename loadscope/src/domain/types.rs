//! Host-facing capability types
//!
//! A host exposes each of its loaders as an `Arc<dyn Loader>`. The registry
//! only ever keeps `Weak` handles to them; queries upgrade for their own
//! duration and drop the strong handles afterwards.

use std::fmt;
use std::iter;
use std::sync::Arc;

use loadscope_common::{Attributes, LoaderId};

use super::errors::{ExtractError, RemoteError, ResolutionError};

/// Shared handle to a host loader.
pub type LoaderRef = Arc<dyn Loader>;

/// One loader as seen by the host.
///
/// Only `id`, `kind` and `parent` are needed to place a loader in the
/// hierarchy. The remaining methods are queried lazily by inspectors and the
/// management operations, and may be slow or fail.
pub trait Loader: Send + Sync {
    /// Identity, stable while the loader is reachable.
    fn id(&self) -> LoaderId;

    /// Kind tag used for inspector dispatch and exclusion.
    fn kind(&self) -> &str;

    /// Parent loader, `None` at the bootstrap level. Never changes.
    fn parent(&self) -> Option<LoaderRef>;

    /// Best-effort human readable value.
    fn value(&self) -> String {
        format!("{}@{}", self.kind(), self.id())
    }

    /// Kind-dependent detail, extracted on demand.
    ///
    /// # Errors
    /// Returns an error when the host cannot introspect this loader.
    fn attributes(&self) -> Result<Attributes, ExtractError> {
        Ok(Attributes::new())
    }

    /// Remote code source this loader proxies, if any.
    fn remote_source(&self) -> Option<Arc<dyn RemoteCodeSource>> {
        None
    }

    /// Resolve a type name through this loader.
    ///
    /// # Errors
    /// Returns an error when the type cannot be found or the loader does not
    /// support resolution.
    fn resolve_type(&self, name: &str) -> Result<TypeInfo, ResolutionError> {
        let _ = name;
        Err(ResolutionError::Unsupported(self.kind().to_string()))
    }
}

impl fmt::Debug for dyn Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind(), self.id())
    }
}

/// Endpoint that serves type definitions to a remote-proxying loader.
pub trait RemoteCodeSource: Send + Sync {
    /// Fetch the definition bytes of `type_name`.
    ///
    /// # Errors
    /// `NotFound` when the endpoint answered without a definition,
    /// `Communication` when it could not be reached, `Other` otherwise.
    fn fetch_definition(&self, type_name: &str) -> Result<Vec<u8>, RemoteError>;
}

/// A resolved type and its supertype chain.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub name: String,
    /// Identity of the type object itself
    pub id: u64,
    /// Defining loader, `None` for bootstrap types
    pub loader: Option<LoaderRef>,
    pub supertype: Option<Box<TypeInfo>>,
}

impl TypeInfo {
    /// This type followed by each of its supertypes.
    pub fn ancestry(&self) -> impl Iterator<Item = &TypeInfo> {
        iter::successors(Some(self), |info| info.supertype.as_deref())
    }
}

/// `kind@id` label for a loader, `<bootstrap>` for the bootstrap level.
#[must_use]
pub fn loader_label(loader: Option<&LoaderRef>) -> String {
    loader.map_or_else(|| "<bootstrap>".to_string(), |l| format!("{}@{}", l.kind(), l.id()))
}
