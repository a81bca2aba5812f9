//! Recorded host adapter
//!
//! Rebuilds a host's loaders from a JSON description so the registry,
//! hierarchy and inspectors can be driven without attaching to a live
//! process. This is the observation source used by the CLI.
//!
//! ```json
//! {
//!   "bootstrap_types": [{ "name": "core.Object", "id": 1 }],
//!   "loaders": [
//!     { "id": 11, "kind": "search-path", "value": "platform",
//!       "attributes": { "search_path": ["file:/opt/platform.jar"] },
//!       "types": [{ "name": "acme.Order", "id": 5001, "supertype": "core.Object" }] },
//!     { "id": 21, "parent": 11, "kind": "remote", "remote": "unreachable" },
//!     { "id": 5, "kind": "search-path", "observed": false }
//!   ]
//! }
//! ```
//!
//! Loaders marked `"observed": false` are never recorded, but stay reachable
//! through their children's parent links, like ancestors the host never
//! reported on their own.

use anyhow::{bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Weak};

use crate::domain::{
    Attributes, ExtractError, Loader, LoaderId, LoaderRef, RemoteCodeSource, RemoteError,
    ResolutionError, TypeInfo,
};
use crate::registry::Registry;

/// Supertype chains longer than this are treated as broken.
const MAX_SUPERTYPE_DEPTH: usize = 64;

// =============================================================================
// DESCRIPTION FORMAT
// =============================================================================

/// Whole recorded host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostDescription {
    /// Types resolvable without any loader
    #[serde(default)]
    pub bootstrap_types: Vec<TypeSpec>,
    pub loaders: Vec<LoaderSpec>,
}

/// One recorded loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderSpec {
    pub id: LoaderId,
    #[serde(default)]
    pub parent: Option<LoaderId>,
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
    /// Makes attribute extraction fail with this message
    #[serde(default)]
    pub attributes_error: Option<String>,
    #[serde(default = "default_observed")]
    pub observed: bool,
    #[serde(default)]
    pub remote: Option<RemoteStatus>,
    #[serde(default)]
    pub types: Vec<TypeSpec>,
}

fn default_observed() -> bool {
    true
}

/// Recorded state of a remote code source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    /// Answers lookups
    Alive,
    /// Connection fails
    Unreachable,
    /// Fails for reasons other than communication
    Broken,
}

/// A type a loader defines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSpec {
    pub name: String,
    pub id: u64,
    #[serde(default)]
    pub supertype: Option<String>,
}

// =============================================================================
// REPLAYED LOADERS
// =============================================================================

/// Types visible at the bootstrap level.
#[derive(Debug, Default)]
struct TypeTable {
    types: HashMap<String, TypeSpec>,
}

impl TypeTable {
    fn new(specs: &[TypeSpec]) -> Self {
        Self { types: specs.iter().map(|t| (t.name.clone(), t.clone())).collect() }
    }

    fn resolve(&self, name: &str, depth: usize) -> Result<TypeInfo, ResolutionError> {
        if depth > MAX_SUPERTYPE_DEPTH {
            return Err(ResolutionError::Failed(format!("supertype chain of {name} is too deep")));
        }
        let spec = self.types.get(name).ok_or_else(|| ResolutionError::NotFound(name.to_string()))?;
        let supertype = spec
            .supertype
            .as_deref()
            .map(|s| self.resolve(s, depth + 1))
            .transpose()?
            .map(Box::new);
        Ok(TypeInfo { name: spec.name.clone(), id: spec.id, loader: None, supertype })
    }
}

struct ReplayRemote {
    status: RemoteStatus,
}

impl RemoteCodeSource for ReplayRemote {
    fn fetch_definition(&self, type_name: &str) -> Result<Vec<u8>, RemoteError> {
        match self.status {
            RemoteStatus::Alive => Err(RemoteError::NotFound(type_name.to_string())),
            RemoteStatus::Unreachable => {
                Err(RemoteError::Communication("connection refused".to_string()))
            }
            RemoteStatus::Broken => {
                Err(RemoteError::Other("remote provider is not initialized".to_string()))
            }
        }
    }
}

/// Loader rebuilt from a [`LoaderSpec`].
pub struct ReplayLoader {
    id: LoaderId,
    kind: String,
    value: Option<String>,
    parent: Option<LoaderRef>,
    attributes: Attributes,
    attributes_error: Option<String>,
    remote: Option<Arc<ReplayRemote>>,
    types: HashMap<String, TypeSpec>,
    bootstrap: Arc<TypeTable>,
    this: Weak<ReplayLoader>,
}

impl ReplayLoader {
    /// Parent-first resolution, then this loader's own types.
    fn resolve(&self, name: &str, depth: usize) -> Result<TypeInfo, ResolutionError> {
        if depth > MAX_SUPERTYPE_DEPTH {
            return Err(ResolutionError::Failed(format!("supertype chain of {name} is too deep")));
        }

        let delegated = match &self.parent {
            Some(parent) => parent.resolve_type(name),
            None => self.bootstrap.resolve(name, 0),
        };
        match delegated {
            Ok(info) => return Ok(info),
            Err(ResolutionError::NotFound(_) | ResolutionError::Unsupported(_)) => {}
            Err(e) => return Err(e),
        }

        let spec = self.types.get(name).ok_or_else(|| ResolutionError::NotFound(name.to_string()))?;
        let supertype = spec
            .supertype
            .as_deref()
            .map(|s| self.resolve(s, depth + 1))
            .transpose()?
            .map(Box::new);
        let loader = self.this.upgrade().map(|l| l as LoaderRef);
        Ok(TypeInfo { name: spec.name.clone(), id: spec.id, loader, supertype })
    }
}

impl Loader for ReplayLoader {
    fn id(&self) -> LoaderId {
        self.id
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn parent(&self) -> Option<LoaderRef> {
        self.parent.clone()
    }

    fn value(&self) -> String {
        self.value.clone().unwrap_or_else(|| format!("{}@{}", self.kind, self.id))
    }

    fn attributes(&self) -> Result<Attributes, ExtractError> {
        match &self.attributes_error {
            Some(message) => Err(ExtractError::Failed(message.clone())),
            None => Ok(self.attributes.clone()),
        }
    }

    fn remote_source(&self) -> Option<Arc<dyn RemoteCodeSource>> {
        self.remote.clone().map(|r| r as Arc<dyn RemoteCodeSource>)
    }

    fn resolve_type(&self, name: &str) -> Result<TypeInfo, ResolutionError> {
        self.resolve(name, 0)
    }
}

// =============================================================================
// HOST
// =============================================================================

struct HostedLoader {
    observed: bool,
    loader: Arc<ReplayLoader>,
}

/// Owner of every replayed loader.
///
/// Holds the only strong references besides children's parent links;
/// [`ReplayHost::release`] drops one to simulate the host reclaiming a loader.
pub struct ReplayHost {
    loaders: Vec<HostedLoader>,
}

impl ReplayHost {
    /// Load a host description from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or describes an invalid host.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read host description {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid host description {}", path.display()))
    }

    /// # Errors
    /// Returns an error on malformed JSON or an invalid host.
    pub fn from_json(json: &str) -> Result<Self> {
        let description: HostDescription =
            serde_json::from_str(json).context("Failed to parse host description")?;
        Self::from_description(&description)
    }

    /// Build every loader, parents before children.
    ///
    /// # Errors
    /// Duplicate identities, unknown parents and parent cycles are rejected.
    pub fn from_description(description: &HostDescription) -> Result<Self> {
        let mut specs: HashMap<LoaderId, &LoaderSpec> = HashMap::new();
        for spec in &description.loaders {
            if specs.insert(spec.id, spec).is_some() {
                bail!("Loader {} is described more than once", spec.id);
            }
        }

        let bootstrap = Arc::new(TypeTable::new(&description.bootstrap_types));
        let mut built: HashMap<LoaderId, Arc<ReplayLoader>> = HashMap::new();
        let mut in_progress: HashSet<LoaderId> = HashSet::new();

        let mut loaders = Vec::with_capacity(description.loaders.len());
        for spec in &description.loaders {
            let loader = build_loader(spec.id, &specs, &bootstrap, &mut built, &mut in_progress)?;
            loaders.push(HostedLoader { observed: spec.observed, loader });
        }

        Ok(Self { loaders })
    }

    /// Record every observed loader, in description order.
    ///
    /// Returns the number of loaders recorded.
    pub fn observe(&self, registry: &Registry) -> usize {
        let mut recorded = 0;
        for hosted in self.loaders.iter().filter(|h| h.observed) {
            let loader: LoaderRef = hosted.loader.clone();
            registry.record(&loader);
            recorded += 1;
        }
        info!("Observed {recorded} of {} replayed loaders", self.loaders.len());
        recorded
    }

    /// Every replayed loader, observed or not.
    pub fn loaders(&self) -> impl Iterator<Item = LoaderRef> + '_ {
        self.loaders.iter().map(|h| -> LoaderRef { h.loader.clone() })
    }

    #[must_use]
    pub fn get(&self, id: LoaderId) -> Option<LoaderRef> {
        self.loaders.iter().find(|h| h.loader.id == id).map(|h| -> LoaderRef { h.loader.clone() })
    }

    /// Drop the host's reference to a loader. Returns whether it was held.
    pub fn release(&mut self, id: LoaderId) -> bool {
        let before = self.loaders.len();
        self.loaders.retain(|h| h.loader.id != id);
        self.loaders.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

fn build_loader(
    id: LoaderId,
    specs: &HashMap<LoaderId, &LoaderSpec>,
    bootstrap: &Arc<TypeTable>,
    built: &mut HashMap<LoaderId, Arc<ReplayLoader>>,
    in_progress: &mut HashSet<LoaderId>,
) -> Result<Arc<ReplayLoader>> {
    if let Some(loader) = built.get(&id) {
        return Ok(Arc::clone(loader));
    }
    if !in_progress.insert(id) {
        bail!("Parent chain of loader {id} loops back on itself");
    }

    let spec = specs.get(&id).with_context(|| format!("Unknown loader {id}"))?;
    let parent = match spec.parent {
        Some(parent_id) => {
            if !specs.contains_key(&parent_id) {
                bail!("Loader {id} refers to unknown parent {parent_id}");
            }
            let parent: LoaderRef = build_loader(parent_id, specs, bootstrap, built, in_progress)?;
            Some(parent)
        }
        None => None,
    };

    let loader = Arc::new_cyclic(|this| ReplayLoader {
        id,
        kind: spec.kind.clone(),
        value: spec.value.clone(),
        parent,
        attributes: spec.attributes.clone(),
        attributes_error: spec.attributes_error.clone(),
        remote: spec.remote.map(|status| Arc::new(ReplayRemote { status })),
        types: spec.types.iter().map(|t| (t.name.clone(), t.clone())).collect(),
        bootstrap: Arc::clone(bootstrap),
        this: this.clone(),
    });

    in_progress.remove(&id);
    built.insert(id, Arc::clone(&loader));
    Ok(loader)
}
