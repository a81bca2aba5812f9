//! Loaders that fetch type definitions from a remote code source
//!
//! Describing one lists the type bindings it owns in the shared remote
//! context. Probing asks the remote source for a type that cannot exist and
//! reads liveness from how the request fails:
//!
//! | Outcome                        | Liveness        |
//! |--------------------------------|-----------------|
//! | definition or "not found"      | `Alive`         |
//! | communication failure          | `Unreachable`   |
//! | anything else / no source      | `Indeterminate` |

use log::{error, info};
use std::fmt::Write;

use loadscope_common::{attr, kinds};

use super::{Inspector, INDENT};
use crate::domain::{Attributes, Liveness, LoaderRef, RemoteError};

/// Type name requested by liveness probes; no code source can define it.
pub const PROBE_TYPE_NAME: &str = "non.existent.type.Here";

pub struct RemoteInspector;

impl Inspector for RemoteInspector {
    fn kind(&self) -> &str {
        kinds::REMOTE
    }

    fn describe(&self, loader: &LoaderRef, attributes: &Attributes, out: &mut String) {
        out.push_str("Context types:\n");
        let Some(bindings) = attributes.bindings(attr::CONTEXT_TYPES) else {
            error!("Failed to read remote context types of loader {}", loader.id());
            let _ = writeln!(out, "{INDENT}failed to read");
            return;
        };

        let id = loader.id();
        for binding in bindings.iter().filter(|b| b.owner == id) {
            let _ = writeln!(out, "{INDENT}{}:{}", binding.name, binding.owner);
        }
    }

    fn probe(&self, loader: &LoaderRef) -> Option<Liveness> {
        let Some(source) = loader.remote_source() else {
            error!("Loader {} exposes no remote code source to probe", loader.id());
            return Some(Liveness::Indeterminate);
        };
        Some(classify(source.fetch_definition(PROBE_TYPE_NAME)))
    }
}

/// Map the outcome of a remote lookup to a liveness verdict.
#[must_use]
pub fn classify(outcome: Result<Vec<u8>, RemoteError>) -> Liveness {
    match outcome {
        Ok(_) => Liveness::Alive,
        Err(e @ RemoteError::NotFound(_)) => {
            info!("Remote probe answered: {e}");
            Liveness::Alive
        }
        Err(e @ RemoteError::Communication(_)) => {
            info!("Remote probe failed: {e}");
            Liveness::Unreachable
        }
        Err(e @ RemoteError::Other(_)) => {
            error!("Remote probe failed: {e}");
            Liveness::Indeterminate
        }
    }
}
