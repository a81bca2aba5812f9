//! Loaders shared across services, assembled from codebases and named components

use std::fmt::Write;

use loadscope_common::{attr, kinds};

use super::{append_locations, Inspector, INDENT};
use crate::domain::{Attributes, LoaderRef};

pub struct SharedCodebaseInspector;

impl Inspector for SharedCodebaseInspector {
    fn kind(&self) -> &str {
        kinds::SHARED_CODEBASE
    }

    fn describe(&self, _loader: &LoaderRef, attributes: &Attributes, out: &mut String) {
        out.push_str("Codebases:\n");
        append_locations(out, attributes.locations(attr::CODEBASES), INDENT);

        out.push_str("Components:\n");
        match attributes.components(attr::COMPONENTS) {
            Some(components) => {
                let nested = INDENT.repeat(2);
                for component in components {
                    let _ = writeln!(out, "{INDENT}{}", component.name);
                    append_locations(out, Some(&component.locations), &nested);
                }
            }
            None => {
                let _ = writeln!(out, "{INDENT}<unavailable>");
            }
        }
    }
}
