//! Per-service loaders: service name and native library path
//!
//! The search path is listed by the registry ahead of these sections.

use std::fmt::Write;

use loadscope_common::{attr, kinds};

use super::{append_locations, Inspector, INDENT};
use crate::domain::{Attributes, LoaderRef};

pub struct ServiceInspector;

impl Inspector for ServiceInspector {
    fn kind(&self) -> &str {
        kinds::SERVICE
    }

    fn describe(&self, _loader: &LoaderRef, attributes: &Attributes, out: &mut String) {
        let name = attributes.text(attr::SERVICE_NAME).unwrap_or("<unavailable>");
        let _ = writeln!(out, "Service name: {name}");
        out.push_str("Lib path:\n");
        append_locations(out, attributes.locations(attr::LIB_PATH), INDENT);
    }
}
