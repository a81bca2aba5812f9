//! Loaders backed by an ordered list of search locations

use loadscope_common::{attr, kinds};

use super::{append_locations, Inspector, INDENT};
use crate::domain::{Attributes, LoaderRef};

pub struct SearchPathInspector;

impl Inspector for SearchPathInspector {
    fn kind(&self) -> &str {
        kinds::SEARCH_PATH
    }

    fn lists_search_path(&self) -> bool {
        true
    }

    fn describe(&self, _loader: &LoaderRef, attributes: &Attributes, out: &mut String) {
        out.push_str("Search path:\n");
        append_locations(out, attributes.locations(attr::SEARCH_PATH), INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExtractError, Loader, LoaderId};
    use loadscope_common::AttributeValue;
    use std::sync::Arc;

    struct App;

    impl Loader for App {
        fn id(&self) -> LoaderId {
            LoaderId(3)
        }
        fn kind(&self) -> &str {
            kinds::SEARCH_PATH
        }
        fn parent(&self) -> Option<LoaderRef> {
            None
        }
        fn attributes(&self) -> Result<Attributes, ExtractError> {
            Ok(Attributes::new().with(
                attr::SEARCH_PATH,
                AttributeValue::Locations(vec![
                    "file:/opt/app/lib/core.jar".into(),
                    "file:/opt/app/lib/util.jar".into(),
                ]),
            ))
        }
    }

    #[test]
    fn test_lists_locations_in_order() {
        let loader: LoaderRef = Arc::new(App);
        let mut out = String::new();
        SearchPathInspector.describe(&loader, &loader.attributes().unwrap(), &mut out);

        assert_eq!(
            out,
            "Search path:\n  file:/opt/app/lib/core.jar\n  file:/opt/app/lib/util.jar\n"
        );
    }

    #[test]
    fn test_search_path_listed_once() {
        let loader: LoaderRef = Arc::new(App);
        let text = crate::inspect::InspectorRegistry::new().describe(&loader);
        assert_eq!(text.matches("Search path:").count(), 1);
    }

    #[test]
    fn test_missing_search_path() {
        let loader: LoaderRef = Arc::new(App);
        let mut out = String::new();
        SearchPathInspector.describe(&loader, &Attributes::new(), &mut out);
        assert_eq!(out, "Search path:\n  <unavailable>\n");
    }
}
