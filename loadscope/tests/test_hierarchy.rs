use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;

use loadscope::domain::{Attributes, LoaderId, LoaderRef};
use loadscope::hierarchy::{Forest, HierarchyBuilder, TreeRenderer, ROOT_LABEL};
use loadscope::inspect::InspectorRegistry;
use loadscope::monitor::LoaderMonitor;
use loadscope::registry::Registry;
use loadscope::replay::{HostDescription, LoaderSpec, ReplayHost};
use loadscope_common::kinds;

fn spec(id: u64, parent: Option<u64>, kind: &str, observed: bool) -> LoaderSpec {
    LoaderSpec {
        id: LoaderId(id),
        parent: parent.map(LoaderId),
        kind: kind.to_string(),
        value: None,
        attributes: Attributes::new(),
        attributes_error: None,
        observed,
        remote: None,
        types: Vec::new(),
    }
}

/// 60 loaders in scrambled order: several roots, every fifth one excluded,
/// every eleventh never observed directly.
fn generated_host() -> HostDescription {
    let loaders = (1..=60u64)
        .map(|k| (k * 37) % 61)
        .map(|i| {
            let parent = (i % 7 != 1).then_some(i / 2);
            let kind = if i % 5 == 3 { kinds::REFLECTION_SUPPORT } else { kinds::SEARCH_PATH };
            spec(i, parent, kind, i % 11 != 0)
        })
        .collect();
    HostDescription { bootstrap_types: Vec::new(), loaders }
}

fn nearest_kept(mut current: Option<LoaderRef>, builder: &HierarchyBuilder) -> Option<LoaderId> {
    while let Some(loader) = current {
        if !builder.is_excluded(loader.kind()) {
            return Some(loader.id());
        }
        current = loader.parent();
    }
    None
}

fn build(registry: &Registry) -> Forest {
    HierarchyBuilder::new().build(&registry.snapshot()).expect("hierarchy should be valid")
}

#[test]
fn test_excluded_loader_is_spliced_out() {
    let host = ReplayHost::from_description(&HostDescription {
        bootstrap_types: Vec::new(),
        loaders: vec![
            spec(1, None, kinds::SEARCH_PATH, true),
            spec(2, Some(1), kinds::SEARCH_PATH, true),
            spec(3, Some(2), kinds::REFLECTION_DELEGATE, true),
            spec(4, Some(3), kinds::SEARCH_PATH, true),
        ],
    })
    .unwrap();
    let registry = Registry::new();
    host.observe(&registry);

    let forest = build(&registry);
    let ids: Vec<LoaderId> = forest.loaders().map(|l| l.id()).collect();
    assert_eq!(ids, [1, 2, 4].map(LoaderId));
    assert_eq!(forest.node(LoaderId(4)).unwrap().parent(), Some(LoaderId(2)));
    assert_eq!(forest.node(LoaderId(2)).unwrap().child_count(), 1);
    assert!(!forest.contains(LoaderId(3)));
}

#[test]
fn test_forest_is_complete_and_free_of_duplicates() {
    let host = ReplayHost::from_description(&generated_host()).unwrap();
    let registry = Registry::new();
    host.observe(&registry);
    let builder = HierarchyBuilder::new();
    let forest = build(&registry);

    let mut expected = HashSet::new();
    for loader in registry.snapshot().iter() {
        let mut current = Some(Arc::clone(loader));
        while let Some(loader) = current {
            if !builder.is_excluded(loader.kind()) {
                expected.insert(loader.id());
            }
            current = loader.parent();
        }
    }

    let ids: Vec<LoaderId> = forest.loaders().map(|l| l.id()).collect();
    let unique: HashSet<LoaderId> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len(), "a loader appears more than once");
    assert_eq!(unique, expected);
    assert!(forest.loaders().all(|l| !builder.is_excluded(l.kind())));
}

#[test]
fn test_forest_is_preorder_under_nearest_kept_ancestor() {
    let host = ReplayHost::from_description(&generated_host()).unwrap();
    let registry = Registry::new();
    host.observe(&registry);
    let builder = HierarchyBuilder::new();
    let forest = build(&registry);

    let nodes = forest.nodes();
    let position: HashMap<LoaderId, usize> =
        nodes.iter().enumerate().filter_map(|(i, n)| n.id().map(|id| (id, i))).collect();

    for (index, node) in nodes.iter().enumerate().skip(1) {
        let loader = node.loader().unwrap();
        assert_eq!(node.parent(), nearest_kept(loader.parent(), &builder), "parent of {}", loader.id());

        let parent_index = node.parent().map_or(0, |p| position[&p]);
        let parent_depth = nodes[parent_index].depth();
        assert!(parent_index < index);
        assert_eq!(node.depth(), parent_depth + 1);
        // Everything between a parent and its child belongs to the parent's subtree
        assert!(nodes[parent_index + 1..index].iter().all(|n| n.depth() > parent_depth));
    }

    for (index, node) in nodes.iter().enumerate() {
        let children = nodes.iter().filter(|n| !n.is_root() && n.parent() == node.id()).count();
        assert_eq!(node.child_count(), children, "child count at position {index}");
    }
}

#[test]
fn test_rendered_glyphs_follow_sibling_order() {
    let host = ReplayHost::from_description(&generated_host()).unwrap();
    let registry = Registry::new();
    host.observe(&registry);
    let mut forest = build(&registry);

    let layout: Vec<(Option<LoaderId>, Option<LoaderId>, usize)> =
        forest.nodes().iter().map(|n| (n.id(), n.parent(), n.depth())).collect();

    let inspectors = InspectorRegistry::new();
    let text = TreeRenderer::new(&inspectors).render(&mut forest, false).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), layout.len());
    assert_eq!(lines[0], ROOT_LABEL);
    for (index, &(id, parent, depth)) in layout.iter().enumerate().skip(1) {
        let line = lines[index];
        let indent = 1 + 2 * (depth - 1);
        let last = !layout[index + 1..].iter().any(|&(_, p, _)| p == parent);

        assert_eq!(&line[indent..indent + 2], if last { "\\-" } else { "|-" }, "line {line:?}");
        assert!(line[indent + 2..].starts_with(&format!("{} : ", id.unwrap())));
    }

    assert!(forest.nodes().iter().all(|n| n.child_count() == 0));
}

#[test]
fn test_siblings_keep_first_observation_order() {
    let host = ReplayHost::from_description(&HostDescription {
        bootstrap_types: Vec::new(),
        loaders: vec![
            spec(30, Some(1), kinds::SEARCH_PATH, true),
            spec(10, Some(1), kinds::SEARCH_PATH, true),
            spec(1, None, kinds::SEARCH_PATH, true),
            spec(20, Some(1), kinds::SEARCH_PATH, true),
            spec(11, Some(10), kinds::SEARCH_PATH, true),
        ],
    })
    .unwrap();
    let registry = Registry::new();
    host.observe(&registry);

    let ids: Vec<LoaderId> = build(&registry).loaders().map(|l| l.id()).collect();
    assert_eq!(ids, [1, 30, 10, 11, 20].map(LoaderId));
}

#[test]
fn test_queries_run_while_loaders_are_recorded() {
    let host = ReplayHost::from_description(&generated_host()).unwrap();
    let registry = Arc::new(Registry::new());
    let monitor = LoaderMonitor::new(Arc::clone(&registry));
    let loaders: Vec<LoaderRef> = host.loaders().collect();

    thread::scope(|scope| {
        for chunk in loaders.chunks(15) {
            let registry = &registry;
            scope.spawn(move || {
                for loader in chunk {
                    registry.record(loader);
                }
            });
        }
        scope.spawn(|| {
            for _ in 0..20 {
                let tree = monitor.show_tree().unwrap();
                assert!(tree.starts_with(ROOT_LABEL));
            }
        });
    });

    assert_eq!(registry.len(), loaders.len());
    let tree = monitor.show_tree().unwrap();
    let forest = build(&registry);
    assert_eq!(tree.lines().count(), forest.len() + 1);
}
