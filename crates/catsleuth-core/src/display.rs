/// Display traversal — feeds catalog nodes, in display order, to a sink.
///
/// The core decides *which* nodes are shown and in what order; the sink
/// decides how a line looks. Nothing here formats text.
use crate::model::{Catalog, NodeIndex, NodeType};
use crate::resolve::glob;
use crate::search::SearchHit;
use crate::sort::{sort_nodes, sorted_children, SortOrder};
use std::io;

/// What a sink is asked to include for each entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderFlags {
    /// Show the storage-relative path instead of the bare name.
    pub with_path: bool,
    /// Show the number of direct children.
    pub with_depth: bool,
    /// Show the owning storage.
    pub with_storage: bool,
    /// Include archive member nodes.
    pub with_archives: bool,
}

/// One line's worth of values for a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    pub node: NodeIndex,
    /// Nesting level relative to the start of the traversal.
    pub depth: usize,
    pub flags: RenderFlags,
    pub storage: Option<NodeIndex>,
    pub child_count: usize,
}

pub trait DisplaySink {
    fn emit(&mut self, catalog: &Catalog, entry: &DisplayEntry) -> io::Result<()>;
}

fn entry(catalog: &Catalog, node: NodeIndex, depth: usize, flags: RenderFlags) -> DisplayEntry {
    DisplayEntry {
        node,
        depth,
        flags,
        storage: catalog.storage_of(node),
        child_count: catalog.child_count(node),
    }
}

/// Emit the subtree at `root` in pre-order, siblings sorted by `order`.
///
/// Uses an explicit stack. Archive members (and everything below them) are
/// skipped unless `flags.with_archives` is set.
pub fn render_tree(
    catalog: &Catalog,
    root: NodeIndex,
    order: SortOrder,
    flags: RenderFlags,
    sink: &mut dyn DisplaySink,
) -> io::Result<()> {
    let mut stack = vec![(root, 0usize)];
    while let Some((idx, depth)) = stack.pop() {
        if !flags.with_archives && catalog.node(idx).node_type() == NodeType::Archive {
            continue;
        }
        sink.emit(catalog, &entry(catalog, idx, depth, flags))?;

        let children = sorted_children(catalog, idx, order);
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }
    Ok(())
}

/// List the nodes matching `pattern` under `root`, like `ls`.
///
/// Without matches nothing is emitted. With `recursive`, the whole tree
/// under the first match's parent is rendered; otherwise that parent is
/// emitted followed by the sorted matches one level below it. Returns the
/// matches in the order they were listed.
pub fn list(
    catalog: &Catalog,
    root: NodeIndex,
    pattern: &str,
    order: SortOrder,
    recursive: bool,
    sink: &mut dyn DisplaySink,
) -> io::Result<Vec<NodeIndex>> {
    let mut found = glob(catalog, root, pattern);
    let Some(&first) = found.first() else {
        return Ok(found);
    };
    let parent = catalog.parent(first).unwrap_or(first);
    let flags = RenderFlags {
        with_depth: true,
        with_archives: true,
        ..RenderFlags::default()
    };

    if recursive {
        render_tree(catalog, parent, order, flags, sink)?;
        return Ok(found);
    }

    sort_nodes(catalog, &mut found, order);
    sink.emit(catalog, &entry(catalog, parent, 0, flags))?;
    for &idx in &found {
        sink.emit(catalog, &entry(catalog, idx, 1, flags))?;
    }
    Ok(found)
}

/// Emit search results with path, child count and storage.
pub fn emit_hits(catalog: &Catalog, hits: &[SearchHit], sink: &mut dyn DisplaySink) -> io::Result<()> {
    let flags = RenderFlags {
        with_path: true,
        with_depth: true,
        with_storage: true,
        with_archives: true,
    };
    for hit in hits {
        sink.emit(catalog, &entry(catalog, hit.node, 0, flags))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogNode, StorageInfo, ROOT};

    #[derive(Default)]
    struct Recorder(Vec<(String, usize)>);

    impl DisplaySink for Recorder {
        fn emit(&mut self, catalog: &Catalog, entry: &DisplayEntry) -> io::Result<()> {
            self.0
                .push((catalog.node(entry.node).name.to_string(), entry.depth));
            Ok(())
        }
    }

    fn sample() -> (Catalog, NodeIndex) {
        let mut catalog = Catalog::new();
        let usb = catalog
            .attach(
                ROOT,
                CatalogNode::new_storage(
                    "usb1".into(),
                    StorageInfo {
                        free: 0,
                        total: 0,
                        indexed_at: chrono::Utc::now(),
                        tags: Vec::new(),
                        size: None,
                    },
                ),
            )
            .unwrap();
        let zip = catalog
            .attach(usb, CatalogNode::new_file("b.zip".into(), "b.zip".into(), 30, None))
            .unwrap();
        catalog
            .attach(zip, CatalogNode::new_archive("m.txt".into(), "m.txt".into(), "b.zip".into()))
            .unwrap();
        let dir = catalog
            .attach(usb, CatalogNode::new_dir("docs".into(), "docs".into()))
            .unwrap();
        catalog
            .attach(dir, CatalogNode::new_file("a.txt".into(), "docs/a.txt".into(), 5, None))
            .unwrap();
        (catalog, usb)
    }

    fn owned(rows: &[(&str, usize)]) -> Vec<(String, usize)> {
        rows.iter().map(|(n, d)| (n.to_string(), *d)).collect()
    }

    #[test]
    fn test_render_tree_sorted_preorder() {
        let (catalog, usb) = sample();
        let mut sink = Recorder::default();
        render_tree(&catalog, usb, SortOrder::by_name(), RenderFlags::default(), &mut sink).unwrap();
        assert_eq!(
            sink.0,
            owned(&[("usb1", 0), ("docs", 1), ("a.txt", 2), ("b.zip", 1)])
        );
    }

    #[test]
    fn test_render_tree_with_archives() {
        let (catalog, usb) = sample();
        let mut sink = Recorder::default();
        let flags = RenderFlags {
            with_archives: true,
            ..RenderFlags::default()
        };
        render_tree(&catalog, usb, SortOrder::by_name(), flags, &mut sink).unwrap();
        assert!(sink.0.contains(&("m.txt".to_string(), 2)));
    }

    #[test]
    fn test_list_emits_parent_then_matches() {
        let (catalog, _) = sample();
        let mut sink = Recorder::default();
        let found = list(&catalog, ROOT, "usb1/*", SortOrder::by_name(), false, &mut sink).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(sink.0, owned(&[("usb1", 0), ("docs", 1), ("b.zip", 1)]));
    }

    #[test]
    fn test_list_without_match_emits_nothing() {
        let (catalog, _) = sample();
        let mut sink = Recorder::default();
        let found = list(&catalog, ROOT, "usb9/*", SortOrder::by_name(), false, &mut sink).unwrap();
        assert!(found.is_empty());
        assert!(sink.0.is_empty());
    }

    #[test]
    fn test_list_recursive_renders_parent_tree() {
        let (catalog, _) = sample();
        let mut sink = Recorder::default();
        list(&catalog, ROOT, "usb1/docs", SortOrder::by_name(), true, &mut sink).unwrap();
        assert_eq!(sink.0.first(), Some(&("usb1".to_string(), 0)));
        assert!(sink.0.contains(&("m.txt".to_string(), 2)));
    }
}
