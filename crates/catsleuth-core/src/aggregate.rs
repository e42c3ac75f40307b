/// Bottom-up size aggregation for directories.
///
/// Files contribute their stored size and directories store and contribute
/// the sum of their children. A Storage node passes the pass down to its
/// children but its own size is never written and it contributes nothing
/// upward. Archive members contribute nothing, so listing an archive never
/// changes the size of the file holding it.
use crate::model::{Catalog, NodeIndex, NodeKind, ROOT};

/// Aggregate the subtree rooted at `root` and return its contribution.
///
/// The subtree is collected in pre-order with an explicit stack and walked
/// in reverse, which visits every child before its parent without recursion
/// (archive listings can nest arbitrarily deep). Totals are recomputed from
/// the leaves on every call, so repeated calls give identical sizes.
pub fn aggregate(catalog: &mut Catalog, root: NodeIndex) -> u64 {
    let order = catalog.preorder(root);
    let mut totals = vec![0u64; catalog.len()];

    for &idx in order.iter().rev() {
        let node = catalog.node_mut(idx);
        let contribution = match &mut node.kind {
            NodeKind::File(file) => file.size,
            NodeKind::Dir(dir) => {
                let total = totals[idx.idx()];
                dir.size = Some(total);
                total
            }
            NodeKind::Storage(_) | NodeKind::Top | NodeKind::Meta(_) | NodeKind::Archive(_) => 0,
        };

        if idx == root {
            return contribution;
        }
        if let Some(parent) = node.parent {
            totals[parent.idx()] += contribution;
        }
    }
    0
}

/// Aggregate every storage in the catalog.
pub fn aggregate_all(catalog: &mut Catalog) {
    aggregate(catalog, ROOT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogNode, StorageInfo};

    struct Sample {
        catalog: Catalog,
        usb: NodeIndex,
        music: NodeIndex,
        live: NodeIndex,
        zip: NodeIndex,
    }

    /// usb1 -> music -> (song.mp3: 1000, cover.jpg: 500, live -> take.mp3: 250)
    ///      -> photos.zip: 4000 -> member
    fn sample() -> Sample {
        let mut catalog = Catalog::new();
        let usb = catalog
            .attach(
                ROOT,
                CatalogNode::new_storage(
                    "usb1".into(),
                    StorageInfo {
                        free: 2_000,
                        total: 5_000,
                        indexed_at: chrono::Utc::now(),
                        tags: Vec::new(),
                        size: None,
                    },
                ),
            )
            .unwrap();
        let music = catalog
            .attach(usb, CatalogNode::new_dir("music".into(), "music".into()))
            .unwrap();
        for (name, size) in [("song.mp3", 1_000), ("cover.jpg", 500)] {
            catalog
                .attach(
                    music,
                    CatalogNode::new_file(name.into(), format!("music/{name}"), size, None),
                )
                .unwrap();
        }
        let live = catalog
            .attach(music, CatalogNode::new_dir("live".into(), "music/live".into()))
            .unwrap();
        catalog
            .attach(
                live,
                CatalogNode::new_file("take.mp3".into(), "music/live/take.mp3".into(), 250, None),
            )
            .unwrap();
        let zip = catalog
            .attach(
                usb,
                CatalogNode::new_file("photos.zip".into(), "photos.zip".into(), 4_000, None),
            )
            .unwrap();
        catalog
            .attach(
                zip,
                CatalogNode::new_archive("a.jpg".into(), "a.jpg".into(), "photos.zip".into()),
            )
            .unwrap();
        Sample {
            catalog,
            usb,
            music,
            live,
            zip,
        }
    }

    #[test]
    fn test_dir_sizes_sum_descendant_files() {
        let mut s = sample();
        aggregate_all(&mut s.catalog);

        assert_eq!(s.catalog.node(s.live).size(), Some(250));
        assert_eq!(s.catalog.node(s.music).size(), Some(1_750));
        assert_eq!(s.catalog.node(s.zip).size(), Some(4_000));
    }

    /// Storage nodes are recursed into but never sized. Kept as-is on purpose.
    #[test]
    fn test_storage_size_stays_unset() {
        let mut s = sample();
        let contribution = aggregate(&mut s.catalog, s.usb);

        assert_eq!(contribution, 0);
        assert_eq!(s.catalog.node(s.usb).size(), None);
        assert_eq!(s.catalog.node(s.music).size(), Some(1_750));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let mut s = sample();
        aggregate_all(&mut s.catalog);
        let first = s.catalog.clone();
        aggregate_all(&mut s.catalog);
        assert_eq!(first, s.catalog);
    }

    #[test]
    fn test_subtree_contribution() {
        let mut s = sample();
        assert_eq!(aggregate(&mut s.catalog, s.music), 1_750);
        assert_eq!(aggregate(&mut s.catalog, s.zip), 4_000);
    }

    #[test]
    fn test_deep_archive_chain_does_not_overflow() {
        let mut s = sample();
        let mut parent = s.zip;
        for i in 0..100_000 {
            parent = s
                .catalog
                .attach(
                    parent,
                    CatalogNode::new_archive(format!("d{i}").into(), String::new(), "photos.zip".into()),
                )
                .unwrap();
        }
        aggregate_all(&mut s.catalog);
        assert_eq!(s.catalog.node(s.music).size(), Some(1_750));
    }
}
