/// Display sinks — turn catalog entries into text or CSV lines.
///
/// All sizes in the catalog are `u64` bytes. Floating point is only used
/// here, at the formatting boundary.
use catsleuth_core::display::{DisplayEntry, DisplaySink};
use catsleuth_core::model::{Catalog, CatalogNode, NodeKind};
use std::io::{self, Write};

/// Render `bytes` with a 1024-based unit: whole bytes below 1 KB, one
/// decimal for KB and MB, two for GB and above.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [(&str, usize); 4] = [("KB", 1), ("MB", 1), ("GB", 2), ("TB", 2)];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    let (label, decimals) = UNITS[unit];
    format!("{value:.decimals$} {label}")
}

fn display_name(node: &CatalogNode, with_path: bool) -> &str {
    match node.relpath() {
        Some(rel) if with_path && !rel.is_empty() => rel,
        _ => node.name.as_str(),
    }
}

/// Indented, human-readable lines.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for TextSink<W> {
    fn emit(&mut self, catalog: &Catalog, entry: &DisplayEntry) -> io::Result<()> {
        let node = catalog.node(entry.node);
        let flags = entry.flags;
        let mut attrs: Vec<String> = Vec::new();

        let label = match &node.kind {
            NodeKind::Top => node.name.to_string(),
            NodeKind::Meta(info) => format!(
                "{} (created {} by v{}, opened {} by v{})",
                node.name,
                info.created.format("%Y-%m-%d %H:%M:%S"),
                info.created_version,
                info.access.format("%Y-%m-%d %H:%M:%S"),
                info.access_version
            ),
            NodeKind::Storage(info) => {
                if !info.tags.is_empty() {
                    attrs.push(format!("tags:{}", info.tags.join(", ")));
                }
                attrs.push(format!("indexed:{}", info.indexed_at.format("%Y-%m-%d %H:%M")));
                format!(
                    "{} (free:{}, total:{})",
                    node.name,
                    format_size(info.free),
                    format_size(info.total)
                )
            }
            NodeKind::Dir(info) => {
                if flags.with_depth {
                    attrs.push(format!("nbfiles:{}", entry.child_count));
                }
                if let Some(size) = info.size.filter(|&s| s > 0) {
                    attrs.push(format!("totsize:{}", format_size(size)));
                }
                format!("{}/", display_name(node, flags.with_path))
            }
            NodeKind::File(info) => {
                attrs.push(format!("size:{}", format_size(info.size)));
                if let Some(digest) = &info.digest {
                    attrs.push(format!("digest:{digest}"));
                }
                display_name(node, flags.with_path).to_string()
            }
            NodeKind::Archive(info) => {
                attrs.push(format!("archive:{}", info.archive));
                display_name(node, flags.with_path).to_string()
            }
        };

        if flags.with_storage {
            if let Some(storage) = entry.storage.filter(|&s| s != entry.node) {
                attrs.push(format!("storage:{}", catalog.node(storage).name));
            }
        }

        let indent = "  ".repeat(entry.depth);
        if attrs.is_empty() {
            writeln!(self.out, "{indent}{label}")
        } else {
            writeln!(self.out, "{indent}{label} [{}]", attrs.join(", "))
        }
    }
}

/// One CSV record per entry, with a header row.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    wrote_header: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
            wrote_header: false,
        }
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

impl<W: Write> DisplaySink for CsvSink<W> {
    fn emit(&mut self, catalog: &Catalog, entry: &DisplayEntry) -> io::Result<()> {
        if !self.wrote_header {
            self.writer.write_record([
                "name", "type", "path", "size", "digest", "storage", "children",
            ])?;
            self.wrote_header = true;
        }

        let node = catalog.node(entry.node);
        let digest = match &node.kind {
            NodeKind::File(info) => info.digest.clone().unwrap_or_default(),
            _ => String::new(),
        };
        let storage = entry
            .storage
            .map(|s| catalog.node(s).name.to_string())
            .unwrap_or_default();
        let size = node.size().map(|s| s.to_string()).unwrap_or_default();
        let path = catalog.path_from_storage(entry.node);
        let children = entry.child_count.to_string();

        self.writer.write_record([
            node.name.as_str(),
            node.node_type().label(),
            path.as_str(),
            size.as_str(),
            digest.as_str(),
            storage.as_str(),
            children.as_str(),
        ])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catsleuth_core::display::{render_tree, RenderFlags};
    use catsleuth_core::model::StorageInfo;
    use catsleuth_core::sort::SortOrder;
    use catsleuth_core::ROOT;

    fn sample() -> Catalog {
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
                        tags: vec!["offsite".into()],
                        size: None,
                    },
                ),
            )
            .unwrap();
        let music = catalog
            .attach(usb, CatalogNode::new_dir("music".into(), "music".into()))
            .unwrap();
        catalog
            .attach(
                music,
                CatalogNode::new_file(
                    "song.mp3".into(),
                    "music/song.mp3".into(),
                    1_536,
                    Some("abc".into()),
                ),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
        assert_eq!(format_size(1_099_511_627_776), "1.00 TB");
    }

    #[test]
    fn test_text_sink_tree() {
        let catalog = sample();
        let mut sink = TextSink::new(Vec::new());
        render_tree(&catalog, ROOT, SortOrder::by_name(), RenderFlags::default(), &mut sink).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "top");
        assert!(lines[1].starts_with("  usb1 (free:2.0 KB, total:4.9 KB) [tags:offsite"));
        assert_eq!(lines[2], "    music/");
        assert_eq!(lines[3], "      song.mp3 [size:1.5 KB, digest:abc]");
    }

    #[test]
    fn test_csv_sink_rows() {
        let catalog = sample();
        let mut sink = CsvSink::new(Vec::new());
        let song = catalog.preorder(ROOT)[3];
        let flags = RenderFlags::default();
        let entry = DisplayEntry {
            node: song,
            depth: 0,
            flags,
            storage: catalog.storage_of(song),
            child_count: 0,
        };
        sink.emit(&catalog, &entry).unwrap();
        let text = String::from_utf8(sink.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "name,type,path,size,digest,storage,children");
        assert_eq!(lines[1], "song.mp3,file,usb1/music/song.mp3,1536,abc,usb1,0");
    }
}
