/// Path resolution by name segments — exact lookup and glob selection.
///
/// Paths are `/`-delimited node names relative to a starting node. Empty
/// segments are ignored, `.` stays on the current node and `..` moves to its
/// parent (staying put at the root).
use crate::error::{CatalogError, Result};
use crate::model::{Catalog, NodeIndex};
use glob::Pattern;

enum Step<'a> {
    Stay,
    Up,
    Child(&'a str),
}

fn steps(path: &str) -> impl Iterator<Item = Step<'_>> {
    path.split('/').filter(|s| !s.is_empty()).map(|s| match s {
        "." => Step::Stay,
        ".." => Step::Up,
        name => Step::Child(name),
    })
}

/// Resolve `path` under `root` by exact name, first matching sibling wins.
///
/// Fails with [`CatalogError::NotFound`] at the first segment without a match.
pub fn resolve(catalog: &Catalog, root: NodeIndex, path: &str) -> Result<NodeIndex> {
    let mut current = root;
    for step in steps(path) {
        current = match step {
            Step::Stay => current,
            Step::Up => catalog.parent(current).unwrap_or(current),
            Step::Child(name) => catalog
                .child_named(current, name)
                .ok_or_else(|| CatalogError::NotFound(path.to_string()))?,
        };
    }
    Ok(current)
}

/// Select every node under `root` matching `pattern`, segment by segment.
///
/// Each segment is a glob (`*`, `?`, `[...]`); a segment that is not a valid
/// glob is compared literally. Matches come back in traversal order. No
/// match is an empty list, never an error.
pub fn glob(catalog: &Catalog, root: NodeIndex, pattern: &str) -> Vec<NodeIndex> {
    let mut frontier = vec![root];
    for step in steps(pattern) {
        frontier = match step {
            Step::Stay => frontier,
            Step::Up => {
                let mut parents: Vec<NodeIndex> = Vec::with_capacity(frontier.len());
                for idx in frontier {
                    let up = catalog.parent(idx).unwrap_or(idx);
                    if !parents.contains(&up) {
                        parents.push(up);
                    }
                }
                parents
            }
            Step::Child(segment) => {
                let matcher = SegmentMatcher::new(segment);
                frontier
                    .into_iter()
                    .flat_map(|idx| catalog.child_iter(idx))
                    .filter(|&child| matcher.matches(&catalog.node(child).name))
                    .collect()
            }
        };
        if frontier.is_empty() {
            break;
        }
    }
    frontier
}

enum SegmentMatcher<'a> {
    Glob(Pattern),
    Literal(&'a str),
}

impl<'a> SegmentMatcher<'a> {
    fn new(segment: &'a str) -> Self {
        let has_wildcard = segment.contains(['*', '?', '[']);
        match Pattern::new(segment) {
            Ok(pattern) if has_wildcard => Self::Glob(pattern),
            _ => Self::Literal(segment),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Glob(pattern) => pattern.matches(name),
            Self::Literal(literal) => *literal == name,
        }
    }
}
