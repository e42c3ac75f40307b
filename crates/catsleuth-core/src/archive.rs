/// Archive flattening — turns a lister's flat member list into Archive nodes.
///
/// Members whose parent chain resolves inside the archive (the archive file
/// itself included) are nested there under their last segment. Anything else
/// is attached directly under the archive file with its full member path as
/// the name; intermediate directories are never synthesised.
use crate::builder::TreeBuilder;
use crate::error::Result;
use crate::model::{Catalog, NodeIndex};
use crate::resolve::resolve;

/// Attach every member in `members` under the archive file node `archive`.
///
/// Returns the number of member nodes created.
pub fn flatten_members<S: AsRef<str>>(
    builder: &TreeBuilder<'_>,
    catalog: &mut Catalog,
    archive: NodeIndex,
    members: &[S],
) -> Result<usize> {
    let label = catalog.node(archive).name.clone();
    let mut created = 0;

    for member in members {
        let member = member.as_ref().trim_end_matches('/');
        if member.is_empty() {
            continue;
        }

        let (parent, name) = match member.rsplit_once('/') {
            None => (archive, member),
            Some((dir, leaf)) => match resolve(catalog, archive, dir) {
                Ok(parent) if parent == archive || descends_from(catalog, parent, archive) => {
                    (parent, leaf)
                }
                // Flat fallback: keep the whole path as the display name.
                _ => (archive, member),
            },
        };

        builder.new_archive_member(catalog, name, member, parent, &label)?;
        created += 1;
    }

    Ok(created)
}

fn descends_from(catalog: &Catalog, node: NodeIndex, ancestor: NodeIndex) -> bool {
    let mut current = catalog.parent(node);
    while let Some(idx) = current {
        if idx == ancestor {
            return true;
        }
        current = catalog.parent(idx);
    }
    false
}
