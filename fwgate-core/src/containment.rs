//! Path containment checks for the storage root.
//!
//! Filenames come from operator-edited JSON documents, so a crafted alias or
//! OTA entry such as `../../etc/passwd` must never be served. Two checks are
//! applied, both component-wise (`/srv/files2` is not inside `/srv/files`):
//!
//! 1. [`stays_within`]: a lexical check on the filename alone, before any
//!    filesystem access. Traversal towards a path that does not exist is
//!    still rejected.
//! 2. [`is_contained`]: on canonical paths, after symlinks are resolved.

use std::path::{Component, Path};

/// Whether `filename`, joined onto a root, lexically stays under that root.
///
/// `..` segments may climb back out of subdirectories they entered, but never
/// above the root. Absolute paths (and Windows prefixes) always escape, since
/// joining them replaces the root entirely.
pub fn stays_within(filename: &Path) -> bool {
    let mut depth: usize = 0;

    for component in filename.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }

    true
}

/// Whether canonical `candidate` lies at or below canonical `root`.
///
/// Both paths must already be canonicalized; this compares whole components.
pub fn is_contained(root: &Path, candidate: &Path) -> bool {
    candidate.starts_with(root)
}
