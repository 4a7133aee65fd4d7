//! Zip-slip protection for archive entry names.

use std::path::{Component, Path, PathBuf};

use crate::error::PathTraversal;

/// An entry path proven to lie below the trusted root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

/// Validates entry names against a fixed extraction root.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: normalize(root.as_ref()),
        }
    }

    /// Resolve an untrusted entry name below the root.
    ///
    /// Backslashes count as separators. Names with a `..` segment or a drive-letter
    /// prefix are refused outright; everything else is joined onto the root,
    /// normalized lexically and must still start with the root component-wise.
    pub fn resolve(&self, entry_name: &str) -> Result<ResolvedPath, PathTraversal> {
        let unified = entry_name.replace('\\', "/");

        if unified.split('/').any(|segment| segment == "..") || has_drive_prefix(&unified) {
            let resolved = normalize(&self.root.join(&unified));
            return Err(PathTraversal::new(entry_name, &resolved));
        }

        // An absolute name replaces the root on join and then fails the prefix check.
        let resolved = normalize(&self.root.join(&unified));
        if resolved == self.root || !resolved.starts_with(&self.root) {
            return Err(PathTraversal::new(entry_name, &resolved));
        }

        Ok(ResolvedPath { path: resolved })
    }
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Collapse `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(part) => result.push(part),
            Component::RootDir => result.push(component.as_os_str()),
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::CurDir => {}
        }
    }

    result
}
