//! Scratch tree discovery.

use std::fs;
use std::io;
use std::path::{Component, Path};

use walkdir::WalkDir;

use super::registry::{Discovery, Registry};
use crate::error::{BridgeError, Result};

/// Walk `scratch` once, recreating its directories under `out_root` and
/// offering every file ending in `suffix` to the registry.
///
/// Entries are visited in file name order, parents before children, so a
/// directory always exists under `out_root` before anything inside it.
pub fn discover(registry: &mut Registry, scratch: &Path, out_root: &Path, suffix: &str) -> Result<()> {
    let walk = WalkDir::new(scratch)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walk {
        let entry = entry.map_err(|source| BridgeError::Walk {
            root: scratch.to_path_buf(),
            source,
        })?;
        let Ok(relative) = entry.path().strip_prefix(scratch) else {
            continue;
        };

        if entry.file_type().is_dir() {
            create_output_dir(&out_root.join(relative))?;
            continue;
        }

        if !is_generated_file(&entry) {
            continue;
        }
        let Some(key) = relative_key(relative) else {
            continue;
        };
        if !key.ends_with(suffix) {
            continue;
        }

        match registry.discover(&key) {
            Discovery::Exact => tracing::debug!(path = %key, "exact match"),
            Discovery::Fallback { target } => {
                tracing::debug!(path = %key, %target, "basename match")
            }
            Discovery::Ambiguous { target } => {
                tracing::debug!(path = %key, %target, "ambiguous basename match")
            }
            Discovery::Shadowed { target } => {
                tracing::debug!(path = %key, %target, "basename match ignored, exact match exists")
            }
            Discovery::Unexpected => {}
        }
    }

    Ok(())
}

/// Regular files, and symlinks that resolve to regular files.
fn is_generated_file(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn create_output_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(BridgeError::io("create directory", path, e)),
    }
}

/// Registry key for a scratch-relative path: normal components joined by `/`.
fn relative_key(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }
    Some(parts.join("/"))
}
