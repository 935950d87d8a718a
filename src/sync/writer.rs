//! Filesystem primitives for mirroring
//!
//! Writes go through a temp file in the target directory followed by a
//! rename, so a reader never observes a half-written mirror.

use std::fs::{self, Metadata, Permissions};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::Config;
use crate::error::TscpResult;

use super::pipeline::LoaderPipeline;

/// `lstat` that maps "not found" to `None`.
pub fn file_stats(path: &Path) -> io::Result<Option<Metadata>> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Remove a file, symlink or whole directory tree. Missing paths are fine.
pub fn remove_file_or_directory(path: &Path) -> io::Result<()> {
    let Some(meta) = file_stats(path)? else {
        return Ok(());
    };
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => {
            debug!(path = %path.display(), "removed");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Create the parent directory tree of `path`.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Write `content` to `path` atomically, with the given permissions.
pub fn atomic_write(path: &Path, content: &[u8], permissions: &Permissions) -> io::Result<()> {
    ensure_parent(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file().set_permissions(permissions.clone())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Mirror one source path onto `target_path`.
///
/// A source that vanished since enumeration is a no-op and a directory
/// becomes an empty directory. Files are read, run through `pipeline` and
/// written with the source's permissions.
pub fn copy_file_or_directory(
    source_path: &Path,
    target_path: &Path,
    config: &Config,
    pipeline: &LoaderPipeline,
) -> TscpResult<()> {
    let meta = match fs::metadata(source_path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(source = %source_path.display(), "source vanished, skipping");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if meta.is_dir() {
        fs::create_dir_all(target_path)?;
        return Ok(());
    }

    let raw = match fs::read(source_path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    let content = pipeline.apply(raw, source_path, target_path, config)?;
    atomic_write(target_path, &content, &meta.permissions())?;
    debug!(source = %source_path.display(), target = %target_path.display(), "copied");
    Ok(())
}
