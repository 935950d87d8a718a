//! Project file enumeration
//!
//! Walks each project's `root_dir` (dotfiles included, symlinks followed)
//! and lists the regular files not covered by the project's ignore list.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;
use tracing::debug;

use crate::config::Config;
use crate::error::{TscpError, TscpResult};
use crate::project::{Project, ProjectWithFiles};

use super::ignore_list::{resolve_ignore_list, IgnoreMatcher};
use super::posix_path;

/// One file to mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTask {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
}

impl CopyTask {
    /// Task for `relative` (a path under the project's root).
    pub fn for_relative(project: &Project, relative: impl AsRef<Path>) -> Self {
        Self {
            source_path: project.root_dir.join(relative.as_ref()),
            target_path: project.out_dir.join(relative.as_ref()),
        }
    }
}

/// Relative paths (forward slashes, sorted) of every file to mirror.
pub fn enumerate(project: &Project, config: &Config) -> TscpResult<Vec<String>> {
    let ignore_list = resolve_ignore_list(config, std::slice::from_ref(project));
    enumerate_under(project, &project.root_dir, &ignore_list)
}

/// Like [`enumerate`], restricted to the subtree at `start`.
///
/// Used by the watcher when a whole directory appears at once.
pub fn enumerate_under(project: &Project, start: &Path, ignore_list: &[String]) -> TscpResult<Vec<String>> {
    if !start.is_dir() {
        debug!(path = %start.display(), "nothing to enumerate");
        return Ok(Vec::new());
    }

    let matcher = IgnoreMatcher::new(&project.root_dir, ignore_list)?;
    let walker = WalkBuilder::new(start)
        .standard_filters(false)
        .hidden(false)
        .follow_links(true)
        .filter_entry(move |entry| !matcher.is_ignored(entry.path()))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| TscpError::Io(std::io::Error::other(e)))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(&project.root_dir) {
            files.push(posix_path(relative));
        }
    }
    files.sort();

    debug!(project = %project.project_name, count = files.len(), "enumerated project files");
    Ok(files)
}

/// Enumerate every project concurrently.
pub fn collect_projects_files(projects: &[Project], config: &Config) -> TscpResult<Vec<ProjectWithFiles>> {
    projects
        .par_iter()
        .map(|project| {
            Ok(ProjectWithFiles {
                source_files: enumerate(project, config)?,
                project: project.clone(),
            })
        })
        .collect()
}

/// Flatten enumerated projects into copy tasks.
pub fn collect_copy_tasks(projects: &[ProjectWithFiles]) -> Vec<CopyTask> {
    projects
        .iter()
        .flat_map(|p| p.source_files.iter().map(|file| CopyTask::for_relative(&p.project, file)))
        .collect()
}
