//! Ignore list resolution
//!
//! Combines each project's own `exclude` patterns with the configured
//! `ignored_files` (which already embed `compiled_files`).

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};

use crate::config::Config;
use crate::error::{TscpError, TscpResult};
use crate::project::Project;

use super::posix_path;

/// `root_dir` relative to `base_path`, with a trailing slash.
///
/// `None` when the root is the base directory itself or lies outside it;
/// exclude patterns are then used verbatim.
fn root_dir_prefix(project: &Project) -> Option<String> {
    let relative = project.root_dir.strip_prefix(&project.base_path).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(format!("{}/", posix_path(relative)))
}

/// Effective ignore list for `projects`.
pub fn resolve_ignore_list(config: &Config, projects: &[Project]) -> Vec<String> {
    let mut ignore_list = Vec::new();

    if config.use_ts_exclude {
        for project in projects {
            let prefix = root_dir_prefix(project);
            ignore_list.extend(project.exclude.iter().map(|rule| {
                match prefix.as_deref().and_then(|p| rule.strip_prefix(p)) {
                    Some(stripped) => stripped.to_string(),
                    None => rule.clone(),
                }
            }));
        }
    }

    ignore_list.extend(config.ignored_files.iter().cloned());
    ignore_list
}

/// Render the ignore list as one brace-group glob for the watcher.
///
/// Patterns not already rooted get a `**/` prefix so they match at any
/// depth. Returns `None` for an empty list.
pub fn to_watch_glob(ignore_list: &[String]) -> Option<String> {
    if ignore_list.is_empty() {
        return None;
    }
    let anchored: Vec<String> = ignore_list
        .iter()
        .map(|rule| {
            if rule.starts_with("**/") || rule.starts_with('/') {
                rule.clone()
            } else {
                format!("**/{rule}")
            }
        })
        .collect();
    Some(format!("{{{}}}", anchored.join(",")))
}

/// Enumeration-time matcher, rooted at a project's `root_dir`.
///
/// Patterns are globs over the root-relative path: `*` stops at `/`, a
/// bare name only matches at the top level, and a matching directory
/// hides everything under it.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    root: PathBuf,
    set: GlobSet,
}

impl IgnoreMatcher {
    pub fn new(root: &Path, patterns: &[String]) -> TscpResult<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| TscpError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| TscpError::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;
        Ok(Self {
            root: root.to_path_buf(),
            set,
        })
    }

    /// True when `path` or one of its ancestors below the root matches.
    /// Paths outside the root never match.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        relative
            .ancestors()
            .take_while(|p| !p.as_os_str().is_empty())
            .any(|p| self.set.is_match(posix_path(p)))
    }
}

/// Watch-time matcher compiled from [`to_watch_glob`].
#[derive(Debug, Clone)]
pub struct WatchIgnore {
    glob: Option<GlobMatcher>,
}

impl WatchIgnore {
    pub fn new(ignore_list: &[String]) -> TscpResult<Self> {
        let glob = match to_watch_glob(ignore_list) {
            Some(source) => Some(
                GlobBuilder::new(&source)
                    .literal_separator(false)
                    .build()
                    .map_err(|e| TscpError::InvalidPattern {
                        pattern: source.clone(),
                        message: e.to_string(),
                    })?
                    .compile_matcher(),
            ),
            None => None,
        };
        Ok(Self { glob })
    }

    /// True when `path` or any of its ancestors below `root` matches.
    pub fn is_ignored(&self, path: &Path, root: &Path) -> bool {
        let Some(glob) = &self.glob else {
            return false;
        };
        path.ancestors()
            .take_while(|p| p.starts_with(root) && *p != root)
            .any(|p| glob.is_match(posix_path(p)))
    }
}
