//! Mirroring engine
//!
//! - `ignore_list` / `enumerate`: which files of a project get mirrored
//! - `rules` / `loader` / `pipeline`: how their content is transformed
//! - `writer`: filesystem primitives (stat, delete, atomic write, copy)
//! - `orchestrator`: the one-shot delete-then-copy run

pub mod enumerate;
pub mod ignore_list;
pub mod loader;
pub mod orchestrator;
pub mod pipeline;
pub mod rules;
pub mod writer;

use std::path::Path;

pub use enumerate::{collect_copy_tasks, collect_projects_files, enumerate, CopyTask};
pub use ignore_list::{resolve_ignore_list, to_watch_glob, IgnoreMatcher, WatchIgnore};
pub use loader::{CommandLoader, Loader, LoaderMeta, LoaderRegistry, Transform, TransformError};
pub use orchestrator::{sync_all, SyncSummary};
pub use pipeline::{apply_loaders, LoaderPipeline};
pub use rules::{matches_rule, test_condition, PathPredicate, Rule, RuleCondition};
pub use writer::{copy_file_or_directory, remove_file_or_directory};

/// Path rendered with forward slashes, the form rules and globs match on.
pub fn posix_path(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        rendered.into_owned()
    } else {
        rendered.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posix_path_keeps_forward_slashes() {
        assert_eq!(posix_path(Path::new("src/styles/a.css")), "src/styles/a.css");
    }

    #[cfg(windows)]
    #[test]
    fn posix_path_converts_backslashes() {
        assert_eq!(posix_path(Path::new(r"C:\repo\src\a.css")), "C:/repo/src/a.css");
    }
}
