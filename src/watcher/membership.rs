//! Which project owns a watched path
//!
//! Built once per session from the projects' `root_dir`s and read-only
//! afterwards.

use std::path::{Path, PathBuf};

use crate::error::{TscpError, TscpResult};
use crate::project::Project;
use crate::sync::posix_path;

#[derive(Debug, Clone)]
struct Member {
    root: PathBuf,
    canonical_root: Option<PathBuf>,
    project: Project,
}

/// A path resolved to its owning project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owned<'a> {
    pub project: &'a Project,
    /// The root `path` was found under, as given or canonicalized
    pub root: &'a Path,
    /// Path relative to the project's `root_dir`
    pub relative: PathBuf,
    pub target_path: PathBuf,
}

impl Owned<'_> {
    /// `<project_name>/<relative>` for display
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.project.project_name, posix_path(&self.relative))
    }
}

/// Root prefix → project index
#[derive(Debug, Clone, Default)]
pub struct Membership {
    /// Longest root first
    members: Vec<Member>,
}

impl Membership {
    pub fn new(projects: &[Project]) -> Self {
        let mut members: Vec<Member> = projects
            .iter()
            .map(|project| Member {
                root: project.root_dir.clone(),
                canonical_root: project.root_dir.canonicalize().ok(),
                project: project.clone(),
            })
            .collect();
        members.sort_by_key(|m| std::cmp::Reverse(m.root.components().count()));
        Self { members }
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.members.iter().map(|m| &m.project)
    }

    /// Whether `path` is one of the watched roots itself.
    pub fn is_root(&self, path: &Path) -> bool {
        self.members
            .iter()
            .any(|m| m.root == path || m.canonical_root.as_deref() == Some(path))
    }

    /// Resolve the project owning `path`; an unowned path is an error.
    pub fn resolve(&self, path: &Path) -> TscpResult<Owned<'_>> {
        for member in &self.members {
            let roots = std::iter::once(member.root.as_path()).chain(member.canonical_root.as_deref());
            for root in roots {
                let Ok(relative) = path.strip_prefix(root) else {
                    continue;
                };
                return Ok(Owned {
                    project: &member.project,
                    root,
                    relative: relative.to_path_buf(),
                    target_path: member.project.out_dir.join(relative),
                });
            }
        }
        Err(TscpError::UnownedPath {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str, root: &str, out: &str) -> Project {
        Project {
            project_name: name.to_string(),
            base_path: PathBuf::from(root).parent().unwrap().to_path_buf(),
            config_path: PathBuf::from("tsconfig.json"),
            root_dir: PathBuf::from(root),
            out_dir: PathBuf::from(out),
            exclude: Vec::new(),
        }
    }

    #[test]
    fn resolves_target_under_out_dir() {
        let index = Membership::new(&[project("repo/app", "/repo/app/src", "/repo/app/dist")]);

        let owned = index.resolve(Path::new("/repo/app/src/styles/a.css")).unwrap();
        assert_eq!(owned.relative, PathBuf::from("styles/a.css"));
        assert_eq!(owned.target_path, PathBuf::from("/repo/app/dist/styles/a.css"));
        assert_eq!(owned.display_name(), "repo/app/styles/a.css");
    }

    #[test]
    fn longest_root_wins() {
        let index = Membership::new(&[
            project("outer", "/repo/src", "/repo/dist"),
            project("inner", "/repo/src/packages/core", "/repo/core-dist"),
        ]);

        let owned = index.resolve(Path::new("/repo/src/packages/core/x.json")).unwrap();
        assert_eq!(owned.project.project_name, "inner");

        let owned = index.resolve(Path::new("/repo/src/packages/other/x.json")).unwrap();
        assert_eq!(owned.project.project_name, "outer");
    }

    #[test]
    fn prefix_match_respects_component_boundaries() {
        let index = Membership::new(&[project("app", "/repo/src", "/repo/dist")]);
        assert!(index.resolve(Path::new("/repo/src2/a.css")).is_err());
    }

    #[test]
    fn unowned_path_is_an_error() {
        let index = Membership::new(&[project("app", "/repo/src", "/repo/dist")]);
        let err = index.resolve(Path::new("/elsewhere/a.css")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find the project to which the file belongs: '/elsewhere/a.css'"
        );
    }

    #[test]
    fn recognises_roots() {
        let index = Membership::new(&[project("app", "/repo/src", "/repo/dist")]);
        assert!(index.is_root(Path::new("/repo/src")));
        assert!(!index.is_root(Path::new("/repo/src/a.css")));
    }
}
