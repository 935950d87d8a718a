//! Project descriptors
//!
//! Turns compiler configuration files into [`Project`]s: the input root, the
//! output root and the project's own exclusions.

pub mod jsonc;
pub mod tsconfig;

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{TscpError, TscpResult};
use crate::sync::posix_path;

pub use tsconfig::{clean_path, find_config_file, TsConfig, TSCONFIG};

/// One compiler project to mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// `<cwd basename>/<base_path relative to cwd>`
    pub project_name: String,
    /// Directory holding the project's configuration
    pub base_path: PathBuf,
    pub config_path: PathBuf,
    /// Absolute input root
    pub root_dir: PathBuf,
    /// Absolute output root
    pub out_dir: PathBuf,
    /// The project's own exclude patterns
    pub exclude: Vec<String>,
}

/// A project together with its enumerated files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectWithFiles {
    pub project: Project,
    /// Paths relative to `root_dir`, forward slashes
    pub source_files: Vec<String>,
}

/// Which projects a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectSelection {
    /// The selected configuration file itself
    #[default]
    Single,
    /// Every project the selected configuration references
    References,
}

impl Project {
    /// Build a descriptor from a loaded configuration.
    ///
    /// Fails when `rootDir` or `outDir` is missing, naming the project by its
    /// path relative to `cwd`.
    pub fn from_ts_config(cwd: &Path, ts: &TsConfig) -> TscpResult<Self> {
        let base_path = ts.path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf());
        let reference = relative_path(cwd, &base_path);
        let reference_name = if reference.as_os_str().is_empty() {
            ".".to_string()
        } else {
            posix_path(&reference)
        };

        let root_dir = ts.root_dir.clone().ok_or_else(|| TscpError::MissingCompilerOption {
            option: "rootDir",
            reference: reference_name.clone(),
        })?;
        let out_dir = ts.out_dir.clone().ok_or_else(|| TscpError::MissingCompilerOption {
            option: "outDir",
            reference: reference_name,
        })?;

        let cwd_name = cwd.file_name().map(PathBuf::from).unwrap_or_default();
        let project_name = posix_path(&clean_path(&cwd_name.join(&reference)));

        Ok(Self {
            project_name,
            base_path,
            config_path: ts.path.clone(),
            root_dir,
            out_dir,
            exclude: ts.exclude.clone(),
        })
    }
}

/// Resolve the projects selected by `project_arg` (file or directory).
pub fn resolve_projects(cwd: &Path, project_arg: &str, selection: ProjectSelection) -> TscpResult<Vec<Project>> {
    let config_path = find_config_file(cwd, project_arg)?;
    let ts = TsConfig::load(&config_path)?;

    let projects = match selection {
        ProjectSelection::Single => vec![Project::from_ts_config(cwd, &ts)?],
        ProjectSelection::References => {
            let references = ts.references.as_deref().ok_or(TscpError::NoProjectReferences)?;
            references
                .iter()
                .map(|reference| {
                    let referenced = TsConfig::load(reference).map_err(|e| match e {
                        TscpError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => TscpError::ConfigNotFound {
                            name: posix_path(reference),
                        },
                        other => other,
                    })?;
                    Project::from_ts_config(cwd, &referenced)
                })
                .collect::<TscpResult<Vec<_>>>()?
        }
    };

    debug!(count = projects.len(), ?selection, "resolved projects");
    Ok(projects)
}

/// Lexical relative path from `from` to `to`.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let (from, to) = (clean_path(from), clean_path(to));
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();

    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let mut out = PathBuf::new();
    for _ in common..from.len() {
        out.push("..");
    }
    for component in &to[common..] {
        out.push(component.as_os_str());
    }
    out
}
