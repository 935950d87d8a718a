//! Error types for tscp
//!
//! Uses `thiserror` for library errors; the binary wraps them with `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tscp operations
pub type TscpResult<T> = Result<T, TscpError>;

/// Main error type for tscp operations
#[derive(Error, Debug)]
pub enum TscpError {
    /// Compiler configuration file could not be located
    #[error("{name} not found")]
    ConfigNotFound { name: String },

    /// Compiler configuration or settings file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// `extends` chain loops back on itself
    #[error("circular 'extends' in {file}")]
    CircularExtends { file: PathBuf },

    /// Required compiler option (`rootDir` / `outDir`) is absent
    #[error("No '{option}' configured in reference '{reference}'")]
    MissingCompilerOption {
        option: &'static str,
        reference: String,
    },

    /// Build mode requested on a project without references
    #[error("No project references configured")]
    NoProjectReferences,

    /// A project reference entry has no `path`
    #[error("Could not find project reference path in {config}")]
    MissingReferencePath { config: PathBuf },

    /// `references` is present but not a list of objects
    #[error("malformed project reference list in {config}")]
    MalformedReferences { config: PathBuf },

    /// Ignore pattern could not be compiled
    #[error("invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Rule condition regex could not be compiled
    #[error("invalid rule pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Rule references a loader name nobody registered
    #[error("unknown loader '{name}' (registered: {registered})")]
    UnknownLoader { name: String, registered: String },

    /// A loader failed while transforming a file
    #[error("loader '{loader}' failed on {source_path}: {message}")]
    Loader {
        loader: String,
        source_path: PathBuf,
        message: String,
    },

    /// Watch event for a path outside every known project
    #[error("Could not find the project to which the file belongs: '{path}'")]
    UnownedPath { path: PathBuf },

    /// Watch primitive failed to start or register a root
    #[error("file watcher error: {0}")]
    Watch(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<notify::Error> for TscpError {
    fn from(e: notify::Error) -> Self {
        TscpError::Watch(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_out_dir() {
        let err = TscpError::MissingCompilerOption {
            option: "outDir",
            reference: "packages/core".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No 'outDir' configured in reference 'packages/core'"
        );
    }

    #[test]
    fn test_error_display_config_not_found() {
        let err = TscpError::ConfigNotFound {
            name: "tsconfig.json".to_string(),
        };
        assert_eq!(err.to_string(), "tsconfig.json not found");
    }

    #[test]
    fn test_error_display_unowned_path() {
        let err = TscpError::UnownedPath {
            path: PathBuf::from("/tmp/elsewhere/a.css"),
        };
        assert_eq!(
            err.to_string(),
            "Could not find the project to which the file belongs: '/tmp/elsewhere/a.css'"
        );
    }
}
