//! Compiler configuration (`tsconfig.json`) reader
//!
//! Only the handful of fields the mirror needs are read: `rootDir` and
//! `outDir` (merged through `extends`), the leaf file's `exclude`, and the
//! leaf file's `references`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{TscpError, TscpResult};

use super::jsonc::from_jsonc_str;

/// Default compiler configuration file name
pub const TSCONFIG: &str = "tsconfig.json";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTsConfig {
    extends: Option<Extends>,
    #[serde(default)]
    compiler_options: RawCompilerOptions,
    exclude: Option<Vec<String>>,
    references: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    root_dir: Option<String>,
    out_dir: Option<String>,
}

/// Parsed compiler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsConfig {
    /// File this configuration was read from
    pub path: PathBuf,
    /// Absolute input root, if configured anywhere in the `extends` chain
    pub root_dir: Option<PathBuf>,
    /// Absolute output root, if configured anywhere in the `extends` chain
    pub out_dir: Option<PathBuf>,
    /// The leaf file's `exclude` list
    pub exclude: Vec<String>,
    /// Referenced configuration files, absent when `references` is not set
    pub references: Option<Vec<PathBuf>>,
}

/// Locate the configuration file named by `name`.
///
/// A directory means its `tsconfig.json`. An absolute file is used as-is.
/// Otherwise `name` is looked up in `search_dir` and each of its ancestors.
pub fn find_config_file(search_dir: &Path, name: &str) -> TscpResult<PathBuf> {
    let not_found = || TscpError::ConfigNotFound { name: name.to_string() };
    let candidate = clean_path(&search_dir.join(name));

    if candidate.is_dir() {
        let inner = candidate.join(TSCONFIG);
        return if inner.is_file() { Ok(inner) } else { Err(not_found()) };
    }
    if Path::new(name).is_absolute() {
        return if candidate.is_file() { Ok(candidate) } else { Err(not_found()) };
    }

    search_dir
        .ancestors()
        .map(|dir| clean_path(&dir.join(name)))
        .find(|path| path.is_file())
        .ok_or_else(not_found)
}

impl TsConfig {
    /// Read `path`, following `extends`.
    pub fn load(path: &Path) -> TscpResult<Self> {
        let raw = read_raw(path)?;
        let dir = parent_dir(path);

        let mut visited = HashSet::new();
        visited.insert(normalize_key(path));
        let (root_dir, out_dir) = merge_dirs(&raw, dir, &mut visited)?;

        let references = match &raw.references {
            None => None,
            Some(value) => Some(parse_references(value, path, dir)?),
        };

        debug!(config = %path.display(), ?root_dir, ?out_dir, "loaded compiler configuration");
        Ok(Self {
            path: path.to_path_buf(),
            root_dir: root_dir.map(|p| clean_path(&p)),
            out_dir: out_dir.map(|p| clean_path(&p)),
            exclude: raw.exclude.unwrap_or_default(),
            references,
        })
    }
}

fn read_raw(path: &Path) -> TscpResult<RawTsConfig> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(RawTsConfig::default());
    }
    from_jsonc_str(&content).map_err(|e| TscpError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

fn normalize_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| clean_path(path))
}

/// `rootDir` / `outDir` contributed by `path` and its own bases.
fn resolve_dirs(path: &Path, visited: &mut HashSet<PathBuf>) -> TscpResult<(Option<PathBuf>, Option<PathBuf>)> {
    let key = normalize_key(path);
    if !visited.insert(key.clone()) {
        return Err(TscpError::CircularExtends { file: path.to_path_buf() });
    }
    trace!(config = %path.display(), "following extends");

    let raw = read_raw(path)?;
    let dirs = merge_dirs(&raw, parent_dir(path), visited)?;
    // `visited` tracks the current chain only, so shared bases are fine
    visited.remove(&key);
    Ok(dirs)
}

/// Bases first in declaration order, then the file's own options.
fn merge_dirs(
    raw: &RawTsConfig,
    dir: &Path,
    visited: &mut HashSet<PathBuf>,
) -> TscpResult<(Option<PathBuf>, Option<PathBuf>)> {
    let (mut root_dir, mut out_dir) = (None, None);
    for base in extends_paths(raw, dir)? {
        let (base_root, base_out) = resolve_dirs(&base, visited)?;
        root_dir = base_root.or(root_dir);
        out_dir = base_out.or(out_dir);
    }
    if let Some(own) = &raw.compiler_options.root_dir {
        root_dir = Some(dir.join(own));
    }
    if let Some(own) = &raw.compiler_options.out_dir {
        out_dir = Some(dir.join(own));
    }
    Ok((root_dir, out_dir))
}

fn extends_paths(raw: &RawTsConfig, dir: &Path) -> TscpResult<Vec<PathBuf>> {
    let specs = match &raw.extends {
        None => return Ok(Vec::new()),
        Some(Extends::One(spec)) => vec![spec.as_str()],
        Some(Extends::Many(specs)) => specs.iter().map(String::as_str).collect(),
    };
    specs.into_iter().map(|spec| resolve_extends(spec, dir)).collect()
}

/// Resolve one `extends` entry declared in `dir`.
///
/// Relative and absolute specs resolve against `dir`; bare specs are looked
/// up in `node_modules` directories from `dir` upwards.
fn resolve_extends(spec: &str, dir: &Path) -> TscpResult<PathBuf> {
    let is_path = spec.starts_with('.') || Path::new(spec).is_absolute();
    let bases: Vec<PathBuf> = if is_path {
        vec![dir.join(spec)]
    } else {
        dir.ancestors().map(|d| d.join("node_modules").join(spec)).collect()
    };

    for base in bases {
        if base.is_file() {
            return Ok(base);
        }
        if base.is_dir() && base.join(TSCONFIG).is_file() {
            return Ok(base.join(TSCONFIG));
        }
        let with_ext = PathBuf::from(format!("{}.json", base.display()));
        if with_ext.is_file() {
            return Ok(with_ext);
        }
    }
    Err(TscpError::ConfigNotFound { name: spec.to_string() })
}

fn parse_references(value: &Value, config: &Path, dir: &Path) -> TscpResult<Vec<PathBuf>> {
    let entries = value.as_array().ok_or_else(|| TscpError::MalformedReferences {
        config: config.to_path_buf(),
    })?;

    entries
        .iter()
        .map(|entry| {
            if !entry.is_object() {
                return Err(TscpError::MalformedReferences { config: config.to_path_buf() });
            }
            let path = entry
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| TscpError::MissingReferencePath { config: config.to_path_buf() })?;
            let resolved = clean_path(&dir.join(path));
            Ok(if resolved.is_dir() { resolved.join(TSCONFIG) } else { resolved })
        })
        .collect()
}

/// Lexically remove `.` and `..` components.
pub fn clean_path(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
