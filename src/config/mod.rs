//! Configuration module for tscp
//!
//! Effective settings come from, lowest priority first:
//! 1. Built-in defaults
//! 2. The discovered settings file (`.tscprc.toml`, `tscp.toml`, `.tscprc`,
//!    `.tscprc.json` or the `"tscp"` key of `package.json`)
//! 3. Environment variables (`TSCP_*`)

mod loader;
mod types;

use std::path::{Path, PathBuf};

use crate::error::{TscpError, TscpResult};
use crate::sync::loader::{Loader, LoaderRegistry};
use crate::sync::rules::{Rule, RuleCondition};

pub use loader::{
    discover, load_with_warnings, with_env_overrides, ConfigWarning, PACKAGE_JSON_KEY, SETTINGS_FILES,
};
pub use types::{ConditionSpec, LoaderSpec, RuleSpec, Settings};

/// Patterns the compiler owns by default
pub const DEFAULT_COMPILED_FILES: &[&str] = &["**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx"];

/// Patterns never mirrored by default
pub const DEFAULT_IGNORED_FILES: &[&str] = &["node_modules"];

/// Effective configuration, immutable once built
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory the run was started from
    pub cwd: PathBuf,
    pub use_ts_exclude: bool,
    pub compiled_files: Vec<String>,
    /// `compiled_files` followed by the configured ignore patterns
    pub ignored_files: Vec<String>,
    pub rules: Vec<Rule>,
}

impl Default for Config {
    fn default() -> Self {
        let compiled_files: Vec<String> = DEFAULT_COMPILED_FILES.iter().map(|s| s.to_string()).collect();
        let ignored_files = compiled_files
            .iter()
            .cloned()
            .chain(DEFAULT_IGNORED_FILES.iter().map(|s| s.to_string()))
            .collect();
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            use_ts_exclude: true,
            compiled_files,
            ignored_files,
            rules: Vec::new(),
        }
    }
}

/// Result of [`Config::load`]
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// Settings file that was applied, if any
    pub source: Option<PathBuf>,
    pub warnings: Vec<ConfigWarning>,
}

impl Config {
    /// Merge `settings` over the defaults, resolving loaders in `registry`.
    pub fn from_settings(cwd: &Path, settings: Settings, registry: &LoaderRegistry) -> TscpResult<Self> {
        let compiled_files = settings
            .compiled_files
            .unwrap_or_else(|| DEFAULT_COMPILED_FILES.iter().map(|s| s.to_string()).collect());
        let configured_ignored = settings
            .ignored_files
            .unwrap_or_else(|| DEFAULT_IGNORED_FILES.iter().map(|s| s.to_string()).collect());
        let ignored_files = compiled_files.iter().cloned().chain(configured_ignored).collect();

        let rules = settings
            .rules
            .into_iter()
            .map(|spec| build_rule(spec, registry))
            .collect::<TscpResult<Vec<_>>>()?;

        Ok(Self {
            cwd: cwd.to_path_buf(),
            use_ts_exclude: settings.use_ts_exclude.unwrap_or(true),
            compiled_files,
            ignored_files,
            rules,
        })
    }

    /// Discover, read and merge the settings governing `cwd`.
    pub fn load(cwd: &Path, registry: &LoaderRegistry) -> TscpResult<LoadedConfig> {
        let home = dirs::home_dir();
        let source = discover(cwd, home.as_deref());
        let (settings, warnings) = match &source {
            Some(path) => load_with_warnings(path)?,
            None => (Settings::default(), Vec::new()),
        };
        let config = Self::from_settings(cwd, with_env_overrides(settings), registry)?;
        Ok(LoadedConfig {
            config,
            source,
            warnings,
        })
    }
}

fn build_rule(spec: RuleSpec, registry: &LoaderRegistry) -> TscpResult<Rule> {
    Ok(Rule {
        test: spec.test.map(build_condition).transpose()?,
        include: spec.include.map(build_condition).transpose()?,
        exclude: spec.exclude.map(build_condition).transpose()?,
        loaders: spec
            .uses
            .into_iter()
            .map(|loader| build_loader(loader, registry))
            .collect::<TscpResult<Vec<_>>>()?,
        options: spec.options,
    })
}

fn build_condition(spec: ConditionSpec) -> TscpResult<RuleCondition> {
    match spec {
        ConditionSpec::Exact(path) | ConditionSpec::Path { path } => Ok(RuleCondition::path(path)),
        ConditionSpec::Regex { regex } => {
            RuleCondition::pattern(&regex).map_err(|source| TscpError::InvalidRegex { pattern: regex, source })
        }
        ConditionSpec::All(items) => Ok(RuleCondition::all(
            items.into_iter().map(build_condition).collect::<TscpResult<Vec<_>>>()?,
        )),
    }
}

fn build_loader(spec: LoaderSpec, registry: &LoaderRegistry) -> TscpResult<Loader> {
    match spec {
        LoaderSpec::Named { loader } => registry.resolve(&loader),
        LoaderSpec::Command { command, args } => Ok(Loader::command(command, args)),
    }
}
