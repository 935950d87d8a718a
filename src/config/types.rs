//! Settings file schema
//!
//! Every key is optional; absent keys fall back to the defaults in
//! [`super::Config::default`].

use serde::Deserialize;

/// Raw contents of a settings file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    /// Also skip files matched by the project's own `exclude`
    #[serde(default)]
    pub use_ts_exclude: Option<bool>,
    /// Patterns the compiler emits itself
    #[serde(default)]
    pub compiled_files: Option<Vec<String>>,
    /// Patterns never mirrored
    #[serde(default)]
    pub ignored_files: Option<Vec<String>>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One `[[rules]]` entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleSpec {
    #[serde(default)]
    pub test: Option<ConditionSpec>,
    #[serde(default)]
    pub include: Option<ConditionSpec>,
    #[serde(default)]
    pub exclude: Option<ConditionSpec>,
    /// Loader chain, applied last-to-first
    #[serde(default, rename = "use")]
    pub uses: Vec<LoaderSpec>,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// Rule condition as written in a settings file
///
/// A bare string is an exact absolute path; `{ regex = "..." }` is a
/// pattern; an array requires every member to hold.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConditionSpec {
    Exact(String),
    Regex { regex: String },
    Path { path: String },
    All(Vec<ConditionSpec>),
}

/// Loader binding as written in a settings file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LoaderSpec {
    /// A transform registered under `loader`
    Named { loader: String },
    /// An external program fed the content on stdin
    Command {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
}
