//! Settings discovery and loading

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{TscpError, TscpResult};

use super::types::Settings;

/// Files searched in every directory, first match wins
pub const SETTINGS_FILES: &[&str] = &[".tscprc.toml", "tscp.toml", ".tscprc", ".tscprc.json"];

/// `package.json` key holding settings
pub const PACKAGE_JSON_KEY: &str = "tscp";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Find the settings file governing `cwd`.
///
/// Walks from `cwd` towards the filesystem root and stops after `home`.
pub fn discover(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    for dir in cwd.ancestors() {
        for name in SETTINGS_FILES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        let package_json = dir.join("package.json");
        if package_json.is_file() && package_json_has_settings(&package_json) {
            return Some(package_json);
        }

        if home.is_some_and(|h| h == dir) {
            break;
        }
    }
    None
}

fn package_json_has_settings(path: &Path) -> bool {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .is_some_and(|value| value.get(PACKAGE_JSON_KEY).is_some())
}

/// Load a settings file and collect unknown keys as warnings.
pub fn load_with_warnings(path: &Path) -> TscpResult<(Settings, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;
    let invalid = |message: String| TscpError::InvalidConfig {
        file: path.to_path_buf(),
        message,
    };

    let mut unknown_paths: Vec<String> = Vec::new();
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

    let settings: Settings = if file_name == "package.json" {
        let mut value: serde_json::Value = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
        let section = value
            .get_mut(PACKAGE_JSON_KEY)
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null);
        if section.is_null() {
            Settings::default()
        } else {
            serde_ignored::deserialize(section, |p| unknown_paths.push(p.to_string()))
                .map_err(|e| invalid(e.to_string()))?
        }
    } else if file_name.ends_with(".json") {
        let mut de = serde_json::Deserializer::from_str(&content);
        serde_ignored::deserialize(&mut de, |p| unknown_paths.push(p.to_string()))
            .map_err(|e| invalid(e.to_string()))?
    } else {
        let de = toml::de::Deserializer::new(&content);
        serde_ignored::deserialize(de, |p| unknown_paths.push(p.to_string()))
            .map_err(|e| invalid(e.to_string()))?
    };

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    debug!(file = %path.display(), "loaded settings");
    Ok((settings, warnings))
}

/// Apply `TSCP_*` environment overrides.
pub fn with_env_overrides(settings: Settings) -> Settings {
    with_env_overrides_from(settings, |key| std::env::var(key).ok())
}

pub(crate) fn with_env_overrides_from(mut settings: Settings, lookup: impl Fn(&str) -> Option<String>) -> Settings {
    if let Some(value) = lookup("TSCP_USE_TS_EXCLUDE") {
        match parse_bool(&value) {
            Some(flag) => settings.use_ts_exclude = Some(flag),
            None => warn!(value = %value, "ignoring invalid TSCP_USE_TS_EXCLUDE"),
        }
    }
    settings
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "use_ts_exclude",
        "compiled_files",
        "ignored_files",
        "rules",
        "test",
        "include",
        "exclude",
        "use",
        "options",
        "loader",
        "command",
        "args",
        "regex",
        "path",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
