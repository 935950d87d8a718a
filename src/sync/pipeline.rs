//! Loader pipeline
//!
//! Runs every matching rule's loaders over a file's content. Rules apply in
//! declaration order; loaders within a rule apply last-declared first.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::trace;

use crate::config::Config;
use crate::error::TscpResult;

use super::loader::LoaderMeta;
use super::posix_path;
use super::rules::{matches_rule, Rule};

/// Per-session loader pipeline
///
/// Owns the skip-set of source paths already known to match no rule. Create
/// one per sync run or watch session and drop it afterwards.
#[derive(Debug, Default)]
pub struct LoaderPipeline {
    without_rules: Mutex<HashSet<PathBuf>>,
}

impl LoaderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `source_path` was recorded as matching no rule.
    pub fn is_skipped(&self, source_path: &Path) -> bool {
        self.without_rules
            .lock()
            .map(|set| set.contains(source_path))
            .unwrap_or(false)
    }

    fn mark_skipped(&self, source_path: &Path) {
        if let Ok(mut set) = self.without_rules.lock() {
            set.insert(source_path.to_path_buf());
        }
    }

    /// Transform `raw_content` for the copy `source_path` → `destination_path`.
    pub fn apply(
        &self,
        raw_content: Vec<u8>,
        source_path: &Path,
        destination_path: &Path,
        config: &Config,
    ) -> TscpResult<Vec<u8>> {
        if self.is_skipped(source_path) {
            return Ok(raw_content);
        }

        let matched_against = posix_path(source_path);
        let used_rules: Vec<&Rule> = config
            .rules
            .iter()
            .filter(|rule| matches_rule(&matched_against, rule))
            .collect();

        if used_rules.is_empty() {
            self.mark_skipped(source_path);
            return Ok(raw_content);
        }

        let meta = LoaderMeta {
            source_path,
            destination_path,
            config,
        };

        let mut content = raw_content;
        for rule in used_rules {
            for loader in rule.loaders.iter().rev() {
                trace!(loader = %loader.name(), source = %source_path.display(), "running loader");
                content = loader.run(content, &meta)?;
            }
        }
        Ok(content)
    }
}

/// One-off transform with a throwaway pipeline.
pub fn apply_loaders(
    raw_content: Vec<u8>,
    source_path: &Path,
    destination_path: &Path,
    config: &Config,
) -> TscpResult<Vec<u8>> {
    LoaderPipeline::new().apply(raw_content, source_path, destination_path, config)
}
