//! Rule matching
//!
//! A [`Rule`] binds up to three [`RuleCondition`]s (`test`, `include`,
//! `exclude`) to a loader chain. Conditions are evaluated against the
//! absolute source path in its forward-slash form.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::loader::Loader;

/// Predicate condition receiving the absolute source path
pub type PathPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// One rule condition
#[derive(Clone)]
pub enum RuleCondition {
    /// Exact absolute path
    Path(String),
    /// Regular expression searched in the path
    Pattern(Regex),
    /// Arbitrary predicate
    Predicate(PathPredicate),
    /// Every sub-condition must hold
    All(Vec<RuleCondition>),
}

impl RuleCondition {
    pub fn path(path: impl Into<String>) -> Self {
        RuleCondition::Path(path.into())
    }

    /// Compile a regex condition.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(RuleCondition::Pattern)
    }

    pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        RuleCondition::Predicate(Arc::new(f))
    }

    pub fn all(conditions: impl IntoIterator<Item = RuleCondition>) -> Self {
        RuleCondition::All(conditions.into_iter().collect())
    }
}

impl fmt::Debug for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCondition::Path(p) => f.debug_tuple("Path").field(p).finish(),
            RuleCondition::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            RuleCondition::Predicate(_) => f.write_str("Predicate(<fn>)"),
            RuleCondition::All(items) => f.debug_tuple("All").field(items).finish(),
        }
    }
}

/// Conditional transform binding
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub test: Option<RuleCondition>,
    pub include: Option<RuleCondition>,
    pub exclude: Option<RuleCondition>,
    /// Loaders in declaration order; they run last-to-first.
    pub loaders: Vec<Loader>,
    /// Reserved; not read by matching or transforms.
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl Rule {
    /// Rule that applies when `test` matches.
    pub fn new(test: RuleCondition) -> Self {
        Self {
            test: Some(test),
            ..Self::default()
        }
    }

    pub fn with_include(mut self, include: RuleCondition) -> Self {
        self.include = Some(include);
        self
    }

    pub fn with_exclude(mut self, exclude: RuleCondition) -> Self {
        self.exclude = Some(exclude);
        self
    }

    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loaders.push(loader);
        self
    }
}

/// Evaluate a single condition against `path`.
///
/// String conditions compare for equality, so a relative `path` never
/// matches one. Array conditions evaluate every member.
pub fn test_condition(path: &str, condition: &RuleCondition) -> bool {
    match condition {
        RuleCondition::All(items) => items
            .iter()
            .map(|c| test_condition(path, c))
            .fold(true, |acc, hit| acc && hit),
        RuleCondition::Path(expected) => expected == path,
        RuleCondition::Pattern(re) => re.is_match(path),
        RuleCondition::Predicate(f) => f(path),
    }
}

/// Decide whether `rule` applies to `path`.
///
/// `include` beats `exclude`, which beats `test`. All configured conditions
/// are evaluated before deciding.
pub fn matches_rule(path: &str, rule: &Rule) -> bool {
    let is_matching = rule.test.as_ref().map(|c| test_condition(path, c));
    let is_included = rule.include.as_ref().map(|c| test_condition(path, c));
    let is_excluded = rule.exclude.as_ref().map(|c| test_condition(path, c));

    if is_included == Some(true) {
        return true;
    }
    if is_excluded == Some(true) {
        return false;
    }
    is_matching == Some(true)
}
