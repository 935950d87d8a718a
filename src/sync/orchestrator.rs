//! One-shot mirror of every project
//!
//! Deletes all existing targets first, then writes every source file through
//! the loader pipeline. The two phases never overlap.

use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, info_span};

use crate::config::Config;
use crate::error::TscpResult;
use crate::project::Project;

use super::enumerate::{collect_copy_tasks, collect_projects_files, CopyTask};
use super::pipeline::LoaderPipeline;
use super::writer::{copy_file_or_directory, file_stats, remove_file_or_directory};

/// Outcome of [`sync_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Number of projects mirrored
    pub projects: usize,
    /// Target paths mirrored, in enumeration order
    pub copied: Vec<PathBuf>,
    /// Stale targets removed before copying
    pub deleted: usize,
}

/// Mirror every project's non-compiled files into its `out_dir`.
pub fn sync_all(projects: &[Project], config: &Config) -> TscpResult<SyncSummary> {
    let _span = info_span!("sync_all", projects = projects.len()).entered();

    let globbed = collect_projects_files(projects, config)?;
    let tasks = collect_copy_tasks(&globbed);
    debug!(tasks = tasks.len(), "collected copy tasks");

    let deleted = delete_targets(&tasks)?;

    let pipeline = LoaderPipeline::new();
    tasks
        .par_iter()
        .try_for_each(|task| copy_file_or_directory(&task.source_path, &task.target_path, config, &pipeline))?;

    Ok(SyncSummary {
        projects: projects.len(),
        copied: tasks.into_iter().map(|t| t.target_path).collect(),
        deleted,
    })
}

fn delete_targets(tasks: &[CopyTask]) -> TscpResult<usize> {
    let deleted = tasks
        .par_iter()
        .map(|task| -> TscpResult<usize> {
            if file_stats(&task.target_path)?.is_none() {
                return Ok(0);
            }
            remove_file_or_directory(&task.target_path)?;
            Ok(1)
        })
        .try_reduce(|| 0, |a, b| Ok(a + b))?;
    debug!(deleted, "delete phase complete");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::loader::Loader;
    use crate::sync::rules::{Rule, RuleCondition};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn project_at(base: &Path) -> Project {
        Project {
            project_name: "tmp".to_string(),
            base_path: base.to_path_buf(),
            config_path: base.join("tsconfig.json"),
            root_dir: base.join("src"),
            out_dir: base.join("dist"),
            exclude: Vec::new(),
        }
    }

    fn seed(base: &Path, files: &[(&str, &[u8])]) {
        for (rel, content) in files {
            let path = base.join("src").join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
        let mut out: Vec<_> = walk(dir)
            .into_iter()
            .map(|p| (p.strip_prefix(dir).unwrap().display().to_string(), fs::read(&p).unwrap()))
            .collect();
        out.sort();
        out
    }

    fn walk(dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                files.extend(walk(&path));
            } else {
                files.push(path);
            }
        }
        files
    }

    #[test]
    fn copies_assets_but_not_sources() {
        let dir = tempdir().unwrap();
        seed(dir.path(), &[("a.sass", b".a { color: red }"), ("a.ts", b"export {}")]);
        let project = project_at(dir.path());

        let summary = sync_all(&[project], &Config::default()).unwrap();

        assert!(dir.path().join("dist/a.sass").exists());
        assert!(!dir.path().join("dist/a.ts").exists());
        assert_eq!(summary.copied, vec![dir.path().join("dist/a.sass")]);
        assert_eq!(summary.deleted, 0);
    }

    #[test]
    fn copy_without_rules_is_byte_identical() {
        let dir = tempdir().unwrap();
        let binary: &[u8] = &[0xff, 0xfe, 0x00, b'\r', b'\n', 0x80];
        seed(dir.path(), &[("img/logo.bin", binary)]);

        sync_all(&[project_at(dir.path())], &Config::default()).unwrap();

        assert_eq!(fs::read(dir.path().join("dist/img/logo.bin")).unwrap(), binary);
    }

    #[test]
    fn second_run_yields_same_tree() {
        let dir = tempdir().unwrap();
        seed(dir.path(), &[("a.css", b"a"), ("deep/b.json", b"{}"), ("c.ts", b"")]);
        let projects = [project_at(dir.path())];
        let config = Config {
            rules: vec![Rule::new(RuleCondition::pattern(r"\.css$").unwrap())
                .with_loader(Loader::text("bang", |c, _| Ok(format!("{c}!"))))],
            ..Config::default()
        };

        sync_all(&projects, &config).unwrap();
        let first = snapshot(&dir.path().join("dist"));
        let summary = sync_all(&projects, &config).unwrap();
        let second = snapshot(&dir.path().join("dist"));

        assert_eq!(first, second);
        assert_eq!(summary.deleted, 2);
        assert_eq!(fs::read_to_string(dir.path().join("dist/a.css")).unwrap(), "a!");
    }

    #[test]
    fn stale_directory_at_target_is_replaced() {
        let dir = tempdir().unwrap();
        seed(dir.path(), &[("data.json", b"{}")]);
        fs::create_dir_all(dir.path().join("dist/data.json/old")).unwrap();

        sync_all(&[project_at(dir.path())], &Config::default()).unwrap();

        assert!(dir.path().join("dist/data.json").is_file());
    }

    #[test]
    fn loader_failure_aborts_sync() {
        let dir = tempdir().unwrap();
        seed(dir.path(), &[("a.css", b"a")]);
        let config = Config {
            rules: vec![Rule::new(RuleCondition::pattern("css").unwrap())
                .with_loader(Loader::text("broken", |_, _| Err("bad input".into())))],
            ..Config::default()
        };

        let err = sync_all(&[project_at(dir.path())], &config).unwrap_err();
        assert!(err.to_string().contains("loader 'broken' failed"));
    }

    #[test]
    fn multiple_projects_mirror_independently() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        seed(&a, &[("x.css", b"a")]);
        seed(&b, &[("y.css", b"b")]);

        let summary = sync_all(&[project_at(&a), project_at(&b)], &Config::default()).unwrap();

        assert_eq!(summary.projects, 2);
        assert_eq!(fs::read(a.join("dist/x.css")).unwrap(), b"a");
        assert_eq!(fs::read(b.join("dist/y.css")).unwrap(), b"b");
    }
}
