//! Watch session: live mirror of every project

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use rayon::prelude::*;
use tracing::{debug, info_span, warn};

use crate::config::Config;
use crate::error::{TscpError, TscpResult};
use crate::project::Project;
use crate::sync::enumerate::{collect_copy_tasks, collect_projects_files, enumerate_under, CopyTask};
use crate::sync::ignore_list::{resolve_ignore_list, to_watch_glob, WatchIgnore};
use crate::sync::pipeline::LoaderPipeline;
use crate::sync::writer::{copy_file_or_directory, remove_file_or_directory};

use super::event::{changes_from_event, FsChange, WatchEvent, WatchPhase, POLL_MS};
use super::membership::Membership;

/// State owned by one watch session
pub struct WatchSession<'a> {
    config: &'a Config,
    membership: Membership,
    ignore_list: Vec<String>,
    ignore: WatchIgnore,
    pipeline: LoaderPipeline,
    phase: WatchPhase,
}

impl<'a> WatchSession<'a> {
    pub fn new(projects: &[Project], config: &'a Config) -> TscpResult<Self> {
        let ignore_list = resolve_ignore_list(config, projects);
        let ignore = WatchIgnore::new(&ignore_list)?;
        Ok(Self {
            config,
            membership: Membership::new(projects),
            ignore_list,
            ignore,
            pipeline: LoaderPipeline::new(),
            phase: WatchPhase::Initializing,
        })
    }

    pub fn phase(&self) -> WatchPhase {
        self.phase
    }

    fn is_ready(&self) -> bool {
        self.phase == WatchPhase::Ready
    }

    pub fn project_names(&self) -> Vec<String> {
        self.membership.projects().map(|p| p.project_name.clone()).collect()
    }

    pub fn roots(&self) -> Vec<PathBuf> {
        self.membership.projects().map(|p| p.root_dir.clone()).collect()
    }

    pub fn started_event(&self) -> WatchEvent {
        WatchEvent::WatchStarted {
            projects: self.project_names(),
            ignored: to_watch_glob(&self.ignore_list),
        }
    }

    fn idle_event(&self) -> WatchEvent {
        WatchEvent::Idle {
            projects: self.project_names(),
        }
    }

    /// Mirror every enumerated file once, then become ready.
    ///
    /// The initial adds are not reported individually.
    pub fn initial_scan(&mut self, on_event: &impl Fn(WatchEvent)) -> TscpResult<usize> {
        let projects: Vec<Project> = self.membership.projects().cloned().collect();
        let globbed = collect_projects_files(&projects, self.config)?;
        let tasks: Vec<CopyTask> = collect_copy_tasks(&globbed);

        let failures: Vec<TscpError> = tasks
            .par_iter()
            .filter_map(|task| {
                copy_file_or_directory(&task.source_path, &task.target_path, self.config, &self.pipeline).err()
            })
            .collect();
        for failure in failures {
            on_event(WatchEvent::Error {
                message: failure.to_string(),
            });
        }

        self.phase = WatchPhase::Ready;
        on_event(WatchEvent::Ready { files: tasks.len() });
        on_event(self.idle_event());
        Ok(tasks.len())
    }

    /// React to one filesystem change.
    ///
    /// Only an unowned path is an error; copy and delete failures are
    /// reported as [`WatchEvent::Error`].
    pub fn handle(&self, change: &FsChange, on_event: &impl Fn(WatchEvent)) -> TscpResult<()> {
        let path = change.path();
        if self.membership.is_root(path) {
            return Ok(());
        }
        let owned = self.membership.resolve(path)?;
        if self.ignore.is_ignored(path, owned.root) {
            return Ok(());
        }
        let project = owned.project.project_name.clone();
        debug!(?change, target = %owned.target_path.display(), "watch event");

        let report = |result: TscpResult<()>| {
            if let Err(e) = result {
                on_event(WatchEvent::Error { message: e.to_string() });
            }
        };

        match change {
            FsChange::Add(source) => {
                report(copy_file_or_directory(source, &owned.target_path, self.config, &self.pipeline));
                if self.is_ready() && source.is_file() {
                    on_event(WatchEvent::Added {
                        project,
                        path: owned.display_name(),
                    });
                }
                if source.is_dir() {
                    let dir = owned.project.root_dir.join(&owned.relative);
                    self.add_directory(owned.project, &dir, on_event)?;
                }
            }
            FsChange::Change(source) => {
                if source.is_dir() {
                    return Ok(());
                }
                report(copy_file_or_directory(source, &owned.target_path, self.config, &self.pipeline));
                on_event(WatchEvent::Changed {
                    project,
                    path: owned.display_name(),
                });
            }
            FsChange::Unlink(_) => {
                report(remove_file_or_directory(&owned.target_path).map_err(TscpError::from));
                on_event(WatchEvent::Deleted {
                    project,
                    path: owned.display_name(),
                });
            }
        }

        if self.is_ready() {
            on_event(self.idle_event());
        }
        Ok(())
    }

    /// Files that arrived together with a new directory.
    fn add_directory(&self, project: &Project, dir: &Path, on_event: &impl Fn(WatchEvent)) -> TscpResult<()> {
        for relative in enumerate_under(project, dir, &self.ignore_list)? {
            let task = CopyTask::for_relative(project, &relative);
            if let Err(e) = copy_file_or_directory(&task.source_path, &task.target_path, self.config, &self.pipeline) {
                on_event(WatchEvent::Error { message: e.to_string() });
                continue;
            }
            if self.is_ready() {
                on_event(WatchEvent::Added {
                    project: project.project_name.clone(),
                    path: format!("{}/{}", project.project_name, relative),
                });
            }
        }
        Ok(())
    }

    fn shutting_down(&mut self) {
        self.phase = WatchPhase::ShuttingDown;
    }

    fn stopped(&mut self) {
        self.phase = WatchPhase::Stopped;
    }
}

/// Watch `projects` until `running` is cleared.
///
/// Returns early with an error when a change cannot be attributed to any
/// project or the watch primitive fails to start.
pub fn watch(
    projects: &[Project],
    config: &Config,
    running: Arc<AtomicBool>,
    on_event: impl Fn(WatchEvent),
) -> TscpResult<()> {
    let _span = info_span!("watch", projects = projects.len()).entered();
    let mut session = WatchSession::new(projects, config)?;
    on_event(session.started_event());

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )?;

    for root in session.roots() {
        if root.is_dir() {
            watcher.watch(&root, RecursiveMode::Recursive)?;
        } else {
            warn!(root = %root.display(), "root directory does not exist, not watching it");
        }
    }

    session.initial_scan(&on_event)?;

    let result = event_loop(&session, &rx, &running, &on_event);

    session.shutting_down();
    drop(watcher);
    session.stopped();
    on_event(WatchEvent::Shutdown);
    result
}

fn event_loop(
    session: &WatchSession<'_>,
    rx: &std::sync::mpsc::Receiver<Result<Event, notify::Error>>,
    running: &AtomicBool,
    on_event: &impl Fn(WatchEvent),
) -> TscpResult<()> {
    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(POLL_MS)) {
            Ok(Ok(event)) => {
                for change in changes_from_event(&event) {
                    session.handle(&change, on_event)?;
                }
            }
            Ok(Err(e)) => on_event(WatchEvent::Error {
                message: TscpError::from(e).to_string(),
            }),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}
