//! Watch event types

use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind, RenameMode};

/// Poll interval of the watch loop in milliseconds
pub const POLL_MS: u64 = 50;

/// Watch events, rendered as NDJSON with `--json`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    WatchStarted {
        projects: Vec<String>,
        ignored: Option<String>,
    },
    /// Initial scan finished
    Ready {
        files: usize,
    },
    Added {
        project: String,
        path: String,
    },
    Changed {
        project: String,
        path: String,
    },
    Deleted {
        project: String,
        path: String,
    },
    /// Waiting for the next change
    Idle {
        projects: Vec<String>,
    },
    Error {
        message: String,
    },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        let mut value = match serde_json::to_value(self) {
            Ok(value) => value,
            Err(_) => return "{}".to_string(),
        };
        if let Some(object) = value.as_object_mut() {
            object.insert("command".to_string(), serde_json::Value::from("watch"));
        }
        value.to_string()
    }
}

/// Lifecycle of a watch session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPhase {
    Initializing,
    Ready,
    ShuttingDown,
    Stopped,
}

/// A filesystem change, as the session understands it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsChange {
    Add(PathBuf),
    Change(PathBuf),
    Unlink(PathBuf),
}

impl FsChange {
    pub fn path(&self) -> &PathBuf {
        match self {
            FsChange::Add(p) | FsChange::Change(p) | FsChange::Unlink(p) => p,
        }
    }
}

/// Translate a raw `notify` event.
pub fn changes_from_event(event: &notify::Event) -> Vec<FsChange> {
    let paths = event.paths.iter().cloned();
    match event.kind {
        EventKind::Create(_) => paths.map(FsChange::Add).collect(),
        EventKind::Remove(_) => paths.map(FsChange::Unlink).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => paths.map(FsChange::Unlink).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => paths.map(FsChange::Add).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut changes = Vec::with_capacity(2);
            if let Some(from) = event.paths.first() {
                changes.push(FsChange::Unlink(from.clone()));
            }
            if let Some(to) = event.paths.get(1) {
                changes.push(FsChange::Add(to.clone()));
            }
            changes
        }
        // Which side of a rename this is is unknown; existence decides.
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .map(|p| if p.exists() { FsChange::Add(p) } else { FsChange::Unlink(p) })
            .collect(),
        EventKind::Modify(_) => paths.map(FsChange::Change).collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}
