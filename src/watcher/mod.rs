//! File watcher for continuous sync
//!
//! Implements watch mode with:
//! - An initial mirror of every project before reporting ready
//! - Per-event copy/delete keyed by the owning project
//! - Graceful Ctrl+C shutdown
//! - NDJSON output for CI

mod event;
mod membership;
mod session;

pub use event::{changes_from_event, FsChange, WatchEvent, WatchPhase, POLL_MS};
pub use membership::{Membership, Owned};
pub use session::{watch, WatchSession};
