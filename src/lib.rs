//! tscp - mirror non-TypeScript assets next to compiled output
//!
//! tscp reads a project's `tsconfig.json`, finds every file under `rootDir`
//! the compiler will not emit, and copies it into `outDir` (optionally
//! through a chain of loaders). In watch mode the mirror is kept live.

pub mod config;
pub mod error;
pub mod project;
pub mod sync;
pub mod watcher;

// Re-exports for convenience
pub use config::{Config, ConfigWarning, LoadedConfig};
pub use error::{TscpError, TscpResult};
pub use project::{resolve_projects, Project, ProjectSelection, ProjectWithFiles};
pub use sync::{sync_all, Loader, LoaderRegistry, Rule, RuleCondition, SyncSummary};
pub use watcher::{watch, WatchEvent};
