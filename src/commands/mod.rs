pub mod copy;
pub mod watch;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::ui::context::UiContext;
use tscp::{resolve_projects, Config, ConfigWarning, LoaderRegistry, Project};

/// Everything a command needs once settings and projects are resolved
pub struct Prepared {
    pub ui: UiContext,
    pub config: Config,
    pub projects: Vec<Project>,
}

impl Prepared {
    pub fn project_names(&self) -> Vec<String> {
        self.projects.iter().map(|p| p.project_name.clone()).collect()
    }
}

pub fn prepare(cli: &Cli) -> Result<Prepared> {
    let ui = UiContext::new(cli.json, cli.color);
    let cwd = std::env::current_dir().context("Could not determine the working directory")?;

    let loaded = Config::load(&cwd, &LoaderRegistry::with_builtins())?;
    if let Some(source) = &loaded.source {
        tracing::debug!(settings = %source.display(), "loaded settings");
    }
    for warning in &loaded.warnings {
        print_config_warning(warning, &ui);
    }

    let projects = resolve_projects(&cwd, cli.project_arg(), cli.selection())?;

    Ok(Prepared {
        ui,
        config: loaded.config,
        projects,
    })
}

fn print_config_warning(warning: &ConfigWarning, ui: &UiContext) {
    if ui.json {
        let _ = crate::ui::json::emit(serde_json::json!({
            "event": "warning",
            "key": warning.key,
            "file": warning.file.display().to_string(),
            "line": warning.line,
            "suggestion": warning.suggestion,
        }));
        return;
    }
    eprint!(
        "{}",
        crate::ui::views::warnings::render_config_warning(warning, ui.color, ui.unicode)
    );
}
