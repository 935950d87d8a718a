use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::ui::views::copy::{copy_summary_json, render_copy_summary};
use tscp::sync_all;

pub fn cmd_copy(cli: &Cli) -> Result<()> {
    let context = "Something went wrong during the copy of the non-typescript files";
    let prepared = super::prepare(cli).context(context)?;

    let summary = sync_all(&prepared.projects, &prepared.config).context(context)?;
    let names = prepared.project_names();

    if prepared.ui.json {
        crate::ui::json::emit(copy_summary_json(&names, &summary))?;
    } else {
        print!(
            "{}",
            render_copy_summary(&names, &summary, prepared.ui.color, prepared.ui.unicode)
        );
    }

    Ok(())
}
