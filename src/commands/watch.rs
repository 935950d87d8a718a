use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};

use crate::cli::Cli;
use crate::ui::views::watch::{render_idle, render_watch_event};
use tscp::{watch, WatchEvent};

pub fn cmd_watch(cli: &Cli) -> Result<()> {
    let context = "Something went wrong during watching the non-typescript files";
    let prepared = super::prepare(cli).context(context)?;
    let ui = prepared.ui;

    // Set up Ctrl+C / SIGTERM handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")?;

    let last_activity: Mutex<Option<String>> = Mutex::new(None);

    watch(&prepared.projects, &prepared.config, running, |event| {
        if ui.json {
            let _ = crate::ui::json::emit_line(&event.to_json());
            return;
        }

        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        if let WatchEvent::Idle { projects } = &event {
            let mut stdout = std::io::stdout().lock();
            if ui.can_clear() {
                let _ = crossterm::execute!(stdout, Clear(ClearType::All), MoveTo(0, 0));
            }
            let last = last_activity.lock().ok().and_then(|l| l.clone());
            let _ = write!(stdout, "{}", render_idle(last.as_deref(), projects, ui.color));
            let _ = stdout.flush();
            return;
        }

        let Some(rendered) = render_watch_event(&timestamp, &event, ui.color, ui.unicode) else {
            return;
        };
        match event {
            WatchEvent::Error { .. } => eprint!("{rendered}"),
            WatchEvent::Added { .. } | WatchEvent::Changed { .. } | WatchEvent::Deleted { .. } => {
                print!("{rendered}");
                if let Ok(mut last) = last_activity.lock() {
                    *last = Some(rendered);
                }
            }
            _ => print!("{rendered}"),
        }
    })
    .context(context)?;

    Ok(())
}
