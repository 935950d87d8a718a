use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use tscp::WatchEvent;

pub const IDLE_MESSAGE: &str = "Watching files for changes";
pub const SHUTDOWN_MESSAGE: &str = "File watcher gracefully shut down.";

/// One log line for `event`, or `None` for events rendered as a screen.
pub fn render_watch_event(
    timestamp: &str,
    event: &WatchEvent,
    supports_color: bool,
    supports_unicode: bool,
) -> Option<String> {
    let prefix = ColoredText::dim(format!("[{}]", timestamp)).render(supports_color);

    let line = match event {
        WatchEvent::WatchStarted { projects, .. } => format!(
            "{} {} Starting the non-typescript file watcher for {}\n",
            prefix,
            Icon::Watch.colored(supports_color, supports_unicode),
            projects.join(", ")
        ),
        WatchEvent::Ready { files } => format!(
            "{} {} Initial copy done: {} file{}\n",
            prefix,
            Icon::Success.colored(supports_color, supports_unicode),
            files,
            if *files == 1 { "" } else { "s" }
        ),
        WatchEvent::Added { path, .. } => format!(
            "{} {} {} added\n",
            prefix,
            Icon::Added.colored(supports_color, supports_unicode),
            ColoredText::success(path).render(supports_color)
        ),
        WatchEvent::Changed { path, .. } => format!(
            "{} {} {} changed\n",
            prefix,
            Icon::Changed.colored(supports_color, supports_unicode),
            ColoredText::warning(path).render(supports_color)
        ),
        WatchEvent::Deleted { path, .. } => format!(
            "{} {} {} deleted\n",
            prefix,
            Icon::Deleted.colored(supports_color, supports_unicode),
            ColoredText::error(path).render(supports_color)
        ),
        WatchEvent::Error { message } => format!(
            "{} {} Error: {}\n",
            prefix,
            Icon::Error.colored(supports_color, supports_unicode),
            message
        ),
        WatchEvent::Shutdown => format!("\n{}\n", SHUTDOWN_MESSAGE),
        WatchEvent::Idle { .. } => return None,
    };
    Some(line)
}

/// Idle status: the last activity line, then the watched projects.
pub fn render_idle(last_activity: Option<&str>, projects: &[String], supports_color: bool) -> String {
    let mut out = String::new();
    if let Some(line) = last_activity {
        out.push_str(line);
    }
    out.push_str(IDLE_MESSAGE);
    out.push('\n');
    for name in projects {
        out.push_str(&ColoredText::dim(name).render(supports_color));
        out.push('\n');
    }
    out
}
