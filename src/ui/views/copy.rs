use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use tscp::SyncSummary;

pub fn render_copy_summary(
    project_names: &[String],
    summary: &SyncSummary,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    if summary.copied.is_empty() {
        return "No non-typescript files found to copy\n".to_string();
    }

    let mut out = format!(
        "{} Non-typescript files copied\n",
        Icon::Success.colored(supports_color, supports_unicode)
    );
    for name in project_names {
        out.push_str(&ColoredText::success(name).render(supports_color));
        out.push('\n');
    }
    out
}

pub fn copy_summary_json(project_names: &[String], summary: &SyncSummary) -> serde_json::Value {
    serde_json::json!({
        "event": "copied",
        "command": "copy",
        "projects": project_names,
        "files": summary.copied.len(),
        "deleted": summary.deleted,
    })
}
