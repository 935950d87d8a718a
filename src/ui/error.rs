use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use crate::ui::terminal::detect_capabilities;

/// Operator hint for library errors that have an obvious fix.
fn hint_for(err: &tscp::TscpError) -> Option<String> {
    use tscp::TscpError;

    match err {
        TscpError::ConfigNotFound { .. } => {
            Some("Run tscp next to a tsconfig.json, or pass one with --project <path>.".to_string())
        }
        TscpError::MissingCompilerOption { option, .. } => {
            Some(format!("Set compilerOptions.{option} in that configuration."))
        }
        TscpError::NoProjectReferences => {
            Some("--build needs a \"references\" list; drop --build to copy a single project.".to_string())
        }
        TscpError::UnknownLoader { .. } => {
            Some("Register the loader or use { command = \"...\" } in the rule.".to_string())
        }
        _ => None,
    }
}

fn format_error_with(err: &anyhow::Error, supports_color: bool, supports_unicode: bool) -> String {
    let mut out = format!(
        "{} {}\n",
        Icon::Error.colored(supports_color, supports_unicode),
        ColoredText::error(err.to_string()).bold().render(supports_color)
    );
    for cause in err.chain().skip(1) {
        out.push_str(&format!("  {}\n", cause));
    }
    if let Some(hint) = err.downcast_ref::<tscp::TscpError>().and_then(hint_for) {
        out.push_str(&format!("  {}\n", ColoredText::dim(hint).render(supports_color)));
    }
    out
}

pub fn format_error(err: &anyhow::Error) -> String {
    let caps = detect_capabilities();
    format_error_with(err, caps.supports_color, caps.supports_unicode)
}

pub fn print_error(err: &anyhow::Error, json: bool) {
    if json {
        let output = serde_json::json!({
            "event": "error",
            "message": err.to_string(),
            "causes": err.chain().skip(1).map(|c| c.to_string()).collect::<Vec<_>>(),
        });
        let _ = crate::ui::json::emit(output);
        return;
    }

    eprint!("{}", format_error(err));
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn renders_context_then_cause() {
        let err = Err::<(), _>(tscp::TscpError::NoProjectReferences)
            .context("Something went wrong during the copy of the non-typescript files")
            .unwrap_err();

        let rendered = format_error_with(&err, false, false);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines[0],
            "[FAIL] Something went wrong during the copy of the non-typescript files"
        );
        assert_eq!(lines[1], "  No project references configured");
        assert!(lines[2].contains("--build"));
    }

    #[test]
    fn plain_errors_have_no_hint() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(format_error_with(&err, false, true), "✗ boom\n");
    }
}
