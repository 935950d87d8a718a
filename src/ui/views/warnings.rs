use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use tscp::ConfigWarning;

pub fn render_config_warning(warning: &ConfigWarning, supports_color: bool, supports_unicode: bool) -> String {
    let location = match warning.line {
        Some(line) => format!("{}:{}", warning.file.display(), line),
        None => warning.file.display().to_string(),
    };
    let mut out = format!(
        "{} Unknown setting '{}' in {}\n",
        Icon::Warning.colored(supports_color, supports_unicode),
        warning.key,
        location
    );
    if let Some(suggestion) = &warning.suggestion {
        out.push_str(&format!(
            "  {}\n",
            ColoredText::dim(format!("did you mean '{}'?", suggestion)).render(supports_color)
        ));
    }
    out
}
