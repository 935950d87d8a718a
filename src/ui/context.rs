use crate::cli::ColorWhen;
use crate::ui::terminal::{detect_capabilities, TerminalCapabilities};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiContext {
    pub json: bool,
    pub caps: TerminalCapabilities,
    pub color: bool,
    pub unicode: bool,
}

impl UiContext {
    pub fn new(json: bool, cli_color: Option<ColorWhen>) -> Self {
        Self::from_caps(json, cli_color, detect_capabilities())
    }

    pub(crate) fn from_caps(json: bool, cli_color: Option<ColorWhen>, caps: TerminalCapabilities) -> Self {
        let color = match cli_color {
            Some(ColorWhen::Never) => false,
            Some(ColorWhen::Always) => true,
            Some(ColorWhen::Auto) | None => caps.supports_color && !caps.is_ci,
        };

        Self {
            json,
            caps,
            color: color && !json,
            unicode: caps.supports_unicode,
        }
    }

    /// Whether the idle screen may be cleared between updates.
    pub fn can_clear(&self) -> bool {
        !self.json && self.caps.is_tty && !self.caps.is_ci
    }
}
