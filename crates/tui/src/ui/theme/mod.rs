//! Theme styling module for the TUI UI layer.
//!
//! Two palettes are available: Dracula for truecolor terminals and an ANSI
//! 256-color fallback. Components never hard-code colors; they go through the
//! semantic roles in [`roles::Theme`] and the builders in [`theme_helpers`].

use std::env;

use tracing::debug;

pub mod ansi256;
pub mod dracula;
pub mod roles;
pub mod theme_helpers;

pub use ansi256::Ansi256Theme;
pub use dracula::DraculaTheme;
pub use roles::Theme;

/// Environment variable that forces a theme by name.
pub const THEME_ENV: &str = "TUI_THEME";

pub const DRACULA: &str = "dracula";
pub const ANSI256: &str = "ansi256";

/// Theme plus the name it was selected under.
pub struct LoadedTheme {
    pub name: &'static str,
    pub theme: Box<dyn Theme>,
}

impl LoadedTheme {
    fn named(name: &'static str) -> Self {
        let theme: Box<dyn Theme> = match name {
            ANSI256 => Box::new(Ansi256Theme::new()),
            _ => Box::new(DraculaTheme::new()),
        };
        Self { name, theme }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorCapability {
    Truecolor,
    Ansi256,
}

/// Selects a theme from `TUI_THEME`, the persisted preference and the
/// terminal's color capability, in that order.
pub fn load(preferred_theme: Option<&str>) -> LoadedTheme {
    if matches!(detect_color_capability(), ColorCapability::Ansi256) {
        debug!("ANSI-only terminal detected; forcing fallback palette");
        return LoadedTheme::named(ANSI256);
    }

    if let Ok(theme_name) = env::var(THEME_ENV)
        && let Some(name) = resolve(theme_name.trim())
    {
        return LoadedTheme::named(name);
    }

    if let Some(name) = preferred_theme.and_then(|name| resolve(name.trim())) {
        return LoadedTheme::named(name);
    }

    LoadedTheme::named(DRACULA)
}

fn resolve(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "dracula" => Some(DRACULA),
        "ansi256" | "ansi" | "256" => Some(ANSI256),
        other => {
            debug!(theme = other, "unknown theme name");
            None
        }
    }
}

fn detect_color_capability() -> ColorCapability {
    if let Some(mode) = env::var("TUI_COLOR_MODE").ok().and_then(|value| parse_color_mode(value.trim())) {
        return mode;
    }

    let color_term = env::var("COLORTERM").unwrap_or_default().to_ascii_lowercase();
    if color_term.contains("truecolor") || color_term.contains("24bit") {
        return ColorCapability::Truecolor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term.contains("truecolor") || term.contains("direct") {
        return ColorCapability::Truecolor;
    }

    ColorCapability::Ansi256
}

fn parse_color_mode(value: &str) -> Option<ColorCapability> {
    match value.to_ascii_lowercase().as_str() {
        "truecolor" | "24bit" => Some(ColorCapability::Truecolor),
        "ansi256" | "256" | "8bit" => Some(ColorCapability::Ansi256),
        _ => None,
    }
}
