//! Color theme system for revu.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every surface
//! the dashboard paints. Two built-in themes are provided:
//!
//! - `dark`: ANSI 16 colors only, so it works on any terminal including
//!   256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha`: Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;
use revu_core::types::Severity;

/// All color values used across revu's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel divider
    /// Divider color next to the focused panel.
    pub border_active: Color,
    pub border_inactive: Color,

    // Severity badges and titles
    pub severity_critical: Color,
    pub severity_high: Color,
    pub severity_medium: Color,
    pub severity_low: Color,
    /// Labels outside critical/high/medium/low.
    pub severity_other: Color,

    // Selection and secondary text
    pub selection: Color,
    pub muted: Color,
    pub heading: Color,

    // Detail panel
    pub inline_code: Color,
    pub diff_added: Color,
    pub diff_removed: Color,
    pub code_string: Color,
    pub code_number: Color,
    pub code_keyword: Color,
    pub code_call: Color,
    pub prompt_rule: Color,

    // Scrollbar
    pub scrollbar_thumb: Color,
    pub scrollbar_track: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_running: Color,
    pub status_ok: Color,
    pub status_failed: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            severity_critical: Color::Red,
            severity_high: Color::Yellow,
            severity_medium: Color::Blue,
            severity_low: Color::Green,
            severity_other: Color::Gray,

            selection: Color::Cyan,
            muted: Color::DarkGray,
            heading: Color::White,

            inline_code: Color::Magenta,
            diff_added: Color::Green,
            diff_removed: Color::Red,
            code_string: Color::Green,
            code_number: Color::LightMagenta,
            code_keyword: Color::LightBlue,
            code_call: Color::LightYellow,
            prompt_rule: Color::Magenta,

            scrollbar_thumb: Color::Gray,
            scrollbar_track: Color::DarkGray,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_running: Color::Cyan,
            status_ok: Color::Green,
            status_failed: Color::Red,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let pink = Color::Rgb(245, 194, 231); // #f5c2e7
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            severity_critical: red,
            severity_high: yellow,
            severity_medium: blue,
            severity_low: green,
            severity_other: overlay1,

            selection: lavender,
            muted: overlay1,
            heading: text,

            inline_code: pink,
            diff_added: green,
            diff_removed: red,
            code_string: green,
            code_number: peach,
            code_keyword: mauve,
            code_call: blue,
            prompt_rule: mauve,

            scrollbar_thumb: text,
            scrollbar_track: surface1,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_running: teal,
            status_ok: green,
            status_failed: red,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    /// Badge / title color for a severity class.
    pub fn severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Critical => self.severity_critical,
            Severity::High => self.severity_high,
            Severity::Medium => self.severity_medium,
            Severity::Low => self.severity_low,
            Severity::Other => self.severity_other,
        }
    }
}
