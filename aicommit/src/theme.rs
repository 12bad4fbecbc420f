//! Color theme system for aicommit.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every surface
//! the review screen renders. Two built-in themes are provided:
//!
//! - `dark` — uses ANSI 16 colors so it works on any terminal, including
//!   256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha` — Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;
use tracing::warn;

/// All color values used across the review screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Border of the message box.
    pub border: Color,
    /// Border of the message box while editing.
    pub border_editing: Color,
    /// Box title.
    pub title: Color,
    /// Commit message text.
    pub message: Color,
    /// Placeholder shown for an empty draft.
    pub placeholder: Color,
    /// Loading spinner glyph.
    pub spinner: Color,
    /// Loading status text.
    pub status: Color,
    /// Key names in the hint line, e.g. `[Enter]`.
    pub hint_key: Color,
    /// Action labels in the hint line.
    pub hint_text: Color,
    /// Failure text in the error view.
    pub error: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    ///
    /// Used when no config is present or the configured name is unknown.
    pub fn dark() -> Self {
        Self {
            border: Color::Cyan,
            border_editing: Color::Green,
            title: Color::Cyan,
            message: Color::Reset,
            placeholder: Color::DarkGray,
            spinner: Color::Magenta,
            status: Color::Reset,
            hint_key: Color::Yellow,
            hint_text: Color::DarkGray,
            error: Color::Red,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161);    // #a6e3a1
        let red = Color::Rgb(243, 139, 168);      // #f38ba8
        let yellow = Color::Rgb(249, 226, 175);   // #f9e2af
        let mauve = Color::Rgb(203, 166, 247);    // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let text = Color::Rgb(205, 214, 244);     // #cdd6f4

        Self {
            border: lavender,
            border_editing: green,
            title: lavender,
            message: text,
            placeholder: overlay1,
            spinner: mauve,
            status: text,
            hint_key: yellow,
            hint_text: overlay1,
            error: red,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup. The fallback is logged, not returned as an error.
    ///
    /// # Arguments
    ///
    /// * `name` — theme name from config, e.g. `"dark"` or `"catppuccin-mocha"`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!("Unknown theme '{}', falling back to 'dark'", other);
                Self::dark()
            }
        }
    }
}
