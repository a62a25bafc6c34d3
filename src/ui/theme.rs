//! Color themes for the UI.
//!
//! Each theme is a Gruvbox palette; [`ThemeColors`] assigns the palette's
//! colors to the roles the panels draw with.

use crate::app::Theme;
use ratatui::style::Color;

struct Palette {
    bg0: Color,
    bg1: Color,
    bg3: Color,
    fg: Color,
    gray: Color,
    red: Color,
    green: Color,
    yellow: Color,
    blue: Color,
    aqua: Color,
    orange: Color,
}

const GRUVBOX_DARK: Palette = Palette {
    bg0: Color::Rgb(40, 40, 40),
    bg1: Color::Rgb(60, 56, 54),
    bg3: Color::Rgb(102, 92, 84),
    fg: Color::Rgb(235, 219, 178),
    gray: Color::Rgb(146, 131, 116),
    red: Color::Rgb(251, 73, 52),
    green: Color::Rgb(184, 187, 38),
    yellow: Color::Rgb(250, 189, 47),
    blue: Color::Rgb(131, 165, 152),
    aqua: Color::Rgb(142, 192, 124),
    orange: Color::Rgb(251, 184, 108),
};

const GRUVBOX_LIGHT: Palette = Palette {
    bg0: Color::Rgb(251, 245, 234),
    bg1: Color::Rgb(235, 219, 178),
    bg3: Color::Rgb(213, 196, 161),
    fg: Color::Rgb(60, 56, 54),
    gray: Color::Rgb(124, 111, 100),
    red: Color::Rgb(157, 0, 6),
    green: Color::Rgb(121, 116, 14),
    yellow: Color::Rgb(181, 118, 20),
    blue: Color::Rgb(7, 102, 120),
    aqua: Color::Rgb(102, 123, 3),
    orange: Color::Rgb(175, 58, 3),
};

/// Colors by role.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    /// Panel background.
    pub bg: Color,
    /// Primary text.
    pub text: Color,
    /// Headings and titles.
    pub heading: Color,
    /// Field labels and grid headers.
    pub label: Color,
    /// Field values and grid cells.
    pub value: Color,
    /// Borders.
    pub border: Color,
    /// Cursor row foreground.
    pub cursor_fg: Color,
    /// Cursor row background.
    pub cursor_bg: Color,
    /// Status bar foreground.
    pub status_fg: Color,
    /// Status bar background.
    pub status_bg: Color,
    /// Names of nodes that can be shown as a grid.
    pub numeric: Color,
    /// Secondary text (shape summaries, non-numeric cells).
    pub muted: Color,
    /// Unresolved nodes and diagnostics.
    pub warning: Color,
    /// Errors.
    pub error: Color,
}

impl ThemeColors {
    /// Create color palette from theme.
    pub fn from_theme(theme: &Theme) -> Self {
        match theme {
            Theme::GruvboxDark => Self::from_palette(&GRUVBOX_DARK),
            Theme::GruvboxLight => Self::from_palette(&GRUVBOX_LIGHT),
        }
    }

    fn from_palette(p: &Palette) -> Self {
        Self {
            bg: p.bg0,
            text: p.fg,
            heading: p.orange,
            label: p.green,
            value: p.aqua,
            border: p.bg3,
            cursor_fg: p.bg0,
            cursor_bg: p.orange,
            status_fg: p.fg,
            status_bg: p.bg1,
            numeric: p.blue,
            muted: p.gray,
            warning: p.yellow,
            error: p.red,
        }
    }
}
