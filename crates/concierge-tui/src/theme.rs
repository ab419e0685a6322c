//! Color palette for the TUI.

use ratatui::style::Color;

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,
    pub surface: Color,

    // Foregrounds
    pub text: Color,
    pub subtext: Color,
    pub muted: Color,

    // Accents
    pub primary: Color,

    // Semantic
    pub success: Color,

    // Message bubbles
    pub user_bubble: Color,
    pub user_text: Color,
    pub assistant_bubble: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::slate()
    }
}

impl Theme {
    /// Slate dark theme (default).
    pub fn slate() -> Self {
        Self {
            base: Color::Rgb(24, 26, 32),      // #181a20
            surface: Color::Rgb(40, 44, 52),   // #282c34

            text: Color::Rgb(229, 231, 235),    // #e5e7eb (gray-200)
            subtext: Color::Rgb(156, 163, 175), // #9ca3af (gray-400)
            muted: Color::Rgb(107, 114, 128),   // #6b7280 (gray-500)

            primary: Color::Rgb(59, 130, 246), // #3b82f6 (blue-500)

            success: Color::Rgb(34, 197, 94), // #22c55e (green-500)

            user_bubble: Color::Rgb(59, 130, 246),      // #3b82f6
            user_text: Color::Rgb(255, 255, 255),       // #ffffff
            assistant_bubble: Color::Rgb(55, 65, 81),   // #374151 (gray-700)

            border: Color::Rgb(75, 85, 99),            // #4b5563
            border_focused: Color::Rgb(59, 130, 246),  // #3b82f6
        }
    }
}
