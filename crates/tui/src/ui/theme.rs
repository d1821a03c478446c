use ratatui::style::Color;

/// Dark palette shared by every screen. Profit and loss colors carry the
/// semantics; everything else is chrome.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub text: Color,
    pub text_muted: Color,
    pub dim: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub error: Color,
    pub border: Color,
    pub border_focused: Color,
    pub surface_bright: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Color::Rgb(220, 220, 220),
            text_muted: Color::Rgb(150, 158, 166),
            dim: Color::Rgb(110, 116, 122),
            accent: Color::Rgb(80, 160, 160),
            positive: Color::Rgb(95, 175, 95),
            negative: Color::Rgb(205, 90, 90),
            warning: Color::Rgb(210, 160, 70),
            error: Color::Rgb(200, 80, 80),
            border: Color::Rgb(60, 70, 80),
            border_focused: Color::Rgb(110, 190, 190),
            surface_bright: Color::Rgb(24, 30, 38),
        }
    }
}
