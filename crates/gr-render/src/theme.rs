use gr_core::config::Theme;
use ratatui::style::{Color, Modifier, Style};

/// Couleurs résolues pour un thème.
///
/// # Example
/// ```
/// use gr_core::config::Theme;
/// use gr_render::theme::ThemeColors;
/// let dark = ThemeColors::for_theme(Theme::Dark);
/// let light = ThemeColors::for_theme(Theme::Light);
/// assert_ne!(dark.bg, light.bg);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeColors {
    pub fg: Color,
    pub bg: Color,
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub gauge: Color,
}

impl ThemeColors {
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                fg: Color::Rgb(0xe6, 0xe6, 0xe6),
                bg: Color::Rgb(0x12, 0x12, 0x14),
                accent: Color::Yellow,
                muted: Color::DarkGray,
                error: Color::LightRed,
                gauge: Color::Cyan,
            },
            Theme::Light => Self {
                fg: Color::Rgb(0x1c, 0x1c, 0x1c),
                bg: Color::Rgb(0xf4, 0xf1, 0xea),
                accent: Color::Blue,
                muted: Color::Gray,
                error: Color::Red,
                gauge: Color::Magenta,
            },
        }
    }

    #[must_use]
    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    #[must_use]
    pub fn title(&self) -> Style {
        self.base().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn dim(&self) -> Style {
        self.base().fg(self.muted)
    }
}
