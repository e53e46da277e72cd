use ratatui::style::Color;

use super::game_model::Pad;

/// Cosmetic color palette. The selected theme is persisted by name alongside
/// the high score and survives a record clearing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Neon,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Default, Theme::Dark, Theme::Neon];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Dark => "dark",
            Theme::Neon => "neon",
        }
    }

    pub fn from_name(name: &str) -> Option<Theme> {
        Theme::ALL.into_iter().find(|theme| theme.name() == name)
    }

    pub fn cycle(self) -> Theme {
        match self {
            Theme::Default => Theme::Dark,
            Theme::Dark => Theme::Neon,
            Theme::Neon => Theme::Default,
        }
    }

    pub fn background(self) -> Color {
        match self {
            Theme::Default => Color::Rgb(26, 26, 46),
            Theme::Dark => Color::Rgb(17, 17, 17),
            Theme::Neon => Color::Rgb(15, 15, 26),
        }
    }

    pub fn text(self) -> Color {
        match self {
            Theme::Default => Color::White,
            Theme::Dark => Color::Rgb(221, 221, 221),
            Theme::Neon => Color::Cyan,
        }
    }

    pub fn border(self) -> Color {
        match self {
            Theme::Default => Color::Blue,
            Theme::Dark => Color::DarkGray,
            Theme::Neon => Color::Magenta,
        }
    }

    pub fn pad_color(self, pad: Pad, lit: bool) -> Color {
        if lit {
            return match pad {
                Pad::Green => Color::LightGreen,
                Pad::Red => Color::LightRed,
                Pad::Yellow => Color::LightYellow,
                Pad::Blue => Color::LightBlue,
            };
        }
        match self {
            Theme::Dark => match pad {
                Pad::Green => Color::Rgb(0, 96, 0),
                Pad::Red => Color::Rgb(112, 0, 0),
                Pad::Yellow => Color::Rgb(112, 96, 0),
                Pad::Blue => Color::Rgb(0, 32, 112),
            },
            _ => match pad {
                Pad::Green => Color::Green,
                Pad::Red => Color::Red,
                Pad::Yellow => Color::Yellow,
                Pad::Blue => Color::Blue,
            },
        }
    }
}
