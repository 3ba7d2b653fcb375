use std::{fmt, str::FromStr};

use ratatui::style::Color;

use crate::error::PongError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameTheme {
    #[default]
    Monokai,
    Solarized,
    Dracula,
    GruvboxDark,
    Nord,
    OneDark,
    HighContrast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    pub background: Color,
    pub border: Color,
    pub text: Color,
    pub net: Color,
    pub left_paddle: Color,
    pub right_paddle: Color,
    pub ball: Color,
    pub bounding_box: Color,
}

impl GameTheme {
    pub const ALL: [GameTheme; 7] = [
        GameTheme::Monokai,
        GameTheme::Solarized,
        GameTheme::Dracula,
        GameTheme::GruvboxDark,
        GameTheme::Nord,
        GameTheme::OneDark,
        GameTheme::HighContrast,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GameTheme::Monokai => "monokai",
            GameTheme::Solarized => "solarized",
            GameTheme::Dracula => "dracula",
            GameTheme::GruvboxDark => "gruvbox-dark",
            GameTheme::Nord => "nord",
            GameTheme::OneDark => "one-dark",
            GameTheme::HighContrast => "high-contrast",
        }
    }

    pub fn colors(&self) -> ThemeColors {
        match self {
            GameTheme::Monokai => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(249, 38, 114),        // pink
                text: Color::Rgb(248, 248, 242),         // foreground
                net: Color::Rgb(117, 113, 94),           // comment grey
                left_paddle: Color::Rgb(102, 217, 239),  // cyan
                right_paddle: Color::Rgb(166, 226, 46),  // green
                ball: Color::Rgb(230, 219, 116),         // yellow
                bounding_box: Color::Rgb(150, 150, 150),
            },
            GameTheme::Solarized => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(38, 139, 210),
                text: Color::Rgb(147, 161, 161),
                net: Color::Rgb(88, 110, 117),
                left_paddle: Color::Rgb(133, 153, 0),
                right_paddle: Color::Rgb(42, 161, 152),
                ball: Color::Rgb(181, 137, 0),
                bounding_box: Color::Rgb(101, 123, 131),
            },
            GameTheme::Dracula => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(255, 121, 198),
                text: Color::Rgb(248, 248, 242),
                net: Color::Rgb(98, 114, 164),
                left_paddle: Color::Rgb(80, 250, 123),
                right_paddle: Color::Rgb(189, 147, 249),
                ball: Color::Rgb(255, 184, 108),
                bounding_box: Color::Rgb(68, 71, 90),
            },
            GameTheme::GruvboxDark => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(250, 189, 47),
                text: Color::Rgb(235, 219, 178),
                net: Color::Rgb(146, 131, 116),
                left_paddle: Color::Rgb(131, 165, 152),
                right_paddle: Color::Rgb(184, 187, 38),
                ball: Color::Rgb(254, 128, 25),
                bounding_box: Color::Rgb(102, 92, 84),
            },
            GameTheme::Nord => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(136, 192, 208),
                text: Color::Rgb(216, 222, 233),
                net: Color::Rgb(76, 86, 106),
                left_paddle: Color::Rgb(94, 129, 172),
                right_paddle: Color::Rgb(143, 188, 187),
                ball: Color::Rgb(235, 203, 139),
                bounding_box: Color::Rgb(67, 76, 94),
            },
            GameTheme::OneDark => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(198, 120, 221),
                text: Color::Rgb(171, 178, 191),
                net: Color::Rgb(92, 99, 112),
                left_paddle: Color::Rgb(97, 175, 239),
                right_paddle: Color::Rgb(152, 195, 121),
                ball: Color::Rgb(229, 192, 123),
                bounding_box: Color::Rgb(75, 82, 99),
            },
            GameTheme::HighContrast => ThemeColors {
                background: Color::Black,
                border: Color::White,
                text: Color::White,
                net: Color::White,
                left_paddle: Color::Rgb(0, 255, 255),
                right_paddle: Color::Rgb(255, 0, 255),
                ball: Color::Rgb(255, 255, 0),
                bounding_box: Color::Rgb(128, 128, 128),
            },
        }
    }
}

impl fmt::Display for GameTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameTheme {
    type Err = PongError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        GameTheme::ALL
            .into_iter()
            .find(|theme| theme.name() == wanted)
            .ok_or_else(|| PongError::InvalidConfig(format!("unknown theme '{s}'")))
    }
}
