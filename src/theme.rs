//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::shapes::BlockColor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Theme file keys for the block colours, in `BlockColor::index` order.
const BLOCK_KEYS: [&str; 7] = [
    "block_cyan",
    "block_yellow",
    "block_purple",
    "block_orange",
    "block_blue",
    "block_green",
    "block_red",
];

/// Block colours and UI colours.
#[derive(Debug, Clone)]
pub struct Theme {
    /// One colour per `BlockColor`, indexed by `BlockColor::index`.
    pub blocks: [Color; 7],
    /// Board background.
    pub bg: Color,
    /// Grid dots / borders.
    pub div_line: Color,
    /// Text (score, lines).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (key hints).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// One Dark base with the classic tetromino hues.
    pub fn onedark_default() -> Self {
        Self {
            blocks: [
                Color::Rgb(0x56, 0xB6, 0xC2), // cyan
                Color::Rgb(0xE5, 0xC0, 0x7B), // yellow
                Color::Rgb(0xC6, 0x78, 0xDD), // purple
                Color::Rgb(0xD1, 0x9A, 0x66), // orange
                Color::Rgb(0x61, 0xAF, 0xEF), // blue
                Color::Rgb(0x98, 0xC3, 0x79), // green
                Color::Rgb(0xE0, 0x6C, 0x75), // red
            ],
            bg: Color::Rgb(0x28, 0x2C, 0x34),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load a btop-style theme file. Missing path or no path gives the default;
    /// keys absent from the file keep their default colour.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => {
                let s = std::fs::read_to_string(p)?;
                Self::from_map(&parse_theme_file(&s))?
            }
            _ => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override block colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.blocks = [
                    Color::Rgb(0x00, 0xFF, 0xFF),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0xFF, 0x88, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0x00),
                ];
            }
            crate::Palette::Colorblind => {
                // Okabe-Ito hues; no red/green pair relies on hue alone.
                self.blocks = [
                    Color::Rgb(0x56, 0xB4, 0xE9),
                    Color::Rgb(0xF0, 0xE4, 0x42),
                    Color::Rgb(0xCC, 0x79, 0xA7),
                    Color::Rgb(0xE6, 0x9F, 0x00),
                    Color::Rgb(0x00, 0x72, 0xB2),
                    Color::Rgb(0x00, 0x9E, 0x73),
                    Color::Rgb(0xD5, 0x5E, 0x00),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let mut theme = Self::onedark_default();
        for (slot, key) in theme.blocks.iter_mut().zip(BLOCK_KEYS) {
            if let Some(v) = map.get(key) {
                *slot = parse_hex(v)?;
            }
        }
        for (key, slot) in [
            ("main_bg", &mut theme.bg),
            ("div_line", &mut theme.div_line),
            ("main_fg", &mut theme.main_fg),
            ("title", &mut theme.title),
            ("inactive_fg", &mut theme.inactive_fg),
        ] {
            if let Some(v) = map.get(key) {
                *slot = parse_hex(v)?;
            }
        }
        Ok(theme)
    }

    #[inline]
    pub fn block_color(&self, color: BlockColor) -> Color {
        self.blocks[color.index()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(rest) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some((key, value)) = rest.split_once(']') else {
            continue;
        };
        let Some((_, value)) = value.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !value.is_empty() {
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    match hex.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}
