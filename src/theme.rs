//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use crate::card::{Card, Category, RibbonColor, Season};
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Season, highlight and UI colours.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Card frame colours: spring, summer, autumn, winter.
    pub seasons: [Color; 4],
    /// Glyph colour of Light cards.
    pub light: Color,
    pub red_ribbon: Color,
    pub blue_ribbon: Color,
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, combo).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text and empty cells.
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
    /// One Dark hex values.
    pub fn onedark_default() -> Self {
        Self {
            seasons: [
                Color::Rgb(0xC6, 0x78, 0xDD), // net_box / magenta
                Color::Rgb(0x98, 0xC3, 0x79), // mem_box / green
                Color::Rgb(0xE0, 0x6C, 0x75), // cpu_end / red
                Color::Rgb(0x61, 0xAF, 0xEF), // cpu_box / blue
            ],
            light: Color::Rgb(0xE5, 0xC0, 0x7B),
            red_ribbon: Color::Rgb(0xE0, 0x6C, 0x75),
            blue_ribbon: Color::Rgb(0x56, 0xB6, 0xC2),
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file does not exist;
    /// unknown keys and bad hex values keep their defaults.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => {
                let s = std::fs::read_to_string(p)?;
                Self::from_map(&parse_theme_file(&s))
            }
            _ => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.seasons = [
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x88, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                ];
                self.light = Color::Rgb(0xFF, 0xFF, 0x00);
                self.red_ribbon = Color::Rgb(0xFF, 0x00, 0x00);
                self.blue_ribbon = Color::Rgb(0x00, 0xFF, 0xFF);
                self.bg = Color::Black;
                self.main_fg = Color::White;
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::onedark_default();
        Self {
            seasons: [
                get("net_box").unwrap_or(d.seasons[0]),
                get("mem_box")
                    .or_else(|| get("cpu_start"))
                    .unwrap_or(d.seasons[1]),
                get("cpu_end")
                    .or_else(|| get("temp_end"))
                    .unwrap_or(d.seasons[2]),
                get("cpu_box").unwrap_or(d.seasons[3]),
            ],
            light: get("title").or_else(|| get("cpu_mid")).unwrap_or(d.light),
            red_ribbon: get("temp_end").unwrap_or(d.red_ribbon),
            blue_ribbon: get("hi_fg")
                .or_else(|| get("proc_misc"))
                .unwrap_or(d.blue_ribbon),
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    #[inline]
    pub fn season_color(&self, season: Season) -> Color {
        match season {
            Season::Spring => self.seasons[0],
            Season::Summer => self.seasons[1],
            Season::Autumn => self.seasons[2],
            Season::Winter => self.seasons[3],
        }
    }

    /// Colour of the category glyph: lights and coloured ribbons stand out.
    pub fn glyph_color(&self, card: Card) -> Color {
        match (card.category(), card.ribbon_color()) {
            (Category::Light, _) => self.light,
            (_, RibbonColor::Red) => self.red_ribbon,
            (_, RibbonColor::Blue) => self.blue_ribbon,
            _ => self.main_fg,
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    if !s.is_ascii() {
        return Err(invalid());
    }
    let (r, g, b) = match s.len() {
        6 => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}
