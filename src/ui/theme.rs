use std::fs;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub bg: String,
    pub fg: String,
    pub correct: String,
    pub incorrect: String,
    pub diacritic: String,
    pub pending: String,
    pub cursor: String,
    pub revealed: String,
    pub accent: String,
    pub border: String,
    pub selected: String,
    pub matched: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            correct: "#a6e3a1".to_string(),
            incorrect: "#f38ba8".to_string(),
            diacritic: "#fab387".to_string(),
            pending: "#585b70".to_string(),
            cursor: "#f5e0dc".to_string(),
            revealed: "#f9e2af".to_string(),
            accent: "#89b4fa".to_string(),
            border: "#45475a".to_string(),
            selected: "#cba6f7".to_string(),
            matched: "#6c7086".to_string(),
        }
    }
}

impl Theme {
    /// `<config_dir>/lingodrill/theme.toml` if present and parseable,
    /// otherwise the built-in palette.
    pub fn load() -> Self {
        dirs::config_dir()
            .map(|dir| dir.join("lingodrill").join("theme.toml"))
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 && hex.is_ascii() {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn correct(&self) -> Color { Self::parse_color(&self.correct) }
    pub fn incorrect(&self) -> Color { Self::parse_color(&self.incorrect) }
    pub fn diacritic(&self) -> Color { Self::parse_color(&self.diacritic) }
    pub fn pending(&self) -> Color { Self::parse_color(&self.pending) }
    pub fn cursor(&self) -> Color { Self::parse_color(&self.cursor) }
    pub fn revealed(&self) -> Color { Self::parse_color(&self.revealed) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn selected(&self) -> Color { Self::parse_color(&self.selected) }
    pub fn matched(&self) -> Color { Self::parse_color(&self.matched) }
}
