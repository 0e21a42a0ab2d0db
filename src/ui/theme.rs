use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub stave: String,
    pub note: String,
    pub correct: String,
    pub incorrect: String,
    pub accent: String,
    pub accent_dim: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub chart_accuracy: String,
    pub chart_response: String,
    pub error: String,
    pub warning: String,
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        // Try user themes dir
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("clefdr")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path) {
                if let Ok(theme) = toml::from_str::<Theme>(&content) {
                    return Some(theme);
                }
            }
        }

        // Try bundled themes
        let filename = format!("{name}.toml");
        if let Some(file) = ThemeAssets::get(&filename) {
            if let Ok(content) = std::str::from_utf8(file.data.as_ref()) {
                if let Ok(theme) = toml::from_str::<Theme>(content) {
                    return Some(theme);
                }
            }
        }

        None
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }

    pub fn is_dark(&self) -> bool {
        self.name == "dark"
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("light").unwrap_or_else(|| Self {
            name: "light".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#faf8f5".to_string(),
            fg: "#2c3e50".to_string(),
            stave: "#2c3e50".to_string(),
            note: "#1a252f".to_string(),
            correct: "#27ae60".to_string(),
            incorrect: "#e74c3c".to_string(),
            accent: "#8e44ad".to_string(),
            accent_dim: "#b8a9c9".to_string(),
            border: "#d5cdc4".to_string(),
            border_focused: "#8e44ad".to_string(),
            header_bg: "#8e44ad".to_string(),
            header_fg: "#faf8f5".to_string(),
            bar_filled: "#8e44ad".to_string(),
            bar_empty: "#e8e2da".to_string(),
            chart_accuracy: "#27ae60".to_string(),
            chart_response: "#2980b9".to_string(),
            error: "#e74c3c".to_string(),
            warning: "#f39c12".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
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
    pub fn stave(&self) -> Color { Self::parse_color(&self.stave) }
    pub fn note(&self) -> Color { Self::parse_color(&self.note) }
    pub fn correct(&self) -> Color { Self::parse_color(&self.correct) }
    pub fn incorrect(&self) -> Color { Self::parse_color(&self.incorrect) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn accent_dim(&self) -> Color { Self::parse_color(&self.accent_dim) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn chart_accuracy(&self) -> Color { Self::parse_color(&self.chart_accuracy) }
    pub fn chart_response(&self) -> Color { Self::parse_color(&self.chart_response) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_themes_parse() {
        for name in ["light", "dark"] {
            let theme = Theme::load(name).unwrap_or_else(|| panic!("{name} theme missing"));
            assert_eq!(theme.name, name);
        }
    }

    #[test]
    fn test_available_themes_lists_both_variants() {
        let themes = Theme::available_themes();
        assert!(themes.iter().any(|t| t == "light"));
        assert!(themes.iter().any(|t| t == "dark"));
    }

    #[test]
    fn test_parse_color_valid_hex() {
        assert_eq!(
            ThemeColors::parse_color("#8e44ad"),
            Color::Rgb(0x8e, 0x44, 0xad)
        );
    }

    #[test]
    fn test_parse_color_invalid_falls_back() {
        assert_eq!(ThemeColors::parse_color("purple"), Color::White);
        assert_eq!(ThemeColors::parse_color("#12"), Color::White);
    }
}
