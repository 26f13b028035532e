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
    pub text_dim: String,
    pub accent: String,
    pub accent_dim: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub cell_idle: String,
    pub cell_lit: String,
    pub cursor: String,
    pub go: String,
    pub stop: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        // User themes shadow bundled ones
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("proeval")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path)
                && let Ok(theme) = toml::from_str::<Theme>(&content)
            {
                return Some(theme);
            }
        }

        let filename = format!("{name}.toml");
        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("neon-slate").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#0f172a".to_string(),
            fg: "#e2e8f0".to_string(),
            text_dim: "#64748b".to_string(),
            accent: "#22d3ee".to_string(),
            accent_dim: "#155e75".to_string(),
            border: "#334155".to_string(),
            border_focused: "#06b6d4".to_string(),
            header_bg: "#1e293b".to_string(),
            header_fg: "#e2e8f0".to_string(),
            bar_filled: "#06b6d4".to_string(),
            bar_empty: "#1e293b".to_string(),
            cell_idle: "#334155".to_string(),
            cell_lit: "#22d3ee".to_string(),
            cursor: "#f8fafc".to_string(),
            go: "#22c55e".to_string(),
            stop: "#dc2626".to_string(),
            error: "#ef4444".to_string(),
            warning: "#eab308".to_string(),
            success: "#4ade80".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn text_dim(&self) -> Color { Self::parse_color(&self.text_dim) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn accent_dim(&self) -> Color { Self::parse_color(&self.accent_dim) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn cell_idle(&self) -> Color { Self::parse_color(&self.cell_idle) }
    pub fn cell_lit(&self) -> Color { Self::parse_color(&self.cell_lit) }
    pub fn cursor(&self) -> Color { Self::parse_color(&self.cursor) }
    pub fn go(&self) -> Color { Self::parse_color(&self.go) }
    pub fn stop(&self) -> Color { Self::parse_color(&self.stop) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_themes_parse() {
        let names = Theme::available_themes();
        assert!(names.contains(&"neon-slate".to_string()));
        for name in names {
            assert!(Theme::load(&name).is_some(), "theme {name} failed to parse");
        }
    }

    #[test]
    fn parse_color_handles_hex_and_garbage() {
        assert_eq!(ThemeColors::parse_color("#22d3ee"), Color::Rgb(0x22, 0xd3, 0xee));
        assert_eq!(ThemeColors::parse_color("nope"), Color::White);
    }
}
