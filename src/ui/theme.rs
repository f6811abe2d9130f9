use std::fs;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::params::HexColor;

/// Colors for the settings screen chrome. The overlay never reads these;
/// its colors come only from the broadcast parameter groups.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub bg: HexColor,
    pub fg: HexColor,
    pub text_pending: HexColor,
    pub focused_key: HexColor,
    pub accent: HexColor,
    pub border: HexColor,
    pub header_bg: HexColor,
    pub header_fg: HexColor,
    pub error: HexColor,
}

impl Theme {
    /// Look for `<config_dir>/keyway/themes/<name>.toml`.
    pub fn load(name: &str) -> Option<Self> {
        let config_dir = dirs::config_dir()?;
        let path = config_dir.join("keyway").join("themes").join(format!("{name}.toml"));
        let content = fs::read_to_string(&path).ok()?;
        match toml::from_str::<Theme>(&content) {
            Ok(theme) => Some(theme),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable theme");
                None
            }
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "catppuccin-mocha".to_string(),
            colors: ThemeColors::default(),
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: HexColor::rgb(0x1e, 0x1e, 0x2e),
            fg: HexColor::rgb(0xcd, 0xd6, 0xf4),
            text_pending: HexColor::rgb(0x58, 0x5b, 0x70),
            focused_key: HexColor::rgb(0xf9, 0xe2, 0xaf),
            accent: HexColor::rgb(0x89, 0xb4, 0xfa),
            border: HexColor::rgb(0x45, 0x47, 0x5a),
            header_bg: HexColor::rgb(0x31, 0x32, 0x44),
            header_fg: HexColor::rgb(0xcd, 0xd6, 0xf4),
            error: HexColor::rgb(0xf3, 0x8b, 0xa8),
        }
    }
}

impl ThemeColors {
    pub fn bg(&self) -> Color { self.bg.to_color() }
    pub fn fg(&self) -> Color { self.fg.to_color() }
    pub fn text_pending(&self) -> Color { self.text_pending.to_color() }
    pub fn focused_key(&self) -> Color { self.focused_key.to_color() }
    pub fn accent(&self) -> Color { self.accent.to_color() }
    pub fn border(&self) -> Color { self.border.to_color() }
    pub fn header_bg(&self) -> Color { self.header_bg.to_color() }
    pub fn header_fg(&self) -> Color { self.header_fg.to_color() }
    pub fn error(&self) -> Color { self.error.to_color() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_theme_falls_back_per_color() {
        let toml_str = r##"
name = "mono"
[colors]
accent = "#ffffff"
"##;
        let theme: Theme = toml::from_str(toml_str).unwrap();
        assert_eq!(theme.name, "mono");
        assert_eq!(theme.colors.accent, HexColor::rgb(255, 255, 255));
        assert_eq!(theme.colors.bg, ThemeColors::default().bg);
    }

    #[test]
    fn test_bad_color_rejected() {
        let toml_str = r##"
name = "broken"
[colors]
bg = "blue"
"##;
        assert!(toml::from_str::<Theme>(toml_str).is_err());
    }
}
