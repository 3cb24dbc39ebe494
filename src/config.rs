use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};
use ratatui::style::Color;

use crate::client::SEARCH_ENDPOINT;

const DEFAULT_PRIMARY: Color = Color::Rgb(0x55, 0x6c, 0xd6);
const DEFAULT_SECONDARY: Color = Color::Rgb(0xff, 0xad, 0x33);
const DEFAULT_TEXT_PRIMARY: Color = Color::Rgb(0x2e, 0x2e, 0x2e);
const DEFAULT_TEXT_SECONDARY: Color = Color::Rgb(0x57, 0x57, 0x57);
const DEFAULT_BOT_BUBBLE: Color = Color::White;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Overrides the built-in search endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Colour overrides as written in the config file (names or `#rrggbb`)
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ThemeConfig {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub secondary: Option<String>,
    #[serde(default)]
    pub text_primary: Option<String>,
    #[serde(default)]
    pub text_secondary: Option<String>,
    #[serde(default)]
    pub bot_bubble: Option<String>,
}

/// Resolved colours handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Borders, title and the enabled search button
    pub primary: Color,
    /// User bubbles
    pub secondary: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub bot_bubble: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY,
            secondary: DEFAULT_SECONDARY,
            text_primary: DEFAULT_TEXT_PRIMARY,
            text_secondary: DEFAULT_TEXT_SECONDARY,
            bot_bubble: DEFAULT_BOT_BUBBLE,
        }
    }
}

impl ThemeConfig {
    pub fn resolve(&self) -> Theme {
        let defaults = Theme::default();
        Theme {
            primary: parse_color(self.primary.as_deref(), defaults.primary),
            secondary: parse_color(self.secondary.as_deref(), defaults.secondary),
            text_primary: parse_color(self.text_primary.as_deref(), defaults.text_primary),
            text_secondary: parse_color(self.text_secondary.as_deref(), defaults.text_secondary),
            bot_bubble: parse_color(self.bot_bubble.as_deref(), defaults.bot_bubble),
        }
    }
}

fn parse_color(value: Option<&str>, fallback: Color) -> Color {
    match value {
        None => fallback,
        Some(raw) => raw.trim().parse::<Color>().unwrap_or_else(|_| {
            tracing::warn!(color = raw, "ignoring unrecognised theme colour");
            fallback
        }),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the user's config directory, falling back to defaults when
    /// the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(SEARCH_ENDPOINT)
    }

    pub fn theme(&self) -> Theme {
        self.theme.resolve()
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("gtsearch").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.endpoint(), SEARCH_ENDPOINT);
        assert_eq!(config.theme(), Theme::default());
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "endpoint": "http://localhost:9000/search", "theme": { "secondary": "magenta" } }"#,
        )
        .unwrap();

        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded.endpoint(), "http://localhost:9000/search");
        assert_eq!(loaded.theme().secondary, Color::Magenta);
        assert_eq!(loaded.theme().primary, DEFAULT_PRIMARY);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r##"{ "theme": { "primary": "#102030" } }"##).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint, None);
        assert_eq!(config.theme().primary, Color::Rgb(0x10, 0x20, 0x30));
        assert_eq!(config.theme().secondary, DEFAULT_SECONDARY);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_bad_colour_falls_back() {
        let theme = ThemeConfig {
            primary: Some("not-a-colour".to_string()),
            ..ThemeConfig::default()
        };
        assert_eq!(theme.resolve().primary, DEFAULT_PRIMARY);
    }
}
