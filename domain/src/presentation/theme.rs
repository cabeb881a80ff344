//! Slide color themes.

use serde::{Deserialize, Serialize};

/// Hex RGB colors (no leading `#`) used when rendering a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub title: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
    pub gradient_start: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Modern,
    Minimal,
    Business,
}

impl Theme {
    /// Parses a theme name case-insensitively. Unknown names fall back to `Modern`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "minimal" => Theme::Minimal,
            "business" => Theme::Business,
            _ => Theme::Modern,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Modern => Palette {
                background: "FFFFFF",
                title: "1A237E",
                text: "424242",
                accent: "3F51B5",
                gradient_start: "3F51B5",
            },
            Theme::Minimal => Palette {
                background: "FAFAFA",
                title: "212121",
                text: "616161",
                accent: "4A90E2",
                gradient_start: "F0F0F0",
            },
            Theme::Business => Palette {
                background: "FFFFFF",
                title: "0D47A1",
                text: "37474F",
                accent: "01579B",
                gradient_start: "1565C0",
            },
        }
    }
}
