//! Quadrant appearance and theme settings

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::list::parse_hex_color;
use crate::quadrant::Quadrant;

/// Color and label shown for one quadrant
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuadrantStyle {
    pub color: String,
    pub label: String,
}

impl QuadrantStyle {
    pub fn new(color: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            label: label.into(),
        }
    }

    /// Factory default for a quadrant
    pub fn default_for(quadrant: Quadrant) -> Self {
        match quadrant {
            Quadrant::Do => Self::new("#AEE7B1", "Do This"),
            Quadrant::Schedule => Self::new("#ABBEE1", "Schedule This"),
            Quadrant::Delegate => Self::new("#BCB5F0", "Assign This"),
            Quadrant::Eliminate => Self::new("#F5D26C", "Consider This"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dark => f.write_str("dark"),
            Self::Light => f.write_str("light"),
        }
    }
}

/// User settings persisted alongside the task graph
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub q1: QuadrantStyle,
    pub q2: QuadrantStyle,
    pub q3: QuadrantStyle,
    pub q4: QuadrantStyle,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            q1: QuadrantStyle::default_for(Quadrant::Do),
            q2: QuadrantStyle::default_for(Quadrant::Schedule),
            q3: QuadrantStyle::default_for(Quadrant::Delegate),
            q4: QuadrantStyle::default_for(Quadrant::Eliminate),
            theme: Theme::default(),
        }
    }
}

impl Settings {
    pub fn style(&self, quadrant: Quadrant) -> &QuadrantStyle {
        match quadrant {
            Quadrant::Do => &self.q1,
            Quadrant::Schedule => &self.q2,
            Quadrant::Delegate => &self.q3,
            Quadrant::Eliminate => &self.q4,
        }
    }

    fn style_mut(&mut self, quadrant: Quadrant) -> &mut QuadrantStyle {
        match quadrant {
            Quadrant::Do => &mut self.q1,
            Quadrant::Schedule => &mut self.q2,
            Quadrant::Delegate => &mut self.q3,
            Quadrant::Eliminate => &mut self.q4,
        }
    }

    /// Replace a quadrant's style after checking the color
    pub fn set_style(&mut self, quadrant: Quadrant, style: QuadrantStyle) -> Result<()> {
        parse_hex_color(&style.color)?;
        if style.label.trim().is_empty() {
            return Err(CoreError::validation("label", "Quadrant label must not be empty"));
        }
        *self.style_mut(quadrant) = style;
        Ok(())
    }

    /// Restore quadrant defaults, keeping the current theme
    pub fn reset(&mut self) {
        *self = Self {
            theme: self.theme,
            ..Self::default()
        };
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.style(Quadrant::Do).label, "Do This");
        assert_eq!(settings.style(Quadrant::Eliminate).color, "#F5D26C");
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn test_reset_preserves_theme() {
        let mut settings = Settings::default();
        settings
            .set_style(Quadrant::Schedule, QuadrantStyle::new("#000000", "Later"))
            .unwrap();
        settings.toggle_theme();

        settings.reset();

        assert_eq!(settings.style(Quadrant::Schedule).label, "Schedule This");
        assert_eq!(settings.theme, Theme::Light);
    }

    #[test]
    fn test_set_style_validates() {
        let mut settings = Settings::default();
        assert!(settings
            .set_style(Quadrant::Do, QuadrantStyle::new("green", "Now"))
            .is_err());
        assert!(settings
            .set_style(Quadrant::Do, QuadrantStyle::new("#00FF00", " "))
            .is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings =
            serde_json::from_str(r##"{"q2": {"color": "#123456", "label": "Plan"}, "theme": "light"}"##)
                .unwrap();
        assert_eq!(settings.q2.label, "Plan");
        assert_eq!(settings.q1, QuadrantStyle::default_for(Quadrant::Do));
        assert_eq!(settings.theme, Theme::Light);
    }
}
