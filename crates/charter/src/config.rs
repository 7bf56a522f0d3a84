//! UI configuration.
//!
//! Every tunable the policy screens and the in-game menu read lives in
//! [`UiConfig`]. Missing keys fall back to their defaults, so a config file
//! only needs to name what it changes:
//!
//! ```
//! use charter::config::UiConfig;
//!
//! let config = UiConfig::from_toml_str("font_pts = 16\n[availability]\nlocked = true\n").unwrap();
//! assert_eq!(config.font_pts, 16);
//! assert!(config.availability.locked);
//! assert_eq!(config.slot_width, 120);
//! ```

use std::path::Path;
use std::time::Duration;

use charter_core::Size;
use charter_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which availability filters the policy palette starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityDefaults {
    pub adopted: bool,
    pub adoptable: bool,
    pub unaffordable: bool,
    pub restricted: bool,
    pub locked: bool,
}

impl Default for AvailabilityDefaults {
    fn default() -> Self {
        Self {
            adopted: true,
            adoptable: true,
            unaffordable: false,
            restricted: false,
            locked: false,
        }
    }
}

/// Sizing of the in-game menu.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub min_button_width: i32,
    pub min_button_height: i32,
    pub horizontal_margin: i32,
    pub vertical_margin: i32,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            min_button_width: 160,
            min_button_height: 40,
            horizontal_margin: 40,
            vertical_margin: 40,
        }
    }
}

/// Configuration for the widget screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Base font size in points.
    pub font_pts: i32,
    /// Width reserved for a list box's scroll bar.
    pub scroll_width: i32,
    /// Policy slot width at zoom 1.
    pub slot_width: i32,
    /// Policy slot height at zoom 1.
    pub slot_height: i32,
    /// Gap between palette cells.
    pub pad: i32,
    /// Space kept clear at the bottom of framed windows.
    pub inner_border_angle_offset: i32,
    /// Delay before a tooltip opens, in milliseconds.
    pub tooltip_delay_ms: u32,
    /// Width of one policy-size button.
    pub policy_size_button_width: i32,
    /// Zoom factor for each policy-size button, in button order.
    pub zoom_factors: Vec<f64>,
    pub availability: AvailabilityDefaults,
    pub menu: MenuConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            font_pts: 12,
            scroll_width: 14,
            slot_width: 120,
            slot_height: 180,
            pad: 3,
            inner_border_angle_offset: 11,
            tooltip_delay_ms: 100,
            policy_size_button_width: 32,
            zoom_factors: vec![1.0, 0.75, 0.5],
            availability: AvailabilityDefaults::default(),
            menu: MenuConfig::default(),
        }
    }
}

impl UiConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "loaded ui config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the layouts cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.font_pts <= 0 {
            return Err(ConfigError::Invalid {
                field: "font_pts",
                reason: format!("must be positive, got {}", self.font_pts),
            });
        }
        if self.slot_width <= 0 || self.slot_height <= 0 {
            return Err(ConfigError::Invalid {
                field: "slot_width/slot_height",
                reason: format!("must be positive, got {}x{}", self.slot_width, self.slot_height),
            });
        }
        if self.zoom_factors.is_empty()
            || self.zoom_factors.iter().any(|z| z.is_nan() || *z <= 0.0)
        {
            return Err(ConfigError::Invalid {
                field: "zoom_factors",
                reason: "need at least one positive factor".to_string(),
            });
        }
        Ok(())
    }

    /// Policy slot size at zoom 1.
    pub fn slot_size(&self) -> Size {
        Size::new(self.slot_width, self.slot_height)
    }

    /// How long the pointer rests on a policy before its details show.
    pub fn tooltip_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.tooltip_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        assert_eq!(UiConfig::from_toml_str("").unwrap(), UiConfig::default());
    }

    #[test]
    fn test_partial_tables_keep_other_defaults() {
        let config = UiConfig::from_toml_str(
            r#"
            zoom_factors = [1.0, 0.5]

            [menu]
            min_button_width = 200
            "#,
        )
        .unwrap();
        assert_eq!(config.zoom_factors, vec![1.0, 0.5]);
        assert_eq!(config.menu.min_button_width, 200);
        assert_eq!(config.menu.min_button_height, 40);
        assert!(config.availability.adopted);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            UiConfig::from_toml_str("font_pts = 0"),
            Err(ConfigError::Invalid { field: "font_pts", .. })
        ));
        assert!(matches!(
            UiConfig::from_toml_str("zoom_factors = []"),
            Err(ConfigError::Invalid { field: "zoom_factors", .. })
        ));
        assert!(matches!(
            UiConfig::from_toml_str("font_pts = \"big\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_serialized_config_parses_back() {
        let mut config = UiConfig::default();
        config.scroll_width = 20;
        config.availability.restricted = true;
        let text = config.to_toml_string().unwrap();
        assert_eq!(UiConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_tooltip_delay_from_millis() {
        let config = UiConfig::from_toml_str("tooltip_delay_ms = 750").unwrap();
        assert_eq!(config.tooltip_delay(), Duration::from_millis(750));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = UiConfig::load("/nonexistent/charter.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/charter.toml"));
    }
}
