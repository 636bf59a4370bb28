// ABOUTME: Tile grid configuration handling.
// ABOUTME: Loads and saves cell geometry and interaction settings from TOML files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::TileColors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Height of one cell in pixels
    pub cell_height: u32,

    /// Width of one cell in pixels
    pub cell_width: u32,

    /// Cells never get shorter than this, even when the container shrinks
    pub min_cell_height: u32,

    /// Cells never get narrower than this, even when the container shrinks
    pub min_cell_width: u32,

    /// Vertical gap between rows in pixels
    pub row_spacing: u32,

    /// Horizontal gap between columns in pixels
    pub column_spacing: u32,

    /// Allow tiles to be dragged out of and dropped onto this grid
    pub drag_and_drop: bool,

    /// Allow tiles to be resized by dragging their edges
    pub resizable: bool,

    /// Width of the edge band (pixels) that grabs a resize instead of a drag
    pub resize_margin: u32,

    /// Feedback colors
    pub colors: TileColors,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            cell_height: 128,
            cell_width: 128,
            min_cell_height: 128,
            min_cell_width: 128,
            row_spacing: 5,
            column_spacing: 5,
            drag_and_drop: true,
            resizable: true,
            resize_margin: 5,
            colors: TileColors::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}

impl TileConfig {
    /// Config with the given cell size; minimums follow the cell size
    pub fn with_cell_size(cell_height: u32, cell_width: u32) -> Self {
        Self {
            cell_height,
            cell_width,
            min_cell_height: cell_height,
            min_cell_width: cell_width,
            ..Self::default()
        }
    }

    /// Same config with the given spacing on both axes
    pub fn with_spacing(self, row_spacing: u32, column_spacing: u32) -> Self {
        Self {
            row_spacing,
            column_spacing,
            ..self
        }
    }

    /// Check the geometry is usable by a grid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_cell_height == 0 || self.min_cell_width == 0 {
            return Err(ConfigError::Invalid("minimum cell size must be positive"));
        }
        if self.cell_height < self.min_cell_height {
            return Err(ConfigError::Invalid("cell_height is below min_cell_height"));
        }
        if self.cell_width < self.min_cell_width {
            return Err(ConfigError::Invalid("cell_width is below min_cell_width"));
        }
        Ok(())
    }

    /// Get the default config file path (~/.config/tile-grid/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tile-grid").join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: TileConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to default path
    pub fn save_to_default(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::ReadError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn test_default_is_valid() {
        assert!(TileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_cell_below_minimum_is_rejected() {
        let config = TileConfig {
            cell_height: 10,
            min_cell_height: 20,
            ..TileConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = TileConfig::with_cell_size(96, 128).with_spacing(4, 6);
        config.drag_and_drop = false;
        config.colors.resize = Color::from_rgb8(10, 20, 30);
        config.save(&path).unwrap();

        let loaded = TileConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "resizable = false\nresize_margin = 8\n").unwrap();

        let loaded = TileConfig::load(&path).unwrap();
        assert!(!loaded.resizable);
        assert_eq!(loaded.resize_margin, 8);
        assert_eq!(loaded.cell_height, TileConfig::default().cell_height);
        assert_eq!(loaded.colors, TileColors::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "cell_width = 1\nmin_cell_width = 50\n").unwrap();

        assert!(matches!(TileConfig::load(&path), Err(ConfigError::Invalid(_))));
    }
}
