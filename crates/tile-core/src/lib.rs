// ABOUTME: Shared types and configuration for tile-grid layouts.
// ABOUTME: Defines colors, tile highlight palette, and config file handling.

pub mod color;
pub mod config;
pub mod highlight;

pub use color::Color;
pub use config::{ConfigError, TileConfig};
pub use highlight::{Highlight, TileColors};
