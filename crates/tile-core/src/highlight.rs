// ABOUTME: Visual feedback states for grid tiles.
// ABOUTME: Maps each highlight state to the color a renderer should paint.

use serde::{Deserialize, Serialize};

use crate::Color;

/// Feedback state of a single tile. Renderers read this; the layout only stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    /// Nothing in progress
    #[default]
    Idle,
    /// A resize drag is active on this grid
    Resize,
    /// A tile is being dragged and this grid may receive it
    DragAndDrop,
    /// Area that passed the last emptiness check
    EmptyCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileColors {
    /// Tiles at rest
    pub idle: Color,

    /// Empty tiles while a resize is in progress
    pub resize: Color,

    /// Empty tiles of grids that accept the tile being dragged
    pub drag_and_drop: Color,

    /// Empty tiles covered by a successful emptiness check
    pub empty_check: Color,
}

impl Default for TileColors {
    fn default() -> Self {
        Self {
            idle: Color::IDLE,
            resize: Color::ACTIVE,
            drag_and_drop: Color::ACTIVE,
            empty_check: Color::CHECKED,
        }
    }
}

impl TileColors {
    pub fn color_for(&self, highlight: Highlight) -> Color {
        match highlight {
            Highlight::Idle => self.idle,
            Highlight::Resize => self.resize,
            Highlight::DragAndDrop => self.drag_and_drop,
            Highlight::EmptyCheck => self.empty_check,
        }
    }
}
