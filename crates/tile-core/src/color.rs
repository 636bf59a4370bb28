// ABOUTME: Color representation and conversion utilities.
// ABOUTME: Supports RGB and the preset greys used for tile feedback.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build an opaque color from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Convert back to 8-bit channels, rounding to nearest
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }

    /// Light grey used for tiles at rest (240, 240, 240)
    pub const IDLE: Self = Self::rgb(0.941, 0.941, 0.941);

    /// Grey used while an interaction is in progress (211, 211, 211)
    pub const ACTIVE: Self = Self::rgb(0.827, 0.827, 0.827);

    /// Dark grey marking an area that passed an emptiness check (150, 150, 150)
    pub const CHECKED: Self = Self::rgb(0.588, 0.588, 0.588);
}

impl Default for Color {
    fn default() -> Self {
        Self::IDLE
    }
}
