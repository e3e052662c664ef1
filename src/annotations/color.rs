//! Highlight color allocation
//!
//! Hues step by the golden angle, which keeps consecutive picks far apart on
//! the color wheel no matter how many words are selected. Lightness and
//! saturation cycle through five values for extra separation between picks
//! that land near each other in hue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Golden angle in degrees
pub const GOLDEN_ANGLE: f64 = 137.508;

const LIGHTNESS_CYCLE: [u8; 5] = [86, 80, 74, 90, 78];
const SATURATION_CYCLE: [u8; 5] = [88, 84, 90, 82, 86];

/// Light yellows vanish on a light background
const YELLOW_BAND: std::ops::RangeInclusive<f64> = 45.0..=85.0;
const YELLOW_MAX_LIGHTNESS: u8 = 70;
const YELLOW_LIGHTNESS: u8 = 62;
const YELLOW_SATURATION: u8 = 92;

/// An HSL color
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct HighlightColor {
    /// Degrees in `[0, 360)`
    pub hue: f64,
    /// Percent
    pub saturation: u8,
    /// Percent
    pub lightness: u8,
}

impl HighlightColor {
    /// CSS form, e.g. `hsl(137.5, 84%, 80%)`
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({:.1}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

/// Color for the n-th selection (pure)
pub fn color_for(sequence_index: u32) -> HighlightColor {
    let hue = (f64::from(sequence_index) * GOLDEN_ANGLE) % 360.0;
    let slot = sequence_index as usize % LIGHTNESS_CYCLE.len();
    let mut lightness = LIGHTNESS_CYCLE[slot];
    let mut saturation = SATURATION_CYCLE[slot];

    if YELLOW_BAND.contains(&hue) && lightness > YELLOW_MAX_LIGHTNESS {
        lightness = YELLOW_LIGHTNESS;
        saturation = YELLOW_SATURATION;
    }

    HighlightColor {
        hue,
        saturation,
        lightness,
    }
}
