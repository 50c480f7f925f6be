//! Fixed catalogs: colors, material presets, positions and scales
//!
//! Everything here is constant data plus pure lookups.

use crate::error::ParseEnumError;
use crate::types::{PrimitiveKind, Rgb, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The 12-color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    White,
    Black,
    Orange,
    Purple,
    Gray,
    Brown,
}

impl NamedColor {
    /// Palette order
    pub const ALL: [Self; 12] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Cyan,
        Self::Magenta,
        Self::White,
        Self::Black,
        Self::Orange,
        Self::Purple,
        Self::Gray,
        Self::Brown,
    ];

    #[must_use]
    pub const fn rgb(&self) -> Rgb {
        match self {
            Self::Red => Rgb::new(1.0, 0.0, 0.0),
            Self::Green => Rgb::new(0.0, 1.0, 0.0),
            Self::Blue => Rgb::new(0.0, 0.0, 1.0),
            Self::Yellow => Rgb::new(1.0, 1.0, 0.0),
            Self::Cyan => Rgb::new(0.0, 1.0, 1.0),
            Self::Magenta => Rgb::new(1.0, 0.0, 1.0),
            Self::White => Rgb::new(1.0, 1.0, 1.0),
            Self::Black => Rgb::new(0.0, 0.0, 0.0),
            Self::Orange => Rgb::new(1.0, 0.5, 0.0),
            Self::Purple => Rgb::new(0.5, 0.0, 0.5),
            Self::Gray => Rgb::new(0.5, 0.5, 0.5),
            Self::Brown => Rgb::new(0.6, 0.3, 0.0),
        }
    }

    /// Lowercase label ("red")
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Cyan => "cyan",
            Self::Magenta => "magenta",
            Self::White => "white",
            Self::Black => "black",
            Self::Orange => "orange",
            Self::Purple => "purple",
            Self::Gray => "gray",
            Self::Brown => "brown",
        }
    }

    /// Capitalized label used in object names ("Red")
    #[must_use]
    pub fn title(&self) -> String {
        let label = self.as_str();
        let mut out = String::with_capacity(label.len());
        let mut chars = label.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
        out
    }

    /// Palette entry whose RGB matches `rgb` within `1e-6` per channel
    #[must_use]
    pub fn from_rgb(rgb: &Rgb) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.rgb().within(rgb, 1e-6))
    }

    /// Closest palette entry by mean channel difference
    #[must_use]
    pub fn nearest(rgb: &Rgb) -> Self {
        let mut best = Self::Red;
        let mut best_diff = f64::INFINITY;
        for color in Self::ALL {
            let diff = color.rgb().mean_abs_diff(rgb);
            if diff < best_diff {
                best = color;
                best_diff = diff;
            }
        }
        best
    }
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamedColor {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("color", s))
    }
}

/// Named material parameter pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialPreset {
    #[default]
    Default,
    Shiny,
    Matte,
    Metallic,
}

impl MaterialPreset {
    pub const ALL: [Self; 4] = [Self::Default, Self::Shiny, Self::Matte, Self::Metallic];

    #[must_use]
    pub const fn metallic(&self) -> f64 {
        match self {
            Self::Default | Self::Matte => 0.0,
            Self::Shiny | Self::Metallic => 1.0,
        }
    }

    #[must_use]
    pub const fn roughness(&self) -> f64 {
        match self {
            Self::Default => 0.5,
            Self::Shiny => 0.0,
            Self::Matte => 1.0,
            Self::Metallic => 0.3,
        }
    }
}

/// Shared position catalog: center, then right/left, front/back, above/below
pub const POSITIONS: [Vec3; 7] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 0.0, 0.0),
    Vec3::new(-2.0, 0.0, 0.0),
    Vec3::new(0.0, 2.0, 0.0),
    Vec3::new(0.0, -2.0, 0.0),
    Vec3::new(0.0, 0.0, 2.0),
    Vec3::new(0.0, 0.0, -2.0),
];

/// Uniform scale catalog
pub const SCALES: [f64; 4] = [0.5, 1.0, 1.5, 2.0];

/// Catalog positions for a primitive kind
#[must_use]
pub fn supported_positions(kind: PrimitiveKind) -> &'static [Vec3] {
    match kind {
        PrimitiveKind::Cone => &POSITIONS[..3],
        PrimitiveKind::Sphere | PrimitiveKind::Cube | PrimitiveKind::Cylinder => &POSITIONS,
    }
}

/// Catalog scales for a primitive kind
#[must_use]
pub fn supported_scales(_kind: PrimitiveKind) -> &'static [f64] {
    &SCALES
}

/// Catalog colors for a primitive kind
#[must_use]
pub fn supported_colors(_kind: PrimitiveKind) -> &'static [NamedColor] {
    &NamedColor::ALL
}

/// Natural-language descriptors for a catalog position
///
/// Positions outside the catalog get a single literal-coordinate phrase.
#[must_use]
pub fn position_descriptors(position: &Vec3) -> Vec<String> {
    let fixed: &[&str] = match POSITIONS.iter().position(|p| p.distance(position) < 1e-9) {
        Some(0) => &["at the center", "in the middle", "at the origin"],
        Some(1) => &["to the right", "2 units right", "on the right side"],
        Some(2) => &["to the left", "2 units left", "on the left side"],
        Some(3) => &["in front", "2 units forward", "toward the front"],
        Some(4) => &["in the back", "2 units back", "toward the back"],
        Some(5) => &["above", "2 units up", "on top"],
        Some(6) => &["below", "2 units down", "underneath"],
        _ => &[],
    };
    fixed
        .iter()
        .map(|s| (*s).to_string())
        .chain(std::iter::once(format!("at position {position}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cone_supports_three_positions() {
        assert_eq!(supported_positions(PrimitiveKind::Cone).len(), 3);
        assert_eq!(supported_positions(PrimitiveKind::Sphere).len(), 7);
        assert_eq!(supported_scales(PrimitiveKind::Cube), &[0.5, 1.0, 1.5, 2.0]);
        assert_eq!(supported_colors(PrimitiveKind::Cylinder).len(), 12);
    }

    #[test]
    fn color_titles_and_lookup() {
        assert_eq!(NamedColor::Red.title(), "Red");
        assert_eq!(NamedColor::from_rgb(&Rgb::new(0.6, 0.3, 0.0)), Some(NamedColor::Brown));
        assert_eq!(NamedColor::from_rgb(&Rgb::new(0.2, 0.2, 0.2)), None);
        assert_eq!(NamedColor::nearest(&Rgb::new(0.95, 0.02, 0.0)), NamedColor::Red);
        assert_eq!("Purple".parse::<NamedColor>().unwrap(), NamedColor::Purple);
    }

    #[test]
    fn material_presets() {
        assert_eq!(MaterialPreset::Shiny.metallic(), 1.0);
        assert_eq!(MaterialPreset::Metallic.roughness(), 0.3);
        assert_eq!(MaterialPreset::default().roughness(), 0.5);
    }

    #[test]
    fn descriptors_for_catalog_and_off_catalog_positions() {
        let center = position_descriptors(&Vec3::ZERO);
        assert_eq!(center.len(), 4);
        assert!(center.contains(&"at the origin".to_string()));
        assert_eq!(center[3], "at position (0, 0, 0)");

        let off = position_descriptors(&Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(off, vec!["at position (3, 0, 0)".to_string()]);
    }
}
