//! Core value types for SceneBench scenes
//!
//! All scene values are immutable once built: edits produce new values
//! through the `with_*` builders rather than mutating in place.

use crate::error::ParseEnumError;
use crate::palette::{MaterialPreset, NamedColor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point or vector in scene space (Z-up)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// The origin
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit scale on every axis
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Same value on all three axes
    #[inline]
    #[must_use]
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Euclidean distance to `other`
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Mean absolute per-axis difference (L1 / 3)
    #[inline]
    #[must_use]
    pub fn mean_abs_diff(&self, other: &Self) -> f64 {
        ((self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()) / 3.0
    }

    #[inline]
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            format_coord(self.x),
            format_coord(self.y),
            format_coord(self.z)
        )
    }
}

/// Human-friendly coordinate: integral values print without a fraction,
/// everything else with two decimals
#[must_use]
pub fn format_coord(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        // avoid "-0"
        format!("{}", v.round() + 0.0)
    } else {
        format!("{v:.2}")
    }
}

/// Linear RGB color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    #[inline]
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Mean absolute channel difference
    #[inline]
    #[must_use]
    pub fn mean_abs_diff(&self, other: &Self) -> f64 {
        ((self.r - other.r).abs() + (self.g - other.g).abs() + (self.b - other.b).abs()) / 3.0
    }

    /// True when every channel differs by at most `tolerance`
    #[inline]
    #[must_use]
    pub fn within(&self, other: &Self, tolerance: f64) -> bool {
        (self.r - other.r).abs() <= tolerance
            && (self.g - other.g).abs() <= tolerance
            && (self.b - other.b).abs() <= tolerance
    }
}

impl From<[f64; 3]> for Rgb {
    fn from([r, g, b]: [f64; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [f64; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Primitive shapes the generator can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Sphere,
    Cube,
    Cylinder,
    Cone,
}

impl PrimitiveKind {
    /// Every primitive kind, in catalog order
    pub const ALL: [Self; 4] = [Self::Sphere, Self::Cube, Self::Cylinder, Self::Cone];

    /// Lowercase label used in datasets and prompts
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Cube => "cube",
            Self::Cylinder => "cylinder",
            Self::Cone => "cone",
        }
    }

    /// Prim type name as written in scene text
    #[inline]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Sphere => "Sphere",
            Self::Cube => "Cube",
            Self::Cylinder => "Cylinder",
            Self::Cone => "Cone",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimitiveKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("primitive kind", s))
    }
}

/// Kind of a prim recognised by the decoder
///
/// Superset of [`PrimitiveKind`]: `Mesh` is recognised as a generic prim
/// but carries no extracted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    Sphere,
    Cube,
    Cylinder,
    Cone,
    Mesh,
}

impl ObjectKind {
    /// The primitive kind, if this is not a generic mesh
    #[inline]
    #[must_use]
    pub const fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Sphere => Some(PrimitiveKind::Sphere),
            Self::Cube => Some(PrimitiveKind::Cube),
            Self::Cylinder => Some(PrimitiveKind::Cylinder),
            Self::Cone => Some(PrimitiveKind::Cone),
            Self::Mesh => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Mesh => "Mesh",
            Self::Sphere => "Sphere",
            Self::Cube => "Cube",
            Self::Cylinder => "Cylinder",
            Self::Cone => "Cone",
        }
    }

    /// Parse a prim type token exactly as written in scene text
    #[must_use]
    pub fn from_type_name(token: &str) -> Option<Self> {
        match token {
            "Sphere" => Some(Self::Sphere),
            "Cube" => Some(Self::Cube),
            "Cylinder" => Some(Self::Cylinder),
            "Cone" => Some(Self::Cone),
            "Mesh" => Some(Self::Mesh),
            _ => None,
        }
    }
}

impl From<PrimitiveKind> for ObjectKind {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Sphere => Self::Sphere,
            PrimitiveKind::Cube => Self::Cube,
            PrimitiveKind::Cylinder => Self::Cylinder,
            PrimitiveKind::Cone => Self::Cone,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Kind-specific dimensions of a primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Sphere { radius: f64 },
    Cube { size: f64 },
    Cylinder { radius: f64, height: f64 },
    Cone { radius: f64, height: f64 },
}

impl Shape {
    /// Catalog dimensions for a kind
    #[must_use]
    pub const fn default_for(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Sphere => Self::Sphere { radius: 1.0 },
            PrimitiveKind::Cube => Self::Cube { size: 2.0 },
            PrimitiveKind::Cylinder => Self::Cylinder {
                radius: 1.0,
                height: 2.0,
            },
            PrimitiveKind::Cone => Self::Cone {
                radius: 1.0,
                height: 2.0,
            },
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Sphere { .. } => PrimitiveKind::Sphere,
            Self::Cube { .. } => PrimitiveKind::Cube,
            Self::Cylinder { .. } => PrimitiveKind::Cylinder,
            Self::Cone { .. } => PrimitiveKind::Cone,
        }
    }
}

/// A single placed primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Unique within a scene; stable identity key
    pub name: String,
    #[serde(flatten)]
    pub shape: Shape,
    pub color_name: NamedColor,
    pub color: Rgb,
    pub position: Vec3,
    /// Uniform scale factor
    pub scale: f64,
    pub metallic: f64,
    pub roughness: f64,
}

impl SceneObject {
    /// Create an object with catalog dimensions and the default material
    pub fn new(
        name: impl Into<String>,
        kind: PrimitiveKind,
        color: NamedColor,
        position: Vec3,
        scale: f64,
    ) -> Self {
        let preset = MaterialPreset::Default;
        Self {
            name: name.into(),
            shape: Shape::default_for(kind),
            color_name: color,
            color: color.rgb(),
            position,
            scale,
            metallic: preset.metallic(),
            roughness: preset.roughness(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        self.shape.kind()
    }

    /// Copy with a new position
    #[inline]
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Copy with a new uniform scale
    #[inline]
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Copy with a new palette color
    #[inline]
    #[must_use]
    pub fn with_color(mut self, color: NamedColor) -> Self {
        self.color_name = color;
        self.color = color.rgb();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_material(mut self, preset: MaterialPreset) -> Self {
        self.metallic = preset.metallic();
        self.roughness = preset.roughness();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }
}

/// An unordered set of objects, stored as a list for deterministic output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn from_objects(objects: Vec<SceneObject>) -> Self {
        Self { objects }
    }

    #[inline]
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SceneObject> {
        self.objects.iter()
    }

    /// Positions of every object, in order
    #[must_use]
    pub fn positions(&self) -> Vec<Vec3> {
        self.objects.iter().map(|o| o.position).collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.name == name)
    }

    /// New scene with `object` appended
    #[must_use]
    pub fn with_object(mut self, object: SceneObject) -> Self {
        self.objects.push(object);
        self
    }

    /// New scene with the object at `index` replaced
    #[must_use]
    pub fn replaced(&self, index: usize, object: SceneObject) -> Self {
        let mut objects = self.objects.clone();
        if let Some(slot) = objects.get_mut(index) {
            *slot = object;
        }
        Self { objects }
    }

    /// New scene without the object at `index`
    #[must_use]
    pub fn without(&self, index: usize) -> Self {
        let objects = self
            .objects
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, o)| o.clone())
            .collect();
        Self { objects }
    }

    /// Serialize to scene-description text
    #[must_use]
    pub fn encode(&self) -> String {
        crate::codec::encode(self)
    }
}

impl FromIterator<SceneObject> for Scene {
    fn from_iter<I: IntoIterator<Item = SceneObject>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Scene {
    type Item = &'a SceneObject;
    type IntoIter = std::slice::Iter<'a, SceneObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_distance_and_mae() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert!((a.mean_abs_diff(&b) - 7.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn vec3_display_is_compact() {
        assert_eq!(Vec3::new(2.0, -0.0, 0.5).to_string(), "(2, 0, 0.50)");
    }

    #[test]
    fn vec3_serializes_as_array() {
        let json = serde_json::to_string(&Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0]");
    }

    #[test]
    fn primitive_kind_parses_case_insensitive() {
        assert_eq!("Sphere".parse::<PrimitiveKind>().unwrap(), PrimitiveKind::Sphere);
        assert_eq!("cone".parse::<PrimitiveKind>().unwrap(), PrimitiveKind::Cone);
        assert!("torus".parse::<PrimitiveKind>().is_err());
    }

    #[test]
    fn object_kind_maps_mesh_to_none() {
        assert_eq!(ObjectKind::Mesh.primitive(), None);
        assert_eq!(
            ObjectKind::from(PrimitiveKind::Cube).primitive(),
            Some(PrimitiveKind::Cube)
        );
    }

    #[test]
    fn edits_preserve_name() {
        let obj = SceneObject::new("RedSphere_1", PrimitiveKind::Sphere, NamedColor::Red, Vec3::ZERO, 1.0);
        let moved = obj.clone().with_position(Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(moved.name, obj.name);
        assert_eq!(obj.position, Vec3::ZERO);

        let recolored = obj.with_color(NamedColor::Blue);
        assert_eq!(recolored.color, NamedColor::Blue.rgb());
    }

    #[test]
    fn scene_replace_and_remove_return_new_scenes() {
        let a = SceneObject::new("A", PrimitiveKind::Cube, NamedColor::Red, Vec3::ZERO, 1.0);
        let b = SceneObject::new("B", PrimitiveKind::Cone, NamedColor::Blue, Vec3::new(2.0, 0.0, 0.0), 1.0);
        let scene = Scene::new().with_object(a).with_object(b);

        let smaller = scene.without(0);
        assert_eq!(scene.len(), 2);
        assert_eq!(smaller.len(), 1);
        assert_eq!(smaller.objects()[0].name, "B");

        let idx = scene.index_of("B").unwrap();
        let moved = scene.replaced(idx, scene.objects()[idx].clone().with_scale(2.0));
        assert!((moved.get("B").unwrap().scale - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shape_defaults_match_catalog() {
        assert_eq!(Shape::default_for(PrimitiveKind::Cube), Shape::Cube { size: 2.0 });
        assert_eq!(Shape::default_for(PrimitiveKind::Cone).kind(), PrimitiveKind::Cone);
    }
}
