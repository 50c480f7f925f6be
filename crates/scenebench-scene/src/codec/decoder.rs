//! Text → decoded objects
//!
//! A permissive line scanner: a small state machine tracks the current
//! object and the brace depth, and field values are pulled out of lines by
//! pattern. Unknown blocks are skipped, missing fields stay unset.

use crate::palette::{MaterialPreset, NamedColor};
use crate::types::{ObjectKind, Rgb, SceneObject, Shape, Vec3};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

const NUM: &str = r"([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)";

/// Any prim declaration: `def <Type> "<name>"`
pub(crate) static DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*def\s+(\w+)\s+"([^"]*)""#).expect("valid regex"));

static TRANSLATE: Lazy<Regex> = Lazy::new(|| vector_pattern("xformOp:translate"));
static SCALE: Lazy<Regex> = Lazy::new(|| vector_pattern("xformOp:scale"));
static DIFFUSE: Lazy<Regex> = Lazy::new(|| vector_pattern("diffuseColor"));
static METALLIC: Lazy<Regex> = Lazy::new(|| scalar_pattern("metallic"));
static ROUGHNESS: Lazy<Regex> = Lazy::new(|| scalar_pattern("roughness"));
static RADIUS: Lazy<Regex> = Lazy::new(|| scalar_pattern("radius"));
static SIZE: Lazy<Regex> = Lazy::new(|| scalar_pattern("size"));
static HEIGHT: Lazy<Regex> = Lazy::new(|| scalar_pattern("height"));

fn vector_pattern(field: &str) -> Regex {
    Regex::new(&format!(
        r"{field}\s*=\s*\(\s*{NUM}\s*,\s*{NUM}\s*,\s*{NUM}\s*\)"
    ))
    .expect("valid regex")
}

fn scalar_pattern(field: &str) -> Regex {
    Regex::new(&format!(r"\b{field}\s*=\s*{NUM}")).expect("valid regex")
}

/// An object as extracted from arbitrary scene text
///
/// Fields hold what was actually found; accessors apply defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedObject {
    pub name: String,
    pub kind: ObjectKind,
    pub position: Option<Vec3>,
    pub scale: Option<Vec3>,
    pub color: Option<Rgb>,
    pub metallic: Option<f64>,
    pub roughness: Option<f64>,
    pub radius: Option<f64>,
    pub size: Option<f64>,
    pub height: Option<f64>,
}

impl DecodedObject {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            position: None,
            scale: None,
            color: None,
            metallic: None,
            roughness: None,
            radius: None,
            size: None,
            height: None,
        }
    }

    /// Position, or the origin when absent
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position.unwrap_or(Vec3::ZERO)
    }

    /// Scale, or unit scale when absent
    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale.unwrap_or(Vec3::ONE)
    }

    #[inline]
    #[must_use]
    pub fn metallic(&self) -> f64 {
        self.metallic.unwrap_or(MaterialPreset::Default.metallic())
    }

    #[inline]
    #[must_use]
    pub fn roughness(&self) -> f64 {
        self.roughness.unwrap_or(MaterialPreset::Default.roughness())
    }

    /// Convert to a typed [`SceneObject`]
    ///
    /// Returns `None` for meshes. The color label is the nearest palette
    /// entry; a missing color decodes as white.
    #[must_use]
    pub fn to_scene_object(&self) -> Option<SceneObject> {
        let kind = self.kind.primitive()?;
        let defaults = Shape::default_for(kind);
        let shape = match defaults {
            Shape::Sphere { radius } => Shape::Sphere {
                radius: self.radius.unwrap_or(radius),
            },
            Shape::Cube { size } => Shape::Cube {
                size: self.size.unwrap_or(size),
            },
            Shape::Cylinder { radius, height } => Shape::Cylinder {
                radius: self.radius.unwrap_or(radius),
                height: self.height.unwrap_or(height),
            },
            Shape::Cone { radius, height } => Shape::Cone {
                radius: self.radius.unwrap_or(radius),
                height: self.height.unwrap_or(height),
            },
        };
        let color = self.color.unwrap_or(NamedColor::White.rgb());

        Some(SceneObject {
            name: self.name.clone(),
            shape,
            color_name: NamedColor::from_rgb(&color).unwrap_or_else(|| NamedColor::nearest(&color)),
            color,
            position: self.position(),
            scale: self.scale().x,
            metallic: self.metallic(),
            roughness: self.roughness(),
        })
    }
}

struct OpenObject {
    object: DecodedObject,
    base_depth: i64,
    entered: bool,
}

/// Decode every recognised object in `text`
///
/// Never fails: malformed input yields whatever could be extracted.
#[must_use]
pub fn decode(text: &str) -> Vec<DecodedObject> {
    let mut objects = Vec::new();
    let mut current: Option<OpenObject> = None;
    let mut depth: i64 = 0;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            continue;
        }

        let mut body = line;
        if let Some(caps) = DECLARATION.captures(line) {
            if let Some(kind) = ObjectKind::from_type_name(&caps[1]) {
                if let Some(open) = current.take() {
                    objects.push(open.object);
                }
                current = Some(OpenObject {
                    object: DecodedObject::new(&caps[2], kind),
                    base_depth: depth,
                    entered: false,
                });
                let end = caps.get(0).map_or(0, |m| m.end());
                body = &line[end..];
            }
        }

        if let Some(open) = current.as_mut() {
            if open.object.kind != ObjectKind::Mesh {
                extract_fields(&mut open.object, body);
            }
        }

        for ch in braces(line) {
            if ch == '{' {
                depth += 1;
                if let Some(open) = current.as_mut() {
                    if depth > open.base_depth {
                        open.entered = true;
                    }
                }
            } else {
                depth -= 1;
                let closed = current
                    .as_ref()
                    .is_some_and(|open| open.entered && depth <= open.base_depth);
                if closed {
                    if let Some(open) = current.take() {
                        objects.push(open.object);
                    }
                }
            }
        }
    }

    if let Some(open) = current {
        objects.push(open.object);
    }

    tracing::trace!(count = objects.len(), "decoded scene objects");
    objects
}

/// Structural braces on a line, ignoring anything inside double quotes
fn braces(line: &str) -> impl Iterator<Item = char> + '_ {
    let mut in_quotes = false;
    line.chars().filter(move |&c| {
        if c == '"' {
            in_quotes = !in_quotes;
            return false;
        }
        !in_quotes && (c == '{' || c == '}')
    })
}

fn extract_fields(object: &mut DecodedObject, line: &str) {
    if let Some(v) = TRANSLATE.captures(line).and_then(|c| triple(&c)) {
        object.position = Some(v);
    }
    if let Some(v) = SCALE.captures(line).and_then(|c| triple(&c)) {
        object.scale = Some(v);
    }
    if let Some(v) = DIFFUSE.captures(line).and_then(|c| triple(&c)) {
        object.color = Some(Rgb::new(v.x, v.y, v.z));
    }
    if let Some(v) = scalar(&METALLIC, line) {
        object.metallic = Some(v);
    }
    if let Some(v) = scalar(&ROUGHNESS, line) {
        object.roughness = Some(v);
    }
    if let Some(v) = scalar(&RADIUS, line) {
        object.radius = Some(v);
    }
    if let Some(v) = scalar(&SIZE, line) {
        object.size = Some(v);
    }
    if let Some(v) = scalar(&HEIGHT, line) {
        object.height = Some(v);
    }
}

fn triple(caps: &Captures<'_>) -> Option<Vec3> {
    let x = caps.get(1)?.as_str().parse().ok()?;
    let y = caps.get(2)?.as_str().parse().ok()?;
    let z = caps.get(3)?.as_str().parse().ok()?;
    Some(Vec3::new(x, y, z))
}

fn scalar(pattern: &Regex, line: &str) -> Option<f64> {
    pattern.captures(line)?.get(1)?.as_str().parse().ok()
}
