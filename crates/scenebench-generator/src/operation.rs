//! Edit operations and their typed parameters
//!
//! Each operation type has exactly one parameter struct. On disk an
//! operation reads `{"type": "...", "parameters": {...}, "description": "..."}`.

use scenebench_scene::{
    circle_positions, grid_positions, line_positions, LineDirection, NamedColor, ParseEnumError,
    PrimitiveKind, Rgb, SceneObject, Vec3,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::case::ComplexityTier;

/// Closed set of edit operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    AddPrimitive,
    ChangeColor,
    MoveObject,
    ScaleObject,
    DeleteObject,
    AddMultipleObjects,
    CreatePattern,
    CompositionalEdit,
}

impl OperationType {
    pub const ALL: [Self; 8] = [
        Self::AddPrimitive,
        Self::ChangeColor,
        Self::MoveObject,
        Self::ScaleObject,
        Self::DeleteObject,
        Self::AddMultipleObjects,
        Self::CreatePattern,
        Self::CompositionalEdit,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AddPrimitive => "add_primitive",
            Self::ChangeColor => "change_color",
            Self::MoveObject => "move_object",
            Self::ScaleObject => "scale_object",
            Self::DeleteObject => "delete_object",
            Self::AddMultipleObjects => "add_multiple_objects",
            Self::CreatePattern => "create_pattern",
            Self::CompositionalEdit => "compositional_edit",
        }
    }

    /// Tier whose repertoire contains this operation
    #[must_use]
    pub const fn tier(&self) -> ComplexityTier {
        match self {
            Self::AddPrimitive | Self::ChangeColor => ComplexityTier::Simple,
            Self::MoveObject | Self::ScaleObject | Self::DeleteObject | Self::AddMultipleObjects => {
                ComplexityTier::Medium
            }
            Self::CreatePattern | Self::CompositionalEdit => ComplexityTier::Complex,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s.trim())
            .ok_or_else(|| ParseEnumError::new("operation type", s))
    }
}

/// One generated edit: typed parameters plus a short human description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditOperation {
    #[serde(flatten)]
    pub params: EditParams,
    /// For logs and reports; never scored
    pub description: String,
}

impl EditOperation {
    pub fn new(params: EditParams, description: impl Into<String>) -> Self {
        Self {
            params,
            description: description.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        self.params.operation_type()
    }
}

/// Parameters, one variant per operation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "parameters", rename_all = "snake_case")]
pub enum EditParams {
    AddPrimitive(ObjectSpec),
    ChangeColor(ChangeColor),
    MoveObject(MoveObject),
    ScaleObject(ScaleObject),
    DeleteObject(DeleteObject),
    AddMultipleObjects(AddMultipleObjects),
    CreatePattern(CreatePattern),
    CompositionalEdit(CompositionalEdit),
}

impl EditParams {
    #[must_use]
    pub const fn operation_type(&self) -> OperationType {
        match self {
            Self::AddPrimitive(_) => OperationType::AddPrimitive,
            Self::ChangeColor(_) => OperationType::ChangeColor,
            Self::MoveObject(_) => OperationType::MoveObject,
            Self::ScaleObject(_) => OperationType::ScaleObject,
            Self::DeleteObject(_) => OperationType::DeleteObject,
            Self::AddMultipleObjects(_) => OperationType::AddMultipleObjects,
            Self::CreatePattern(_) => OperationType::CreatePattern,
            Self::CompositionalEdit(_) => OperationType::CompositionalEdit,
        }
    }
}

/// A fully specified new object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub object_name: String,
    pub primitive_type: PrimitiveKind,
    pub color_name: NamedColor,
    pub color: Rgb,
    pub position: Vec3,
    pub scale: f64,
}

impl From<&SceneObject> for ObjectSpec {
    fn from(object: &SceneObject) -> Self {
        Self {
            object_name: object.name.clone(),
            primitive_type: object.kind(),
            color_name: object.color_name,
            color: object.color,
            position: object.position,
            scale: object.scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeColor {
    pub object_name: String,
    pub object_type: PrimitiveKind,
    pub old_color_name: NamedColor,
    pub new_color_name: NamedColor,
    pub new_color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveObject {
    pub object_name: String,
    pub object_color: NamedColor,
    pub object_type: PrimitiveKind,
    pub old_position: Vec3,
    pub new_position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleObject {
    pub object_name: String,
    pub object_color: NamedColor,
    pub object_type: PrimitiveKind,
    pub old_scale: f64,
    pub new_scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteObject {
    pub object_name: String,
    pub object_color: NamedColor,
    pub object_type: PrimitiveKind,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddMultipleObjects {
    pub num_objects: usize,
    pub objects: Vec<ObjectSpec>,
}

/// Geometric layout of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern_type", rename_all = "snake_case")]
pub enum PatternLayout {
    Grid { rows: usize, cols: usize, spacing: f64 },
    Circle { count: usize, radius: f64 },
    Line { count: usize, spacing: f64, direction: LineDirection },
}

impl PatternLayout {
    /// Number of positions the layout produces
    #[must_use]
    pub const fn count(&self) -> usize {
        match *self {
            Self::Grid { rows, cols, .. } => rows * cols,
            Self::Circle { count, .. } | Self::Line { count, .. } => count,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Grid { .. } => "grid",
            Self::Circle { .. } => "circle",
            Self::Line { .. } => "line",
        }
    }

    /// Positions centered on `center`
    #[must_use]
    pub fn positions(&self, center: Vec3) -> Vec<Vec3> {
        match *self {
            Self::Grid { rows, cols, spacing } => grid_positions(rows, cols, spacing, center),
            Self::Circle { count, radius } => circle_positions(count, radius, center),
            Self::Line {
                count,
                spacing,
                direction,
            } => line_positions(count, spacing, direction, center),
        }
    }
}

impl fmt::Display for PatternLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid { rows, cols, .. } => write!(f, "{rows}x{cols} grid"),
            Self::Circle { count, .. } => write!(f, "circle of {count}"),
            Self::Line { count, .. } => write!(f, "line of {count}"),
        }
    }
}

/// How a pattern is colored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// Every object shares one palette color
    Single,
    /// Each object draws its own color
    Varied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePattern {
    pub layout: PatternLayout,
    pub primitive_type: PrimitiveKind,
    pub num_objects: usize,
    pub color_scheme: ColorScheme,
    pub center: Vec3,
    pub objects: Vec<ObjectSpec>,
}

/// Flavor of a compositional edit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "composition_type", rename_all = "snake_case")]
pub enum Composition {
    /// Move objects onto a line
    Arrangement { direction: LineDirection, spacing: f64 },
    /// Add several new objects
    Creation,
    /// Scale objects by a common factor
    Transformation { factor: f64 },
}

impl Composition {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Arrangement { .. } => "arrangement",
            Self::Creation => "creation",
            Self::Transformation { .. } => "transformation",
        }
    }
}

/// A primitive sub-operation recorded inside a compositional edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CompositionStep {
    MoveObject(MoveObject),
    AddPrimitive(ObjectSpec),
    ScaleObject(ScaleObject),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionalEdit {
    #[serde(flatten)]
    pub composition: Composition,
    pub steps: Vec<CompositionStep>,
}
