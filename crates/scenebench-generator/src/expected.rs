//! Ground-truth assertions recorded alongside each generated case
//!
//! A lightweight sanity oracle, independent of the full scoring engine:
//! [`ExpectedMetrics::verify`] checks a decoded scene against the
//! operation-specific facts the generator knows to be true.

use scenebench_scene::{DecodedObject, PrimitiveKind, Rgb, Vec3};
use serde::{Deserialize, Serialize};

/// Positions closer than this count as the same place
pub const POSITION_TOLERANCE: f64 = 0.1;

/// Per-channel color tolerance
pub const COLOR_TOLERANCE: f64 = 0.05;

/// Absolute tolerance on uniform scale
pub const SCALE_TOLERANCE: f64 = 0.05;

/// One operation-specific fact about the target scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum ExpectedCheck {
    /// Some object of this kind and color sits at `position`
    ObjectPresent {
        primitive_type: PrimitiveKind,
        color: Rgb,
        position: Vec3,
    },
    /// The named object has this color
    ObjectColor { object_name: String, color: Rgb },
    /// The named object sits within `tolerance` of `position`
    ObjectPosition {
        object_name: String,
        position: Vec3,
        tolerance: f64,
    },
    /// The named object has this uniform scale
    ObjectScale { object_name: String, scale: f64 },
    /// No object carries this name
    ObjectAbsent { object_name: String },
}

impl ExpectedCheck {
    /// `None` when satisfied, otherwise a failure message
    #[must_use]
    pub fn check(&self, objects: &[DecodedObject]) -> Option<String> {
        let named = |name: &str| objects.iter().find(|o| o.name == name);
        match self {
            Self::ObjectPresent {
                primitive_type,
                color,
                position,
            } => {
                let found = objects.iter().any(|o| {
                    o.kind.primitive() == Some(*primitive_type)
                        && o.color.is_some_and(|c| c.within(color, COLOR_TOLERANCE))
                        && o.position().distance(position) < POSITION_TOLERANCE
                });
                (!found).then(|| format!("no {primitive_type} of color {color} at {position}"))
            }
            Self::ObjectColor { object_name, color } => match named(object_name) {
                Some(o) if o.color.is_some_and(|c| c.within(color, COLOR_TOLERANCE)) => None,
                Some(o) => Some(format!(
                    "{object_name} has color {:?}, expected {color}",
                    o.color
                )),
                None => Some(format!("{object_name} not found")),
            },
            Self::ObjectPosition {
                object_name,
                position,
                tolerance,
            } => match named(object_name) {
                Some(o) if o.position().distance(position) < *tolerance => None,
                Some(o) => Some(format!(
                    "{object_name} at {}, expected {position}",
                    o.position()
                )),
                None => Some(format!("{object_name} not found")),
            },
            Self::ObjectScale { object_name, scale } => match named(object_name) {
                Some(o) if (o.scale().x - scale).abs() <= SCALE_TOLERANCE => None,
                Some(o) => Some(format!(
                    "{object_name} has scale {}, expected {scale}",
                    o.scale().x
                )),
                None => Some(format!("{object_name} not found")),
            },
            Self::ObjectAbsent { object_name } => named(object_name)
                .map(|_| format!("{object_name} should have been removed")),
        }
    }
}

/// Expected facts about a case's target scene
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpectedMetrics {
    pub object_count: usize,
    pub checks: Vec<ExpectedCheck>,
}

impl ExpectedMetrics {
    #[must_use]
    pub fn new(object_count: usize) -> Self {
        Self {
            object_count,
            checks: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_check(mut self, check: ExpectedCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// Every failed assertion against `objects`; empty means consistent
    #[must_use]
    pub fn verify(&self, objects: &[DecodedObject]) -> Vec<String> {
        let mut failures = Vec::new();
        if objects.len() != self.object_count {
            failures.push(format!(
                "expected {} objects, found {}",
                self.object_count,
                objects.len()
            ));
        }
        failures.extend(self.checks.iter().filter_map(|c| c.check(objects)));
        failures
    }

    #[must_use]
    pub fn is_satisfied_by(&self, objects: &[DecodedObject]) -> bool {
        self.verify(objects).is_empty()
    }
}
