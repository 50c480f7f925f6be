//! SceneBench Scene - typed scenes and their text form
//!
//! Provides:
//! - Value types for placed primitives (`SceneObject`, `Scene`, `Vec3`, `Rgb`)
//! - Fixed catalogs of colors, material presets, positions and scales
//! - Pattern layout math (grid / circle / line) and collision checks
//! - A lossless encoder to USD-style scene text and a permissive decoder
//!
//! # Example
//!
//! ```rust
//! use scenebench_scene::{decode, NamedColor, PrimitiveKind, Scene, SceneObject, Vec3};
//!
//! let scene = Scene::new().with_object(SceneObject::new(
//!     "RedSphere_1",
//!     PrimitiveKind::Sphere,
//!     NamedColor::Red,
//!     Vec3::ZERO,
//!     1.0,
//! ));
//! let decoded = decode(&scene.encode());
//! assert_eq!(decoded.len(), 1);
//! assert_eq!(decoded[0].name, "RedSphere_1");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod codec;
pub mod error;
pub mod layout;
pub mod palette;
pub mod types;

// Re-exports for convenience
pub use codec::{decode, encode, encode_objects, validate_syntax, DecodedObject};
pub use error::{ParseEnumError, SyntaxError};
pub use layout::{
    circle_positions, collides, collides_with_any, free_positions, grid_positions,
    is_collision_free, line_positions, LineDirection, MIN_SEPARATION,
};
pub use palette::{
    position_descriptors, supported_colors, supported_positions, supported_scales,
    MaterialPreset, NamedColor,
};
pub use types::{format_coord, ObjectKind, PrimitiveKind, Rgb, Scene, SceneObject, Shape, Vec3};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with scenes
    pub use crate::{
        decode, encode, DecodedObject, LineDirection, NamedColor, ObjectKind, PrimitiveKind, Rgb,
        Scene, SceneObject, Vec3,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
