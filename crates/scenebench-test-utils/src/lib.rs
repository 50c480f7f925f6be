//! Testing utilities for SceneBench workspace
//!
//! Shared scene fixtures, hand-written scene text, and assertions.

#![allow(missing_docs)]

use scenebench_scene::{NamedColor, PrimitiveKind, Scene, SceneObject, Vec3};
use std::collections::HashSet;

pub fn create_object(
    name: &str,
    kind: PrimitiveKind,
    color: NamedColor,
    position: Vec3,
) -> SceneObject {
    SceneObject::new(name, kind, color, position, 1.0)
}

pub fn create_red_sphere() -> SceneObject {
    create_object("RedSphere_1", PrimitiveKind::Sphere, NamedColor::Red, Vec3::ZERO)
}

pub fn create_blue_cube() -> SceneObject {
    create_object(
        "BlueCube_2",
        PrimitiveKind::Cube,
        NamedColor::Blue,
        Vec3::new(2.0, 0.0, 0.0),
    )
}

pub fn create_green_cylinder() -> SceneObject {
    create_object(
        "GreenCylinder_3",
        PrimitiveKind::Cylinder,
        NamedColor::Green,
        Vec3::new(-2.0, 0.0, 0.0),
    )
}

/// Red sphere, blue cube and green cylinder on the x axis
pub fn create_sample_scene() -> Scene {
    Scene::from_objects(vec![
        create_red_sphere(),
        create_blue_cube(),
        create_green_cylinder(),
    ])
}

pub fn create_sample_scene_text() -> String {
    create_sample_scene().encode()
}

/// Minimal hand-written scene with one sphere that carries only a name,
/// a translate and a color, wrapped in unrelated blocks
pub fn create_sparse_scene_text(position: Vec3, color: (f64, f64, f64)) -> String {
    format!(
        r#"#usda 1.0
(
    defaultPrim = "World"
)

def Xform "World"
{{
    def Scope "Looks"
    {{
        token purpose = "render"
    }}

    def Sphere "Loose"
    {{
        double3 xformOp:translate = ({}, {}, {})
        def Material "Mat"
        {{
            def Shader "Surface"
            {{
                color3f inputs:diffuseColor = ({}, {}, {})
            }}
        }}
    }}

    def Camera "Cam"
    {{
        float focalLength = 50
    }}
}}
"#,
        position.x, position.y, position.z, color.0, color.1, color.2
    )
}

/// Panic unless `a` and `b` differ by at most `eps`
#[track_caller]
pub fn assert_close(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "expected {a} to be within {eps} of {b}");
}

/// Panic if any two objects across `scenes` share a name
#[track_caller]
pub fn assert_unique_names<'a>(scenes: impl IntoIterator<Item = &'a Scene>) {
    let mut seen = HashSet::new();
    for scene in scenes {
        for object in scene {
            assert!(seen.insert(object.name.clone()), "duplicate object name {}", object.name);
        }
    }
}
