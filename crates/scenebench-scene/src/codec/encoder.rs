//! Scene → text
//!
//! Floats are written with `{:?}`, which is the shortest representation
//! that parses back to the identical `f64`.

use crate::types::{Rgb, Scene, SceneObject, Shape, Vec3};

const HEADER: &str = "#usda 1.0\n(\n    defaultPrim = \"World\"\n    upAxis = \"Z\"\n)\n\n";

/// Encode a scene as scene-description text
#[must_use]
pub fn encode(scene: &Scene) -> String {
    encode_objects(scene.objects())
}

/// Encode a list of objects under a `World` root
#[must_use]
pub fn encode_objects(objects: &[SceneObject]) -> String {
    let mut out = String::with_capacity(HEADER.len() + objects.len() * 900);
    out.push_str(HEADER);
    out.push_str("def Xform \"World\"\n{\n");
    for (i, object) in objects.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_object(&mut out, object);
    }
    out.push_str("}\n");
    out
}

fn write_object(out: &mut String, object: &SceneObject) {
    let name = &object.name;
    out.push_str(&format!(
        "    def {} \"{}\"\n    {{\n",
        object.kind().type_name(),
        name
    ));

    match object.shape {
        Shape::Sphere { radius } => {
            out.push_str(&format!("        double radius = {radius:?}\n"));
        }
        Shape::Cube { size } => {
            out.push_str(&format!("        double size = {size:?}\n"));
        }
        Shape::Cylinder { radius, height } | Shape::Cone { radius, height } => {
            out.push_str(&format!("        double height = {height:?}\n"));
            out.push_str(&format!("        double radius = {radius:?}\n"));
        }
    }

    out.push_str(&format!(
        "        double3 xformOp:translate = {}\n",
        triple(&object.position)
    ));
    out.push_str(&format!(
        "        double3 xformOp:scale = {}\n",
        triple(&Vec3::splat(object.scale))
    ));
    out.push_str(
        "        uniform token[] xformOpOrder = [\"xformOp:translate\", \"xformOp:scale\"]\n\n",
    );

    out.push_str("        def Material \"Material\"\n        {\n");
    out.push_str(&format!(
        "            token outputs:surface.connect = </World/{name}/Material/Surface.outputs:surface>\n\n"
    ));
    out.push_str("            def Shader \"Surface\"\n            {\n");
    out.push_str("                uniform token info:id = \"UsdPreviewSurface\"\n");
    out.push_str(&format!(
        "                color3f inputs:diffuseColor = {}\n",
        color_triple(&object.color)
    ));
    out.push_str(&format!(
        "                float inputs:metallic = {:?}\n",
        object.metallic
    ));
    out.push_str(&format!(
        "                float inputs:roughness = {:?}\n",
        object.roughness
    ));
    out.push_str("                token outputs:surface\n");
    out.push_str("            }\n        }\n    }\n");
}

fn triple(v: &Vec3) -> String {
    format!("({:?}, {:?}, {:?})", v.x, v.y, v.z)
}

fn color_triple(c: &Rgb) -> String {
    format!("({:?}, {:?}, {:?})", c.r, c.g, c.b)
}
