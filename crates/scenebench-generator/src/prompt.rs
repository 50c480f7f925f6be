//! Natural-language instructions for edit operations
//!
//! Templates hold `{slot}` placeholders that are filled from small synonym
//! pools. Variation generation is bounded: after
//! `k * attempts_per_variation` draws the remaining slots are filled by
//! repeating the distinct prompts already found.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use scenebench_scene::{position_descriptors, NamedColor, PrimitiveKind, Vec3};

use crate::operation::{
    ChangeColor, Composition, CompositionStep, CompositionalEdit, CreatePattern, DeleteObject,
    EditParams, MoveObject, ObjectSpec, PatternLayout, ScaleObject,
};

/// Default draw budget per requested variation
pub const DEFAULT_ATTEMPTS_PER_VARIATION: usize = 50;

const ADD_PRIMITIVE: &[&str] = &[
    "Add {article} {color} {primitive} {position}",
    "Create {article} {color} {primitive} {position}",
    "Put {article} {color} {primitive} {position}",
    "I want {article} {color} {primitive} {position}",
    "Place {article} {color} {primitive} {position}",
    "Make {article} {color} {primitive} {position}",
];

const CHANGE_COLOR: &[&str] = &[
    "Make the {object} {new_color}",
    "Change the {object}'s color to {new_color}",
    "Turn the {object} {new_color}",
    "Set the {object} color to {new_color}",
    "Color the {object} {new_color}",
    "Change the color of the {object} to {new_color}",
];

const MOVE_OBJECT: &[&str] = &[
    "Move the {object} {position}",
    "Shift the {object} {position}",
    "Relocate the {object} {position}",
    "Put the {object} {position}",
    "Change the position of the {object} so it is {position}",
];

const SCALE_OBJECT: &[&str] = &[
    "Make the {object} {scale}",
    "Scale the {object} to {factor}x",
    "Change the {object} size to {scale}",
    "Resize the {object} to {scale}",
];

const DELETE_OBJECT: &[&str] = &[
    "Remove the {object}",
    "Delete the {object}",
    "Get rid of the {object}",
    "Take away the {object}",
];

const ADD_ONE: &[&str] = &["Add {objects}", "Place {objects} in the scene", "Create {objects}"];

const ADD_SEVERAL: &[&str] = &[
    "Add {objects}",
    "Place {objects} in the scene",
    "Create {objects}",
    "Put {objects} into the scene",
];

const GRID: &[&str] = &[
    "Create a grid of {primitive}s",
    "Make a grid pattern with {primitive}s",
    "Arrange {count} {primitive}s in a grid",
    "Put {primitive}s in a grid formation",
];

const CIRCLE: &[&str] = &[
    "Create a circle of {primitive}s",
    "Arrange {count} {primitive}s in a circle",
    "Make a circular pattern with {primitive}s",
    "Put {primitive}s in a circle",
];

const LINE: &[&str] = &[
    "Create a line of {primitive}s",
    "Arrange {primitive}s in a line",
    "Make a row of {primitive}s",
    "Put {count} {primitive}s in a line",
];

const ARRANGEMENT: &[&str] = &[
    "Arrange the {objects} in a line",
    "Put the {objects} in a row",
    "Line up the {objects} horizontally",
    "Organize the {objects} in a horizontal line",
];

const CREATION: &[&str] = &[
    "Create a colorful scene with {objects}",
    "Add {objects} to make an interesting scene",
    "Make a diverse scene by adding {objects}",
    "Fill the scene with {objects}",
];

const TRANSFORMATION: &[&str] = &[
    "Make the {objects} {scale}",
    "Scale up the {objects} by {factor}x",
    "Increase the size of the {objects} {factor} times",
    "Make the {objects} bigger, {scale}",
];

fn primitive_synonyms(kind: PrimitiveKind) -> &'static [&'static str] {
    match kind {
        PrimitiveKind::Sphere => &["sphere", "ball", "spherical object"],
        PrimitiveKind::Cube => &["cube", "box", "cubic object"],
        PrimitiveKind::Cylinder => &["cylinder", "cylindrical object", "tube"],
        PrimitiveKind::Cone => &["cone", "conical object", "pyramid"],
    }
}

/// Synonyms for a scale factor; unknown factors get a literal phrase
fn scale_descriptors(scale: f64) -> Vec<String> {
    let fixed: &[&str] = if (scale - 0.5).abs() < 1e-9 {
        &["smaller", "half the size", "half size"]
    } else if (scale - 1.0).abs() < 1e-9 {
        &["normal size", "regular size", "original size"]
    } else if (scale - 1.5).abs() < 1e-9 {
        &["larger", "1.5 times the size", "50% larger"]
    } else if (scale - 2.0).abs() < 1e-9 {
        &["twice as large", "double the size", "much larger"]
    } else {
        &[]
    };
    if fixed.is_empty() {
        vec![format!("{scale}x size")]
    } else {
        fixed.iter().map(|s| (*s).to_string()).collect()
    }
}

/// Randomized, template-based instruction writer
#[derive(Debug)]
pub struct Paraphraser {
    rng: StdRng,
    attempts_per_variation: usize,
}

impl Paraphraser {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            attempts_per_variation: DEFAULT_ATTEMPTS_PER_VARIATION,
        }
    }

    /// Draw budget per requested variation (minimum 1)
    #[inline]
    #[must_use]
    pub fn with_attempts_per_variation(mut self, attempts: usize) -> Self {
        self.attempts_per_variation = attempts.max(1);
        self
    }

    /// One instruction for `params`
    pub fn generate_prompt(&mut self, params: &EditParams) -> String {
        match params {
            EditParams::AddPrimitive(spec) => self.add_primitive(spec),
            EditParams::ChangeColor(p) => self.change_color(p),
            EditParams::MoveObject(p) => self.move_object(p),
            EditParams::ScaleObject(p) => self.scale_object(p),
            EditParams::DeleteObject(p) => self.delete_object(p),
            EditParams::AddMultipleObjects(p) => self.add_objects(&p.objects),
            EditParams::CreatePattern(p) => self.create_pattern(p),
            EditParams::CompositionalEdit(p) => self.compositional(p),
        }
    }

    /// `k` textually distinct instructions when the phrasing space allows
    ///
    /// Always returns exactly `k` prompts; duplicates appear only once the
    /// attempt budget is spent.
    pub fn generate_prompt_variations(&mut self, params: &EditParams, k: usize) -> Vec<String> {
        let budget = k.saturating_mul(self.attempts_per_variation);
        let mut variations: Vec<String> = Vec::with_capacity(k);
        let mut attempts = 0;

        while variations.len() < k && attempts < budget {
            attempts += 1;
            let prompt = self.generate_prompt(params);
            if !variations.contains(&prompt) {
                variations.push(prompt);
            }
        }

        if variations.len() < k {
            tracing::warn!(
                requested = k,
                distinct = variations.len(),
                operation = %params.operation_type(),
                "prompt space exhausted, repeating variations"
            );
            if variations.is_empty() {
                variations.push(self.generate_prompt(params));
            }
            let distinct = variations.len();
            for i in 0..k - distinct {
                let repeat = variations[i % distinct].clone();
                variations.push(repeat);
            }
        }
        variations
    }

    fn add_primitive(&mut self, spec: &ObjectSpec) -> String {
        let template = self.pick(ADD_PRIMITIVE);
        let primitive = self.primitive(spec.primitive_type);
        let position = self.position(&spec.position);
        fill(
            template,
            &[
                ("article", article(spec.color_name.as_str())),
                ("color", spec.color_name.as_str()),
                ("primitive", &primitive),
                ("position", &position),
            ],
        )
    }

    fn change_color(&mut self, p: &ChangeColor) -> String {
        let template = self.pick(CHANGE_COLOR);
        let object = self.object(p.old_color_name, p.object_type);
        fill(
            template,
            &[("object", &object), ("new_color", p.new_color_name.as_str())],
        )
    }

    fn move_object(&mut self, p: &MoveObject) -> String {
        let template = self.pick(MOVE_OBJECT);
        let object = self.object(p.object_color, p.object_type);
        let position = self.position(&p.new_position);
        fill(template, &[("object", &object), ("position", &position)])
    }

    fn scale_object(&mut self, p: &ScaleObject) -> String {
        let template = self.pick(SCALE_OBJECT);
        let object = self.object(p.object_color, p.object_type);
        let scale = self.pick_owned(&scale_descriptors(p.new_scale));
        fill(
            template,
            &[
                ("object", &object),
                ("scale", &scale),
                ("factor", &p.new_scale.to_string()),
            ],
        )
    }

    fn delete_object(&mut self, p: &DeleteObject) -> String {
        let template = self.pick(DELETE_OBJECT);
        let object = self.object(p.object_color, p.object_type);
        fill(template, &[("object", &object)])
    }

    fn add_objects(&mut self, specs: &[ObjectSpec]) -> String {
        if specs.len() > 3 {
            return format!("Add {} objects to the scene", specs.len());
        }
        let template = self.pick(if specs.len() == 1 { ADD_ONE } else { ADD_SEVERAL });
        let objects = self.object_list(specs.iter().map(|s| (s.color_name, s.primitive_type)), true);
        fill(template, &[("objects", &objects)])
    }

    fn create_pattern(&mut self, p: &CreatePattern) -> String {
        let templates = match p.layout {
            PatternLayout::Grid { .. } => GRID,
            PatternLayout::Circle { .. } => CIRCLE,
            PatternLayout::Line { .. } => LINE,
        };
        let template = self.pick(templates);
        let primitive = self.primitive(p.primitive_type);
        fill(
            template,
            &[("primitive", &primitive), ("count", &p.num_objects.to_string())],
        )
    }

    fn compositional(&mut self, p: &CompositionalEdit) -> String {
        match p.composition {
            Composition::Arrangement { .. } => {
                let moved = p.steps.iter().filter_map(|s| match s {
                    CompositionStep::MoveObject(m) => Some((m.object_color, m.object_type)),
                    _ => None,
                });
                let objects = self.object_list(moved, false);
                let template = self.pick(ARRANGEMENT);
                fill(template, &[("objects", &objects)])
            }
            Composition::Creation => {
                let added = p.steps.iter().filter_map(|s| match s {
                    CompositionStep::AddPrimitive(spec) => Some((spec.color_name, spec.primitive_type)),
                    _ => None,
                });
                let objects = self.object_list(added, true);
                let template = self.pick(CREATION);
                fill(template, &[("objects", &objects)])
            }
            Composition::Transformation { factor } => {
                let scaled = p.steps.iter().filter_map(|s| match s {
                    CompositionStep::ScaleObject(sc) => Some((sc.object_color, sc.object_type)),
                    _ => None,
                });
                let objects = self.object_list(scaled, false);
                let scale = self.pick_owned(&scale_descriptors(factor));
                let template = self.pick(TRANSFORMATION);
                fill(
                    template,
                    &[
                        ("objects", &objects),
                        ("scale", &scale),
                        ("factor", &factor.to_string()),
                    ],
                )
            }
        }
    }

    /// "red ball"
    fn object(&mut self, color: NamedColor, kind: PrimitiveKind) -> String {
        format!("{color} {}", self.primitive(kind))
    }

    /// "red ball, blue box and green tube" (with articles when `indefinite`)
    fn object_list(
        &mut self,
        items: impl Iterator<Item = (NamedColor, PrimitiveKind)>,
        indefinite: bool,
    ) -> String {
        let items: Vec<(NamedColor, PrimitiveKind)> = items.collect();
        let phrases: Vec<String> = items
            .into_iter()
            .map(|(color, kind)| {
                let object = self.object(color, kind);
                if indefinite {
                    format!("{} {object}", article(&object))
                } else {
                    object
                }
            })
            .collect();
        join_list(&phrases)
    }

    fn primitive(&mut self, kind: PrimitiveKind) -> String {
        self.pick(primitive_synonyms(kind)).to_string()
    }

    fn position(&mut self, position: &Vec3) -> String {
        self.pick_owned(&position_descriptors(position))
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn pick_owned(&mut self, items: &[String]) -> String {
        items.choose(&mut self.rng).cloned().unwrap_or_default()
    }
}

/// Indefinite article for the word that follows it
fn article(next: &str) -> &'static str {
    match next.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// "a", "a and b", "a, b and c"
fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// Replace every `{slot}` with its value
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    slots
        .iter()
        .fold(template.to_string(), |acc, (slot, value)| {
            acc.replace(&format!("{{{slot}}}"), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{AddMultipleObjects, ObjectSpec};
    use scenebench_scene::Vec3;

    fn red_sphere_at_origin() -> EditParams {
        EditParams::AddPrimitive(ObjectSpec {
            object_name: "RedSphere_1".into(),
            primitive_type: PrimitiveKind::Sphere,
            color_name: NamedColor::Red,
            color: NamedColor::Red.rgb(),
            position: Vec3::ZERO,
            scale: 1.0,
        })
    }

    #[test]
    fn fill_replaces_all_slots() {
        assert_eq!(
            fill("Add a {color} {primitive}", &[("color", "red"), ("primitive", "ball")]),
            "Add a red ball"
        );
    }

    #[test]
    fn article_follows_the_next_word() {
        assert_eq!(article("orange"), "an");
        assert_eq!(article("Orange"), "an");
        assert_eq!(article("red"), "a");
        assert_eq!(article(""), "a");
    }

    #[test]
    fn orange_objects_take_an() {
        let orange_cube = EditParams::AddPrimitive(ObjectSpec {
            object_name: "OrangeCube_1".into(),
            primitive_type: PrimitiveKind::Cube,
            color_name: NamedColor::Orange,
            color: NamedColor::Orange.rgb(),
            position: Vec3::ZERO,
            scale: 1.0,
        });
        let mut paraphraser = Paraphraser::new(7);
        for _ in 0..20 {
            let prompt = paraphraser.generate_prompt(&orange_cube);
            assert!(prompt.contains(" an orange "), "{prompt}");
            assert!(!prompt.contains(" a orange"), "{prompt}");
        }
        assert!(paraphraser.generate_prompt(&red_sphere_at_origin()).contains(" a red "));
    }

    #[test]
    fn join_list_uses_commas_and_and() {
        let items: Vec<String> = ["a", "b", "c"].iter().map(|s| (*s).to_string()).collect();
        assert_eq!(join_list(&items), "a, b and c");
        assert_eq!(join_list(&items[..2]), "a and b");
        assert_eq!(join_list(&items[..1]), "a");
    }

    #[test]
    fn add_prompt_mentions_color_and_no_slots() {
        let mut paraphraser = Paraphraser::new(42);
        for _ in 0..20 {
            let prompt = paraphraser.generate_prompt(&red_sphere_at_origin());
            assert!(prompt.contains("red"));
            assert!(!prompt.contains('{'));
        }
    }

    #[test]
    fn variations_are_distinct() {
        let mut paraphraser = Paraphraser::new(42);
        let prompts = paraphraser.generate_prompt_variations(&red_sphere_at_origin(), 5);
        assert_eq!(prompts.len(), 5);
        let mut unique = prompts.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn oversized_requests_terminate_with_duplicates() {
        let params = EditParams::AddMultipleObjects(AddMultipleObjects {
            num_objects: 4,
            objects: vec![
                ObjectSpec {
                    object_name: "RedCube_1".into(),
                    primitive_type: PrimitiveKind::Cube,
                    color_name: NamedColor::Red,
                    color: NamedColor::Red.rgb(),
                    position: Vec3::ZERO,
                    scale: 1.0,
                };
                4
            ],
        });
        let mut paraphraser = Paraphraser::new(1).with_attempts_per_variation(3);
        let prompts = paraphraser.generate_prompt_variations(&params, 6);
        assert_eq!(prompts.len(), 6);
        assert!(prompts.iter().all(|p| p == "Add 4 objects to the scene"));
    }

    #[test]
    fn zero_variations_is_empty() {
        let mut paraphraser = Paraphraser::new(0);
        assert!(paraphraser
            .generate_prompt_variations(&red_sphere_at_origin(), 0)
            .is_empty());
    }

    #[test]
    fn scale_descriptors_fall_back_to_literal() {
        assert_eq!(scale_descriptors(3.0), vec!["3x size".to_string()]);
        assert_eq!(scale_descriptors(0.5).len(), 3);
    }
}
