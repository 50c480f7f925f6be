//! Seeded procedural case generator
//!
//! A [`CaseGenerator`] owns its PRNG and name counter; two generators built
//! from the same seed and driven with the same calls produce identical
//! edits. One instance per worker: it is `Send` but not meant to be shared.
//!
//! Whenever a requested operation cannot be satisfied by the initial scene
//! the generator substitutes `add_primitive` instead of failing. Both
//! simple-tier operations start from 0 to 2 objects, so roughly a third of
//! `change_color` draws land on an empty scene and become additions.

use rand::{rngs::StdRng, seq::index, seq::SliceRandom, Rng, SeedableRng};
use scenebench_scene::{
    collides_with_any, free_positions, line_positions, supported_colors, supported_positions,
    supported_scales, LineDirection, NamedColor, PrimitiveKind, Scene, SceneObject, Vec3,
    MIN_SEPARATION,
};

use crate::case::{ComplexityTier, GeneratedEdit};
use crate::expected::{ExpectedCheck, ExpectedMetrics, POSITION_TOLERANCE};
use crate::operation::{
    AddMultipleObjects, ChangeColor, ColorScheme, Composition, CompositionStep,
    CompositionalEdit, CreatePattern, DeleteObject, EditOperation, EditParams, MoveObject,
    ObjectSpec, OperationType, PatternLayout, ScaleObject,
};

/// Kinds placed by simple-tier cases
const SIMPLE_KINDS: [PrimitiveKind; 3] = [
    PrimitiveKind::Sphere,
    PrimitiveKind::Cube,
    PrimitiveKind::Cylinder,
];

const GRID_SHAPES: [(usize, usize); 3] = [(2, 3), (3, 3), (2, 2)];
const PATTERN_SPACING: f64 = 2.0;
const CIRCLE_RADIUS: f64 = 3.0;
/// Weighted toward unit scale
const PATTERN_SCALES: [f64; 4] = [1.0, 1.0, 1.0, 1.5];
const PATTERN_CENTERS: [Vec3; 2] = [Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0)];

const ARRANGEMENT_SPACING: f64 = 2.5;
const ARRANGEMENT_MAX: usize = 3;
const ARRANGEMENT_CENTERS: [Vec3; 3] = [
    Vec3::ZERO,
    Vec3::new(0.0, 0.0, 4.0),
    Vec3::new(0.0, 0.0, -4.0),
];
const CREATION_MAX: usize = 4;
const TRANSFORMATION_MAX: usize = 4;
const TRANSFORMATION_FACTORS: [f64; 2] = [1.5, 2.0];

/// Generator configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Minimum distance between generated objects
    pub min_separation: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            min_separation: MIN_SEPARATION,
        }
    }
}

impl GeneratorConfig {
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_min_separation(mut self, min_separation: f64) -> Self {
        self.min_separation = min_separation;
        self
    }
}

/// A caller-fixed new object for [`CaseGenerator::add_primitive_edit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectChoice {
    pub kind: PrimitiveKind,
    pub color: NamedColor,
    pub position: Vec3,
    pub scale: f64,
}

/// Deterministic generator of (initial, target, operation) triples
#[derive(Debug)]
pub struct CaseGenerator {
    rng: StdRng,
    config: GeneratorConfig,
    objects_created: u64,
    cases_created: u64,
}

impl CaseGenerator {
    /// Generator with default configuration and the given seed
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(GeneratorConfig::default().with_seed(seed))
    }

    #[must_use]
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            objects_created: 0,
            cases_created: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Objects named so far in this run
    #[inline]
    #[must_use]
    pub fn objects_created(&self) -> u64 {
        self.objects_created
    }

    /// One case of `tier`, operation drawn uniformly from its repertoire
    pub fn generate(&mut self, tier: ComplexityTier) -> GeneratedEdit {
        let operations = tier.operations();
        let operation = operations[self.rng.gen_range(0..operations.len())];
        self.generate_operation(operation)
    }

    /// One case of a specific operation on a freshly generated initial scene
    pub fn generate_operation(&mut self, operation: OperationType) -> GeneratedEdit {
        let initial = self.initial_scene_for(operation);
        match operation {
            OperationType::AddPrimitive => self.add_primitive_edit(&initial, None),
            OperationType::ChangeColor => self.change_color_edit(&initial),
            OperationType::MoveObject => self.move_object_edit(&initial),
            OperationType::ScaleObject => self.scale_object_edit(&initial),
            OperationType::DeleteObject => self.delete_object_edit(&initial),
            OperationType::AddMultipleObjects => self.add_multiple_objects_edit(&initial),
            OperationType::CreatePattern => self.create_pattern_edit(&initial),
            OperationType::CompositionalEdit => self.compositional_edit(&initial),
        }
    }

    /// Initial scene sized for `operation`'s tier
    pub fn initial_scene_for(&mut self, operation: OperationType) -> Scene {
        let (count, kinds): (usize, &[PrimitiveKind]) = match operation {
            OperationType::AddPrimitive | OperationType::ChangeColor => {
                (self.rng.gen_range(0..=2), &SIMPLE_KINDS)
            }
            OperationType::MoveObject
            | OperationType::ScaleObject
            | OperationType::DeleteObject
            | OperationType::AddMultipleObjects => (self.rng.gen_range(2..=4), &PrimitiveKind::ALL),
            OperationType::CreatePattern => (self.rng.gen_range(0..=1), &PrimitiveKind::ALL),
            OperationType::CompositionalEdit => (self.rng.gen_range(5..=8), &PrimitiveKind::ALL),
        };
        self.random_scene(count, kinds)
    }

    /// Up to `count` collision-free objects; stops early when the catalog runs out
    pub fn random_scene(&mut self, count: usize, kinds: &[PrimitiveKind]) -> Scene {
        let mut scene = Scene::new();
        for _ in 0..count {
            match self.try_place(&scene.positions(), kinds) {
                Some(object) => scene = scene.with_object(object),
                None => {
                    tracing::debug!(requested = count, placed = scene.len(), "position catalog exhausted");
                    break;
                }
            }
        }
        scene
    }

    /// Add one primitive, random unless `choice` fixes it
    pub fn add_primitive_edit(&mut self, initial: &Scene, choice: Option<ObjectChoice>) -> GeneratedEdit {
        self.add_primitive_in(ComplexityTier::Simple, initial, choice)
    }

    /// Recolor one object to a different palette color
    pub fn change_color_edit(&mut self, initial: &Scene) -> GeneratedEdit {
        let tier = ComplexityTier::Simple;
        let Some(index) = self.pick_index(initial.len()) else {
            return self.fallback(tier, initial, OperationType::ChangeColor, "scene is empty");
        };
        let object = &initial.objects()[index];
        let choices: Vec<NamedColor> = supported_colors(object.kind())
            .iter()
            .copied()
            .filter(|c| *c != object.color_name)
            .collect();
        let Some(new_color) = self.pick(&choices) else {
            return self.fallback(tier, initial, OperationType::ChangeColor, "no alternative color");
        };

        let params = ChangeColor {
            object_name: object.name.clone(),
            object_type: object.kind(),
            old_color_name: object.color_name,
            new_color_name: new_color,
            new_color: new_color.rgb(),
        };
        let target = initial.replaced(index, object.clone().with_color(new_color));
        let description = format!(
            "Change the {} {} to {}",
            object.color_name,
            object.kind(),
            new_color
        );
        let expected = ExpectedMetrics::new(target.len()).with_check(ExpectedCheck::ObjectColor {
            object_name: object.name.clone(),
            color: new_color.rgb(),
        });

        self.finish(
            tier,
            "change_color",
            initial,
            target,
            EditOperation::new(EditParams::ChangeColor(params), description),
            expected,
            false,
        )
    }

    /// Move one object to a free catalog position
    pub fn move_object_edit(&mut self, initial: &Scene) -> GeneratedEdit {
        let tier = ComplexityTier::Medium;
        let separation = self.config.min_separation;

        let mut order: Vec<usize> = (0..initial.len()).collect();
        order.shuffle(&mut self.rng);

        for index in order {
            let object = &initial.objects()[index];
            let others: Vec<Vec3> = initial
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, o)| o.position)
                .collect();
            let destinations: Vec<Vec3> =
                free_positions(supported_positions(object.kind()), &others, separation)
                    .into_iter()
                    .filter(|p| p.distance(&object.position) > 1e-9)
                    .collect();
            let Some(new_position) = self.pick(&destinations) else {
                continue;
            };

            let params = MoveObject {
                object_name: object.name.clone(),
                object_color: object.color_name,
                object_type: object.kind(),
                old_position: object.position,
                new_position,
            };
            let target = initial.replaced(index, object.clone().with_position(new_position));
            let description = format!(
                "Move the {} {} to {}",
                object.color_name,
                object.kind(),
                new_position
            );
            let expected =
                ExpectedMetrics::new(target.len()).with_check(ExpectedCheck::ObjectPosition {
                    object_name: object.name.clone(),
                    position: new_position,
                    tolerance: POSITION_TOLERANCE,
                });

            return self.finish(
                tier,
                "move_object",
                initial,
                target,
                EditOperation::new(EditParams::MoveObject(params), description),
                expected,
                false,
            );
        }

        self.fallback(tier, initial, OperationType::MoveObject, "no object has a free destination")
    }

    /// Rescale one object to a different catalog scale
    pub fn scale_object_edit(&mut self, initial: &Scene) -> GeneratedEdit {
        let tier = ComplexityTier::Medium;
        let Some(index) = self.pick_index(initial.len()) else {
            return self.fallback(tier, initial, OperationType::ScaleObject, "scene is empty");
        };
        let object = &initial.objects()[index];
        let choices: Vec<f64> = supported_scales(object.kind())
            .iter()
            .copied()
            .filter(|s| (s - object.scale).abs() > 1e-9)
            .collect();
        let new_scale = self.pick(&choices).unwrap_or(1.5);

        let params = ScaleObject {
            object_name: object.name.clone(),
            object_color: object.color_name,
            object_type: object.kind(),
            old_scale: object.scale,
            new_scale,
        };
        let target = initial.replaced(index, object.clone().with_scale(new_scale));
        let description = format!(
            "Scale the {} {} to {}x",
            object.color_name,
            object.kind(),
            new_scale
        );
        let expected = ExpectedMetrics::new(target.len()).with_check(ExpectedCheck::ObjectScale {
            object_name: object.name.clone(),
            scale: new_scale,
        });

        self.finish(
            tier,
            "scale_object",
            initial,
            target,
            EditOperation::new(EditParams::ScaleObject(params), description),
            expected,
            false,
        )
    }

    /// Remove one object; needs at least two
    pub fn delete_object_edit(&mut self, initial: &Scene) -> GeneratedEdit {
        let tier = ComplexityTier::Medium;
        if initial.len() < 2 {
            return self.fallback(tier, initial, OperationType::DeleteObject, "fewer than two objects");
        }
        let index = self.rng.gen_range(0..initial.len());
        let object = &initial.objects()[index];

        let params = DeleteObject {
            object_name: object.name.clone(),
            object_color: object.color_name,
            object_type: object.kind(),
            position: object.position,
        };
        let target = initial.without(index);
        let description = format!("Delete the {} {}", object.color_name, object.kind());
        let expected = ExpectedMetrics::new(target.len()).with_check(ExpectedCheck::ObjectAbsent {
            object_name: object.name.clone(),
        });

        self.finish(
            tier,
            "delete_object",
            initial,
            target,
            EditOperation::new(EditParams::DeleteObject(params), description),
            expected,
            false,
        )
    }

    /// Add two or three objects at once
    pub fn add_multiple_objects_edit(&mut self, initial: &Scene) -> GeneratedEdit {
        let tier = ComplexityTier::Medium;
        let wanted = self.rng.gen_range(2..=3);
        let (target, added) = self.place_several(initial, wanted, None);
        if added.is_empty() {
            return self.fallback(tier, initial, OperationType::AddMultipleObjects, "no free positions");
        }

        let description = format!("Add {} objects to the scene", added.len());
        let expected = added
            .iter()
            .fold(ExpectedMetrics::new(target.len()), |acc, spec| {
                acc.with_check(present(spec))
            });
        let params = AddMultipleObjects {
            num_objects: added.len(),
            objects: added,
        };

        self.finish(
            tier,
            "add_multiple",
            initial,
            target,
            EditOperation::new(EditParams::AddMultipleObjects(params), description),
            expected,
            false,
        )
    }

    /// Lay out a grid, circle or line of one primitive kind
    pub fn create_pattern_edit(&mut self, initial: &Scene) -> GeneratedEdit {
        let tier = ComplexityTier::Complex;
        let layout = match self.rng.gen_range(0..3) {
            0 => {
                let (rows, cols) = self.pick(&GRID_SHAPES).unwrap_or((2, 2));
                PatternLayout::Grid {
                    rows,
                    cols,
                    spacing: PATTERN_SPACING,
                }
            }
            1 => PatternLayout::Circle {
                count: self.rng.gen_range(6..=8),
                radius: CIRCLE_RADIUS,
            },
            _ => PatternLayout::Line {
                count: self.rng.gen_range(4..=6),
                spacing: PATTERN_SPACING,
                direction: self
                    .pick(&[LineDirection::Horizontal, LineDirection::Vertical])
                    .unwrap_or_default(),
            },
        };
        let kind = self.pick(&SIMPLE_KINDS).unwrap_or(PrimitiveKind::Sphere);
        let color_scheme = if self.rng.gen_bool(0.5) {
            ColorScheme::Single
        } else {
            ColorScheme::Varied
        };
        let base_color = self.random_color(kind);
        let scale = self.pick(&PATTERN_SCALES).unwrap_or(1.0);

        let (center, degraded) = clear_center(
            &PATTERN_CENTERS,
            &initial.positions(),
            self.config.min_separation,
            |c| layout.positions(c),
        );
        if degraded {
            tracing::warn!(pattern = layout.label(), "pattern overlaps the initial scene");
        }

        let mut target = initial.clone();
        let mut objects = Vec::with_capacity(layout.count());
        for position in layout.positions(center) {
            let color = match color_scheme {
                ColorScheme::Single => base_color,
                ColorScheme::Varied => self.random_color(kind),
            };
            let object = self.named_object(kind, color, position, scale);
            objects.push(ObjectSpec::from(&object));
            target = target.with_object(object);
        }

        let description = format!("Create a {} of {} {kind}s", layout.label(), objects.len());
        let expected = objects
            .iter()
            .fold(ExpectedMetrics::new(target.len()), |acc, spec| {
                acc.with_check(present(spec))
            });
        let label = format!("create_pattern_{}", layout.label());
        let params = CreatePattern {
            layout,
            primitive_type: kind,
            num_objects: objects.len(),
            color_scheme,
            center,
            objects,
        };

        self.finish(
            tier,
            &label,
            initial,
            target,
            EditOperation::new(EditParams::CreatePattern(params), description),
            expected,
            degraded,
        )
    }

    /// A bounded composite of one to four primitive sub-operations
    pub fn compositional_edit(&mut self, initial: &Scene) -> GeneratedEdit {
        match self.rng.gen_range(0..3) {
            0 => self.arrangement_edit(initial),
            1 => self.creation_edit(initial),
            _ => self.transformation_edit(initial),
        }
    }

    fn arrangement_edit(&mut self, initial: &Scene) -> GeneratedEdit {
        let tier = ComplexityTier::Complex;
        if initial.is_empty() {
            return self.fallback(tier, initial, OperationType::CompositionalEdit, "nothing to arrange");
        }
        let count = initial.len().min(ARRANGEMENT_MAX);
        let chosen = index::sample(&mut self.rng, initial.len(), count).into_vec();
        let direction = LineDirection::Horizontal;

        let others: Vec<Vec3> = initial
            .iter()
            .enumerate()
            .filter(|(i, _)| !chosen.contains(i))
            .map(|(_, o)| o.position)
            .collect();
        let (center, degraded) = clear_center(
            &ARRANGEMENT_CENTERS,
            &others,
            self.config.min_separation,
            |c| line_positions(count, ARRANGEMENT_SPACING, direction, c),
        );
        if degraded {
            tracing::warn!("arrangement line overlaps the remaining objects");
        }

        let mut target = initial.clone();
        let mut steps = Vec::with_capacity(count);
        let mut expected = ExpectedMetrics::new(initial.len());
        let slots = line_positions(count, ARRANGEMENT_SPACING, direction, center);
        for (&index, new_position) in chosen.iter().zip(slots) {
            let object = &initial.objects()[index];
            steps.push(CompositionStep::MoveObject(MoveObject {
                object_name: object.name.clone(),
                object_color: object.color_name,
                object_type: object.kind(),
                old_position: object.position,
                new_position,
            }));
            expected = expected.with_check(ExpectedCheck::ObjectPosition {
                object_name: object.name.clone(),
                position: new_position,
                tolerance: POSITION_TOLERANCE,
            });
            target = target.replaced(index, object.clone().with_position(new_position));
        }

        let description = format!("Arrange {count} objects in a line");
        let params = CompositionalEdit {
            composition: Composition::Arrangement {
                direction,
                spacing: ARRANGEMENT_SPACING,
            },
            steps,
        };
        self.finish(
            tier,
            "compositional_arrangement",
            initial,
            target,
            EditOperation::new(EditParams::CompositionalEdit(params), description),
            expected,
            degraded,
        )
    }

    fn creation_edit(&mut self, initial: &Scene) -> GeneratedEdit {
        let tier = ComplexityTier::Complex;
        let wanted = self.rng.gen_range(3..=CREATION_MAX);
        let (target, added) = self.place_several(initial, wanted, Some(1.0));
        if added.is_empty() {
            return self.fallback(tier, initial, OperationType::CompositionalEdit, "no free positions");
        }

        let description = format!("Create a colorful scene with {} new objects", added.len());
        let expected = added
            .iter()
            .fold(ExpectedMetrics::new(target.len()), |acc, spec| {
                acc.with_check(present(spec))
            });
        let params = CompositionalEdit {
            composition: Composition::Creation,
            steps: added.into_iter().map(CompositionStep::AddPrimitive).collect(),
        };
        self.finish(
            tier,
            "compositional_creation",
            initial,
            target,
            EditOperation::new(EditParams::CompositionalEdit(params), description),
            expected,
            false,
        )
    }

    fn transformation_edit(&mut self, initial: &Scene) -> GeneratedEdit {
        let tier = ComplexityTier::Complex;
        if initial.is_empty() {
            return self.fallback(tier, initial, OperationType::CompositionalEdit, "nothing to scale");
        }
        let factor = self.pick(&TRANSFORMATION_FACTORS).unwrap_or(2.0);
        let count = initial.len().min(TRANSFORMATION_MAX);
        let chosen = index::sample(&mut self.rng, initial.len(), count).into_vec();

        let mut target = initial.clone();
        let mut steps = Vec::with_capacity(count);
        let mut expected = ExpectedMetrics::new(initial.len());
        for &index in &chosen {
            let object = &initial.objects()[index];
            let new_scale = object.scale * factor;
            steps.push(CompositionStep::ScaleObject(ScaleObject {
                object_name: object.name.clone(),
                object_color: object.color_name,
                object_type: object.kind(),
                old_scale: object.scale,
                new_scale,
            }));
            expected = expected.with_check(ExpectedCheck::ObjectScale {
                object_name: object.name.clone(),
                scale: new_scale,
            });
            target = target.replaced(index, object.clone().with_scale(new_scale));
        }

        let description = format!("Make {count} objects {factor}x larger");
        let params = CompositionalEdit {
            composition: Composition::Transformation { factor },
            steps,
        };
        self.finish(
            tier,
            "compositional_transformation",
            initial,
            target,
            EditOperation::new(EditParams::CompositionalEdit(params), description),
            expected,
            false,
        )
    }

    fn add_primitive_in(
        &mut self,
        tier: ComplexityTier,
        initial: &Scene,
        choice: Option<ObjectChoice>,
    ) -> GeneratedEdit {
        let occupied = initial.positions();
        let (object, degraded) = match choice {
            Some(choice) => {
                let degraded =
                    collides_with_any(&choice.position, &occupied, self.config.min_separation);
                let object =
                    self.named_object(choice.kind, choice.color, choice.position, choice.scale);
                (object, degraded)
            }
            None => self.place_or_reuse(&occupied, kinds_for(tier)),
        };

        let spec = ObjectSpec::from(&object);
        let target = initial.clone().with_object(object);
        let description = format!("Add a {} {}", spec.color_name, spec.primitive_type);
        let expected = ExpectedMetrics::new(target.len()).with_check(present(&spec));
        let label = format!("add_{}", spec.primitive_type);

        self.finish(
            tier,
            &label,
            initial,
            target,
            EditOperation::new(EditParams::AddPrimitive(spec), description),
            expected,
            degraded,
        )
    }

    fn fallback(
        &mut self,
        tier: ComplexityTier,
        initial: &Scene,
        requested: OperationType,
        reason: &str,
    ) -> GeneratedEdit {
        tracing::debug!(%requested, reason, "substituting add_primitive");
        self.add_primitive_in(tier, initial, None)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &mut self,
        tier: ComplexityTier,
        label: &str,
        initial: &Scene,
        target: Scene,
        operation: EditOperation,
        expected: ExpectedMetrics,
        degraded: bool,
    ) -> GeneratedEdit {
        self.cases_created += 1;
        let id = format!("{tier}_{label}_{}", self.cases_created);
        tracing::debug!(%id, operation = %operation.operation_type(), degraded, "generated case");
        GeneratedEdit {
            id,
            complexity: tier,
            initial: initial.clone(),
            target,
            operation,
            expected,
            degraded,
        }
    }

    /// Place up to `wanted` new objects, each avoiding everything placed so far
    fn place_several(
        &mut self,
        initial: &Scene,
        wanted: usize,
        fixed_scale: Option<f64>,
    ) -> (Scene, Vec<ObjectSpec>) {
        let mut target = initial.clone();
        let mut added = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            let Some(mut object) = self.try_place(&target.positions(), &PrimitiveKind::ALL) else {
                tracing::debug!(wanted, placed = added.len(), "position catalog exhausted");
                break;
            };
            if let Some(scale) = fixed_scale {
                object = object.with_scale(scale);
            }
            added.push(ObjectSpec::from(&object));
            target = target.with_object(object);
        }
        (target, added)
    }

    /// Random object at a free position, or `None` when every catalog is full
    fn try_place(&mut self, occupied: &[Vec3], kinds: &[PrimitiveKind]) -> Option<SceneObject> {
        let separation = self.config.min_separation;
        let placeable: Vec<(PrimitiveKind, Vec<Vec3>)> = kinds
            .iter()
            .filter_map(|&kind| {
                let free = free_positions(supported_positions(kind), occupied, separation);
                (!free.is_empty()).then_some((kind, free))
            })
            .collect();
        let (kind, free) = placeable.choose(&mut self.rng)?;
        let position = *free.choose(&mut self.rng)?;
        Some(self.random_object_at(*kind, position))
    }

    /// Like [`Self::try_place`], but reuses an occupied position when full
    fn place_or_reuse(&mut self, occupied: &[Vec3], kinds: &[PrimitiveKind]) -> (SceneObject, bool) {
        if let Some(object) = self.try_place(occupied, kinds) {
            return (object, false);
        }
        let kind = self.pick(kinds).unwrap_or(PrimitiveKind::Sphere);
        let position = self
            .pick(supported_positions(kind))
            .unwrap_or(Vec3::ZERO);
        tracing::warn!(%kind, %position, "no free position left, reusing an occupied one");
        (self.random_object_at(kind, position), true)
    }

    fn random_object_at(&mut self, kind: PrimitiveKind, position: Vec3) -> SceneObject {
        let color = self.random_color(kind);
        let scale = self.pick(supported_scales(kind)).unwrap_or(1.0);
        self.named_object(kind, color, position, scale)
    }

    fn random_color(&mut self, kind: PrimitiveKind) -> NamedColor {
        self.pick(supported_colors(kind)).unwrap_or(NamedColor::Red)
    }

    /// Build an object with the next run-unique name
    fn named_object(
        &mut self,
        kind: PrimitiveKind,
        color: NamedColor,
        position: Vec3,
        scale: f64,
    ) -> SceneObject {
        self.objects_created += 1;
        let name = format!("{}{}_{}", color.title(), kind.type_name(), self.objects_created);
        SceneObject::new(name, kind, color, position, scale)
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        items.choose(&mut self.rng).copied()
    }

    fn pick_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }
}

fn kinds_for(tier: ComplexityTier) -> &'static [PrimitiveKind] {
    match tier {
        ComplexityTier::Simple => &SIMPLE_KINDS,
        ComplexityTier::Medium | ComplexityTier::Complex => &PrimitiveKind::ALL,
    }
}

fn present(spec: &ObjectSpec) -> ExpectedCheck {
    ExpectedCheck::ObjectPresent {
        primitive_type: spec.primitive_type,
        color: spec.color,
        position: spec.position,
    }
}

/// First center whose layout clears `occupied`; the first center, flagged
/// degraded, when none does
fn clear_center(
    centers: &[Vec3],
    occupied: &[Vec3],
    min_distance: f64,
    layout_at: impl Fn(Vec3) -> Vec<Vec3>,
) -> (Vec3, bool) {
    centers
        .iter()
        .find(|&&c| {
            layout_at(c)
                .iter()
                .all(|p| !collides_with_any(p, occupied, min_distance))
        })
        .map_or((centers.first().copied().unwrap_or(Vec3::ZERO), true), |&c| (c, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenebench_scene::{decode, is_collision_free};

    #[test]
    fn seeded_add_red_sphere_on_empty_scene() {
        let mut generator = CaseGenerator::new(42);
        let edit = generator.add_primitive_edit(
            &Scene::new(),
            Some(ObjectChoice {
                kind: PrimitiveKind::Sphere,
                color: NamedColor::Red,
                position: Vec3::ZERO,
                scale: 1.0,
            }),
        );

        let objects = decode(&edit.target.encode());
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].kind.primitive(), Some(PrimitiveKind::Sphere));
        assert!(objects[0].color.unwrap().within(&NamedColor::Red.rgb(), 0.05));
        assert!(objects[0].position().distance(&Vec3::ZERO) < 1e-6);
        assert_eq!(objects[0].name, "RedSphere_1");
        assert_eq!(edit.id, "simple_add_sphere_1");
        assert!(!edit.degraded);
    }

    #[test]
    fn change_color_on_empty_scene_falls_back_to_add() {
        let mut generator = CaseGenerator::new(7);
        let edit = generator.change_color_edit(&Scene::new());
        assert_eq!(edit.operation.operation_type(), OperationType::AddPrimitive);
        assert_eq!(edit.target.len(), 1);
    }

    #[test]
    fn delete_needs_two_objects() {
        let mut generator = CaseGenerator::new(7);
        let one = generator.random_scene(1, &SIMPLE_KINDS);
        let edit = generator.delete_object_edit(&one);
        assert_eq!(edit.operation.operation_type(), OperationType::AddPrimitive);
        assert_eq!(edit.complexity, ComplexityTier::Medium);

        let two = generator.random_scene(2, &SIMPLE_KINDS);
        let edit = generator.delete_object_edit(&two);
        assert_eq!(edit.operation.operation_type(), OperationType::DeleteObject);
        assert_eq!(edit.target.len(), 1);
    }

    #[test]
    fn change_color_always_picks_a_new_color() {
        let mut generator = CaseGenerator::new(3);
        for _ in 0..50 {
            let initial = generator.initial_scene_for(OperationType::ChangeColor);
            let edit = generator.change_color_edit(&initial);
            if let EditParams::ChangeColor(params) = &edit.operation.params {
                assert_ne!(params.old_color_name, params.new_color_name);
            }
        }
    }

    #[test]
    fn empty_change_color_scenes_become_additions() {
        let mut generator = CaseGenerator::new(17);
        let mut empty = 0;
        for _ in 0..60 {
            let edit = generator.generate_operation(OperationType::ChangeColor);
            let expected = if edit.initial.is_empty() {
                empty += 1;
                OperationType::AddPrimitive
            } else {
                OperationType::ChangeColor
            };
            assert_eq!(edit.operation.operation_type(), expected);
            assert!(edit.initial.len() <= 2);
        }
        assert!(empty > 0);
    }

    #[test]
    fn scale_always_changes_scale() {
        let mut generator = CaseGenerator::new(5);
        for _ in 0..50 {
            let initial = generator.initial_scene_for(OperationType::ScaleObject);
            let edit = generator.scale_object_edit(&initial);
            if let EditParams::ScaleObject(params) = &edit.operation.params {
                assert!((params.old_scale - params.new_scale).abs() > 1e-9);
            }
        }
    }

    #[test]
    fn random_scene_stops_when_catalog_is_full() {
        let mut generator = CaseGenerator::new(11);
        let scene = generator.random_scene(20, &PrimitiveKind::ALL);
        assert_eq!(scene.len(), 7);
        assert!(is_collision_free(&scene.positions(), MIN_SEPARATION));
    }

    #[test]
    fn full_scene_add_is_degraded() {
        let mut generator = CaseGenerator::new(11);
        let full = generator.random_scene(7, &PrimitiveKind::ALL);
        let edit = generator.add_multiple_objects_edit(&full);
        assert_eq!(edit.operation.operation_type(), OperationType::AddPrimitive);
        assert!(edit.degraded);
    }

    #[test]
    fn pattern_moves_off_origin_when_blocked() {
        let mut generator = CaseGenerator::new(1);
        let blocker = Scene::new().with_object(SceneObject::new(
            "RedCube_99",
            PrimitiveKind::Cube,
            NamedColor::Red,
            Vec3::ZERO,
            1.0,
        ));
        for _ in 0..20 {
            let edit = generator.create_pattern_edit(&blocker);
            let EditParams::CreatePattern(params) = &edit.operation.params else {
                panic!("expected a pattern");
            };
            assert!(is_collision_free(&edit.target.positions(), MIN_SEPARATION));
            assert_eq!(edit.target.len(), 1 + params.layout.count());
        }
    }

    #[test]
    fn compositional_steps_are_bounded() {
        let mut generator = CaseGenerator::new(9);
        for _ in 0..60 {
            let edit = generator.generate_operation(OperationType::CompositionalEdit);
            if let EditParams::CompositionalEdit(params) = &edit.operation.params {
                assert!((1..=4).contains(&params.steps.len()));
            }
        }
    }

    #[test]
    fn clear_center_prefers_first_free() {
        let occupied = [Vec3::ZERO];
        let (center, degraded) = clear_center(&PATTERN_CENTERS, &occupied, MIN_SEPARATION, |c| vec![c]);
        assert_eq!(center, Vec3::new(0.0, 0.0, 4.0));
        assert!(!degraded);

        let (center, degraded) = clear_center(&[Vec3::ZERO], &occupied, MIN_SEPARATION, |c| vec![c]);
        assert_eq!(center, Vec3::ZERO);
        assert!(degraded);
    }
}
