//! Scene description: primitives, lights and integrator parameters.

use crate::config::{validate_background, validate_russian_roulette};
use crate::sampling::sample_by_area;
use crate::{AreaSample, Bvh, Color, ConfigError, Intersection, Primitive, RenderSettings, SplitMethod};
use ember_math::{Aabb, Ray};
use rand::RngCore;
use std::sync::Arc;

/// An immutable, fully built scene.
///
/// Holds the BVH over every primitive plus the subset that emits light.
/// Shared by reference between render threads.
pub struct Scene {
    primitives: Vec<Arc<dyn Primitive>>,
    emitters: Vec<Arc<dyn Primitive>>,
    bvh: Bvh,
    pub(crate) max_depth: u32,
    pub(crate) russian_roulette: f32,
    pub(crate) background: Color,
}

impl Scene {
    /// Nearest hit along `ray` over the whole scene.
    pub fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        self.bvh.intersect(ray)
    }

    /// Draw a point on the union of all emitters, by area.
    ///
    /// `None` when the scene has no emitting area.
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> Option<AreaSample> {
        sample_by_area(&self.emitters, rng)
    }

    pub fn primitives(&self) -> &[Arc<dyn Primitive>] {
        &self.primitives
    }

    pub fn emitters(&self) -> &[Arc<dyn Primitive>] {
        &self.emitters
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn bounds(&self) -> Aabb {
        self.bvh.bounds()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn russian_roulette(&self) -> f32 {
        self.russian_roulette
    }

    pub fn background(&self) -> Color {
        self.background
    }
}

/// Collects primitives and parameters, then builds a [`Scene`].
pub struct SceneBuilder {
    primitives: Vec<Arc<dyn Primitive>>,
    max_depth: u32,
    russian_roulette: f32,
    background: Color,
    split_method: SplitMethod,
    max_prims_in_node: usize,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBuilder {
    pub fn new() -> Self {
        let defaults = RenderSettings::default();
        Self {
            primitives: Vec::new(),
            max_depth: defaults.max_depth,
            russian_roulette: defaults.russian_roulette,
            background: defaults.background_color(),
            split_method: defaults.split_method,
            max_prims_in_node: defaults.max_prims_in_node,
        }
    }

    /// Add a primitive.
    pub fn add(self, primitive: impl Primitive + 'static) -> Self {
        self.add_arc(Arc::new(primitive))
    }

    /// Add an already shared primitive.
    pub fn add_arc(mut self, primitive: Arc<dyn Primitive>) -> Self {
        self.primitives.push(primitive);
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_russian_roulette(mut self, probability: f32) -> Self {
        self.russian_roulette = probability;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_split_method(mut self, split_method: SplitMethod) -> Self {
        self.split_method = split_method;
        self
    }

    pub fn with_max_prims_in_node(mut self, max_prims_in_node: usize) -> Self {
        self.max_prims_in_node = max_prims_in_node;
        self
    }

    /// Take depth, roulette, background and BVH options from `settings`.
    pub fn with_settings(self, settings: &RenderSettings) -> Self {
        self.with_max_depth(settings.max_depth)
            .with_russian_roulette(settings.russian_roulette)
            .with_background(settings.background_color())
            .with_split_method(settings.split_method)
            .with_max_prims_in_node(settings.max_prims_in_node)
    }

    /// Validate the parameters and build the BVH.
    pub fn build(self) -> Result<Scene, ConfigError> {
        validate_russian_roulette(self.russian_roulette)?;
        validate_background(self.background.to_array())?;

        let emitters: Vec<_> = self
            .primitives
            .iter()
            .filter(|p| p.has_emit())
            .cloned()
            .collect();

        if emitters.is_empty() {
            log::warn!("Scene has no emissive primitives; direct lighting will be black");
        }

        log::info!(
            "Building scene: {} primitives, {} emitters",
            self.primitives.len(),
            emitters.len()
        );

        let bvh = Bvh::new(
            self.primitives.clone(),
            self.max_prims_in_node,
            self.split_method,
        );

        Ok(Scene {
            primitives: self.primitives,
            emitters,
            bvh,
            max_depth: self.max_depth,
            russian_roulette: self.russian_roulette,
            background: self.background,
        })
    }
}
