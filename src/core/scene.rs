use glam::Vec3;
use log::debug;

use crate::config::FieldConfig;

use super::{
    particles::{scatter_from_config, Rotation, Spin},
    Camera, EdgeSet, PointerOffset, Viewport,
};

/// The particle field: an immutable base cloud, its rotation, and the links
/// derived from the rotated positions.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    base: Vec<Vec3>,
    transformed: Vec<Vec3>,
    rotation: Rotation,
    spin: Spin,
    pointer: PointerOffset,
    edges: EdgeSet,
    viewport: Viewport,
    ticks: u64,
}

impl Scene {
    /// Scatters a fresh cloud sized to `viewport`.
    pub fn new(config: &FieldConfig, viewport: Viewport) -> Self {
        Self::from_points(scatter_from_config(config), config, viewport)
    }

    /// Builds a scene over an explicit cloud. Positions and links reflect
    /// the identity rotation until the first tick.
    pub fn from_points(points: Vec<Vec3>, config: &FieldConfig, viewport: Viewport) -> Self {
        let camera = Camera::from_config(config, viewport.aspect_ratio().unwrap_or(1.0));
        let mut scene = Self {
            camera,
            transformed: Vec::with_capacity(points.len()),
            base: points,
            rotation: Rotation::default(),
            spin: Spin::from_config(config),
            pointer: PointerOffset::default(),
            edges: EdgeSet::new(config.link_distance),
            viewport,
            ticks: 0,
        };
        scene.refresh();
        debug!(
            "scene built: {} particles, {} links, viewport {}",
            scene.base.len(),
            scene.edges.len(),
            viewport
        );
        scene
    }

    /// One frame of simulation: spin, rotate the cloud, relink.
    pub fn tick(&mut self) {
        self.rotation.advance(self.spin, self.pointer);
        self.refresh();
        self.ticks += 1;
    }

    /// Stores the pointer for the next tick. Nothing moves until then.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = PointerOffset::from_screen(x, y, self.viewport);
    }

    /// Follows a viewport change. The cloud and its rotation are kept.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera
            .set_aspect_ratio(viewport.width as f32, viewport.height as f32);
    }

    fn refresh(&mut self) {
        self.rotation.apply(&self.base, &mut self.transformed);
        self.edges.rebuild(&self.transformed);
    }

    /// Current rotated positions.
    pub fn points(&self) -> &[Vec3] {
        &self.transformed
    }

    pub fn base_points(&self) -> &[Vec3] {
        &self.base
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn pointer(&self) -> PointerOffset {
        self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
