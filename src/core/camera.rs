use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::config::FieldConfig;

/// Perspective camera fixed on a point. Matrices are rebuilt eagerly whenever
/// a parameter changes, so the getters are plain copies.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    /// Vertical field of view, degrees.
    fov: f32,
    aspect_ratio: f32,
    /// The near plane of the camera, anything closer than this will not be rendered
    near: f32,
    /// The far plane of the camera, anything beyond this will not be rendered
    far: f32,

    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    pub fn new(
        position: Vec3,
        target: Vec3,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            target,
            fov,
            aspect_ratio,
            near,
            far,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.update_view_matrix();
        camera.update_projection_matrix();
        camera
    }

    /// Camera on the +z axis looking back at the origin, as the field expects.
    pub fn from_config(config: &FieldConfig, aspect_ratio: f32) -> Self {
        Self::new(
            Vec3::new(0.0, 0.0, config.camera_distance),
            Vec3::ZERO,
            config.fov,
            aspect_ratio,
            config.near,
            config.far,
        )
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Ignores degenerate sizes so a minimised window keeps the last good aspect.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.aspect_ratio = width / height;
        self.update_projection_matrix();
    }

    /// World space to view space. The camera looks down -z in view space.
    pub fn to_view(&self, world: Vec3) -> Vec3 {
        self.view_matrix.transform_point3(world)
    }

    /// Whether a view-space point lies in front of the near plane.
    pub fn in_front(&self, view: Vec3) -> bool {
        -view.z >= self.near
    }

    /// Projects a view-space point to pixel coordinates with y pointing down.
    /// Points behind the near plane have no projection.
    pub fn project_view(&self, view: Vec3, width: usize, height: usize) -> Option<Vec2> {
        if !self.in_front(view) {
            return None;
        }
        let clip = self.projection_matrix * Vec4::from((view, 1.0));
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = Vec2::new(clip.x / clip.w, clip.y / clip.w);
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * width as f32,
            (1.0 - ndc.y) * 0.5 * height as f32,
        ))
    }

    fn update_view_matrix(&mut self) {
        self.view_matrix = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
    }

    fn update_projection_matrix(&mut self) {
        self.projection_matrix =
            Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect_ratio, self.near, self.far);
    }
}
