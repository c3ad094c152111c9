use crate::core::Color;

/// Number of particles in the cloud.
pub const PARTICLE_COUNT: usize = 150;
/// Side length of the cube the particles are scattered in, centred at the origin.
pub const FIELD_EXTENT: f32 = 60.0;
/// Two particles closer than this (strictly) get linked.
pub const LINK_DISTANCE: f32 = 7.0;

/// Everything that shapes the simulated field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub particle_count: usize,
    pub extent: f32,
    pub link_distance: f32,
    /// Radians added to `rot_x` every tick regardless of the pointer.
    pub base_spin_x: f32,
    /// Radians added to `rot_y` every tick regardless of the pointer.
    pub base_spin_y: f32,
    /// Scales the normalized pointer offset into extra spin.
    pub pointer_gain: f32,
    pub camera_distance: f32,
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Fixed RNG seed. `None` draws from the thread rng.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            extent: FIELD_EXTENT,
            link_distance: LINK_DISTANCE,
            base_spin_x: 0.0005,
            base_spin_y: 0.001,
            pointer_gain: 0.01,
            camera_distance: 30.0,
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            seed: None,
        }
    }
}

/// How the field is painted.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub background: Color,
    pub point_color: Color,
    pub point_opacity: f32,
    /// Edge length of the square drawn for each particle, in pixels.
    pub point_size: u32,
    pub edge_color: Color,
    pub edge_opacity: f32,
    /// Opacity of the whole particle layer over the background. Scales both
    /// the point and the edge opacity.
    pub layer_opacity: f32,
}

impl Style {
    /// Point opacity as it lands on the background.
    pub fn composite_point_opacity(&self) -> f32 {
        self.point_opacity * self.layer_opacity
    }

    /// Edge opacity as it lands on the background.
    pub fn composite_edge_opacity(&self) -> f32 {
        self.edge_opacity * self.layer_opacity
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: Color::MIDNIGHT,
            point_color: Color::CYAN,
            point_opacity: 0.8,
            point_size: 2,
            edge_color: Color::DEEP_VIOLET,
            edge_opacity: 0.15,
            layer_opacity: 0.7,
        }
    }
}
