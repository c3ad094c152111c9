use glam::{Mat3, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::FieldConfig;

use super::PointerOffset;

/// Scatters `count` points uniformly over a cube of side `extent` centred at the origin.
pub fn scatter<R: Rng + ?Sized>(rng: &mut R, count: usize, extent: f32) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            Vec3::new(
                (rng.gen::<f32>() - 0.5) * extent,
                (rng.gen::<f32>() - 0.5) * extent,
                (rng.gen::<f32>() - 0.5) * extent,
            )
        })
        .collect()
}

/// Draws the cloud described by `config`, honouring its seed when present.
pub fn scatter_from_config(config: &FieldConfig) -> Vec<Vec3> {
    match config.seed {
        Some(seed) => scatter(
            &mut StdRng::seed_from_u64(seed),
            config.particle_count,
            config.extent,
        ),
        None => scatter(&mut rand::thread_rng(), config.particle_count, config.extent),
    }
}

/// Per-tick spin of the cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub base_x: f32,
    pub base_y: f32,
    pub pointer_gain: f32,
}

impl Spin {
    pub fn from_config(config: &FieldConfig) -> Self {
        Self {
            base_x: config.base_spin_x,
            base_y: config.base_spin_y,
            pointer_gain: config.pointer_gain,
        }
    }
}

impl Default for Spin {
    fn default() -> Self {
        Self::from_config(&FieldConfig::default())
    }
}

/// Accumulated rotation of the whole cloud, in radians.
///
/// The angles are never wrapped: sin/cos are periodic, so an ever growing
/// angle draws the same as its reduced form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
}

impl Rotation {
    /// Pointer x steers the spin around y, pointer y the spin around x.
    pub fn advance(&mut self, spin: Spin, pointer: PointerOffset) {
        self.y += spin.base_y + pointer.x * spin.pointer_gain;
        self.x += spin.base_x + pointer.y * spin.pointer_gain;
    }

    /// Rotation about x, then y, with no roll.
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_rotation_x(self.x) * Mat3::from_rotation_y(self.y)
    }

    /// Writes `base` rotated by `self` into `out`, reusing its allocation.
    pub fn apply(&self, base: &[Vec3], out: &mut Vec<Vec3>) {
        let m = self.matrix();
        out.clear();
        out.extend(base.iter().map(|p| m * *p));
    }
}
