use std::fmt::{self, Display, Formatter};

/// Size of the drawable area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `None` for a degenerate viewport so callers keep their previous aspect.
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }
}

impl Display for Viewport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pointer position relative to the viewport centre, each axis in `[-0.5, 0.5]`
/// while the pointer stays inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerOffset {
    pub x: f32,
    pub y: f32,
}

impl PointerOffset {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Maps raw pointer coordinates to `(x / width - 0.5, y / height - 0.5)`.
    pub fn from_screen(x: f32, y: f32, viewport: Viewport) -> Self {
        if viewport.is_empty() {
            return Self::default();
        }
        Self {
            x: x / viewport.width as f32 - 0.5,
            y: y / viewport.height as f32 - 0.5,
        }
    }
}
