pub mod camera;
pub mod color;
pub mod edges;
pub mod particles;
pub mod scene;
pub mod viewport;

pub use camera::Camera;
pub use color::Color;
pub use edges::{Edge, EdgeSet};
pub use particles::{Rotation, Spin};
pub use scene::Scene;
pub use viewport::{PointerOffset, Viewport};
