use log::{debug, info};

use crate::{
    config::Style,
    core::{Scene, Viewport},
    error::FieldError,
    pipeline::{FrameBuffer, FrameStats, Pipeline},
    Metrics,
};

/// Where a mounted particle field ends up on screen.
///
/// Dropping a surface releases everything it holds; there is no separate
/// close call.
pub trait Surface {
    fn resize(&mut self, viewport: Viewport);
    /// Renders `scene` and shows it.
    fn draw(&mut self, scene: &Scene) -> Result<FrameStats, FieldError>;
}

/// Off-screen surface. Frames are rendered into a [`FrameBuffer`] and kept
/// there, which is all tests and benchmarks need.
pub struct HeadlessSurface {
    pipeline: Pipeline<FrameBuffer>,
    metrics: Metrics,
    frames: u64,
    edges_drawn: u64,
}

impl HeadlessSurface {
    pub fn new(viewport: Viewport, style: Style) -> Self {
        debug!("headless surface {}", viewport);
        Self {
            pipeline: Pipeline::new(viewport, style),
            metrics: Metrics::new(),
            frames: 0,
            edges_drawn: 0,
        }
    }

    pub fn buffer(&self) -> &FrameBuffer {
        self.pipeline.buffer()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Surface for HeadlessSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.pipeline.resize(viewport);
    }

    fn draw(&mut self, scene: &Scene) -> Result<FrameStats, FieldError> {
        let stats = self.pipeline.render(scene);
        self.metrics.tick();
        self.frames += 1;
        self.edges_drawn += stats.edges_drawn as u64;
        Ok(stats)
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        let avg_edges = if self.frames == 0 {
            0.0
        } else {
            self.edges_drawn as f64 / self.frames as f64
        };
        info!(
            "headless surface released after {} frames, {:.1} links/frame | {}",
            self.frames, avg_edges, self.metrics
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::FieldConfig, core::Color};
    use glam::Vec3;

    #[test]
    fn headless_surface_keeps_the_last_frame() {
        let viewport = Viewport::new(80, 60);
        let scene = Scene::from_points(vec![Vec3::ZERO], &FieldConfig::default(), viewport);
        let mut surface = HeadlessSurface::new(viewport, Style::default());

        let stats = surface.draw(&scene).unwrap();
        surface.draw(&scene).unwrap();

        assert_eq!(stats.points_drawn, 1);
        assert_eq!(surface.frames(), 2);
        assert_eq!(surface.buffer().pixel(0, 0), Some(Color::MIDNIGHT.to_u32()));
        assert_ne!(surface.buffer().pixel(40, 30), Some(Color::MIDNIGHT.to_u32()));
    }

    #[test]
    fn resize_reaches_the_buffer() {
        let mut surface = HeadlessSurface::new(Viewport::new(80, 60), Style::default());
        surface.resize(Viewport::new(32, 24));
        assert_eq!(surface.buffer().pixel(31, 23), Some(0));
        assert_eq!(surface.buffer().pixel(32, 0), None);
    }
}
