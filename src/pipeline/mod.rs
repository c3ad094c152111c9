use crate::{
    config::Style,
    core::{Scene, Viewport},
};
use glam::{Vec2, Vec3};
use log::trace;

pub mod buffer;
pub mod clipper;
pub mod rasterizer;

pub use buffer::{Buffer, FrameBuffer, TermBuffer};

/// What one call to [`Pipeline::render`] actually put on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub points_drawn: usize,
    pub edges_drawn: usize,
}

/// Turns a [`Scene`] into pixels.
///
/// Per frame:
/// 1. Clear the buffer to the background
/// 2. Move every particle into view space and project it
/// 3. Draw each link as its own segment, clipped to the near plane and the screen
/// 4. Draw every visible particle on top
pub struct Pipeline<B: Buffer> {
    buffer: B,
    style: Style,
    view: Vec<Vec3>,
    projected: Vec<Option<Vec2>>,
}

impl<B: Buffer> Pipeline<B> {
    pub fn new(viewport: Viewport, style: Style) -> Self {
        Self {
            buffer: B::new(viewport.width, viewport.height),
            style,
            view: Vec::new(),
            projected: Vec::new(),
        }
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.buffer.resize(viewport.width, viewport.height);
    }

    pub fn render(&mut self, scene: &Scene) -> FrameStats {
        self.buffer.clear(self.style.background);
        self.process_geometry(scene);

        let edges_drawn = self.draw_edges(scene);
        let points_drawn = self.draw_points();

        trace!(
            "frame {}: {} points, {} of {} links drawn",
            scene.ticks(),
            points_drawn,
            edges_drawn,
            scene.edges().len()
        );
        FrameStats {
            points_drawn,
            edges_drawn,
        }
    }

    fn process_geometry(&mut self, scene: &Scene) {
        let (w, h) = (self.buffer.width(), self.buffer.height());
        let camera = &scene.camera;

        self.view.clear();
        self.view
            .extend(scene.points().iter().map(|p| camera.to_view(*p)));

        self.projected.clear();
        self.projected
            .extend(self.view.iter().map(|v| camera.project_view(*v, w, h)));
    }

    fn draw_edges(&mut self, scene: &Scene) -> usize {
        let (w, h) = (self.buffer.width(), self.buffer.height());
        let camera = &scene.camera;
        let opacity = self.style.composite_edge_opacity();
        let mut drawn = 0;

        for edge in scene.edges().iter() {
            let Some((a, b)) = clipper::clip_near(self.view[edge.a], self.view[edge.b], camera.near())
            else {
                continue;
            };
            let (Some(sa), Some(sb)) = (camera.project_view(a, w, h), camera.project_view(b, w, h))
            else {
                continue;
            };
            let Some((sa, sb)) = clipper::clip_rect(sa, sb, w as f32, h as f32) else {
                continue;
            };
            self.buffer
                .draw_line(sa, sb, self.style.edge_color, opacity);
            drawn += 1;
        }
        drawn
    }

    fn draw_points(&mut self) -> usize {
        let (w, h) = (self.buffer.width() as f32, self.buffer.height() as f32);
        let opacity = self.style.composite_point_opacity();
        let mut drawn = 0;

        for screen in self.projected.iter().flatten() {
            if screen.x < 0.0 || screen.y < 0.0 || screen.x >= w || screen.y >= h {
                continue;
            }
            self.buffer.fill_square(
                *screen,
                self.style.point_size,
                self.style.point_color,
                opacity,
            );
            drawn += 1;
        }
        drawn
    }
}
