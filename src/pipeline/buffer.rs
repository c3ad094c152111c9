use crate::core::Color;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};
use glam::Vec2;
use rayon::iter::ParallelIterator;
use rayon::slice::ParallelSliceMut;
use std::io::{self, Write};

use super::rasterizer;

/// A pixel target the pipeline composites into.
pub trait Buffer {
    fn new(width: usize, height: usize) -> Self
    where
        Self: Sized;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn resize(&mut self, width: usize, height: usize);
    fn clear(&mut self, color: Color);
    /// Blends `color` over the pixel with the given opacity. Out of bounds is a no-op.
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, opacity: f32);

    fn draw_line(&mut self, start: Vec2, end: Vec2, color: Color, opacity: f32) {
        rasterizer::bresenham(start, end, |x, y| self.blend_pixel(x, y, color, opacity));
    }

    fn fill_square(&mut self, center: Vec2, size: u32, color: Color, opacity: f32) {
        rasterizer::square(center, size, |x, y| self.blend_pixel(x, y, color, opacity));
    }
}

#[inline]
fn index(x: i32, y: i32, width: usize, height: usize) -> Option<usize> {
    if x < 0 || y < 0 {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    if x < width && y < height {
        Some(x + y * width)
    } else {
        None
    }
}

/// Packed `0x00RRGGBB` pixels, ready for `minifb::Window::update_with_buffer`.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    data: Vec<u32>,
}

impl FrameBuffer {
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        index(x as i32, y as i32, self.width, self.height).map(|i| self.data[i])
    }
}

impl Buffer for FrameBuffer {
    fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.resize(width * height, 0);
    }

    fn clear(&mut self, color: Color) {
        let packed = color.to_u32();
        self.data.par_chunks_mut(1024).for_each(|chunk| {
            for point in chunk {
                *point = packed;
            }
        });
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, opacity: f32) {
        if let Some(i) = index(x, y, self.width, self.height) {
            self.data[i] = Color::lerp_u32(self.data[i], color.to_u32(), opacity);
        }
    }
}

/// Terminal target. Every cell shows two stacked pixels with the upper half
/// block glyph (foreground = top, background = bottom), so `height` counts
/// pixel rows, twice the terminal rows.
pub struct TermBuffer {
    width: usize,
    height: usize,
    data: Vec<Color>,
}

impl TermBuffer {
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        index(x as i32, y as i32, self.width, self.height).map(|i| self.data[i])
    }

    /// Terminal rows needed to show every pixel row.
    pub fn rows(&self) -> usize {
        self.height.div_ceil(2)
    }

    fn cell(&self, x: usize, row: usize) -> (Color, Color) {
        let top = self.data[x + 2 * row * self.width];
        let bottom = self.pixel(x, 2 * row + 1).unwrap_or(top);
        (top, bottom)
    }

    /// Writes the whole buffer from the top-left corner, batching runs of
    /// identical cells behind a single color change.
    pub fn present<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut last = None;
        for row in 0..self.rows() {
            queue!(out, MoveTo(0, row as u16))?;
            let mut x = 0;
            while x < self.width {
                let cell = self.cell(x, row);
                let mut run = String::new();
                while x < self.width && self.cell(x, row) == cell {
                    run.push('▀');
                    x += 1;
                }
                if last != Some(cell) {
                    queue!(
                        out,
                        SetForegroundColor(cell.0.to_crossterm_color()),
                        SetBackgroundColor(cell.1.to_crossterm_color())
                    )?;
                    last = Some(cell);
                }
                queue!(out, Print(run))?;
            }
        }
        queue!(out, ResetColor)?;
        out.flush()
    }
}

impl Buffer for TermBuffer {
    fn new(width: usize, height: usize) -> Self {
        TermBuffer {
            width,
            height,
            data: vec![Color::BLACK; width * height],
        }
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.resize(width * height, Color::BLACK);
    }

    fn clear(&mut self, color: Color) {
        self.data.fill(color);
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, opacity: f32) {
        if let Some(i) = index(x, y, self.width, self.height) {
            self.data[i] = self.data[i].lerp(&color, opacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framebuffer_clear_and_blend() {
        let mut buf = FrameBuffer::new(4, 3);
        buf.clear(Color::BLACK);
        buf.blend_pixel(1, 1, Color::WHITE, 1.0);
        assert_eq!(buf.pixel(1, 1), Some(0xFFFFFF));
        assert_eq!(buf.pixel(0, 0), Some(0));

        buf.blend_pixel(2, 2, Color::WHITE, 0.5);
        assert_eq!(buf.pixel(2, 2), Some(0x7F7F7F));
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut buf = FrameBuffer::new(4, 3);
        buf.clear(Color::BLACK);
        buf.blend_pixel(-1, 0, Color::WHITE, 1.0);
        buf.blend_pixel(4, 0, Color::WHITE, 1.0);
        buf.blend_pixel(0, 3, Color::WHITE, 1.0);
        assert!(buf.data().iter().all(|&p| p == 0));
    }

    #[test]
    fn framebuffer_resize_keeps_dimensions_consistent() {
        let mut buf = FrameBuffer::new(4, 3);
        buf.resize(10, 7);
        assert_eq!(buf.data().len(), 70);
        buf.clear(Color::CYAN);
        assert_eq!(buf.pixel(9, 6), Some(0x00FFFF));
    }

    #[test]
    fn term_buffer_pairs_rows_into_cells() {
        let mut buf = TermBuffer::new(2, 3);
        buf.clear(Color::BLACK);
        buf.blend_pixel(0, 0, Color::WHITE, 1.0);
        assert_eq!(buf.rows(), 2);
        assert_eq!(buf.cell(0, 0), (Color::WHITE, Color::BLACK));
        // odd height: the last row has no bottom pixel and repeats the top
        assert_eq!(buf.cell(1, 1), (Color::BLACK, Color::BLACK));
    }

    #[test]
    fn term_buffer_presents_every_cell() {
        let mut buf = TermBuffer::new(3, 4);
        buf.clear(Color::MIDNIGHT);
        buf.blend_pixel(1, 2, Color::CYAN, 1.0);
        let mut out = Vec::new();
        buf.present(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('▀').count(), 6);
    }
}
