use glam::Vec2;

/// Plots every pixel of the segment exactly once, endpoints included.
pub fn bresenham<F>(start: Vec2, end: Vec2, mut plot: F)
where
    F: FnMut(i32, i32),
{
    let mut x0 = start.x.floor() as i32;
    let mut y0 = start.y.floor() as i32;
    let x1 = end.x.floor() as i32;
    let y1 = end.y.floor() as i32;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        plot(x0, y0);

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Plots a `size` x `size` block centred on `center`. Size 0 plots nothing.
pub fn square<F>(center: Vec2, size: u32, mut plot: F)
where
    F: FnMut(i32, i32),
{
    if size == 0 {
        return;
    }
    let size = size as i32;
    let x0 = (center.x - size as f32 * 0.5).round() as i32;
    let y0 = (center.y - size as f32 * 0.5).round() as i32;
    for y in y0..y0 + size {
        for x in x0..x0 + size {
            plot(x, y);
        }
    }
}
