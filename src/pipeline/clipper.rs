use glam::{Vec2, Vec3};

/// Clips a view-space segment to the half space in front of the near plane
/// (`-z >= near`). Returns `None` when the whole segment is behind it.
pub fn clip_near(a: Vec3, b: Vec3, near: f32) -> Option<(Vec3, Vec3)> {
    let da = -a.z - near;
    let db = -b.z - near;
    match (da >= 0.0, db >= 0.0) {
        (true, true) => Some((a, b)),
        (false, false) => None,
        (true, false) => Some((a, on_plane(a.lerp(b, da / (da - db)), near))),
        (false, true) => Some((on_plane(b.lerp(a, db / (db - da)), near), b)),
    }
}

// pin the cut point so rounding can't leave it a hair behind the plane
fn on_plane(mut p: Vec3, near: f32) -> Vec3 {
    p.z = -near;
    p
}

/// Liang-Barsky clip of a screen-space segment against `[0, width] x [0, height]`.
/// Keeps Bresenham from walking millions of pixels for segments that end
/// just in front of the near plane.
pub fn clip_rect(p0: Vec2, p1: Vec2, width: f32, height: f32) -> Option<(Vec2, Vec2)> {
    let d = p1 - p0;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    // (p, q) for left, right, top, bottom
    let edges = [
        (-d.x, p0.x),
        (d.x, width - p0.x),
        (-d.y, p0.y),
        (d.y, height - p0.y),
    ];

    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((p0 + d * t0, p0 + d * t1))
}
