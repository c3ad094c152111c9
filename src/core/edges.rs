use glam::Vec3;

/// A link between two particles, stored as indices with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    pub fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Self { a: i, b: j }
        } else {
            Self { a: j, b: i }
        }
    }
}

/// Proximity links of one frame.
///
/// Rebuilt from scratch on every call to [`EdgeSet::rebuild`]; the backing
/// vector is kept so steady-state frames do not allocate.
#[derive(Debug, Clone)]
pub struct EdgeSet {
    threshold: f32,
    edges: Vec<Edge>,
}

impl EdgeSet {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            edges: Vec::new(),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Exhaustive pair scan. A pair is linked iff its distance is strictly
    /// below the threshold.
    pub fn rebuild(&mut self, positions: &[Vec3]) {
        self.edges.clear();
        for (i, p) in positions.iter().enumerate() {
            for (j, q) in positions.iter().enumerate().skip(i + 1) {
                if p.distance(*q) < self.threshold {
                    self.edges.push(Edge { a: i, b: j });
                }
            }
        }
    }

    /// Order of `i` and `j` does not matter.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        let edge = Edge::new(i, j);
        self.edges.contains(&edge)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn edges_for(points: &[Vec3]) -> EdgeSet {
        let mut set = EdgeSet::new(7.0);
        set.rebuild(points);
        set
    }

    #[test]
    fn close_points_are_linked() {
        let set = edges_for(&[Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)]);
        assert!(set.contains(0, 1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn far_points_are_not_linked() {
        let set = edges_for(&[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)]);
        assert!(set.is_empty());
    }

    #[test]
    fn threshold_is_exclusive() {
        let set = edges_for(&[Vec3::ZERO, Vec3::new(7.0, 0.0, 0.0)]);
        assert!(set.is_empty());
        let set = edges_for(&[Vec3::ZERO, Vec3::new(6.999, 0.0, 0.0)]);
        assert!(set.contains(0, 1));
    }

    #[test]
    fn links_are_symmetric() {
        let set = edges_for(&[Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0)]);
        assert!(set.contains(0, 1));
        assert!(set.contains(1, 0));
        assert_eq!(Edge::new(1, 0), Edge::new(0, 1));
    }

    #[test]
    fn matches_brute_force_on_a_random_cloud() {
        let mut rng = StdRng::seed_from_u64(11);
        let points = crate::core::particles::scatter(&mut rng, 150, 60.0);
        let set = edges_for(&points);
        for i in 0..points.len() {
            for j in 0..points.len() {
                if i == j {
                    continue;
                }
                let expected = points[i].distance(points[j]) < 7.0;
                assert_eq!(set.contains(i, j), expected, "pair ({i}, {j})");
            }
        }
        assert!(set.iter().all(|e| e.a < e.b));
    }

    #[test]
    fn rebuild_discards_previous_frame() {
        let mut set = EdgeSet::new(7.0);
        set.rebuild(&[Vec3::ZERO, Vec3::X]);
        assert_eq!(set.len(), 1);
        set.rebuild(&[Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0)]);
        assert!(set.is_empty());
    }
}
