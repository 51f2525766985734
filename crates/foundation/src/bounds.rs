/// Axis-aligned bounding box in planar or lon/lat coordinates.
///
/// An empty box has `min > max` on both axes so that the first `extend`
/// initializes it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    pub fn empty() -> Self {
        Aabb2 {
            min: [f64::INFINITY, f64::INFINITY],
            max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.min[0] <= self.max[0] && self.min[1] <= self.max[1])
    }

    /// Grows the box to include `p`. Non-finite points are ignored.
    pub fn extend(&mut self, p: [f64; 2]) {
        if !p[0].is_finite() || !p[1].is_finite() {
            return;
        }
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max[0] - self.min[0]
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max[1] - self.min[1]
        }
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }

    /// True when all four bounds are valid longitude/latitude degrees.
    pub fn is_geographic(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        let lon_ok = |v: f64| (-180.0..=180.0).contains(&v);
        let lat_ok = |v: f64| (-90.0..=90.0).contains(&v);
        lon_ok(self.min[0]) && lon_ok(self.max[0]) && lat_ok(self.min[1]) && lat_ok(self.max[1])
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2;

    #[test]
    fn extend_from_empty() {
        let mut b = Aabb2::empty();
        assert!(b.is_empty());
        b.extend([2.0, -1.0]);
        b.extend([-3.0, 4.0]);
        assert_eq!(b, Aabb2::new([-3.0, -1.0], [2.0, 4.0]));
        assert_eq!(b.width(), 5.0);
        assert_eq!(b.center(), [-0.5, 1.5]);
    }

    #[test]
    fn ignores_non_finite_points() {
        let mut b = Aabb2::empty();
        b.extend([f64::NAN, 1.0]);
        assert!(b.is_empty());
    }

    #[test]
    fn geographic_range_check() {
        assert!(Aabb2::new([68.0, 6.0], [97.5, 37.1]).is_geographic());
        assert!(!Aabb2::new([0.0, 0.0], [4000.0, 3000.0]).is_geographic());
        assert!(!Aabb2::new([-10.0, -95.0], [10.0, 10.0]).is_geographic());
        assert!(!Aabb2::empty().is_geographic());
    }
}
