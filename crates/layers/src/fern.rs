//! Barnsley fern point clouds.

use foundation::math::Vec2;
use rand::Rng;

/// `(x, y) -> (a*x + b*y + e, c*x + d*y + f)`
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AffineMap {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineMap {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.b * p.y + self.e,
            self.c * p.x + self.d * p.y + self.f,
        )
    }
}

/// A map and the selector value below which it is chosen.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Branch {
    pub map: AffineMap,
    pub below: f64,
}

/// Stem, successive leaflets, left leaflet, right leaflet. The stem's
/// threshold is its own weight; the last branch takes everything else.
pub const BARNSLEY: [Branch; 4] = [
    Branch {
        map: AffineMap::new(0.0, 0.0, 0.0, 0.16, 0.0, 0.0),
        below: 0.01,
    },
    Branch {
        map: AffineMap::new(0.85, 0.04, -0.04, 0.85, 0.0, 1.6),
        below: 0.86,
    },
    Branch {
        map: AffineMap::new(0.20, -0.26, 0.23, 0.22, 0.0, 1.6),
        below: 0.93,
    },
    Branch {
        map: AffineMap::new(-0.15, 0.28, 0.26, 0.24, 0.0, 0.44),
        below: 1.0,
    },
];

/// Height of the attractor in IFS units.
pub const FERN_HEIGHT: f64 = 10.0;

pub fn pick_branch(r: f64) -> &'static Branch {
    BARNSLEY
        .iter()
        .find(|b| r < b.below)
        .unwrap_or(&BARNSLEY[BARNSLEY.len() - 1])
}

/// Runs `count` iterations from the origin and returns the emitted points in
/// screen space: the fern's base sits on `base` and it grows upward (towards
/// smaller y) to roughly `height_px`.
pub fn generate<R: Rng + ?Sized>(
    base: Vec2,
    height_px: f64,
    count: usize,
    rng: &mut R,
) -> Vec<Vec2> {
    let k = height_px / FERN_HEIGHT;
    let mut state = Vec2::ZERO;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let r: f64 = rng.gen_range(0.0..1.0);
        state = pick_branch(r).map.apply(state);
        out.push(Vec2::new(base.x + state.x * k, base.y - state.y * k));
    }
    out
}
