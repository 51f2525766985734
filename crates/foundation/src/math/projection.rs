//! Projection selection and viewport fitting.
//!
//! Boundary documents arrive either in lon/lat degrees or in an already
//! planar coordinate system. Both are mapped to screen pixels (x right,
//! y down) through a raw transform followed by a uniform fit.

use super::Vec2;
use crate::bounds::Aabb2;

pub const MERCATOR_MAX_LAT_DEG: f64 = 85.05112878;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProjectionKind {
    /// Spherical Mercator on the unit sphere (input in degrees).
    Mercator,
    /// Coordinates are already planar; only the vertical axis flips.
    Planar,
}

impl ProjectionKind {
    /// Selects Mercator when every bound is a valid lon/lat, planar otherwise.
    pub fn for_bounds(bounds: &Aabb2) -> Self {
        if bounds.is_geographic() {
            ProjectionKind::Mercator
        } else {
            ProjectionKind::Planar
        }
    }

    /// Raw (unfitted) projection with y pointing up.
    pub fn raw(self, p: [f64; 2]) -> Vec2 {
        match self {
            ProjectionKind::Mercator => Vec2::new(mercator_x(p[0]), mercator_y(p[1])),
            ProjectionKind::Planar => Vec2::new(p[0], p[1]),
        }
    }
}

fn mercator_x(lon_deg: f64) -> f64 {
    lon_deg.to_radians()
}

fn mercator_y(lat_deg: f64) -> f64 {
    let lat = lat_deg
        .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
        .to_radians();
    (0.5 * (std::f64::consts::FRAC_PI_2 + lat)).tan().ln()
}

/// A projection fitted to a viewport: `screen = center_px + (raw - raw_center) * scale`,
/// with the y term negated so that north is up on screen.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FittedProjection {
    pub kind: ProjectionKind,
    pub viewport: Viewport,
    /// Pixels per raw unit.
    pub scale: f64,
    raw_center: Vec2,
}

impl FittedProjection {
    /// Fits the bounding box of `bounds` (in input coordinates) into the viewport,
    /// centered, preserving aspect ratio, leaving `padding_px` on every side.
    pub fn fit(bounds: &Aabb2, viewport: Viewport, padding_px: f64) -> Self {
        let kind = ProjectionKind::for_bounds(bounds);
        if bounds.is_empty() {
            return Self {
                kind,
                viewport,
                scale: 1.0,
                raw_center: Vec2::ZERO,
            };
        }

        // Both raw transforms are monotone per axis, so the corners bound the result.
        let a = kind.raw(bounds.min);
        let b = kind.raw(bounds.max);
        let dx = (b.x - a.x).abs();
        let dy = (b.y - a.y).abs();
        let avail_w = (viewport.width - 2.0 * padding_px).max(1.0);
        let avail_h = (viewport.height - 2.0 * padding_px).max(1.0);

        let scale = match (dx > f64::EPSILON, dy > f64::EPSILON) {
            (true, true) => (avail_w / dx).min(avail_h / dy),
            (true, false) => avail_w / dx,
            (false, true) => avail_h / dy,
            (false, false) => 1.0,
        };

        Self {
            kind,
            viewport,
            scale,
            raw_center: Vec2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5),
        }
    }

    pub fn project(&self, p: [f64; 2]) -> Vec2 {
        let r = self.kind.raw(p);
        Vec2::new(
            self.viewport.width * 0.5 + (r.x - self.raw_center.x) * self.scale,
            self.viewport.height * 0.5 - (r.y - self.raw_center.y) * self.scale,
        )
    }
}
