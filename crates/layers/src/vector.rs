use foundation::math::{FittedProjection, Vec2};
use formats::boundary::BoundaryCollection;

/// One feature's rings in screen space, ready for path output.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Outline {
    /// Open rings (closing duplicate removed), at least three points each.
    pub rings: Vec<Vec<Vec2>>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct OutlineSnapshot {
    pub outlines: Vec<Outline>,
}

impl OutlineSnapshot {
    pub fn ring_count(&self) -> usize {
        self.outlines.iter().map(|o| o.rings.len()).sum()
    }
}

/// Projects every polygon ring of every feature through `projection`.
pub fn project_outlines(
    collection: &BoundaryCollection,
    projection: &FittedProjection,
) -> OutlineSnapshot {
    let mut out = OutlineSnapshot::default();
    for feature in &collection.features {
        let mut outline = Outline::default();
        for polygon in feature.geometry.polygons() {
            for ring in polygon {
                let mut pts: Vec<Vec2> = ring
                    .iter()
                    .map(|p| projection.project(*p))
                    .filter(|p| p.is_finite())
                    .collect();
                drop_closing_duplicate(&mut pts);
                if pts.len() >= 3 {
                    outline.rings.push(pts);
                }
            }
        }
        if !outline.rings.is_empty() {
            out.outlines.push(outline);
        }
    }
    out
}

fn drop_closing_duplicate(points: &mut Vec<Vec2>) {
    if points.len() >= 2 {
        let first = points[0];
        let last = points[points.len() - 1];
        if (first.x - last.x).abs() < 1e-9 && (first.y - last.y).abs() < 1e-9 {
            points.pop();
        }
    }
}
