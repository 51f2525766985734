//! Per-region screen anchors.
//!
//! Anchors are a pure function of (boundaries, projection, names, aliases,
//! overrides). They are rebuilt wholesale whenever the projection changes.

use std::collections::BTreeMap;

use foundation::bounds::Aabb2;
use foundation::math::{FittedProjection, Vec2};
use formats::boundary::{BoundaryCollection, BoundaryGeometry};
use tracing::{debug, warn};

use crate::alias::AliasTable;
use crate::names::{NameFields, normalize};
use crate::overrides::OverrideTable;

const MIN_DERIVED_SCALE: f64 = 0.6;
const MAX_DERIVED_SCALE: f64 = 1.6;

#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    /// Canonical (dataset-side) key.
    pub key: String,
    /// Normalized boundary-side key before aliasing.
    pub source_key: String,
    pub display_name: String,
    pub position: Vec2,
    pub scale: f64,
    pub overridden: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorSet {
    anchors: BTreeMap<String, Anchor>,
    /// Features without a usable name.
    pub unnamed: usize,
    /// Named features whose geometry projected to nothing finite.
    pub no_centroid: usize,
    /// Features whose canonical key was already taken; the later one wins.
    pub duplicates: usize,
}

impl AnchorSet {
    pub fn get(&self, key: &str) -> Option<&Anchor> {
        self.anchors.get(key)
    }

    /// Anchor for a normalized dataset-side key, also trying the key as a
    /// boundary-side spelling.
    pub fn lookup(&self, key: &str, alias: &AliasTable) -> Option<&Anchor> {
        self.anchors
            .get(key)
            .or_else(|| self.anchors.get(alias.forward(key)))
    }

    /// Anchors in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.anchors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

pub struct AnchorBuilder<'a> {
    pub names: &'a NameFields,
    pub alias: &'a AliasTable,
    pub overrides: &'a OverrideTable,
    /// Projected region extent (px) that maps to a display scale of 1.0.
    pub scale_reference_px: f64,
}

impl<'a> AnchorBuilder<'a> {
    pub fn new(names: &'a NameFields, alias: &'a AliasTable, overrides: &'a OverrideTable) -> Self {
        Self {
            names,
            alias,
            overrides,
            scale_reference_px: 80.0,
        }
    }

    pub fn build(
        &self,
        collection: &BoundaryCollection,
        projection: &FittedProjection,
    ) -> AnchorSet {
        let mut out = AnchorSet::default();

        for feature in &collection.features {
            let Some(display_name) = self.names.display_name(&feature.properties) else {
                out.unnamed += 1;
                continue;
            };
            let source_key = normalize(&display_name);
            if source_key.is_empty() {
                out.unnamed += 1;
                continue;
            }
            let Some((centroid, extent)) = projected_centroid(&feature.geometry, projection)
            else {
                out.no_centroid += 1;
                continue;
            };

            let key = self.alias.forward(&source_key).to_string();
            let ov = self.overrides.lookup(&key, &source_key, self.alias);
            let position = ov.and_then(|o| o.position());
            let scale = ov
                .and_then(|o| o.scale())
                .unwrap_or_else(|| self.derived_scale(extent));
            if ov.is_some() {
                debug!(region = %key, "anchor override applied");
            }

            let anchor = Anchor {
                key: key.clone(),
                source_key,
                display_name,
                position: position.unwrap_or(centroid),
                scale,
                overridden: ov.is_some(),
            };
            if out.anchors.insert(key, anchor).is_some() {
                out.duplicates += 1;
            }
        }

        debug!(anchors = out.anchors.len(), "anchors rebuilt");
        if out.unnamed > 0 || out.no_centroid > 0 || out.duplicates > 0 {
            warn!(
                unnamed = out.unnamed,
                no_centroid = out.no_centroid,
                duplicates = out.duplicates,
                "some boundary features produced no distinct anchor"
            );
        }
        out
    }

    fn derived_scale(&self, extent: Aabb2) -> f64 {
        let size = extent.width().min(extent.height());
        if !(size > 0.0) || !(self.scale_reference_px > 0.0) {
            return 1.0;
        }
        (size / self.scale_reference_px).clamp(MIN_DERIVED_SCALE, MAX_DERIVED_SCALE)
    }
}

/// Area-weighted centroid in screen space plus the projected extent.
///
/// Outer rings add their absolute area and holes subtract theirs, so ring
/// winding in the source does not matter. Zero-area geometry falls back to
/// the vertex mean.
pub fn projected_centroid(
    geometry: &BoundaryGeometry,
    projection: &FittedProjection,
) -> Option<(Vec2, Aabb2)> {
    let mut extent = Aabb2::empty();
    let mut weight = 0.0;
    let mut weighted = Vec2::ZERO;
    let mut vertex_sum = Vec2::ZERO;
    let mut vertex_count = 0usize;

    for polygon in geometry.polygons() {
        for (ring_index, ring) in polygon.iter().enumerate() {
            let pts: Vec<Vec2> = ring
                .iter()
                .map(|p| projection.project(*p))
                .filter(|p| p.is_finite())
                .collect();
            for p in &pts {
                extent.extend([p.x, p.y]);
                vertex_sum = vertex_sum + *p;
                vertex_count += 1;
            }
            let Some((area, centroid)) = ring_area_centroid(&pts) else {
                continue;
            };
            let w = if ring_index == 0 { area } else { -area };
            weight += w;
            weighted = weighted + centroid * w;
        }
    }

    if vertex_count == 0 {
        return None;
    }
    let centroid = if weight.abs() > 1e-9 {
        weighted * (1.0 / weight)
    } else {
        vertex_sum * (1.0 / vertex_count as f64)
    };
    Some((centroid, extent))
}

/// Absolute area and centroid of one ring (shoelace).
fn ring_area_centroid(pts: &[Vec2]) -> Option<(f64, Vec2)> {
    if pts.len() < 3 {
        return None;
    }
    let mut a2 = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..pts.len() {
        let a = pts[i];
        let b = pts[(i + 1) % pts.len()];
        let cross = a.x * b.y - b.x * a.y;
        a2 += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    if a2.abs() <= 1e-12 {
        return None;
    }
    Some((a2.abs() * 0.5, Vec2::new(cx / (3.0 * a2), cy / (3.0 * a2))))
}
