//! TopoJSON extraction.
//!
//! Only the first named object of a topology is converted. Arcs are decoded
//! once up front (delta + quantization when a `transform` is present) and
//! then stitched into rings per geometry.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::boundary::{
    BoundaryCollection, BoundaryError, BoundaryFeature, BoundaryGeometry, Polygon, Ring, parse_id,
    parse_position,
};

#[derive(Debug, Copy, Clone, PartialEq)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

pub(crate) fn collection_from_topology(
    obj: &Map<String, Value>,
) -> Result<BoundaryCollection, BoundaryError> {
    let transform = match obj.get("transform") {
        None | Some(Value::Null) => None,
        Some(t) => Some(parse_transform(t).map_err(BoundaryError::InvalidTopology)?),
    };
    let arcs = decode_arcs(obj.get("arcs"), transform).map_err(BoundaryError::InvalidTopology)?;

    let objects = obj
        .get("objects")
        .and_then(|v| v.as_object())
        .ok_or_else(|| BoundaryError::InvalidTopology("missing objects".to_string()))?;
    let (name, first) = objects
        .iter()
        .next()
        .ok_or_else(|| BoundaryError::InvalidTopology("objects is empty".to_string()))?;
    debug!(object = %name, arcs = arcs.len(), "extracting topology object");

    let geometries: Vec<&Value> = match first.get("type").and_then(|v| v.as_str()) {
        Some("GeometryCollection") => first
            .get("geometries")
            .and_then(|v| v.as_array())
            .map(|gs| gs.iter().collect())
            .unwrap_or_default(),
        Some(_) => vec![first],
        None => {
            return Err(BoundaryError::InvalidTopology(format!(
                "object {name:?} has no type"
            )));
        }
    };

    let mut out = BoundaryCollection {
        features: Vec::with_capacity(geometries.len()),
        skipped: 0,
    };
    for (index, geom) in geometries.into_iter().enumerate() {
        match feature_from_geometry(geom, &arcs) {
            Ok(Some(feature)) => out.features.push(feature),
            Ok(None) => out.skipped += 1,
            Err(reason) => {
                warn!(index, %reason, "skipping malformed topology geometry");
                out.skipped += 1;
            }
        }
    }
    Ok(out)
}

fn parse_transform(value: &Value) -> Result<Transform, String> {
    let obj = value
        .as_object()
        .ok_or("transform must be an object".to_string())?;
    let scale = obj
        .get("scale")
        .ok_or("transform missing scale".to_string())
        .and_then(parse_position)?;
    let translate = obj
        .get("translate")
        .ok_or("transform missing translate".to_string())
        .and_then(parse_position)?;
    Ok(Transform { scale, translate })
}

/// Absolute positions for every arc.
fn decode_arcs(value: Option<&Value>, transform: Option<Transform>) -> Result<Vec<Ring>, String> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let arcs = value
        .as_array()
        .ok_or("arcs must be an array".to_string())?;
    let mut out = Vec::with_capacity(arcs.len());
    for (i, arc) in arcs.iter().enumerate() {
        let positions = arc
            .as_array()
            .ok_or_else(|| format!("arc {i} must be an array"))?;
        let mut decoded = Vec::with_capacity(positions.len());
        let (mut x, mut y) = (0.0, 0.0);
        for p in positions {
            let p = parse_position(p).map_err(|e| format!("arc {i}: {e}"))?;
            match transform {
                Some(t) => {
                    x += p[0];
                    y += p[1];
                    decoded.push([
                        x * t.scale[0] + t.translate[0],
                        y * t.scale[1] + t.translate[1],
                    ]);
                }
                None => decoded.push(p),
            }
        }
        out.push(decoded);
    }
    Ok(out)
}

fn feature_from_geometry(value: &Value, arcs: &[Ring]) -> Result<Option<BoundaryFeature>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let geometry = match ty {
        "Polygon" => {
            let rings = obj.get("arcs").ok_or("Polygon missing arcs".to_string())?;
            BoundaryGeometry::Polygon(stitch_polygon(rings, arcs)?)
        }
        "MultiPolygon" => {
            let polys = obj
                .get("arcs")
                .and_then(|v| v.as_array())
                .ok_or("MultiPolygon arcs must be an array".to_string())?;
            let mut out = Vec::with_capacity(polys.len());
            for poly in polys {
                out.push(stitch_polygon(poly, arcs)?);
            }
            BoundaryGeometry::MultiPolygon(out)
        }
        _ => return Ok(None),
    };

    Ok(Some(BoundaryFeature {
        id: parse_id(obj.get("id")),
        properties: obj
            .get("properties")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default(),
        geometry,
    }))
}

fn stitch_polygon(value: &Value, arcs: &[Ring]) -> Result<Polygon, String> {
    let rings = value
        .as_array()
        .ok_or("polygon arcs must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        let indices = ring
            .as_array()
            .ok_or("ring must be an array of arc indices".to_string())?;
        let mut ids = Vec::with_capacity(indices.len());
        for ix in indices {
            ids.push(ix.as_i64().ok_or("arc index must be an integer".to_string())?);
        }
        out.push(stitch_ring(&ids, arcs)?);
    }
    Ok(out)
}

/// Concatenates arcs into one ring. Consecutive arcs share their junction
/// point, and a negative index `~i` walks arc `i` backwards.
fn stitch_ring(indices: &[i64], arcs: &[Ring]) -> Result<Ring, String> {
    let mut points: Ring = Vec::new();
    for &i in indices {
        let arc_index = (if i < 0 { !i } else { i }) as usize;
        let arc = arcs
            .get(arc_index)
            .ok_or_else(|| format!("arc index {i} out of range ({} arcs)", arcs.len()))?;
        points.pop();
        let start = points.len();
        points.extend_from_slice(arc);
        if i < 0 {
            points[start..].reverse();
        }
    }
    if points.len() < 4 {
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::stitch_ring;
    use crate::boundary::{BoundaryCollection, BoundaryError, BoundaryGeometry};
    use pretty_assertions::assert_eq;

    // Two squares sharing the edge x=1, quantized with a 0.5 degree grid.
    const TOPO: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [0.5, 0.5], "translate": [70, 10]},
        "objects": {
            "states": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "arcs": [[0, 1]], "properties": {"st_nm": "West"}},
                    {"type": "Polygon", "arcs": [[2, -1]], "id": 7, "properties": {"st_nm": "East"}},
                    {"type": "LineString", "arcs": [0]}
                ]
            },
            "ignored": {"type": "GeometryCollection", "geometries": []}
        },
        "arcs": [
            [[2, 0], [0, 2]],
            [[2, 2], [-2, 0], [0, -2], [2, 0]],
            [[2, 0], [2, 0], [0, 2], [-2, 0]]
        ]
    }"#;

    #[test]
    fn decodes_first_object_with_transform() {
        let c = BoundaryCollection::from_json_str(TOPO).expect("parse topology");
        assert_eq!(c.len(), 2);
        assert_eq!(c.skipped, 1);

        let BoundaryGeometry::Polygon(west) = &c.features[0].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(
            west[0],
            vec![[71.0, 10.0], [71.0, 11.0], [70.0, 11.0], [70.0, 10.0], [71.0, 10.0]]
        );
        assert_eq!(c.features[1].id.as_deref(), Some("7"));
    }

    #[test]
    fn reversed_arc_closes_neighbor() {
        let c = BoundaryCollection::from_json_str(TOPO).expect("parse topology");
        let BoundaryGeometry::Polygon(east) = &c.features[1].geometry else {
            panic!("expected polygon");
        };
        let ring = &east[0];
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring[0], [71.0, 10.0]);
        assert_eq!(ring[3], [71.0, 11.0]);
        assert_eq!(ring.len(), 5);
        let b = c.bounds();
        assert_eq!(b.min, [70.0, 10.0]);
        assert_eq!(b.max, [72.0, 11.0]);
    }

    #[test]
    fn short_ring_is_closed() {
        let arcs = vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]];
        let ring = stitch_ring(&[0], &arcs).expect("stitch");
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[3], [0.0, 0.0]);
    }

    #[test]
    fn out_of_range_arc_is_an_error() {
        let arcs = vec![vec![[0.0, 0.0], [1.0, 0.0]]];
        assert!(stitch_ring(&[3], &arcs).is_err());
        assert!(stitch_ring(&[!3], &arcs).is_err());
    }

    #[test]
    fn empty_objects_is_an_error() {
        let err = BoundaryCollection::from_json_str(
            r#"{"type": "Topology", "objects": {}, "arcs": []}"#,
        )
        .expect_err("should fail");
        assert!(matches!(err, BoundaryError::InvalidTopology(_)));
    }

    #[test]
    fn untransformed_arcs_are_absolute() {
        let payload = r#"{
            "type": "Topology",
            "objects": {
                "states": {"type": "Polygon", "arcs": [[0]], "properties": {"st_nm": "Goa"}}
            },
            "arcs": [[[73.5, 15.0], [74.0, 15.0], [74.0, 15.5], [73.5, 15.0]]]
        }"#;
        let c = BoundaryCollection::from_json_str(payload).expect("parse topology");
        assert_eq!(c.len(), 1);
        let BoundaryGeometry::Polygon(goa) = &c.features[0].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(
            goa[0],
            vec![[73.5, 15.0], [74.0, 15.0], [74.0, 15.5], [73.5, 15.0]]
        );
    }
}
