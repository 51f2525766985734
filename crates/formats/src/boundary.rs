use foundation::bounds::Aabb2;
use serde_json::{Map, Value};
use tracing::warn;

use crate::topology;

/// One closed ring of `[x, y]` positions (lon/lat degrees or planar units).
pub type Ring = Vec<[f64; 2]>;

/// Outer ring first, holes after.
pub type Polygon = Vec<Ring>;

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryGeometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl BoundaryGeometry {
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            BoundaryGeometry::Polygon(p) => std::slice::from_ref(p),
            BoundaryGeometry::MultiPolygon(ps) => ps,
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.polygons()
            .iter()
            .flat_map(|poly| poly.iter())
            .flat_map(|ring| ring.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: BoundaryGeometry,
}

/// Normalized polygon-feature collection, whichever encoding it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryCollection {
    pub features: Vec<BoundaryFeature>,
    /// Features dropped because their geometry was missing, not areal, or malformed.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryError {
    InvalidJson(String),
    MissingDiscriminant,
    UnsupportedDocument(String),
    InvalidCollection(String),
    InvalidTopology(String),
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryError::InvalidJson(e) => write!(f, "JSON parse error: {e}"),
            BoundaryError::MissingDiscriminant => write!(f, "document has no \"type\" field"),
            BoundaryError::UnsupportedDocument(ty) => write!(
                f,
                "unsupported document type {ty:?} (expected \"Topology\" or \"FeatureCollection\")"
            ),
            BoundaryError::InvalidCollection(reason) => {
                write!(f, "invalid FeatureCollection: {reason}")
            }
            BoundaryError::InvalidTopology(reason) => write!(f, "invalid Topology: {reason}"),
        }
    }
}

impl std::error::Error for BoundaryError {}

impl BoundaryCollection {
    pub fn from_json_str(payload: &str) -> Result<Self, BoundaryError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| BoundaryError::InvalidJson(e.to_string()))?;
        Self::from_json_value(&value)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, BoundaryError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| BoundaryError::InvalidJson(e.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Dispatches on the top-level `type` discriminant.
    pub fn from_json_value(value: &Value) -> Result<Self, BoundaryError> {
        let obj = value.as_object().ok_or(BoundaryError::MissingDiscriminant)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(BoundaryError::MissingDiscriminant)?;
        match ty {
            "Topology" => topology::collection_from_topology(obj),
            "FeatureCollection" => collection_from_geojson(obj),
            other => Err(BoundaryError::UnsupportedDocument(other.to_string())),
        }
    }

    pub fn bounds(&self) -> Aabb2 {
        let mut b = Aabb2::empty();
        for feature in &self.features {
            for p in feature.geometry.positions() {
                b.extend(p);
            }
        }
        b
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn collection_from_geojson(obj: &Map<String, Value>) -> Result<BoundaryCollection, BoundaryError> {
    let features_val = obj
        .get("features")
        .and_then(|v| v.as_array())
        .ok_or_else(|| BoundaryError::InvalidCollection("missing features array".to_string()))?;

    let mut out = BoundaryCollection {
        features: Vec::with_capacity(features_val.len()),
        skipped: 0,
    };
    for (index, feat_val) in features_val.iter().enumerate() {
        match parse_feature(feat_val) {
            Ok(Some(feature)) => out.features.push(feature),
            Ok(None) => out.skipped += 1,
            Err(reason) => {
                warn!(index, %reason, "skipping malformed boundary feature");
                out.skipped += 1;
            }
        }
    }
    Ok(out)
}

/// `Ok(None)` for features that are valid but carry no areal geometry.
fn parse_feature(value: &Value) -> Result<Option<BoundaryFeature>, String> {
    let feat_obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;
    let feat_type = feat_obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("feature missing type".to_string())?;
    if feat_type != "Feature" {
        return Err(format!("unexpected feature type: {feat_type}"));
    }

    let geometry = match feat_obj.get("geometry") {
        None | Some(Value::Null) => return Ok(None),
        Some(g) => match parse_geometry(g)? {
            Some(g) => g,
            None => return Ok(None),
        },
    };

    Ok(Some(BoundaryFeature {
        id: parse_id(feat_obj.get("id")),
        properties: feat_obj
            .get("properties")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default(),
        geometry,
    }))
}

pub(crate) fn parse_id(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_geometry(value: &Value) -> Result<Option<BoundaryGeometry>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    match ty {
        "Polygon" | "MultiPolygon" => {}
        _ => return Ok(None),
    }
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;
    match ty {
        "Polygon" => Ok(Some(BoundaryGeometry::Polygon(parse_polygon(coords)?))),
        _ => Ok(Some(BoundaryGeometry::MultiPolygon(parse_multi_polygon(
            coords,
        )?))),
    }
}

pub(crate) fn parse_position(coords: &Value) -> Result<[f64; 2], String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [x, y]".to_string());
    }
    let x = arr[0].as_f64().ok_or("x must be a number".to_string())?;
    let y = arr[1].as_f64().ok_or("y must be a number".to_string())?;
    Ok([x, y])
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_position(item)?);
    }
    Ok(out)
}

fn parse_polygon(coords: &Value) -> Result<Polygon, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_ring(ring)?);
    }
    Ok(out)
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Polygon>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    let mut out = Vec::with_capacity(polys.len());
    for poly in polys {
        out.push(parse_polygon(poly)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{BoundaryCollection, BoundaryError, BoundaryGeometry};
    use pretty_assertions::assert_eq;

    const STATES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": 32, "properties": {"st_nm": "Kerala"},
             "geometry": {"type": "Polygon", "coordinates": [[[75,8],[77,8],[77,12],[75,12],[75,8]]]}},
            {"type": "Feature", "properties": {"st_nm": "Lakshadweep"},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                 [[[72,10],[73,10],[73,11],[72,10]]],
                 [[[71,8],[72,8],[72,9],[71,8]]]
             ]}},
            {"type": "Feature", "properties": {"name": "capital"},
             "geometry": {"type": "Point", "coordinates": [77, 28]}},
            {"type": "Feature", "properties": {}, "geometry": null}
        ]
    }"#;

    #[test]
    fn parses_feature_collection_and_skips_non_areal() {
        let c = BoundaryCollection::from_json_str(STATES).expect("parse");
        assert_eq!(c.len(), 2);
        assert_eq!(c.skipped, 2);
        assert_eq!(c.features[0].id.as_deref(), Some("32"));
        assert!(matches!(
            c.features[1].geometry,
            BoundaryGeometry::MultiPolygon(ref ps) if ps.len() == 2
        ));
    }

    #[test]
    fn bounds_cover_all_rings() {
        let c = BoundaryCollection::from_json_str(STATES).expect("parse");
        let b = c.bounds();
        assert_eq!(b.min, [71.0, 8.0]);
        assert_eq!(b.max, [77.0, 12.0]);
        assert!(b.is_geographic());
    }

    #[test]
    fn malformed_feature_is_isolated() {
        let payload = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"st_nm": "Goa"},
             "geometry": {"type": "Polygon", "coordinates": [[["a", 1]]]}},
            {"type": "Feature", "properties": {"st_nm": "Assam"},
             "geometry": {"type": "Polygon", "coordinates": [[[90,25],[92,25],[92,27],[90,25]]]}}
        ]}"#;
        let c = BoundaryCollection::from_json_str(payload).expect("parse");
        assert_eq!(c.len(), 1);
        assert_eq!(c.skipped, 1);
    }

    #[test]
    fn rejects_unknown_discriminant() {
        let err = BoundaryCollection::from_json_str(r#"{"type": "GeometryCollection"}"#)
            .expect_err("should fail");
        assert_eq!(
            err,
            BoundaryError::UnsupportedDocument("GeometryCollection".to_string())
        );
    }

    #[test]
    fn rejects_missing_discriminant_and_bad_json() {
        assert_eq!(
            BoundaryCollection::from_json_str("[1, 2]").expect_err("array"),
            BoundaryError::MissingDiscriminant
        );
        assert!(matches!(
            BoundaryCollection::from_json_str("{"),
            Err(BoundaryError::InvalidJson(_))
        ));
    }
}
