use std::collections::HashMap;

use foundation::math::Vec2;
use serde::Deserialize;

use crate::alias::AliasTable;
use crate::names::normalize;

/// Manual placement for one region. Positions are screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorOverride {
    #[serde(default)]
    pub position: Option<[f64; 2]>,
    #[serde(default)]
    pub scale: Option<f64>,
}

impl AnchorOverride {
    pub fn position(&self) -> Option<Vec2> {
        self.position.map(Vec2::from).filter(|p| p.is_finite())
    }

    pub fn scale(&self) -> Option<f64> {
        self.scale.filter(|s| s.is_finite() && *s > 0.0)
    }
}

#[derive(Debug)]
pub struct OverrideError(serde_json::Error);

impl std::fmt::Display for OverrideError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid anchor overrides: {}", self.0)
    }
}

impl std::error::Error for OverrideError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Overrides keyed by normalized region name (either naming scheme).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable {
    entries: HashMap<String, AnchorOverride>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `{ "<region>": { "position": [x, y], "scale": s }, ... }`.
    pub fn from_json_str(payload: &str) -> Result<Self, OverrideError> {
        let raw: HashMap<String, AnchorOverride> =
            serde_json::from_str(payload).map_err(OverrideError)?;
        let mut table = Self::new();
        for (name, entry) in raw {
            table.insert(&name, entry);
        }
        Ok(table)
    }

    pub fn insert(&mut self, name: &str, entry: AnchorOverride) {
        let key = normalize(name);
        if !key.is_empty() {
            self.entries.insert(key, entry);
        }
    }

    /// Looks up by canonical key, then by the boundary-side key, then by the
    /// reverse alias of the canonical key.
    pub fn lookup(
        &self,
        canonical: &str,
        source_key: &str,
        alias: &AliasTable,
    ) -> Option<&AnchorOverride> {
        self.entries
            .get(canonical)
            .or_else(|| self.entries.get(source_key))
            .or_else(|| self.entries.get(alias.reverse(canonical)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
