//! Per-region fern entities.

use std::collections::BTreeMap;

use compute::resolve::ValueResolver;
use formats::rainfall::RainfallTable;
use foundation::math::Vec2;
use foundation::time::Month;
use layers::alias::AliasTable;
use layers::anchors::Anchor;
use layers::fern;
use layers::names::normalize;
use layers::symbology::{RainStyle, style_for};
use rand::Rng;
use runtime::tally::Tally;

use crate::map::MapState;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FernConfig {
    /// Fern height in pixels at display scale 1.0.
    pub height_px: f64,
}

impl Default for FernConfig {
    fn default() -> Self {
        Self { height_px: 36.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FernEntity {
    pub key: String,
    pub display_name: String,
    /// Literal region name in the rainfall table, if any.
    pub region: Option<String>,
    /// `false` when the region has no anchor and sits at the origin.
    pub anchored: bool,
    pub position: Vec2,
    pub scale: f64,
    pub value: f64,
    pub style: RainStyle,
    pub points: Vec<Vec2>,
}

/// What the ferns are computed from.
pub struct FernInputs<'a> {
    pub map: Option<&'a MapState>,
    pub table: &'a RainfallTable,
    pub alias: &'a AliasTable,
    pub year: Option<i32>,
    pub month: Month,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FernField {
    entities: Vec<FernEntity>,
}

struct Slot<'a> {
    anchor: Option<&'a Anchor>,
    region: Option<&'a str>,
}

impl FernField {
    /// One entity per region known to either side: every anchor, plus every
    /// rainfall region. Misses are counted into `tally`.
    pub fn build<R: Rng + ?Sized>(
        inputs: &FernInputs<'_>,
        config: FernConfig,
        rng: &mut R,
        tally: &mut Tally,
    ) -> Self {
        let mut slots: BTreeMap<String, Slot<'_>> = BTreeMap::new();
        if let Some(map) = inputs.map {
            for anchor in map.anchors.iter() {
                slots.insert(
                    anchor.key.clone(),
                    Slot {
                        anchor: Some(anchor),
                        region: None,
                    },
                );
            }
        }

        for region in inputs.table.regions() {
            let key = normalize(region);
            if key.is_empty() {
                tally.add("unnamed_region", 1);
                continue;
            }
            let anchor = inputs
                .map
                .and_then(|m| m.anchors.lookup(&key, inputs.alias));
            let key = anchor.map(|a| a.key.clone()).unwrap_or(key);
            let slot = slots.entry(key).or_insert(Slot {
                anchor,
                region: None,
            });
            if slot.region.is_some() {
                tally.add("duplicate_region", 1);
                continue;
            }
            slot.region = Some(region.as_str());
        }

        let mut entities = Vec::with_capacity(slots.len());
        for (key, slot) in slots {
            let value = match (slot.region, inputs.year) {
                (Some(region), Some(year)) => {
                    ValueResolver::value(inputs.table, region, year, inputs.month)
                }
                _ => f64::NAN,
            };
            if slot.anchor.is_none() {
                tally.add("no_anchor", 1);
            }
            if slot.region.is_none() {
                tally.add("no_observation", 1);
            } else if !value.is_finite() {
                tally.add("undefined_value", 1);
            }

            let style = style_for(value);
            let position = slot.anchor.map(|a| a.position).unwrap_or(Vec2::ZERO);
            let scale = slot.anchor.map(|a| a.scale).unwrap_or(1.0);
            let points = fern::generate(position, config.height_px * scale, style.points, rng);
            let display_name = slot
                .anchor
                .map(|a| a.display_name.clone())
                .or_else(|| slot.region.map(str::to_string))
                .unwrap_or_else(|| key.clone());

            entities.push(FernEntity {
                key,
                display_name,
                region: slot.region.map(str::to_string),
                anchored: slot.anchor.is_some(),
                position,
                scale,
                value,
                style,
                points,
            });
        }

        Self { entities }
    }

    pub fn entities(&self) -> &[FernEntity] {
        &self.entities
    }

    pub fn get(&self, key: &str) -> Option<&FernEntity> {
        self.entities.iter().find(|e| e.key == key)
    }

    pub fn values(&self) -> Vec<f64> {
        self.entities.iter().map(|e| e.value).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
