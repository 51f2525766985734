//! Everything derived from the boundary document and the viewport.

use formats::boundary::BoundaryCollection;
use foundation::math::{FittedProjection, Viewport};
use layers::alias::AliasTable;
use layers::anchors::{AnchorBuilder, AnchorSet};
use layers::labels::{
    LabelLayoutConfig, LabelStyle, PlacedLabel, labels_from_anchors, layout_labels,
};
use layers::names::NameFields;
use layers::overrides::OverrideTable;
use layers::vector::{OutlineSnapshot, project_outlines};

#[derive(Debug, Clone)]
pub struct MapConfig {
    pub names: NameFields,
    pub alias: AliasTable,
    pub overrides: OverrideTable,
    pub padding_px: f64,
    pub label_style: LabelStyle,
    pub show_labels: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            names: NameFields::default(),
            alias: AliasTable::india_subdivisions(),
            overrides: OverrideTable::new(),
            padding_px: 0.0,
            label_style: LabelStyle::default(),
            show_labels: true,
        }
    }
}

/// Projection, anchors, outlines and labels for one viewport. Never patched:
/// a resize builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    pub viewport: Viewport,
    pub projection: FittedProjection,
    pub anchors: AnchorSet,
    pub outlines: OutlineSnapshot,
    pub labels: Vec<PlacedLabel>,
}

impl MapState {
    pub fn build(collection: &BoundaryCollection, viewport: Viewport, config: &MapConfig) -> Self {
        let projection = FittedProjection::fit(&collection.bounds(), viewport, config.padding_px);
        let anchors = AnchorBuilder::new(&config.names, &config.alias, &config.overrides)
            .build(collection, &projection);
        let outlines = project_outlines(collection, &projection);
        let labels = if config.show_labels {
            layout_labels(
                &labels_from_anchors(&anchors, &config.label_style),
                &config.label_style,
                LabelLayoutConfig {
                    viewport_px: [viewport.width, viewport.height],
                    ..LabelLayoutConfig::default()
                },
            )
        } else {
            Vec::new()
        };
        Self {
            viewport,
            projection,
            anchors,
            outlines,
            labels,
        }
    }
}
