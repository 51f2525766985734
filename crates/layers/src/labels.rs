//! Region name labels with grid-based collision rejection.

use std::collections::HashSet;

use foundation::math::Vec2;

use crate::anchors::AnchorSet;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font_size_px: f64,
    pub color: [f32; 4],
    pub halo_color: [f32; 4],
    pub halo_width_px: f64,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size_px: 11.0,
            color: [0.92, 0.92, 0.92, 1.0],
            halo_color: [0.0, 0.0, 0.0, 0.85],
            halo_width_px: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelAnchor {
    pub text: String,
    pub position: Vec2,
    pub priority: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelLayoutConfig {
    pub viewport_px: [f64; 2],
    pub cell_px: f64,
    pub padding_px: f64,
    pub max_labels: usize,
    pub max_text_len: usize,
}

impl Default for LabelLayoutConfig {
    fn default() -> Self {
        Self {
            viewport_px: [1.0, 1.0],
            cell_px: 16.0,
            padding_px: 2.0,
            max_labels: 200,
            max_text_len: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub text: String,
    pub position: Vec2,
    pub size_px: [f64; 2],
}

/// One label per anchor, largest regions first. Labels sit just below the
/// anchor so they do not cover the fern.
pub fn labels_from_anchors(anchors: &AnchorSet, style: &LabelStyle) -> Vec<LabelAnchor> {
    let mut out: Vec<LabelAnchor> = anchors
        .iter()
        .map(|a| LabelAnchor {
            text: a.display_name.trim().to_string(),
            position: Vec2::new(a.position.x, a.position.y + style.font_size_px),
            priority: a.scale,
        })
        .filter(|l| !l.text.is_empty())
        .collect();
    out.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}

/// Greedy placement in the given order; a label is dropped when any grid
/// cell under its padded box is already taken or it falls off screen.
pub fn layout_labels(
    labels: &[LabelAnchor],
    style: &LabelStyle,
    config: LabelLayoutConfig,
) -> Vec<PlacedLabel> {
    let mut out = Vec::new();
    let mut occupied: HashSet<u64> = HashSet::new();

    for label in labels {
        if out.len() >= config.max_labels {
            break;
        }
        if label.text.chars().count() > config.max_text_len || !label.position.is_finite() {
            continue;
        }

        let size = estimate_text_size(&label.text, style);
        let half_w = size[0] * 0.5 + config.padding_px;
        let half_h = size[1] * 0.5 + config.padding_px;
        let p = label.position;

        if p.x + half_w < 0.0
            || p.y + half_h < 0.0
            || p.x - half_w > config.viewport_px[0]
            || p.y - half_h > config.viewport_px[1]
        {
            continue;
        }

        if !try_place_label(&mut occupied, p, [half_w, half_h], config.cell_px) {
            continue;
        }

        out.push(PlacedLabel {
            text: label.text.clone(),
            position: p,
            size_px: size,
        });
    }

    out
}

fn estimate_text_size(text: &str, style: &LabelStyle) -> [f64; 2] {
    let count = text.chars().count().max(1) as f64;
    [style.font_size_px * 0.6 * count, style.font_size_px]
}

fn try_place_label(
    occupied: &mut HashSet<u64>,
    center: Vec2,
    half_size: [f64; 2],
    cell_px: f64,
) -> bool {
    let min_x = ((center.x - half_size[0]) / cell_px).floor() as i32;
    let max_x = ((center.x + half_size[0]) / cell_px).floor() as i32;
    let min_y = ((center.y - half_size[1]) / cell_px).floor() as i32;
    let max_y = ((center.y + half_size[1]) / cell_px).floor() as i32;

    for cy in min_y..=max_y {
        for cx in min_x..=max_x {
            if occupied.contains(&cell_key(cx, cy)) {
                return false;
            }
        }
    }

    for cy in min_y..=max_y {
        for cx in min_x..=max_x {
            occupied.insert(cell_key(cx, cy));
        }
    }

    true
}

fn cell_key(cx: i32, cy: i32) -> u64 {
    ((cx as u64) << 32) ^ (cy as u32 as u64)
}
