//! Frame composition: map, ferns, labels, timeline, legend, status.

use foundation::math::Vec2;
use foundation::time::Month;
use layers::symbology::legend;
use runtime::status::StatusLevel;
use scene::Controller;

use crate::canvas::{Canvas, Rgba, TextAnchor, TextStyle};

const BACKGROUND: Rgba = [0.06, 0.07, 0.09, 1.0];
const LAND: Rgba = [0.13, 0.15, 0.18, 1.0];
const BORDER: Rgba = [0.40, 0.44, 0.50, 0.9];
const TEXT: Rgba = [0.90, 0.91, 0.93, 1.0];
const MUTED: Rgba = [0.55, 0.58, 0.62, 1.0];
const ERROR: Rgba = [0.95, 0.36, 0.30, 1.0];
const SEGMENT: Rgba = [0.20, 0.22, 0.26, 1.0];
const SEGMENT_ACTIVE: Rgba = [0.35, 0.62, 0.90, 1.0];

const TIMELINE_HEIGHT: f64 = 26.0;
const MARGIN: f64 = 12.0;

pub fn draw_frame<C: Canvas>(controller: &Controller, mut canvas: C) -> C::Output {
    let vp = controller.viewport();
    canvas.begin(vp, BACKGROUND);

    if let Some(map) = controller.map() {
        for outline in &map.outlines.outlines {
            canvas.polygon(&outline.rings, LAND, BORDER, 0.75);
        }
    }

    for fern in controller.ferns().entities() {
        canvas.points(&fern.points, fern.style.color, 1.2);
    }

    if let Some(map) = controller.map() {
        let s = &controller.config().map.label_style;
        let style = TextStyle::new(s.font_size_px, s.color)
            .anchored(TextAnchor::Middle)
            .with_halo(s.halo_color, s.halo_width_px);
        for label in &map.labels {
            canvas.text(label.position, &label.text, &style);
        }
    }

    draw_header(controller, &mut canvas);
    draw_legend(controller, &mut canvas);
    draw_timeline(controller, &mut canvas);
    draw_status(controller, &mut canvas);

    canvas.finish()
}

fn draw_header<C: Canvas>(controller: &Controller, canvas: &mut C) {
    let title = TextStyle::new(18.0, TEXT).bold();
    let sub = TextStyle::new(12.0, MUTED);
    let month = controller.cursor().month();
    match controller.year() {
        Some(year) => {
            canvas.text(Vec2::new(MARGIN, MARGIN + 16.0), &format!("{month} {year}"), &title);
            let years = controller.years();
            if let (Some(first), Some(last)) = (years.first(), years.last()) {
                canvas.text(
                    Vec2::new(MARGIN, MARGIN + 34.0),
                    &format!("years {first}–{last} · monthly rainfall (mm)"),
                    &sub,
                );
            }
        }
        None => canvas.text(Vec2::new(MARGIN, MARGIN + 16.0), "waiting for rainfall data", &title),
    }
}

fn draw_legend<C: Canvas>(controller: &Controller, canvas: &mut C) {
    let vp = controller.viewport();
    let x = vp.width - MARGIN - 70.0;
    let text = TextStyle::new(11.0, TEXT);
    for (i, style) in legend().iter().enumerate() {
        let y = MARGIN + i as f64 * 16.0;
        canvas.rect(Vec2::new(x, y), Vec2::new(12.0, 12.0), style.color);
        canvas.text(Vec2::new(x + 18.0, y + 10.0), style.label, &text);
    }
}

/// Twelve equal segments along the bottom edge; the current month is lit.
fn draw_timeline<C: Canvas>(controller: &Controller, canvas: &mut C) {
    let vp = controller.viewport();
    let top = vp.height - MARGIN - TIMELINE_HEIGHT;
    let width = (vp.width - 2.0 * MARGIN).max(12.0);
    let seg = width / 12.0;
    let current = controller.cursor().month();
    let label = TextStyle::new(10.0, TEXT).anchored(TextAnchor::Middle);
    for month in Month::ALL {
        let x = MARGIN + month.index() as f64 * seg;
        let fill = if month == current { SEGMENT_ACTIVE } else { SEGMENT };
        canvas.rect(Vec2::new(x + 1.0, top), Vec2::new(seg - 2.0, TIMELINE_HEIGHT), fill);
        canvas.text(
            Vec2::new(x + seg * 0.5, top + TIMELINE_HEIGHT * 0.5 + 4.0),
            month.label(),
            &label,
        );
    }
}

/// Status headline on the left; unmatched-region counts right-aligned.
fn draw_status<C: Canvas>(controller: &Controller, canvas: &mut C) {
    let vp = controller.viewport();
    let baseline = vp.height - MARGIN - TIMELINE_HEIGHT - 8.0;

    if let Some(msg) = controller.status().headline() {
        let color = match msg.level {
            StatusLevel::Error => ERROR,
            StatusLevel::Info => MUTED,
        };
        canvas.text(
            Vec2::new(MARGIN, baseline),
            &format!("{}: {}", msg.source, msg.text),
            &TextStyle::new(12.0, color),
        );
    }

    let tally = controller.tally();
    if !tally.is_empty() {
        canvas.text(
            Vec2::new(vp.width - MARGIN, baseline),
            &format!("unmatched: {tally}"),
            &TextStyle::new(11.0, MUTED).anchored(TextAnchor::End),
        );
    }
}
