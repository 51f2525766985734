//! Rainfall value → fern style.

/// Color and density for one rainfall band.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RainStyle {
    pub label: &'static str,
    pub color: [f32; 4],
    /// IFS iterations per fern.
    pub points: usize,
}

impl RainStyle {
    pub const fn new(label: &'static str, color: [f32; 4], points: usize) -> Self {
        Self {
            label,
            color,
            points,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.label == UNKNOWN.label
    }
}

pub const UNKNOWN: RainStyle = RainStyle::new("unknown", [0.55, 0.55, 0.55, 0.35], 250);

/// Inclusive upper bounds in mm, ascending.
const BANDS: [(f64, RainStyle); 5] = [
    (10.0, RainStyle::new("≤10", [0.85, 0.80, 0.55, 0.55], 600)),
    (50.0, RainStyle::new("≤50", [0.62, 0.82, 0.48, 0.65], 1_200)),
    (100.0, RainStyle::new("≤100", [0.30, 0.75, 0.45, 0.75], 2_000)),
    (200.0, RainStyle::new("≤200", [0.16, 0.62, 0.62, 0.80], 3_200)),
    (400.0, RainStyle::new("≤400", [0.15, 0.42, 0.78, 0.85], 4_800)),
];

const WETTEST: RainStyle = RainStyle::new(">400", [0.30, 0.22, 0.80, 0.90], 6_500);

/// Style for a monthly rainfall value. Non-finite values get [`UNKNOWN`].
pub fn style_for(value: f64) -> RainStyle {
    if !value.is_finite() {
        return UNKNOWN;
    }
    BANDS
        .iter()
        .find(|(upper, _)| value <= *upper)
        .map(|(_, style)| *style)
        .unwrap_or(WETTEST)
}

/// Every style in display order, for legends.
pub fn legend() -> Vec<RainStyle> {
    let mut out: Vec<RainStyle> = BANDS.iter().map(|(_, s)| *s).collect();
    out.push(WETTEST);
    out.push(UNKNOWN);
    out
}
