use std::fmt::Write;

use foundation::math::{Vec2, Viewport};

use crate::canvas::{Canvas, Rgba, TextAnchor, TextStyle};

const FONT_STACK: &str = "\"Open Sans\", \"Arial\", sans-serif";

/// Builds one standalone SVG document.
#[derive(Debug, Default)]
pub struct SvgCanvas {
    body: String,
    viewport: Option<Viewport>,
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canvas for SvgCanvas {
    type Output = String;

    fn begin(&mut self, viewport: Viewport, background: Rgba) {
        self.body.clear();
        self.viewport = Some(viewport);
        let _ = writeln!(
            self.body,
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" {}/>",
            num(viewport.width),
            num(viewport.height),
            paint("fill", background)
        );
    }

    fn polygon(&mut self, rings: &[Vec<Vec2>], fill: Rgba, stroke: Rgba, stroke_width: f64) {
        let mut d = String::new();
        for ring in rings {
            let mut it = ring.iter();
            let Some(first) = it.next() else {
                continue;
            };
            let _ = write!(d, "M{},{}", num(first.x), num(first.y));
            for p in it {
                let _ = write!(d, "L{},{}", num(p.x), num(p.y));
            }
            d.push('Z');
        }
        if d.is_empty() {
            return;
        }
        let _ = writeln!(
            self.body,
            "<path d=\"{d}\" fill-rule=\"evenodd\" {} {} stroke-width=\"{}\" stroke-linejoin=\"round\"/>",
            paint("fill", fill),
            paint("stroke", stroke),
            num(stroke_width)
        );
    }

    fn rect(&mut self, min: Vec2, size: Vec2, fill: Rgba) {
        let _ = writeln!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {}/>",
            num(min.x),
            num(min.y),
            num(size.x.max(0.0)),
            num(size.y.max(0.0)),
            paint("fill", fill)
        );
    }

    fn points(&mut self, points: &[Vec2], color: Rgba, size_px: f64) {
        // One path of tiny squares keeps large clouds compact.
        let half = size_px * 0.5;
        let side = num(size_px);
        let mut d = String::with_capacity(points.len() * 24);
        for p in points.iter().filter(|p| p.is_finite()) {
            let _ = write!(
                d,
                "M{},{}h{side}v{side}h-{side}z",
                num(p.x - half),
                num(p.y - half)
            );
        }
        if d.is_empty() {
            return;
        }
        let _ = writeln!(self.body, "<path d=\"{d}\" {}/>", paint("fill", color));
    }

    fn text(&mut self, at: Vec2, text: &str, style: &TextStyle) {
        let anchor = match style.anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };
        let weight = if style.bold { "bold" } else { "normal" };
        let halo = match style.halo {
            Some((color, width)) => format!(
                " {} stroke-width=\"{}\" paint-order=\"stroke\" stroke-linejoin=\"round\"",
                paint("stroke", color),
                num(width)
            ),
            None => String::new(),
        };
        let _ = writeln!(
            self.body,
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" font-weight=\"{weight}\" text-anchor=\"{anchor}\" {}{halo}>{}</text>",
            num(at.x),
            num(at.y),
            num(style.size_px),
            paint("fill", style.color),
            escape_xml_text(text)
        );
    }

    fn finish(self) -> String {
        let vp = self.viewport.unwrap_or(Viewport::new(1.0, 1.0));
        let mut out = String::with_capacity(self.body.len() + 256);
        let _ = writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"{}\">",
            escape_xml_attr(FONT_STACK),
            w = num(vp.width),
            h = num(vp.height),
        );
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

/// `fill="#rrggbb" fill-opacity="a"` (opacity omitted when opaque).
fn paint(attr: &str, c: Rgba) -> String {
    let ch = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    let mut s = format!(
        "{attr}=\"#{:02x}{:02x}{:02x}\"",
        ch(c[0]),
        ch(c[1]),
        ch(c[2])
    );
    let a = c[3].clamp(0.0, 1.0);
    if a < 1.0 {
        let _ = write!(s, " {attr}-opacity=\"{}\"", num(f64::from(a)));
    }
    s
}

/// Two decimals, trailing zeros trimmed.
fn num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

pub fn escape_xml_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

pub fn escape_xml_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{SvgCanvas, num, paint};
    use crate::canvas::{Canvas, TextStyle};
    use foundation::math::{Vec2, Viewport};

    #[test]
    fn number_formatting() {
        assert_eq!(num(3.0), "3");
        assert_eq!(num(2.5), "2.5");
        assert_eq!(num(1.23456), "1.23");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(f64::NAN), "0");
    }

    #[test]
    fn paint_omits_opaque_alpha() {
        assert_eq!(paint("fill", [1.0, 0.0, 0.0, 1.0]), "fill=\"#ff0000\"");
        assert_eq!(
            paint("stroke", [0.0, 0.0, 1.0, 0.5]),
            "stroke=\"#0000ff\" stroke-opacity=\"0.5\""
        );
    }

    #[test]
    fn document_structure() {
        let mut c = SvgCanvas::new();
        c.begin(Viewport::new(100.0, 50.0), [0.0, 0.0, 0.0, 1.0]);
        c.polygon(
            &[vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)]],
            [0.2, 0.2, 0.2, 1.0],
            [1.0, 1.0, 1.0, 1.0],
            1.0,
        );
        c.points(&[Vec2::new(5.0, 5.0), Vec2::new(f64::NAN, 1.0)], [0.0, 1.0, 0.0, 0.8], 1.0);
        c.text(Vec2::new(1.0, 2.0), "Andaman & Nicobar", &TextStyle::new(10.0, [1.0; 4]));
        let svg = c.finish();

        assert!(svg.starts_with(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100\" height=\"50\""
        ));
        assert!(svg.contains("M0,0L10,0L10,10Z"));
        assert!(svg.contains("M4.5,4.5h1v1h-1z\""));
        assert!(svg.contains(">Andaman &amp; Nicobar</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
