//! SVG rendering of placed glyphs.
//!
//! The output is a single static `<svg>` element with no scripts and no
//! external references, ready to be inlined into a page.

use std::fmt::Write;

use crate::layout::PlacedGlyph;

/// Ten-color categorical palette (d3 `schemeCategory10`)
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Paints placed glyphs into an SVG document
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    font_family: String,
}

impl SceneRenderer {
    pub fn new(font_family: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
        }
    }

    /// Render glyphs in order onto a `width` x `height` canvas
    pub fn render(&self, width: u32, height: u32, glyphs: &[PlacedGlyph]) -> String {
        let mut svg = String::new();
        let font_family = escape_xml(&self.font_family);

        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
        );
        let _ = write!(
            svg,
            "<g transform=\"translate({},{})\">",
            format_number(f64::from(width) / 2.0),
            format_number(f64::from(height) / 2.0)
        );

        for glyph in glyphs {
            let _ = write!(
                svg,
                "<text style=\"font-size: {}px; font-family: {}; fill: {};\" text-anchor=\"middle\" transform=\"translate({}, {})rotate({})\">{}</text>",
                format_number(glyph.font_size),
                font_family,
                PALETTE[glyph.color_index % PALETTE.len()],
                glyph.x,
                glyph.y,
                glyph.rotation.degrees(),
                escape_xml(&glyph.text)
            );
        }

        svg.push_str("</g></svg>");
        svg
    }
}

/// Format with at most two decimals and no trailing zeros
fn format_number(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
