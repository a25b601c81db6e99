//! Word-cloud layout.
//!
//! Words are sized from their weight, then placed largest first along an
//! Archimedean spiral that starts at the canvas center. A candidate
//! position is accepted when the glyph lies inside the canvas and its padded
//! bounding box does not intersect any glyph placed before it. Words that
//! find no position are dropped and reported on [`LayoutOutcome`].
//!
//! Coordinates are relative to the canvas center with y pointing down, the
//! same frame the renderer translates its group into.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::render::PALETTE;

/// Fraction of the font size above the baseline
const ASCENT: f64 = 0.8;
/// Fraction of the font size below the baseline
const DESCENT: f64 = 0.2;
/// Advance of one terminal column, in ems
const COLUMN_ADVANCE: f64 = 0.5;
/// Angle increment per spiral step, in radians
const SPIRAL_STEP: f64 = 0.1;
/// Side of one spatial index cell, in pixels
const CELL_SIZE: f64 = 64.0;

/// A word and how often it occurs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCloudEntry {
    pub text: String,
    pub weight: u32,
}

impl WordCloudEntry {
    pub fn new(text: impl Into<String>, weight: u32) -> Self {
        Self {
            text: text.into(),
            weight,
        }
    }
}

/// Parameters of one layout run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Exponent `p` in `size = weight^p * zoom`
    pub font_size_exponent: f64,
    /// Linear factor `zoom` in `size = weight^p * zoom`
    pub font_size_zoom: f64,
    /// Distance each glyph box is grown by before collision tests
    pub padding: f64,
    /// Upper bound on spiral positions tried per word
    pub max_spiral_steps: usize,
}

impl LayoutParams {
    /// Font size in pixels for a weight
    pub fn font_size(&self, weight: u32) -> f64 {
        f64::from(weight).powf(self.font_size_exponent) * self.font_size_zoom
    }
}

/// Glyph orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    Upright,
    Vertical,
}

impl Rotation {
    /// Odd weights stay upright, even weights are turned 90 degrees
    pub fn for_weight(weight: u32) -> Self {
        if weight % 2 == 1 {
            Rotation::Upright
        } else {
            Rotation::Vertical
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Upright => 0,
            Rotation::Vertical => 90,
        }
    }
}

/// A word with its final position, size, orientation and color slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedGlyph {
    pub text: String,
    pub weight: u32,
    /// Anchor x: horizontal center of the text
    pub x: i32,
    /// Anchor y: baseline of the text
    pub y: i32,
    pub rotation: Rotation,
    pub font_size: f64,
    /// Position in placement order modulo the palette size
    pub color_index: usize,
}

impl PlacedGlyph {
    /// Bounding box of the rendered glyph
    pub fn bounds(&self) -> BoundingBox {
        glyph_extent(&self.text, self.font_size, self.rotation).translate(self.x, self.y)
    }
}

/// Axis-aligned rectangle, y pointing down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    /// Strict overlap; boxes that only share an edge do not intersect
    pub fn intersects(&self, other: &Self) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    pub fn inflate(&self, amount: f64) -> Self {
        Self {
            left: self.left - amount,
            top: self.top - amount,
            right: self.right + amount,
            bottom: self.bottom + amount,
        }
    }

    fn translate(&self, x: i32, y: i32) -> Self {
        let (dx, dy) = (f64::from(x), f64::from(y));
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Estimated advance width of `text` at `font_size`
pub fn text_width(text: &str, font_size: f64) -> f64 {
    let columns: usize = text.graphemes(true).map(|g| g.width()).sum();
    columns as f64 * COLUMN_ADVANCE * font_size
}

/// Box of a glyph anchored at the origin
fn glyph_extent(text: &str, font_size: f64, rotation: Rotation) -> BoundingBox {
    let half_width = text_width(text, font_size) / 2.0;
    let ascent = ASCENT * font_size;
    let descent = DESCENT * font_size;

    match rotation {
        Rotation::Upright => BoundingBox {
            left: -half_width,
            top: -ascent,
            right: half_width,
            bottom: descent,
        },
        // rotate(90) maps (u, v) to (-v, u)
        Rotation::Vertical => BoundingBox {
            left: -descent,
            top: -half_width,
            right: ascent,
            bottom: half_width,
        },
    }
}

/// Result of one layout run
#[derive(Debug, Clone, Default)]
pub struct LayoutOutcome {
    /// Placed glyphs in placement order
    pub glyphs: Vec<PlacedGlyph>,
    /// Words that found no free position
    pub dropped: Vec<String>,
}

impl LayoutOutcome {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Uniform grid over placed boxes, so a collision test only looks at
/// glyphs in nearby cells.
#[derive(Debug, Default)]
struct SpatialIndex {
    boxes: Vec<BoundingBox>,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialIndex {
    fn cell_range(bounds: &BoundingBox) -> (i64, i64, i64, i64) {
        (
            (bounds.left / CELL_SIZE).floor() as i64,
            (bounds.top / CELL_SIZE).floor() as i64,
            (bounds.right / CELL_SIZE).floor() as i64,
            (bounds.bottom / CELL_SIZE).floor() as i64,
        )
    }

    fn insert(&mut self, bounds: BoundingBox) {
        let id = self.boxes.len();
        self.boxes.push(bounds);

        let (x0, y0, x1, y1) = Self::cell_range(&bounds);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().push(id);
            }
        }
    }

    fn collides(&self, bounds: &BoundingBox) -> bool {
        let (x0, y0, x1, y1) = Self::cell_range(bounds);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(ids) = self.cells.get(&(cx, cy)) {
                    if ids.iter().any(|&id| self.boxes[id].intersects(bounds)) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Mutable state of a single layout run
///
/// Each run owns its own index, so independent clouds can be laid out on
/// different threads.
pub struct CloudLayout {
    params: LayoutParams,
    canvas: BoundingBox,
    index: SpatialIndex,
    placed: Vec<PlacedGlyph>,
    dropped: Vec<String>,
}

impl CloudLayout {
    pub fn new(params: LayoutParams) -> Self {
        let half_w = f64::from(params.width) / 2.0;
        let half_h = f64::from(params.height) / 2.0;
        Self {
            params,
            canvas: BoundingBox {
                left: -half_w,
                top: -half_h,
                right: half_w,
                bottom: half_h,
            },
            index: SpatialIndex::default(),
            placed: Vec::new(),
            dropped: Vec::new(),
        }
    }

    /// Lay out entries, largest font first. Entries of equal size keep their
    /// input order.
    pub fn run(params: LayoutParams, entries: &[WordCloudEntry]) -> LayoutOutcome {
        let mut sized: Vec<(&WordCloudEntry, f64)> = entries
            .iter()
            .map(|entry| (entry, params.font_size(entry.weight)))
            .collect();
        sized.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut layout = Self::new(params);
        for (entry, font_size) in sized {
            layout.place(entry, font_size);
        }
        layout.finish()
    }

    /// Try to place one word; returns whether it was placed
    pub fn place(&mut self, entry: &WordCloudEntry, font_size: f64) -> bool {
        let rotation = Rotation::for_weight(entry.weight);
        let extent = glyph_extent(&entry.text, font_size, rotation);

        let fits_canvas = font_size.is_finite()
            && font_size > 0.0
            && !entry.text.is_empty()
            && extent.width() <= self.canvas.width()
            && extent.height() <= self.canvas.height();

        let position = if fits_canvas {
            self.search(&extent)
        } else {
            None
        };

        match position {
            Some((x, y)) => {
                let bounds = extent.translate(x, y);
                self.index.insert(bounds.inflate(self.params.padding));
                let color_index = self.placed.len() % PALETTE.len();
                self.placed.push(PlacedGlyph {
                    text: entry.text.clone(),
                    weight: entry.weight,
                    x,
                    y,
                    rotation,
                    font_size,
                    color_index,
                });
                true
            }
            None => {
                tracing::debug!("No room for {:?} at {:.1}px", entry.text, font_size);
                self.dropped.push(entry.text.clone());
                false
            }
        }
    }

    /// Walk the spiral until a free, in-bounds anchor is found
    fn search(&self, extent: &BoundingBox) -> Option<(i32, i32)> {
        let ratio = f64::from(self.params.width) / f64::from(self.params.height);
        // Past this radius every spiral point lies outside the canvas
        let max_radius = self.canvas.right.hypot(self.canvas.bottom) / ratio.min(1.0);

        for step in 0..self.params.max_spiral_steps {
            let angle = step as f64 * SPIRAL_STEP;
            if angle > max_radius {
                break;
            }

            let x = (ratio * angle * angle.cos()) as i32;
            let y = (angle * angle.sin()) as i32;
            let bounds = extent.translate(x, y);

            if !self.contains(&bounds) {
                continue;
            }
            if self.index.collides(&bounds.inflate(self.params.padding)) {
                continue;
            }
            return Some((x, y));
        }

        None
    }

    fn contains(&self, bounds: &BoundingBox) -> bool {
        bounds.left >= self.canvas.left
            && bounds.right <= self.canvas.right
            && bounds.top >= self.canvas.top
            && bounds.bottom <= self.canvas.bottom
    }

    pub fn finish(self) -> LayoutOutcome {
        LayoutOutcome {
            glyphs: self.placed,
            dropped: self.dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(width: u32, height: u32) -> LayoutParams {
        LayoutParams {
            width,
            height,
            font_size_exponent: 0.8,
            font_size_zoom: 18.0,
            padding: 2.0,
            max_spiral_steps: 20_000,
        }
    }

    fn sample_entries() -> Vec<WordCloudEntry> {
        [
            ("Rust", 12),
            ("形態素解析", 9),
            ("Gatsby", 7),
            ("React", 6),
            ("TypeScript", 5),
            ("辞書", 4),
            ("Docker", 3),
            ("GraphQL", 2),
            ("SVG", 1),
            ("ワードクラウド", 1),
        ]
        .into_iter()
        .map(|(text, weight)| WordCloudEntry::new(text, weight))
        .collect()
    }

    #[test]
    fn test_font_size_formula() {
        let p = params(100, 100);
        assert_eq!(p.font_size(1), 18.0);
        assert!((p.font_size(10) - 10f64.powf(0.8) * 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_parity() {
        for weight in 1..50 {
            let expected = if weight % 2 == 1 { 0 } else { 90 };
            assert_eq!(Rotation::for_weight(weight).degrees(), expected);
        }

        let outcome = CloudLayout::run(params(1200, 630), &sample_entries());
        for glyph in &outcome.glyphs {
            assert_eq!(glyph.rotation, Rotation::for_weight(glyph.weight));
        }
    }

    #[test]
    fn test_text_width_counts_wide_characters_double() {
        assert_eq!(text_width("ab", 10.0), 10.0);
        assert_eq!(text_width("猫", 10.0), 10.0);
        assert_eq!(text_width("猫a", 10.0), 15.0);
    }

    #[test]
    fn test_vertical_extent_is_rotated() {
        let upright = glyph_extent("ab", 10.0, Rotation::Upright);
        let vertical = glyph_extent("ab", 10.0, Rotation::Vertical);
        assert_eq!(upright.width(), vertical.height());
        assert_eq!(upright.height(), vertical.width());
    }

    #[test]
    fn test_bounding_box_edges_do_not_intersect() {
        let a = BoundingBox {
            left: 0.0,
            top: 0.0,
            right: 10.0,
            bottom: 10.0,
        };
        let b = BoundingBox {
            left: 10.0,
            top: 0.0,
            right: 20.0,
            bottom: 10.0,
        };
        assert!(!a.intersects(&b));
        assert!(a.inflate(1.0).intersects(&b));
    }

    #[test]
    fn test_largest_word_at_center() {
        let outcome = CloudLayout::run(params(1200, 630), &sample_entries());
        let first = &outcome.glyphs[0];

        assert_eq!(first.text, "Rust");
        assert_eq!((first.x, first.y), (0, 0));
        assert_eq!(first.color_index, 0);
    }

    #[test]
    fn test_no_padded_overlap() {
        let p = params(600, 400);
        let mut entries = sample_entries();
        for i in 0..40 {
            entries.push(WordCloudEntry::new(format!("単語{i}"), (i % 7) + 1));
        }
        let outcome = CloudLayout::run(p, &entries);

        let boxes: Vec<BoundingBox> = outcome
            .glyphs
            .iter()
            .map(|g| g.bounds().inflate(p.padding))
            .collect();
        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_glyphs_stay_inside_canvas() {
        let outcome = CloudLayout::run(params(400, 300), &sample_entries());
        for glyph in &outcome.glyphs {
            let b = glyph.bounds();
            assert!(b.left >= -200.0 && b.right <= 200.0, "{glyph:?}");
            assert!(b.top >= -150.0 && b.bottom <= 150.0, "{glyph:?}");
        }
    }

    #[test]
    fn test_tiny_canvas_drops_words() {
        let entries: Vec<WordCloudEntry> = (0..50)
            .map(|i| WordCloudEntry::new(format!("word{i}"), 100 + i))
            .collect();
        let outcome = CloudLayout::run(params(10, 10), &entries);

        assert!(outcome.dropped_count() > 0);
        assert_eq!(outcome.glyphs.len() + outcome.dropped_count(), 50);
    }

    #[test]
    fn test_every_word_is_placed_or_dropped() {
        let entries = sample_entries();
        let outcome = CloudLayout::run(params(300, 200), &entries);
        assert_eq!(outcome.glyphs.len() + outcome.dropped_count(), entries.len());
    }

    #[test]
    fn test_layout_is_deterministic() {
        let entries = sample_entries();
        let a = CloudLayout::run(params(800, 500), &entries);
        let b = CloudLayout::run(params(800, 500), &entries);

        assert_eq!(a.glyphs, b.glyphs);
        assert_eq!(a.dropped, b.dropped);
    }

    #[test]
    fn test_equal_sizes_keep_input_order() {
        let entries = vec![
            WordCloudEntry::new("一", 1),
            WordCloudEntry::new("二", 1),
            WordCloudEntry::new("三", 1),
        ];
        let outcome = CloudLayout::run(params(800, 500), &entries);
        let order: Vec<&str> = outcome.glyphs.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(order, vec!["一", "二", "三"]);
    }

    #[test]
    fn test_color_index_cycles_with_placement_order() {
        let entries: Vec<WordCloudEntry> = (0..15)
            .map(|i| WordCloudEntry::new(format!("w{i}"), 1))
            .collect();
        let outcome = CloudLayout::run(params(1200, 630), &entries);

        for (i, glyph) in outcome.glyphs.iter().enumerate() {
            assert_eq!(glyph.color_index, i % 10);
        }
    }

    #[test]
    fn test_empty_text_is_dropped() {
        let outcome = CloudLayout::run(params(100, 100), &[WordCloudEntry::new("", 3)]);
        assert!(outcome.glyphs.is_empty());
        assert_eq!(outcome.dropped, vec![String::new()]);
    }

    #[test]
    fn test_step_bound_limits_search() {
        let mut p = params(1200, 630);
        p.max_spiral_steps = 1;
        let entries = vec![WordCloudEntry::new("中心", 1), WordCloudEntry::new("外側", 1)];
        let outcome = CloudLayout::run(p, &entries);

        // Only the center position is tried, and the first word takes it
        assert_eq!(outcome.glyphs.len(), 1);
        assert_eq!(outcome.dropped, vec!["外側".to_string()]);
    }
}
