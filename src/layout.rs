//! Geometric heuristics: when a formula is too wide to sit inline.

use crate::engine::TypesetNode;

/// Engine width units above which a math node gets a horizontal scroll
/// wrapper. Strictly greater-than: a node exactly at the threshold stays
/// inline.
pub const SCROLL_THRESHOLD: f64 = 40.0;

/// Visual affix appended inside a scroll wrapper to signal clipped content.
pub const SCROLL_AFFIX: &str = ">>";

/// Declared heights (engine units) above this force a glyph to minimum
/// full width, putting tall display formulas on their own line.
pub const TALL_GLYPH_HEIGHT: f64 = 8.0;

/// Read a math container's intrinsic width from its first child's declared
/// width attribute, unit-stripped. Absent or unparsable widths default to 1.
pub fn intrinsic_width(node: &TypesetNode) -> f64 {
    node.children
        .first()
        .and_then(|child| child.attr("width"))
        .and_then(|width| {
            width
                .trim_end_matches(|c: char| c.is_ascii_alphabetic())
                .parse::<f64>()
                .ok()
        })
        .unwrap_or(1.0)
}

pub fn needs_scroll(width: f64) -> bool {
    width > SCROLL_THRESHOLD
}
