//! Geometry resolution between pixel positions and text offsets.
//!
//! Every query is total: offsets outside the text and points outside the
//! block are clamped instead of rejected.

use crate::{
    layout::{TextLayout, floor_char_boundary},
    px::{Px, PxPosition},
};

/// Clamps `offset` into `[0, len]` on a `char` boundary of the layout text.
pub fn clamp_offset(layout: &dyn TextLayout, offset: usize) -> usize {
    floor_char_boundary(layout.text(), offset)
}

/// Offset under `point`, or `-1` above the text and `len` beyond its last
/// line.
pub fn raw_offset_for_position(layout: &dyn TextLayout, point: PxPosition) -> isize {
    if point.y < Px::ZERO {
        return -1;
    }
    if point.y >= layout.size().height {
        return layout.text_len() as isize;
    }
    clamp_offset(layout, layout.offset_for_position(point)) as isize
}

/// Nearest caret offset under a local point, clamped to `[0, len]`.
///
/// Points beyond the last line map to the end of the text and points before
/// the first line map to 0.
pub fn offset_for_position(layout: &dyn TextLayout, point: PxPosition) -> usize {
    raw_offset_for_position(layout, point).max(0) as usize
}

/// Whether a drag from `p1` to `p2` stays entirely past one end of the text.
///
/// True when both points resolve at or after the last character, or both
/// resolve before the first one. The result does not depend on argument
/// order.
pub fn is_out_of_boundary(layout: &dyn TextLayout, p1: PxPosition, p2: PxPosition) -> bool {
    let last = layout.text_len() as isize - 1;
    let first = raw_offset_for_position(layout, p1);
    let second = raw_offset_for_position(layout, p2);
    (first >= last && second >= last) || (first < 0 && second < 0)
}

/// Local position where a selection handle attaches for `offset`.
///
/// The x coordinate comes from the caret on the selected side of the
/// offset, the y coordinate is the bottom of its line minus one pixel.
pub fn handle_anchor(
    layout: &dyn TextLayout,
    offset: usize,
    is_start_handle: bool,
    handles_crossed: bool,
) -> PxPosition {
    let offset = clamp_offset(layout, offset);
    let direction_offset = if is_start_handle != handles_crossed {
        offset
    } else {
        floor_char_boundary(layout.text(), offset.saturating_sub(1))
    };
    let use_primary_direction =
        layout.bidi_run_direction(direction_offset) == layout.paragraph_direction(offset);
    let x = layout.horizontal_position(offset, use_primary_direction);
    let line = layout.line_for_offset(offset);
    adjusted_coordinates(PxPosition::new(x, layout.line_bottom(line)))
}

/// Moves a line-bottom anchor one pixel up so it hit-tests inside the line
/// it belongs to.
pub fn adjusted_coordinates(point: PxPosition) -> PxPosition {
    PxPosition::new(point.x, point.y - Px(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::GridTextLayout;

    fn at(x: i32, y: i32) -> PxPosition {
        PxPosition::new(Px(x), Px(y))
    }

    #[test]
    fn offsets_clamp_above_and_below_text() {
        let layout = GridTextLayout::new("Hello\nworld");
        assert_eq!(offset_for_position(&layout, at(30, -10)), 0);
        assert_eq!(offset_for_position(&layout, at(0, 400)), 11);
        assert_eq!(offset_for_position(&layout, at(20, 25)), 8);
        assert_eq!(raw_offset_for_position(&layout, at(30, -10)), -1);
    }

    #[test]
    fn out_of_boundary_is_symmetric() {
        let layout = GridTextLayout::new("Hello world");
        let above = at(10, -5);
        let below = at(10, 50);
        let inside = at(30, 5);
        let tail = at(105, 5);
        let pairs = [
            (above, above),
            (below, below),
            (above, below),
            (inside, below),
            (tail, below),
            (inside, above),
        ];
        for (p1, p2) in pairs {
            assert_eq!(
                is_out_of_boundary(&layout, p1, p2),
                is_out_of_boundary(&layout, p2, p1)
            );
        }
        assert!(is_out_of_boundary(&layout, above, above));
        assert!(is_out_of_boundary(&layout, tail, below));
        assert!(!is_out_of_boundary(&layout, inside, below));
        assert!(!is_out_of_boundary(&layout, above, below));
    }

    #[test]
    fn handle_anchor_sits_on_line_bottom() {
        let layout = GridTextLayout::new("Hello\nworld");
        assert_eq!(handle_anchor(&layout, 2, true, false), at(20, 19));
        assert_eq!(handle_anchor(&layout, 8, false, false), at(20, 39));
        assert_eq!(handle_anchor(&layout, 500, false, false), at(50, 39));
    }

    #[test]
    fn handle_anchor_follows_rtl_runs() {
        // a b [c d e] f with the run laid out right to left
        let layout = GridTextLayout::new("abcdef").with_rtl_run(2..5);
        // Start handle at the run start reads 'c' (rtl) -> secondary caret.
        assert_eq!(handle_anchor(&layout, 2, true, false).x, Px(50));
        // End handle at the run end reads 'e' (rtl) -> secondary caret.
        assert_eq!(handle_anchor(&layout, 5, false, false).x, Px(20));
        // End handle at the run start reads 'b' (ltr) -> primary caret.
        assert_eq!(handle_anchor(&layout, 2, false, false).x, Px(20));
        // Crossed handles swap which side is read.
        assert_eq!(handle_anchor(&layout, 2, true, true).x, Px(20));
    }
}
