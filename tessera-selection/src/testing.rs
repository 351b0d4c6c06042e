//! Headless layouts and recording services for tests and hosts without a
//! shaping engine.
//!
//! Enabled with the `testing` feature.

use std::ops::Range;

use parking_lot::Mutex;

use crate::{
    error::{SelectionError, SelectionResult},
    layout::{ResolvedTextDirection, TextLayout, floor_char_boundary},
    platform::{ClipboardService, HapticFeedback, HapticFeedbackType},
    px::{Px, PxPosition, PxRect, PxSize},
    toolbar::{TextToolbar, ToolbarItem, ToolbarStatus},
};

/// A monospace grid layout.
///
/// Every `char` occupies one cell of `char_width` by `line_height`; `'\n'`
/// starts a new line. Paragraphs are left to right, and byte ranges marked
/// with [`GridTextLayout::with_rtl_run`] are laid out right to left inside
/// their line.
///
/// # Examples
///
/// ```
/// use tessera_selection::px::{Px, PxPosition};
/// use tessera_selection::layout::TextLayout;
/// use tessera_selection::testing::GridTextLayout;
///
/// let layout = GridTextLayout::new("Hello world");
/// assert_eq!(layout.offset_for_position(PxPosition::new(Px(75), Px(5))), 8);
/// assert_eq!(layout.horizontal_position(6, true), Px(60));
/// ```
#[derive(Debug, Clone)]
pub struct GridTextLayout {
    text: String,
    char_width: Px,
    line_height: Px,
    line_starts: Vec<usize>,
    rtl_runs: Vec<Range<usize>>,
}

impl GridTextLayout {
    /// Default cell width.
    pub const DEFAULT_CHAR_WIDTH: Px = Px(10);
    /// Default line height.
    pub const DEFAULT_LINE_HEIGHT: Px = Px(20);

    /// Lays out `text` with the default metrics.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            text,
            char_width: Self::DEFAULT_CHAR_WIDTH,
            line_height: Self::DEFAULT_LINE_HEIGHT,
            line_starts,
            rtl_runs: Vec::new(),
        }
    }

    /// Overrides the cell metrics.
    pub fn with_metrics(mut self, char_width: Px, line_height: Px) -> Self {
        self.char_width = char_width;
        self.line_height = line_height;
        self
    }

    /// Marks a byte range as a right-to-left run. The run must not span a
    /// line break.
    pub fn with_rtl_run(mut self, run: Range<usize>) -> Self {
        let start = floor_char_boundary(&self.text, run.start);
        let end = floor_char_boundary(&self.text, run.end);
        if start < end {
            self.rtl_runs.push(start..end);
        }
        self
    }

    /// Local position of the middle of the glyph at `offset`.
    pub fn glyph_center(&self, offset: usize) -> PxPosition {
        let offset = floor_char_boundary(&self.text, offset);
        let line = self.line_for_offset(offset);
        let visual = self.visual_column(line, self.column(line, offset));
        PxPosition::new(
            self.char_width * visual as i32 + self.char_width / 2,
            self.line_height * line as i32 + self.line_height / 2,
        )
    }

    fn line_end(&self, line: usize) -> usize {
        self.line_starts
            .get(line + 1)
            .map_or(self.text.len(), |next| next - 1)
    }

    fn line_text(&self, line: usize) -> &str {
        &self.text[self.line_starts[line]..self.line_end(line)]
    }

    fn column(&self, line: usize, offset: usize) -> usize {
        let start = self.line_starts[line];
        self.text[start..offset.max(start)].chars().count()
    }

    fn offset_at_column(&self, line: usize, column: usize) -> usize {
        let start = self.line_starts[line];
        let line_text = self.line_text(line);
        line_text
            .char_indices()
            .nth(column)
            .map_or(start + line_text.len(), |(i, _)| start + i)
    }

    /// RTL runs on `line` as `(start_column, end_column)` pairs.
    fn run_columns(&self, line: usize) -> impl Iterator<Item = (usize, usize, &Range<usize>)> {
        let start = self.line_starts[line];
        let end = self.line_end(line);
        self.rtl_runs
            .iter()
            .filter(move |run| run.start >= start && run.end <= end)
            .map(move |run| (self.column(line, run.start), self.column(line, run.end), run))
    }

    /// Visual cell of the glyph at logical `column`.
    fn visual_column(&self, line: usize, column: usize) -> usize {
        for (s, e, _) in self.run_columns(line) {
            if column >= s && column < e {
                return s + e - 1 - column;
            }
        }
        column
    }
}

impl TextLayout for GridTextLayout {
    fn text(&self) -> &str {
        &self.text
    }

    fn size(&self) -> PxSize {
        let widest = (0..self.line_count())
            .map(|line| self.line_text(line).chars().count())
            .max()
            .unwrap_or(0);
        PxSize::new(
            self.char_width * widest as i32,
            self.line_height * self.line_count() as i32,
        )
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_for_offset(&self, offset: usize) -> usize {
        let offset = offset.min(self.text.len());
        self.line_starts
            .iter()
            .rposition(|start| *start <= offset)
            .unwrap_or(0)
    }

    fn line_top(&self, line: usize) -> Px {
        self.line_height * line.min(self.line_count() - 1) as i32
    }

    fn line_bottom(&self, line: usize) -> Px {
        self.line_top(line) + self.line_height
    }

    fn horizontal_position(&self, offset: usize, use_primary_direction: bool) -> Px {
        let offset = floor_char_boundary(&self.text, offset);
        let line = self.line_for_offset(offset);
        let column = self.column(line, offset);
        for (s, e, run) in self.run_columns(line) {
            let inside = run.start < offset && offset < run.end;
            let at_edge = offset == run.start || offset == run.end;
            if inside || (at_edge && !use_primary_direction) {
                return self.char_width * (s + e - column) as i32;
            }
        }
        self.char_width * column as i32
    }

    fn bidi_run_direction(&self, offset: usize) -> ResolvedTextDirection {
        if self
            .rtl_runs
            .iter()
            .any(|run| run.start <= offset && offset < run.end)
        {
            ResolvedTextDirection::Rtl
        } else {
            ResolvedTextDirection::Ltr
        }
    }

    fn paragraph_direction(&self, _offset: usize) -> ResolvedTextDirection {
        ResolvedTextDirection::Ltr
    }

    fn offset_for_position(&self, position: PxPosition) -> usize {
        let line = if position.y.0 < 0 {
            0
        } else {
            ((position.y.0 / self.line_height.0.max(1)) as usize).min(self.line_count() - 1)
        };
        let line_chars = self.line_text(line).chars().count();
        let width = self.char_width.0.max(1);
        let mut column = if position.x.0 < 0 {
            0
        } else {
            (((position.x.0 + width / 2) / width) as usize).min(line_chars)
        };
        for (s, e, _) in self.run_columns(line) {
            if column > s && column < e {
                column = s + e - column;
                break;
            }
        }
        self.offset_at_column(line, column)
    }

    fn path_for_range(&self, range: Range<usize>) -> Vec<PxRect> {
        let start = floor_char_boundary(&self.text, range.start.min(range.end));
        let end = floor_char_boundary(&self.text, range.start.max(range.end));
        let mut rects = Vec::new();
        for line in self.line_for_offset(start)..=self.line_for_offset(end) {
            let from = start.max(self.line_starts[line]);
            let to = end.min(self.line_end(line));
            if from >= to {
                continue;
            }
            let first = self.column(line, from);
            let count = self.text[from..to].chars().count();
            let mut cells: Vec<usize> = (first..first + count)
                .map(|column| self.visual_column(line, column))
                .collect();
            cells.sort_unstable();

            let top = self.line_top(line);
            let mut run_start = cells[0];
            let mut previous = cells[0];
            for &cell in cells.iter().skip(1).chain(std::iter::once(&usize::MAX)) {
                if cell != previous + 1 {
                    rects.push(PxRect::new(
                        self.char_width * run_start as i32,
                        top,
                        self.char_width * (previous + 1 - run_start) as i32,
                        self.line_height,
                    ));
                    run_start = cell;
                }
                previous = cell;
            }
        }
        rects
    }
}

/// A toolbar that records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingToolbar {
    state: Mutex<ToolbarRecord>,
}

#[derive(Debug, Default)]
struct ToolbarRecord {
    status: ToolbarStatus,
    shown: Vec<(PxRect, Vec<String>)>,
    hides: usize,
}

impl RecordingToolbar {
    /// Number of `show` calls.
    pub fn show_count(&self) -> usize {
        self.state.lock().shown.len()
    }

    /// Number of `hide` calls.
    pub fn hide_count(&self) -> usize {
        self.state.lock().hides
    }

    /// Anchor and item ids of the last `show` call.
    pub fn last_shown(&self) -> Option<(PxRect, Vec<String>)> {
        self.state.lock().shown.last().cloned()
    }
}

impl TextToolbar for RecordingToolbar {
    fn show(&self, anchor: PxRect, items: &[ToolbarItem]) {
        let mut state = self.state.lock();
        state.status = ToolbarStatus::Shown;
        state
            .shown
            .push((anchor, items.iter().map(|item| item.id.clone()).collect()));
    }

    fn hide(&self) {
        let mut state = self.state.lock();
        state.status = ToolbarStatus::Hidden;
        state.hides += 1;
    }

    fn status(&self) -> ToolbarStatus {
        self.state.lock().status
    }
}

/// An in-memory clipboard.
#[derive(Debug, Default)]
pub struct RecordingClipboard {
    contents: Mutex<Option<String>>,
    fail: bool,
}

impl RecordingClipboard {
    /// A clipboard that rejects every write.
    pub fn failing() -> Self {
        Self {
            contents: Mutex::new(None),
            fail: true,
        }
    }

    /// Last text written.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl ClipboardService for RecordingClipboard {
    fn set_text(&self, text: &str) -> SelectionResult<()> {
        if self.fail {
            return Err(SelectionError::Clipboard("clipboard unavailable".to_owned()));
        }
        *self.contents.lock() = Some(text.to_owned());
        Ok(())
    }
}

/// Haptics that record every pulse.
#[derive(Debug, Default)]
pub struct RecordingHaptics {
    pulses: Mutex<Vec<HapticFeedbackType>>,
}

impl RecordingHaptics {
    /// Pulses performed so far.
    pub fn pulses(&self) -> Vec<HapticFeedbackType> {
        self.pulses.lock().clone()
    }
}

impl HapticFeedback for RecordingHaptics {
    fn perform(&self, kind: HapticFeedbackType) {
        self.pulses.lock().push(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: i32, y: i32) -> PxPosition {
        PxPosition::new(Px(x), Px(y))
    }

    #[test]
    fn hit_testing_rounds_to_nearest_caret() {
        let layout = GridTextLayout::new("Hello world");
        assert_eq!(layout.offset_for_position(at(0, 5)), 0);
        assert_eq!(layout.offset_for_position(at(4, 5)), 0);
        assert_eq!(layout.offset_for_position(at(5, 5)), 1);
        assert_eq!(layout.offset_for_position(at(500, 5)), 11);
        assert_eq!(layout.offset_for_position(at(-20, 5)), 0);
    }

    #[test]
    fn lines_split_on_line_breaks() {
        let layout = GridTextLayout::new("ab\ncde");
        assert_eq!(layout.line_count(), 2);
        assert_eq!(layout.line_for_offset(2), 0);
        assert_eq!(layout.line_for_offset(3), 1);
        assert_eq!(layout.line_bottom(1), Px(40));
        assert_eq!(layout.offset_for_position(at(15, 25)), 5);
        assert_eq!(layout.size(), PxSize::new(Px(30), Px(40)));
    }

    #[test]
    fn rtl_runs_mirror_carets() {
        // cells: a b [c d e] f, run covers bytes 2..5
        let layout = GridTextLayout::new("abcdef").with_rtl_run(2..5);
        assert_eq!(layout.bidi_run_direction(3), ResolvedTextDirection::Rtl);
        assert_eq!(layout.bidi_run_direction(5), ResolvedTextDirection::Ltr);
        assert_eq!(layout.horizontal_position(3, true), Px(40));
        assert_eq!(layout.horizontal_position(2, true), Px(20));
        assert_eq!(layout.horizontal_position(2, false), Px(50));
        assert_eq!(layout.horizontal_position(5, false), Px(20));
        assert_eq!(layout.offset_for_position(at(40, 5)), 3);
        assert_eq!(layout.glyph_center(2), at(45, 10));
    }

    #[test]
    fn path_merges_adjacent_cells() {
        let layout = GridTextLayout::new("ab\ncde");
        let rects = layout.path_for_range(1..5);
        assert_eq!(
            rects,
            vec![
                PxRect::new(Px(10), Px(0), Px(10), Px(20)),
                PxRect::new(Px(0), Px(20), Px(20), Px(20)),
            ]
        );
        assert!(layout.path_for_range(3..3).is_empty());
    }
}
