//! The line-measurement oracle and a reference implementation.

use unicode_width::UnicodeWidthChar;

/// One broken line of a measured window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// First character of the line, relative to the measured window.
    pub start: usize,
    /// Cumulative bottom edge of the line from the top of the window.
    pub bottom: f32,
}

/// Immutable result of measuring one window of text.
///
/// Lines are in order with increasing `start` and `bottom`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    lines: Vec<LineMetrics>,
}

impl TextLayout {
    pub fn new(lines: Vec<LineMetrics>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[LineMetrics] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(|l| l.start)
    }

    pub fn line_bottom(&self, line: usize) -> Option<f32> {
        self.lines.get(line).map(|l| l.bottom)
    }

    /// Number of leading lines whose bottom fits within `height`.
    pub fn lines_fitting(&self, height: f32) -> usize {
        self.lines.iter().take_while(|l| l.bottom <= height).count()
    }
}

/// Breaks a window of text into lines for a given width and font.
///
/// Implementations must be pure: the same input always yields the same
/// layout. Pagination is deterministic only if the measurer is.
pub trait LineMeasurer {
    fn measure(&self, window: &str, width: f32, font_size: f32, line_spacing: f32) -> TextLayout;
}

impl<M: LineMeasurer + ?Sized> LineMeasurer for &M {
    fn measure(&self, window: &str, width: f32, font_size: f32, line_spacing: f32) -> TextLayout {
        (**self).measure(window, width, font_size, line_spacing)
    }
}

/// Greedy per-character line breaker on a fixed advance grid.
///
/// Each character advances by its display width in columns times
/// `column_ratio × font_size`, so with the default ratio of one half a wide
/// CJK character takes one em and a Latin letter half an em. A newline ends
/// its line. Every line holds at least one character even if it overflows.
#[derive(Debug, Clone, Copy)]
pub struct GridMeasurer {
    column_ratio: f32,
}

impl Default for GridMeasurer {
    fn default() -> Self {
        Self { column_ratio: 0.5 }
    }
}

impl GridMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measurer where one display column is `column_ratio` ems wide.
    pub fn with_column_ratio(column_ratio: f32) -> Self {
        Self { column_ratio }
    }

    fn advance(&self, c: char, font_size: f32) -> f32 {
        let columns = c.width().unwrap_or(0) as f32;
        columns * self.column_ratio * font_size
    }
}

impl LineMeasurer for GridMeasurer {
    fn measure(&self, window: &str, width: f32, font_size: f32, line_spacing: f32) -> TextLayout {
        let mut starts = Vec::new();
        let mut x = 0.0f32;
        let mut at_line_start = true;

        for (index, c) in window.chars().enumerate() {
            if at_line_start {
                starts.push(index);
                at_line_start = false;
                x = 0.0;
            }
            if c == '\n' {
                at_line_start = true;
                continue;
            }

            let advance = self.advance(c, font_size);
            if x > 0.0 && x + advance > width {
                starts.push(index);
                x = 0.0;
            }
            x += advance;
        }

        let line_height = font_size * line_spacing;
        let lines = starts
            .into_iter()
            .enumerate()
            .map(|(line, start)| LineMetrics {
                start,
                bottom: (line + 1) as f32 * line_height,
            })
            .collect();
        TextLayout::new(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts(layout: &TextLayout) -> Vec<usize> {
        layout.lines().iter().map(|l| l.start).collect()
    }

    #[test]
    fn test_wraps_latin_at_half_em() {
        // 10px font, 20px wide: four Latin characters per line.
        let layout = GridMeasurer::new().measure("abcdefghij", 20.0, 10.0, 1.0);
        assert_eq!(starts(&layout), vec![0, 4, 8]);
        assert_eq!(layout.line_bottom(2), Some(30.0));
    }

    #[test]
    fn test_wraps_cjk_at_full_em() {
        let layout = GridMeasurer::new().measure("第一章开端正文", 30.0, 10.0, 1.5);
        assert_eq!(starts(&layout), vec![0, 3, 6]);
        assert_eq!(layout.line_bottom(0), Some(15.0));
    }

    #[test]
    fn test_newlines_end_lines() {
        let layout = GridMeasurer::new().measure("ab\n\ncd", 100.0, 10.0, 1.0);
        assert_eq!(starts(&layout), vec![0, 3, 4]);
    }

    #[test]
    fn test_overwide_character_still_placed() {
        let layout = GridMeasurer::new().measure("字字", 5.0, 10.0, 1.0);
        assert_eq!(starts(&layout), vec![0, 1]);
    }

    #[test]
    fn test_lines_fitting() {
        let layout = GridMeasurer::new().measure("abcdefghij", 20.0, 10.0, 1.0);
        assert_eq!(layout.lines_fitting(25.0), 2);
        assert_eq!(layout.lines_fitting(5.0), 0);
        assert_eq!(layout.lines_fitting(30.0), 3);
    }

    #[test]
    fn test_empty_window() {
        let layout = GridMeasurer::new().measure("", 20.0, 10.0, 1.0);
        assert_eq!(layout.line_count(), 0);
    }
}
