//! Reflowable pagination of decoded text against a viewport.
//!
//! Line breaking is delegated to a [`LineMeasurer`] supplied by the host. The
//! paginator only walks the measured lines and decides where each page ends.

mod measure;
mod paginate;

pub use measure::{GridMeasurer, LineMeasurer, LineMetrics, TextLayout};
pub use paginate::{PageIter, paginate};

use crate::text::DecodedText;

/// Page box and font parameters a pagination was computed for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    /// Multiplier applied to the font size to get the line height.
    pub line_spacing: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, font_size: f32, line_spacing: f32) -> Self {
        Self {
            width,
            height,
            font_size,
            line_spacing,
        }
    }

    /// True when any dimension is not strictly positive (or NaN).
    ///
    /// A zero-sized viewport is normal while the host is mid-layout, so this
    /// produces an empty pagination rather than an error.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.font_size > 0.0 && self.line_spacing > 0.0)
    }

    /// Rough characters per page used to size the measurement window.
    pub(crate) fn estimated_chars_per_page(&self) -> usize {
        let chars_per_line = ((self.width / self.font_size) as usize).max(1);
        let lines_per_page = ((self.height / (self.font_size * self.line_spacing)) as usize).max(1);
        chars_per_line.saturating_mul(lines_per_page)
    }
}

/// A half-open character range `[start, end)` shown on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageSpan {
    pub start: usize,
    pub end: usize,
}

impl PageSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// The ordered, contiguous pages produced for one viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    viewport: Viewport,
    pages: Vec<PageSpan>,
}

impl Pagination {
    pub(crate) fn new(viewport: Viewport, pages: Vec<PageSpan>) -> Self {
        Self { viewport, pages }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pages(&self) -> &[PageSpan] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<PageSpan> {
        self.pages.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// See [`find_page`].
    pub fn find_page(&self, offset: usize) -> usize {
        find_page(&self.pages, offset)
    }

    /// Whether this pagination was computed for `viewport`.
    pub fn matches(&self, viewport: &Viewport) -> bool {
        self.viewport == *viewport
    }
}

/// Index of the page containing `offset`.
///
/// The first page whose end lies past `offset`; offsets at or beyond the last
/// page map to the last page. An empty page list yields 0, which callers must
/// not index with.
pub fn find_page(pages: &[PageSpan], offset: usize) -> usize {
    // Pages are contiguous and sorted, so ends are strictly increasing.
    let index = pages.partition_point(|page| page.end <= offset);
    index.min(pages.len().saturating_sub(1))
}

/// Text covered by `span`, with offsets clamped into the buffer.
pub fn page_text(text: &DecodedText, span: PageSpan) -> &str {
    text.slice(span.start, span.end)
}
