//! Windowed page breaking.
//!
//! Laying out "all remaining text" for every page is quadratic in document
//! length. Instead each page measures a bounded window starting at the page
//! start, sized at a few pages' worth of characters, and only falls back to
//! measuring the whole remainder when the window turns out too small to fill
//! the viewport.

use super::{LineMeasurer, PageSpan, Pagination, TextLayout, Viewport};
use crate::text::DecodedText;

/// Measurement window size, in estimated pages.
const WINDOW_PAGES: usize = 5;

/// Lazily yields the pages of a text one measurement at a time.
///
/// Each call to `next` performs at most two measurements, which makes the
/// iterator a natural place for the host to yield between pages.
/// Degenerate viewports and empty text yield no pages; [`paginate`] turns
/// those into the documented results.
pub struct PageIter<'a, M: LineMeasurer + ?Sized> {
    text: &'a DecodedText,
    viewport: Viewport,
    measurer: &'a M,
    window: usize,
    offset: usize,
}

impl<'a, M: LineMeasurer + ?Sized> PageIter<'a, M> {
    pub fn new(text: &'a DecodedText, viewport: Viewport, measurer: &'a M) -> Self {
        let offset = if viewport.is_degenerate() { text.len() } else { 0 };
        let window = viewport
            .estimated_chars_per_page()
            .saturating_mul(WINDOW_PAGES)
            .max(1);
        Self {
            text,
            viewport,
            measurer,
            window,
            offset,
        }
    }

    /// Character offset where the next page will start.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn measure(&self, start: usize, end: usize) -> TextLayout {
        let Viewport {
            width,
            font_size,
            line_spacing,
            ..
        } = self.viewport;
        self.measurer
            .measure(self.text.slice(start, end), width, font_size, line_spacing)
    }
}

impl<M: LineMeasurer + ?Sized> Iterator for PageIter<'_, M> {
    type Item = PageSpan;

    fn next(&mut self) -> Option<PageSpan> {
        let length = self.text.len();
        let start = self.offset;
        if start >= length {
            return None;
        }
        let height = self.viewport.height;

        let mut window_end = start.saturating_add(self.window).min(length);
        let mut layout = self.measure(start, window_end);
        let mut lines_in_page = layout.lines_fitting(height);

        // Every line fit and there is still room below the last one: the
        // window ran out before the page did. Remeasure everything left.
        if lines_in_page == layout.line_count() && window_end < length {
            let room_left = layout
                .line_count()
                .checked_sub(1)
                .and_then(|last| layout.line_bottom(last))
                .is_some_and(|bottom| bottom < height);
            if room_left {
                window_end = length;
                layout = self.measure(start, window_end);
                lines_in_page = layout.lines_fitting(height);
            }
        }

        // A line taller than the page still gets a page of its own.
        let lines_in_page = lines_in_page.max(1);

        let mut end = match layout.line_start(lines_in_page) {
            Some(line_start) => start + line_start,
            None => window_end,
        };
        if end <= start || end > window_end {
            end = window_end;
        }

        self.offset = end;
        Some(PageSpan::new(start, end))
    }
}

impl<M: LineMeasurer + ?Sized> std::iter::FusedIterator for PageIter<'_, M> {}

/// Partition `text` into pages for `viewport`.
///
/// A degenerate viewport yields no pages. Otherwise the result is never
/// empty: empty text becomes a single zero-width page. Progress is reported
/// at most once per integer percent of text consumed and always ends with
/// `1.0`.
pub fn paginate<M: LineMeasurer + ?Sized>(
    text: &DecodedText,
    viewport: Viewport,
    measurer: &M,
    mut progress: Option<&mut dyn FnMut(f32)>,
) -> Pagination {
    if viewport.is_degenerate() {
        log::debug!("skipping pagination for degenerate viewport {viewport:?}");
        if let Some(report) = progress.as_deref_mut() {
            report(1.0);
        }
        return Pagination::new(viewport, Vec::new());
    }

    let length = text.len();
    let mut pages = Vec::new();
    let mut last_percent: Option<usize> = None;

    for page in PageIter::new(text, viewport, measurer) {
        pages.push(page);

        if let Some(report) = progress.as_deref_mut() {
            let percent = page.end * 100 / length;
            if last_percent.is_none_or(|last| percent > last) {
                last_percent = Some(percent);
                report(page.end as f32 / length as f32);
            }
        }
    }

    if pages.is_empty() {
        pages.push(PageSpan::new(0, length));
    }

    log::debug!(
        "paginated {} characters into {} pages ({}x{} @ {}px)",
        length,
        pages.len(),
        viewport.width,
        viewport.height,
        viewport.font_size
    );
    // The last page already reported 100% unless the text was empty.
    if let Some(report) = progress.as_deref_mut()
        && last_percent != Some(100)
    {
        report(1.0);
    }
    Pagination::new(viewport, pages)
}
