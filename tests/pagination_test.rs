//! Pagination properties over arbitrary text and viewports.

use proptest::prelude::*;

use pagewise::{
    DecodedText, GridMeasurer, LineMeasurer, LineMetrics, PageIter, TextLayout, Viewport,
    find_page, page_text, paginate,
};

/// Text drawn from a small alphabet of narrow, wide and breaking characters.
fn arb_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just('a'),
            Just('Z'),
            Just(' '),
            Just('\n'),
            Just('第'),
            Just('。'),
            Just('é'),
        ],
        0..400,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn arb_viewport() -> impl Strategy<Value = Viewport> {
    (8.0f32..200.0, 8.0f32..200.0, 4.0f32..24.0, 1.0f32..2.0)
        .prop_map(|(width, height, font, spacing)| Viewport::new(width, height, font, spacing))
}

/// Fixed-height lines of `per_line` characters, ignoring newlines.
struct FixedColumns {
    per_line: usize,
}

impl LineMeasurer for FixedColumns {
    fn measure(&self, window: &str, _width: f32, font_size: f32, _spacing: f32) -> TextLayout {
        let chars = window.chars().count();
        let lines = (0..chars)
            .step_by(self.per_line)
            .enumerate()
            .map(|(line, start)| LineMetrics {
                start,
                bottom: (line + 1) as f32 * font_size,
            })
            .collect();
        TextLayout::new(lines)
    }
}

// ============================================================================
// Structure
// ============================================================================

proptest! {
    #[test]
    fn prop_pages_tile_the_text(text in arb_text(), viewport in arb_viewport()) {
        let decoded = DecodedText::new(text);
        let pagination = paginate(&decoded, viewport, &GridMeasurer::new(), None);
        let pages = pagination.pages();

        prop_assert!(!pages.is_empty());
        prop_assert_eq!(pages[0].start, 0);
        prop_assert_eq!(pages[pages.len() - 1].end, decoded.len());
        for pair in pages.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        if !decoded.is_empty() {
            prop_assert!(pages.iter().all(|p| p.end > p.start));
        }

        let rebuilt: String = pages.iter().map(|&p| page_text(&decoded, p)).collect();
        prop_assert_eq!(rebuilt.as_str(), decoded.as_str());
    }

    #[test]
    fn prop_pagination_is_deterministic(text in arb_text(), viewport in arb_viewport()) {
        let decoded = DecodedText::new(text);
        let first = paginate(&decoded, viewport, &GridMeasurer::new(), None);
        let second = paginate(&decoded, viewport, &GridMeasurer::new(), None);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_lazy_iteration_matches_paginate(text in arb_text(), viewport in arb_viewport()) {
        let decoded = DecodedText::new(text);
        let measurer = GridMeasurer::new();
        let eager = paginate(&decoded, viewport, &measurer, None);
        let lazy: Vec<_> = PageIter::new(&decoded, viewport, &measurer).collect();

        if decoded.is_empty() {
            prop_assert!(lazy.is_empty());
        } else {
            prop_assert_eq!(eager.pages(), lazy.as_slice());
        }
    }

    #[test]
    fn prop_find_page_lands_on_containing_page(text in arb_text(), viewport in arb_viewport()) {
        let decoded = DecodedText::new(text);
        let pagination = paginate(&decoded, viewport, &GridMeasurer::new(), None);
        let pages = pagination.pages();

        for (index, page) in pages.iter().enumerate() {
            prop_assert_eq!(find_page(pages, page.start), index);
        }

        let mut previous = 0;
        for offset in 0..=decoded.len() + 2 {
            let index = pagination.find_page(offset);
            prop_assert!(index >= previous);
            prop_assert!(index < pages.len());
            if offset < decoded.len() {
                prop_assert!(pages[index].contains(offset));
            }
            previous = index;
        }
    }

    #[test]
    fn prop_progress_is_monotonic(text in arb_text(), viewport in arb_viewport()) {
        let decoded = DecodedText::new(text);
        let mut reports = Vec::new();
        let mut record = |fraction: f32| reports.push(fraction);
        paginate(&decoded, viewport, &GridMeasurer::new(), Some(&mut record));

        prop_assert_eq!(reports.last().copied(), Some(1.0));
        // At most one report per integer percent, so never a repeat.
        prop_assert!(reports.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(reports.iter().all(|&f| (0.0..=1.0).contains(&f)));
    }
}

// ============================================================================
// Window handling
// ============================================================================

#[test]
fn test_long_pages_cross_the_estimated_window() {
    // The estimate assumes one character per line, so five pages of it
    // cover only half of one real page of ten-character lines.
    let text = DecodedText::new("x".repeat(5000));
    let viewport = Viewport::new(1.0, 100.0, 1.0, 1.0);
    let pagination = paginate(&text, viewport, &FixedColumns { per_line: 10 }, None);

    assert_eq!(pagination.len(), 5);
    assert!(pagination.pages().iter().all(|p| p.len() == 1000));
}

#[test]
fn test_short_last_page() {
    let text = DecodedText::new("x".repeat(25));
    let viewport = Viewport::new(10.0, 3.0, 1.0, 1.0);
    let pagination = paginate(&text, viewport, &FixedColumns { per_line: 4 }, None);

    let lens: Vec<_> = pagination.pages().iter().map(|p| p.len()).collect();
    assert_eq!(lens, vec![12, 12, 1]);
}

#[test]
fn test_degenerate_viewports() {
    let text = DecodedText::new("hello world".to_string());
    for viewport in [
        Viewport::new(0.0, 100.0, 10.0, 1.0),
        Viewport::new(100.0, -1.0, 10.0, 1.0),
        Viewport::new(100.0, 100.0, 0.0, 1.0),
        Viewport::new(100.0, 100.0, 10.0, f32::NAN),
    ] {
        assert!(viewport.is_degenerate());
        assert!(paginate(&text, viewport, &GridMeasurer::new(), None).is_empty());
    }
}
