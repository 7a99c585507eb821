//! Case-insensitive literal search over decoded text.
//!
//! Results are recomputed per query; nothing is indexed.

use memchr::memmem;

use crate::text::DecodedText;
use crate::util::CharCursor;

/// One occurrence of the query, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct SearchHit {
    pub offset: usize,
    /// Always the query's length in characters.
    pub length: usize,
}

impl SearchHit {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Find every case-insensitive occurrence of `query` in `text`.
///
/// Overlapping occurrences are all reported: after a hit at `p` the scan
/// resumes at `p + 1`. An empty query finds nothing.
pub fn search(text: &str, query: &str) -> Vec<SearchHit> {
    if query.is_empty() {
        return Vec::new();
    }

    let haystack = fold_case(text);
    let needle = fold_case(query);
    let finder = memmem::Finder::new(needle.as_bytes());
    let length = query.chars().count();

    let mut hits = Vec::new();
    let mut chars = CharCursor::new(&haystack);
    let mut pos = 0;
    while let Some(found) = finder.find(&haystack.as_bytes()[pos..]) {
        let at = pos + found;
        hits.push(SearchHit {
            offset: chars.advance_to(at),
            length,
        });
        let step = haystack[at..].chars().next().map_or(1, char::len_utf8);
        pos = at + step;
    }
    hits
}

/// The hit plus up to `context` characters on either side.
pub fn snippet(text: &DecodedText, hit: SearchHit, context: usize) -> &str {
    text.slice(hit.offset.saturating_sub(context), hit.end().saturating_add(context))
}

/// Lowercase `text` one character at a time.
///
/// Characters whose lowercase form is longer than one character are kept as
/// is, so folded and original text share character offsets.
fn fold_case(text: &str) -> String {
    if text.is_ascii() {
        return text.to_ascii_lowercase();
    }
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(hits: &[SearchHit]) -> Vec<usize> {
        hits.iter().map(|h| h.offset).collect()
    }

    #[test]
    fn test_overlapping_case_insensitive() {
        let hits = search("AAaaAA", "aa");
        assert_eq!(offsets(&hits), vec![0, 1, 2, 3, 4]);
        assert!(hits.iter().all(|h| h.length == 2));
    }

    #[test]
    fn test_empty_query() {
        assert!(search("anything", "").is_empty());
    }

    #[test]
    fn test_cjk_offsets_are_characters() {
        let hits = search("第一章 开端\n正文内容\n第二章", "第");
        assert_eq!(offsets(&hits), vec![0, 12]);
    }

    #[test]
    fn test_non_ascii_case_folding() {
        let hits = search("Ärger und ärger", "ÄRGER");
        assert_eq!(offsets(&hits), vec![0, 10]);
    }

    #[test]
    fn test_expanding_lowercase_keeps_offsets() {
        // 'İ' lowercases to two characters; it must not shift later hits.
        let hits = search("İx İx", "x");
        assert_eq!(offsets(&hits), vec![1, 4]);
    }

    #[test]
    fn test_query_longer_than_text() {
        assert!(search("ab", "abc").is_empty());
    }

    #[test]
    fn test_snippet() {
        let text = DecodedText::from("正文内容更多内容");
        let hit = search(text.as_str(), "更多")[0];
        assert_eq!(snippet(&text, hit, 1), "容更多内");
        assert_eq!(snippet(&text, hit, 100), "正文内容更多内容");
    }
}
