//! Outline extraction from heading-like lines.
//!
//! Plain text carries no markup, so headings are recognised by a fixed,
//! prioritised set of line-start patterns. The heuristic either finds a
//! plausible number of headings or reports no structure at all.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::util::CharCursor;

/// Longest title, in characters, still taken for a heading.
pub const MAX_TITLE_CHARS: usize = 50;
/// Fewest entries for an outline to be trusted.
pub const MIN_ENTRIES: usize = 2;
/// Most entries for an outline to be trusted.
pub const MAX_ENTRIES: usize = 500;

/// Heading patterns with their level, in priority order.
static PATTERNS: LazyLock<Vec<(Regex, u8)>> = LazyLock::new(|| {
    [
        // 第X章 / 第X回 / 第X卷 / 第X部 / 第X篇 / 第X集
        (r"(?m)^(第[零一二三四五六七八九十百千\d]+[章回卷部篇集].*)", 1),
        // 第X节
        (r"(?m)^(第[零一二三四五六七八九十百千\d]+节.*)", 2),
        // Chapter 12
        (r"(?m)^((?i:chapter)[ \t]+\d+.*)", 1),
        // 1. Title
        (r"(?m)^(\d+\.[ \t]+\S.*)", 1),
        // 1.1 Title
        (r"(?m)^(\d+\.\d+[ \t]+\S.*)", 2),
        // 【Title】
        (r"(?m)^(【.+?】.*)", 1),
    ]
    .into_iter()
    .map(|(pattern, level)| (Regex::new(pattern).expect("valid heading pattern"), level))
    .collect()
});

/// One heading in the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct TocEntry {
    pub title: String,
    /// Character offset of the heading's line start.
    pub char_offset: usize,
    /// 1 for chapters, 2 for sections.
    pub level: u8,
}

/// Headings sorted by offset, no two sharing an offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    entries: Vec<TocEntry>,
}

impl Outline {
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no structure was detected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TocEntry> {
        self.entries.get(index)
    }

    /// See [`current_chapter`].
    pub fn current_chapter(&self, offset: usize) -> Option<usize> {
        current_chapter(&self.entries, offset)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TocEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Outline {
    type Item = &'a TocEntry;
    type IntoIter = std::slice::Iter<'a, TocEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Build the outline of `text`.
///
/// Returns an empty outline unless between [`MIN_ENTRIES`] and
/// [`MAX_ENTRIES`] headings are found.
pub fn extract(text: &str) -> Outline {
    let mut entries = Vec::new();
    let mut claimed: HashSet<usize> = HashSet::new();

    for (pattern, level) in PATTERNS.iter() {
        let mut chars = CharCursor::new(text);
        for caps in pattern.captures_iter(text) {
            let Some(m) = caps.get(1) else {
                continue;
            };
            if claimed.contains(&m.start()) {
                continue;
            }

            let title = m.as_str().trim();
            if title.chars().count() > MAX_TITLE_CHARS {
                continue;
            }

            claimed.insert(m.start());
            entries.push(TocEntry {
                title: title.to_string(),
                char_offset: chars.advance_to(m.start()),
                level: *level,
            });
        }
    }

    entries.sort_by_key(|e| e.char_offset);

    if (MIN_ENTRIES..=MAX_ENTRIES).contains(&entries.len()) {
        log::debug!("outline: {} headings", entries.len());
        Outline { entries }
    } else {
        log::debug!("outline rejected: {} heading candidates", entries.len());
        Outline::default()
    }
}

/// Index of the last entry starting at or before `offset`.
///
/// `None` when the outline is empty or `offset` precedes the first heading.
pub fn current_chapter(entries: &[TocEntry], offset: usize) -> Option<usize> {
    entries
        .partition_point(|e| e.char_offset <= offset)
        .checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cjk_chapters() {
        let text = "第一章 开端\n正文内容\n第二章 转折\n更多内容";
        let outline = extract(text);
        assert_eq!(outline.len(), 2);
        assert_eq!(outline.entries()[0].title, "第一章 开端");
        assert_eq!(outline.entries()[0].char_offset, 0);
        assert_eq!(outline.entries()[1].title, "第二章 转折");
        assert_eq!(outline.entries()[1].char_offset, 12);
        assert!(outline.iter().all(|e| e.level == 1));

        let inside = text.chars().count() - 2;
        assert_eq!(outline.current_chapter(inside), Some(1));
    }

    #[test]
    fn test_sections_are_level_two() {
        let text = "第1章 起\n第一节 甲\n第二节 乙\n";
        let outline = extract(text);
        let levels: Vec<u8> = outline.iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![1, 2, 2]);
    }

    #[test]
    fn test_latin_chapters_case_insensitive() {
        let text = "CHAPTER 1 Loomings\nCall me Ishmael.\nchapter 2 The Carpet-Bag\nMore.";
        let outline = extract(text);
        assert_eq!(outline.len(), 2);
        assert_eq!(outline.entries()[1].title, "chapter 2 The Carpet-Bag");
    }

    #[test]
    fn test_numeric_headings() {
        let text = "1. Intro\nbody\n1.1 Scope\nbody\n2. Usage\n";
        let outline = extract(text);
        let summary: Vec<(&str, u8)> = outline.iter().map(|e| (e.title.as_str(), e.level)).collect();
        assert_eq!(summary, vec![("1. Intro", 1), ("1.1 Scope", 2), ("2. Usage", 1)]);
    }

    #[test]
    fn test_bracketed_titles() {
        let text = "【序】\n文字\n【终章】尾声\n";
        let outline = extract(text);
        assert_eq!(outline.len(), 2);
        assert_eq!(outline.entries()[1].title, "【终章】尾声");
    }

    #[test]
    fn test_mixed_patterns_sorted_by_offset() {
        let text = "Chapter 1 Start
第一节 甲
1.1 Detail
【附录】
";
        let outline = extract(text);
        let offsets: Vec<usize> = outline.iter().map(|e| e.char_offset).collect();
        assert_eq!(offsets, vec![0, 16, 22, 33]);
        let levels: Vec<u8> = outline.iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![1, 2, 2, 1]);
    }

    #[test]
    fn test_long_titles_discarded() {
        let long = format!("第一章 {}", "长".repeat(60));
        let text = format!("{long}\n第二章 短\n第三章 短\n");
        let outline = extract(&text);
        assert_eq!(outline.len(), 2);
        assert_eq!(outline.entries()[0].title, "第二章 短");
    }

    #[test]
    fn test_headings_must_start_line() {
        let text = "见第一章 开端\n和第二章\n";
        assert!(extract(text).is_empty());
    }

    #[test]
    fn test_single_heading_rejected() {
        assert!(extract("第一章 开端\n正文").is_empty());
    }

    #[test]
    fn test_too_many_headings_rejected() {
        let text: String = (1..=501).map(|i| format!("{i}. line\n")).collect();
        assert!(extract(&text).is_empty());
        let text: String = (1..=500).map(|i| format!("{i}. line\n")).collect();
        assert_eq!(extract(&text).len(), 500);
    }

    #[test]
    fn test_crlf_titles_trimmed() {
        let outline = extract("Chapter 1 A\r\nx\r\nChapter 2 B\r\n");
        assert_eq!(outline.entries()[0].title, "Chapter 1 A");
        assert_eq!(outline.entries()[1].char_offset, 16);
    }

    #[test]
    fn test_current_chapter_bounds() {
        let entries = vec![
            TocEntry { title: "a".into(), char_offset: 5, level: 1 },
            TocEntry { title: "b".into(), char_offset: 10, level: 1 },
        ];
        assert_eq!(current_chapter(&entries, 0), None);
        assert_eq!(current_chapter(&entries, 5), Some(0));
        assert_eq!(current_chapter(&entries, 9), Some(0));
        assert_eq!(current_chapter(&entries, 10), Some(1));
        assert_eq!(current_chapter(&entries, 1000), Some(1));
        assert_eq!(current_chapter(&[], 3), None);
    }
}
