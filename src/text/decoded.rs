/// Characters between index checkpoints.
const CHECKPOINT_STRIDE: usize = 128;

/// An owned, immutable Unicode buffer addressed by character offset.
///
/// Keeps a byte offset for every 128th character so that a
/// character offset resolves to a byte position with a bounded forward walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedText {
    text: String,
    char_len: usize,
    /// Empty for pure-ASCII text, where char and byte offsets coincide.
    checkpoints: Vec<usize>,
}

impl DecodedText {
    pub fn new(text: String) -> Self {
        if text.is_ascii() {
            return Self {
                char_len: text.len(),
                text,
                checkpoints: Vec::new(),
            };
        }

        let mut checkpoints = Vec::with_capacity(text.len() / CHECKPOINT_STRIDE + 1);
        let mut char_len = 0;
        for (byte, _) in text.char_indices() {
            if char_len % CHECKPOINT_STRIDE == 0 {
                checkpoints.push(byte);
            }
            char_len += 1;
        }

        Self {
            text,
            char_len,
            checkpoints,
        }
    }

    /// Length in characters. Also the end-of-buffer offset.
    pub fn len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Byte position of a character offset, clamped to the end of the buffer.
    pub fn char_to_byte(&self, char_offset: usize) -> usize {
        if char_offset >= self.char_len {
            return self.text.len();
        }
        if self.checkpoints.is_empty() {
            return char_offset;
        }

        let base = self.checkpoints[char_offset / CHECKPOINT_STRIDE];
        let skip = char_offset % CHECKPOINT_STRIDE;
        self.text[base..]
            .char_indices()
            .nth(skip)
            .map(|(rel, _)| base + rel)
            .unwrap_or(self.text.len())
    }

    /// Character offset of the character containing `byte_offset`.
    pub fn byte_to_char(&self, byte_offset: usize) -> usize {
        let byte_offset = byte_offset.min(self.text.len());
        if self.checkpoints.is_empty() {
            return byte_offset;
        }

        let slot = match self.checkpoints.binary_search(&byte_offset) {
            Ok(slot) => return slot * CHECKPOINT_STRIDE,
            Err(slot) => slot - 1,
        };
        let base = self.checkpoints[slot];
        let walked = self.text[base..]
            .char_indices()
            .take_while(|(rel, _)| base + rel < byte_offset)
            .count();
        // A byte inside a multi-byte character belongs to that character.
        let inside = !self.text.is_char_boundary(byte_offset);
        slot * CHECKPOINT_STRIDE + walked - usize::from(inside)
    }

    /// Text between two character offsets, both clamped into `[0, len]`
    /// with `end >= start`.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let start = start.min(self.char_len);
        let end = end.clamp(start, self.char_len);
        let from = self.char_to_byte(start);
        let to = if end == start {
            from
        } else {
            self.char_to_byte(end)
        };
        &self.text[from..to]
    }

    /// Everything from `start` to the end of the buffer.
    pub fn tail(&self, start: usize) -> &str {
        &self.text[self.char_to_byte(start)..]
    }
}

impl From<String> for DecodedText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for DecodedText {
    fn from(text: &str) -> Self {
        Self::new(text.to_string())
    }
}

impl AsRef<str> for DecodedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_identity() {
        let text = DecodedText::from("abcdefghij");
        assert_eq!(text.len(), 10);
        assert_eq!(text.char_to_byte(4), 4);
        assert_eq!(text.byte_to_char(7), 7);
        assert_eq!(text.slice(2, 5), "cde");
    }

    #[test]
    fn test_multibyte_offsets() {
        let text = DecodedText::from("第一章 开端\n正文");
        assert_eq!(text.len(), 9);
        assert_eq!(text.slice(0, 3), "第一章");
        assert_eq!(text.slice(7, 9), "正文");
        assert_eq!(text.byte_to_char(text.char_to_byte(7)), 7);
        // Byte 1 sits inside the first character.
        assert_eq!(text.byte_to_char(1), 0);
    }

    #[test]
    fn test_offsets_across_checkpoints() {
        let source: String = (0..1000).map(|i| if i % 3 == 0 { '字' } else { 'a' }).collect();
        let text = DecodedText::new(source.clone());
        for offset in [0, 127, 128, 129, 500, 999, 1000] {
            let expected: usize = source.chars().take(offset).map(char::len_utf8).sum();
            assert_eq!(text.char_to_byte(offset), expected, "offset {offset}");
            assert_eq!(text.byte_to_char(expected), offset, "offset {offset}");
        }
    }

    #[test]
    fn test_slice_clamps() {
        let text = DecodedText::from("正文内容");
        assert_eq!(text.slice(2, 100), "内容");
        assert_eq!(text.slice(3, 1), "");
        assert_eq!(text.slice(50, 60), "");
        assert_eq!(text.tail(3), "容");
    }

    #[test]
    fn test_empty() {
        let text = DecodedText::default();
        assert!(text.is_empty());
        assert_eq!(text.slice(0, 0), "");
        assert_eq!(text.char_to_byte(3), 0);
    }
}
