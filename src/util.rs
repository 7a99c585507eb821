//! Small helpers shared across modules.

use std::time::{SystemTime, UNIX_EPOCH};

const SECS_PER_DAY: u64 = 86_400;

/// Get current time as seconds since Unix epoch.
pub fn time_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Days elapsed since the Unix epoch (UTC), used to bucket reading time.
pub fn epoch_day() -> u32 {
    (time_now_secs() / SECS_PER_DAY) as u32
}

/// Translates increasing byte offsets of a `&str` into character offsets.
///
/// Each lookup walks forward from the previous one, so a full scan over
/// ascending matches is linear in the text length.
pub(crate) struct CharCursor<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    /// Character offset of `byte_offset`, which must be a char boundary at or
    /// after the previous lookup.
    pub(crate) fn advance_to(&mut self, byte_offset: usize) -> usize {
        debug_assert!(byte_offset >= self.byte);
        if byte_offset > self.byte {
            self.chars += self.text[self.byte..byte_offset].chars().count();
            self.byte = byte_offset;
        }
        self.chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_cursor_counts_multibyte() {
        let text = "a第b章c";
        let mut cursor = CharCursor::new(text);
        assert_eq!(cursor.advance_to(0), 0);
        assert_eq!(cursor.advance_to(1), 1);
        assert_eq!(cursor.advance_to(4), 2);
        assert_eq!(cursor.advance_to(4), 2);
        assert_eq!(cursor.advance_to(text.len()), 5);
    }

    #[test]
    fn test_epoch_day_is_after_2020() {
        // 2020-01-01 is day 18262.
        assert!(epoch_day() > 18_262);
    }
}
