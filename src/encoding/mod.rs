//! Text encoding inference from a bounded byte prefix.
//!
//! Detection is total: every input yields an [`EncodingGuess`]. The checks run
//! in a fixed priority order and the first match wins:
//!
//! 1. Byte order mark (UTF-8, UTF-16LE, UTF-16BE)
//! 2. UTF-8 structural validity
//! 3. Clean GB18030 decode
//! 4. Clean Big5 decode
//! 5. GBK as the catch-all for legacy Chinese text

use encoding_rs::{DecoderResult, Encoding};

/// Recommended number of leading bytes to hand to [`detect`].
pub const DETECTION_WINDOW: usize = 8192;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// The charsets the detector can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    Utf16Le,
    Utf16Be,
    Gb18030,
    Big5,
    Gbk,
}

impl Charset {
    /// The string tag stored in book records.
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Gb18030 => "GB18030",
            Charset::Big5 => "Big5",
            Charset::Gbk => "GBK",
        }
    }

    /// Parse a tag produced by [`Charset::name`], ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Charset::Utf8,
            Charset::Utf16Le,
            Charset::Utf16Be,
            Charset::Gb18030,
            Charset::Big5,
            Charset::Gbk,
        ]
        .into_iter()
        .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// The decoder backing this charset.
    pub fn encoding(self) -> &'static Encoding {
        match self {
            Charset::Utf8 => encoding_rs::UTF_8,
            Charset::Utf16Le => encoding_rs::UTF_16LE,
            Charset::Utf16Be => encoding_rs::UTF_16BE,
            Charset::Gb18030 => encoding_rs::GB18030,
            Charset::Big5 => encoding_rs::BIG5,
            Charset::Gbk => encoding_rs::GBK,
        }
    }

    /// Rough bytes per decoded character, for load progress estimates.
    pub fn average_bytes_per_char(self) -> f32 {
        match self {
            // Close to 1 for Latin text, close to 3 for CJK.
            Charset::Utf8 => 1.5,
            Charset::Utf16Le | Charset::Utf16Be => 2.0,
            Charset::Gb18030 | Charset::Big5 | Charset::Gbk => 2.0,
        }
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of sniffing a byte prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingGuess {
    pub charset: Charset,
    /// Leading bytes to discard before decoding the rest of the stream.
    pub bom_length: usize,
}

impl EncodingGuess {
    pub fn name(&self) -> &'static str {
        self.charset.name()
    }
}

/// Infer the encoding of a stream from its first bytes.
///
/// Never fails. Empty and one-byte inputs report UTF-8.
pub fn detect(prefix: &[u8]) -> EncodingGuess {
    let charset = detect_bom(prefix)
        .or_else(|| is_valid_utf8(prefix).then_some(Charset::Utf8))
        .or_else(|| decodes_cleanly(Charset::Gb18030, prefix).then_some(Charset::Gb18030))
        .or_else(|| decodes_cleanly(Charset::Big5, prefix).then_some(Charset::Big5))
        .unwrap_or(Charset::Gbk);

    let guess = EncodingGuess {
        charset,
        bom_length: bom_length(prefix),
    };
    log::debug!(
        "detected {} from {} prefix bytes (bom {})",
        guess.name(),
        prefix.len(),
        guess.bom_length
    );
    guess
}

/// Length of a leading byte order mark, regardless of the detected charset.
pub fn bom_length(bytes: &[u8]) -> usize {
    if bytes.starts_with(&UTF8_BOM) {
        3
    } else if bytes.starts_with(&UTF16LE_BOM) || bytes.starts_with(&UTF16BE_BOM) {
        2
    } else {
        0
    }
}

fn detect_bom(bytes: &[u8]) -> Option<Charset> {
    if bytes.starts_with(&UTF8_BOM) {
        Some(Charset::Utf8)
    } else if bytes.starts_with(&UTF16LE_BOM) {
        Some(Charset::Utf16Le)
    } else if bytes.starts_with(&UTF16BE_BOM) {
        Some(Charset::Utf16Be)
    } else {
        None
    }
}

/// Structural UTF-8 check over a window.
///
/// Only lead/continuation shape is verified. A sequence cut off by the end of
/// the window is accepted.
fn is_valid_utf8(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        let expected_len = match bytes[i] {
            0x00..=0x7F => {
                i += 1;
                continue;
            }
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return false,
        };

        if i + expected_len > bytes.len() {
            // Truncated by the window; the rest of the sequence is unseen.
            break;
        }
        if !bytes[i + 1..i + expected_len]
            .iter()
            .all(|b| (0x80..=0xBF).contains(b))
        {
            return false;
        }
        i += expected_len;
    }
    true
}

/// Whether `bytes` decode under `charset` without any malformed sequence.
///
/// The decoder is never told the input is finished, so a double-byte
/// character split by the end of the window does not count as malformed.
fn decodes_cleanly(charset: Charset, bytes: &[u8]) -> bool {
    let mut decoder = charset.encoding().new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .unwrap_or(bytes.len().saturating_mul(3));
    let mut scratch = String::with_capacity(capacity);

    let mut input = bytes;
    loop {
        let (result, read) = decoder.decode_to_string_without_replacement(input, &mut scratch, false);
        input = &input[read..];
        match result {
            DecoderResult::InputEmpty => return true,
            DecoderResult::Malformed(_, _) => return false,
            DecoderResult::OutputFull => {
                scratch.clear();
                scratch.reserve(capacity);
            }
        }
    }
}
