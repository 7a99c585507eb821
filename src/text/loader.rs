//! Two-pass streaming decode of a byte source.
//!
//! Pass one reads a bounded prefix and runs [`encoding::detect`]. Pass two
//! reopens the source, skips the byte order mark and decodes the remainder
//! into a single buffer, reporting coarse progress along the way.
//!
//! [`encoding::detect`]: crate::encoding::detect

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;

use encoding_rs::CoderResult;

use super::DecodedText;
use crate::encoding::{self, Charset, DETECTION_WINDOW, EncodingGuess};
use crate::error::Result;
use crate::io::{ByteSource, ByteSourceCursor};

/// Highest progress value reported while bytes are still streaming.
const STREAMING_PROGRESS_CAP: f32 = 0.95;

/// Tuning knobs for [`TextLoader`].
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Bytes sniffed for encoding detection.
    pub prefix_len: usize,
    /// Bytes read per decode step.
    pub chunk_size: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            prefix_len: DETECTION_WINDOW,
            chunk_size: 64 * 1024,
        }
    }
}

/// A fully decoded document.
#[derive(Debug, Clone)]
pub struct LoadedText {
    pub guess: EncodingGuess,
    pub text: DecodedText,
}

impl LoadedText {
    pub fn encoding_name(&self) -> &'static str {
        self.guess.name()
    }
}

/// Loads byte sources of unknown encoding into [`DecodedText`].
#[derive(Debug, Clone, Default)]
pub struct TextLoader {
    config: LoadConfig,
}

impl TextLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Detect and decode a random-access source.
    ///
    /// The source is opened twice through independent cursors. Its length is
    /// the size hint for progress reporting.
    pub fn load(
        &self,
        source: Arc<dyn ByteSource>,
        progress: Option<&mut dyn FnMut(f32)>,
    ) -> Result<LoadedText> {
        let size_hint = source.len();

        let mut sniff = ByteSourceCursor::new(Arc::clone(&source));
        let prefix = read_prefix(&mut sniff, self.config.prefix_len)?;
        let guess = encoding::detect(&prefix);
        drop(sniff);

        let mut body = ByteSourceCursor::new(source);
        body.seek(SeekFrom::Start(guess.bom_length as u64))?;
        let text = self.decode_stream(body, guess.charset, Some(size_hint), progress)?;
        Ok(LoadedText { guess, text })
    }

    /// Detect and decode a forward-only stream.
    ///
    /// The detection prefix is buffered and replayed in front of the rest of
    /// the stream, standing in for a second open.
    pub fn load_reader<R: Read>(
        &self,
        mut reader: R,
        size_hint: Option<u64>,
        progress: Option<&mut dyn FnMut(f32)>,
    ) -> Result<LoadedText> {
        let prefix = read_prefix(&mut reader, self.config.prefix_len)?;
        let guess = encoding::detect(&prefix);

        let mut head = Cursor::new(prefix);
        head.set_position(guess.bom_length as u64);
        let body = head.chain(reader);
        let text = self.decode_stream(body, guess.charset, size_hint, progress)?;
        Ok(LoadedText { guess, text })
    }

    fn decode_stream<R: Read>(
        &self,
        mut reader: R,
        charset: Charset,
        size_hint: Option<u64>,
        mut progress: Option<&mut dyn FnMut(f32)>,
    ) -> Result<DecodedText> {
        let mut decoder = charset.encoding().new_decoder_without_bom_handling();

        // Only estimate progress when there is someone to tell and a size to
        // measure against.
        let expected_chars = match (size_hint, progress.is_some()) {
            (Some(size), true) if size > 0 => {
                Some(size as f32 / charset.average_bytes_per_char())
            }
            _ => None,
        };

        let capacity = size_hint
            .and_then(|s| usize::try_from(s).ok())
            .unwrap_or(0);
        let mut out = String::with_capacity(capacity);
        let mut buf = vec![0u8; self.config.chunk_size.max(1)];
        let mut chars_decoded = 0usize;
        let mut last_percent = 0u32;
        let mut replaced = false;

        loop {
            let read = read_retrying(&mut reader, &mut buf)?;
            let last = read == 0;

            let before = out.len();
            let mut input = &buf[..read];
            loop {
                let needed = decoder
                    .max_utf8_buffer_length(input.len())
                    .unwrap_or(input.len().saturating_mul(3).saturating_add(4));
                out.reserve(needed);
                let (result, consumed, had_replacements) =
                    decoder.decode_to_string(input, &mut out, last);
                replaced |= had_replacements;
                input = &input[consumed..];
                if matches!(result, CoderResult::InputEmpty) {
                    break;
                }
            }
            chars_decoded += out[before..].chars().count();

            if last {
                break;
            }

            if let (Some(expected), Some(report)) = (expected_chars, progress.as_deref_mut()) {
                let estimate = (chars_decoded as f32 / expected).clamp(0.0, STREAMING_PROGRESS_CAP);
                let percent = (estimate * 100.0) as u32;
                if percent > last_percent {
                    last_percent = percent;
                    report(estimate);
                }
            }
        }

        if replaced {
            log::warn!("malformed {} sequences replaced while decoding", charset.name());
        }
        log::debug!("decoded {} characters as {}", chars_decoded, charset.name());

        if let Some(report) = progress.as_deref_mut() {
            report(1.0);
        }
        Ok(DecodedText::new(out))
    }
}

/// Read up to `limit` bytes, stopping early only at end of stream.
fn read_prefix<R: Read>(reader: &mut R, limit: usize) -> io::Result<Vec<u8>> {
    let mut prefix = Vec::with_capacity(limit);
    reader.by_ref().take(limit as u64).read_to_end(&mut prefix)?;
    Ok(prefix)
}

fn read_retrying<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}
