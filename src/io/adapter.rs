use super::byte_source::ByteSource;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;

/// A stateful `Read + Seek` view over a shared [`ByteSource`].
///
/// Each cursor keeps its own position; the loader opens one per pass.
pub struct ByteSourceCursor {
    inner: Arc<dyn ByteSource>,
    position: u64,
}

impl ByteSourceCursor {
    pub fn new(inner: Arc<dyn ByteSource>) -> Self {
        Self { inner, position: 0 }
    }

    /// Bytes left between the cursor and the end of the source.
    pub fn remaining(&self) -> u64 {
        self.inner.len().saturating_sub(self.position)
    }
}

impl Read for ByteSourceCursor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want = self.remaining().min(buf.len() as u64) as usize;
        if want == 0 {
            return Ok(0);
        }

        let read = self.inner.read_at_into(self.position, &mut buf[..want])?;
        self.position += read as u64;
        Ok(read)
    }
}

impl Seek for ByteSourceCursor {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::End(delta) => self.inner.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };

        match target {
            Some(p) => {
                self.position = p;
                Ok(p)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of source",
            )),
        }
    }
}
