//! # pagewise
//!
//! The text engine behind a plain-text ebook reader: takes bytes of unknown
//! encoding and produces a decoded buffer, a reflowable pagination, a
//! heuristic table of contents, and on-demand search.
//!
//! Every position is a character offset into the decoded text, so pages,
//! outline entries, search hits and saved reading positions all share one
//! coordinate system.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use pagewise::{GridMeasurer, MemorySource, MemoryStore, ReadingSession, Viewport};
//!
//! let bytes = "第一章 开端\n正文内容\n第二章 转折\n更多内容".as_bytes().to_vec();
//!
//! let mut session = ReadingSession::new(MemoryStore::new(), GridMeasurer::new());
//! session.set_viewport(Viewport::new(320.0, 480.0, 18.0, 1.5), &mut |_, _| {});
//! session
//!     .open("novel.txt", Arc::new(MemorySource::new(bytes)), &mut |_, _| {})
//!     .unwrap();
//!
//! assert_eq!(session.encoding().unwrap().name(), "UTF-8");
//! assert_eq!(session.outline().unwrap().len(), 2);
//! assert!(session.current_page_text().starts_with("第一章"));
//! ```
//!
//! ## Using the pieces directly
//!
//! ```
//! use pagewise::{DecodedText, GridMeasurer, Viewport, detect, paginate, search};
//!
//! assert_eq!(detect(b"\xEF\xBB\xBFhello").bom_length, 3);
//!
//! let text = DecodedText::from("abcdefghij");
//! let pages = paginate(&text, Viewport::new(20.0, 10.0, 10.0, 1.0), &GridMeasurer::new(), None);
//! assert_eq!(pages.len(), 3);
//!
//! assert_eq!(search("AAaaAA", "aa").len(), 5);
//! ```

pub mod encoding;
pub mod error;
pub mod io;
pub mod layout;
pub mod search;
pub mod session;
pub mod text;
pub mod toc;
pub(crate) mod util;

pub use encoding::{Charset, EncodingGuess, bom_length, detect};
pub use error::{Error, Result};
pub use io::{ByteSource, ByteSourceCursor, FileSource, MemorySource};
pub use layout::{
    GridMeasurer, LineMeasurer, LineMetrics, PageIter, PageSpan, Pagination, TextLayout, Viewport,
    find_page, page_text, paginate,
};
pub use search::{SearchHit, search};
#[cfg(feature = "cli")]
pub use session::JsonFileStore;
pub use session::{
    BookRecord, MemoryStore, Phase, ReadingClock, ReadingSession, RecordStore, SessionState, Theme,
    UserSettings,
};
pub use text::{DecodedText, LoadConfig, LoadedText, TextLoader};
pub use toc::{Outline, TocEntry, current_chapter, extract};
