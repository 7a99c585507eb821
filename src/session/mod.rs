//! The reading session: one open document and its layout state.
//!
//! A session owns the decoded text, the current pagination and the lazily
//! built outline, and keeps page index, outline position and the persisted
//! read position consistent with each other. Everything is addressed by
//! character offset; page indices are only meaningful within one pagination.
//!
//! All mutation goes through `&mut self`, so at most one open, relayout or
//! navigation is ever in flight. A replacement text or pagination is built
//! completely before it is swapped in. A host may decode on a worker thread
//! with [`TextLoader`] and commit through [`ReadingSession::install`], or
//! paginate [`ReadingSession::shared_text`] on a worker and commit through
//! [`ReadingSession::install_pagination`]. Dropping either result instead
//! leaves the session as it was.

mod clock;
mod store;

pub use clock::ReadingClock;
#[cfg(feature = "cli")]
pub use store::JsonFileStore;
pub use store::{BookRecord, MemoryStore, RecordStore, Theme, UserSettings};

use std::cell::OnceCell;
use std::sync::Arc;

use crate::encoding::EncodingGuess;
use crate::error::Result;
use crate::io::ByteSource;
use crate::layout::{LineMeasurer, PageSpan, Pagination, Viewport, page_text, paginate};
use crate::search::{self, SearchHit};
use crate::text::{DecodedText, LoadedText, TextLoader};
use crate::toc::{self, Outline};
use crate::util::time_now_secs;

/// Lifecycle of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing opened yet.
    Empty,
    Loading,
    Ready,
    /// The last open failed. Only a new open leaves this state.
    Error(String),
}

/// Which long-running step a progress report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Decoding the byte source; tops out at 0.95 until done.
    Reading,
    /// Paginating the decoded text.
    Layout,
}

struct Document {
    key: String,
    guess: EncodingGuess,
    text: Arc<DecodedText>,
    record: BookRecord,
    outline: OnceCell<Outline>,
}

pub struct ReadingSession<S: RecordStore, M: LineMeasurer> {
    store: S,
    measurer: M,
    loader: TextLoader,
    settings: UserSettings,
    state: SessionState,
    document: Option<Document>,
    viewport: Option<Viewport>,
    pagination: Option<Pagination>,
    current_page: usize,
    /// Offset to land on once a usable pagination exists.
    pending_offset: Option<usize>,
}

impl<S: RecordStore, M: LineMeasurer> ReadingSession<S, M> {
    pub fn new(store: S, measurer: M) -> Self {
        let settings = store.settings().unwrap_or_else(|e| {
            log::warn!("could not load settings, using defaults: {e}");
            UserSettings::default()
        });
        Self {
            store,
            measurer,
            loader: TextLoader::new(),
            settings,
            state: SessionState::Empty,
            document: None,
            viewport: None,
            pagination: None,
            current_page: 0,
            pending_offset: None,
        }
    }

    pub fn with_loader(mut self, loader: TextLoader) -> Self {
        self.loader = loader;
        self
    }

    // ------------------------------------------------------------------
    // Opening
    // ------------------------------------------------------------------

    /// Decode `source` as the document stored under `key`.
    ///
    /// On success the saved read position for `key` is restored and, if a
    /// viewport is already known, the text is paginated right away. On
    /// failure the session moves to [`SessionState::Error`].
    pub fn open(
        &mut self,
        key: &str,
        source: Arc<dyn ByteSource>,
        progress: &mut dyn FnMut(Phase, f32),
    ) -> Result<()> {
        log::debug!("opening {key}");
        self.state = SessionState::Loading;

        let loaded = {
            let mut reading = |fraction: f32| progress(Phase::Reading, fraction);
            self.loader.load(source, Some(&mut reading))
        };

        match loaded {
            Ok(loaded) => {
                self.install(key, loaded, progress);
                Ok(())
            }
            Err(e) => {
                log::warn!("failed to open {key}: {e}");
                self.document = None;
                self.pagination = None;
                self.pending_offset = None;
                self.current_page = 0;
                self.state = SessionState::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Commit text decoded elsewhere as the document stored under `key`.
    pub fn install(&mut self, key: &str, loaded: LoadedText, progress: &mut dyn FnMut(Phase, f32)) {
        let previous = match self.store.book(key) {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                log::warn!("could not read record for {key}: {e}");
                BookRecord::default()
            }
        };

        let total_chars = loaded.text.len();
        let record = BookRecord {
            encoding: loaded.guess.name().to_string(),
            total_chars,
            read_position: previous.read_position.min(total_chars),
            last_read_time: time_now_secs(),
        };
        if let Err(e) = self.store.save_book(key, &record) {
            log::warn!("could not save record for {key}: {e}");
        }

        self.pending_offset = Some(record.read_position);
        self.document = Some(Document {
            key: key.to_string(),
            guess: loaded.guess,
            text: Arc::new(loaded.text),
            record,
            outline: OnceCell::new(),
        });
        self.pagination = None;
        self.current_page = 0;
        self.state = SessionState::Ready;
        log::debug!("{key} ready: {total_chars} characters as {}", loaded.guess.name());

        if let Some(viewport) = self.viewport {
            self.relayout(viewport, progress);
        }
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Change the page box or font. Repaginates unless nothing changed,
    /// keeping the current page's start offset on screen.
    pub fn set_viewport(&mut self, viewport: Viewport, progress: &mut dyn FnMut(Phase, f32)) {
        if self.viewport == Some(viewport) {
            return;
        }
        self.viewport = Some(viewport);
        if self.state == SessionState::Ready {
            self.relayout(viewport, progress);
        }
    }

    /// Persist new settings and relayout with their font size and spacing.
    ///
    /// Without a viewport nothing is laid out; the host should build the
    /// first one with [`settings_viewport`](Self::settings_viewport).
    pub fn apply_settings(&mut self, settings: UserSettings, progress: &mut dyn FnMut(Phase, f32)) {
        if let Err(e) = self.store.save_settings(&settings) {
            log::warn!("could not save settings: {e}");
        }
        let font_size = settings.font_size;
        let line_spacing = settings.line_spacing;
        self.settings = settings;

        if let Some(viewport) = self.viewport {
            let viewport = Viewport {
                font_size,
                line_spacing,
                ..viewport
            };
            self.set_viewport(viewport, progress);
        }
    }

    /// Page box of `width` × `height` using the font size and line spacing
    /// from the current settings.
    pub fn settings_viewport(&self, width: f32, height: f32) -> Viewport {
        Viewport::new(
            width,
            height,
            self.settings.font_size,
            self.settings.line_spacing,
        )
    }

    /// Commit a pagination computed elsewhere over [`shared_text`].
    ///
    /// The pagination's viewport becomes the session viewport and the
    /// current page start stays on screen. Returns `false` and changes
    /// nothing when no document is ready or the pages do not cover the open
    /// text, as with a pagination of a document that has since been
    /// replaced. Dropping a pagination instead of installing it abandons the
    /// relayout.
    ///
    /// [`shared_text`]: Self::shared_text
    pub fn install_pagination(&mut self, pagination: Pagination) -> bool {
        if self.state != SessionState::Ready {
            return false;
        }
        let Some(document) = self.document.as_ref() else {
            return false;
        };
        if !covers(&pagination, document.text.len()) {
            log::warn!(
                "rejecting pagination of {} pages for {} characters",
                pagination.len(),
                document.text.len()
            );
            return false;
        }

        self.viewport = Some(pagination.viewport());
        self.commit(pagination);
        true
    }

    fn relayout(&mut self, viewport: Viewport, progress: &mut dyn FnMut(Phase, f32)) {
        let Some(document) = self.document.as_ref() else {
            return;
        };

        let mut layout = |fraction: f32| progress(Phase::Layout, fraction);
        let pagination = paginate(&document.text, viewport, &self.measurer, Some(&mut layout));
        self.commit(pagination);
    }

    /// Swap in `pagination`, keeping the anchor offset on screen.
    fn commit(&mut self, pagination: Pagination) {
        let anchor = self
            .pending_offset
            .take()
            .or_else(|| self.current_span().map(|span| span.start))
            .unwrap_or(0);

        if pagination.is_empty() {
            // Degenerate viewport; land on the anchor once a real one arrives.
            self.pending_offset = Some(anchor);
        }
        self.current_page = pagination.find_page(anchor);
        self.pagination = Some(pagination);
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Show page `index`, clamped to the last page.
    pub fn goto_page(&mut self, index: usize) {
        let Some(pagination) = self.pagination.as_ref() else {
            return;
        };
        let Some(last) = pagination.len().checked_sub(1) else {
            return;
        };
        let index = index.min(last);
        let start = pagination.pages()[index].start;
        self.current_page = index;
        self.save_position(start);
    }

    /// Show the page containing `offset`.
    pub fn goto_offset(&mut self, offset: usize) {
        let Some(pagination) = self.pagination.as_ref() else {
            return;
        };
        if pagination.is_empty() {
            return;
        }
        let index = pagination.find_page(offset);
        self.goto_page(index);
    }

    /// Advance one page; no-op on the last page.
    pub fn next_page(&mut self) {
        if self.current_page + 1 < self.page_count() {
            self.goto_page(self.current_page + 1);
        }
    }

    /// Go back one page; no-op on the first page.
    pub fn previous_page(&mut self) {
        if self.current_page > 0 && self.page_count() > 0 {
            self.goto_page(self.current_page - 1);
        }
    }

    fn save_position(&mut self, offset: usize) {
        let Some(document) = self.document.as_mut() else {
            return;
        };
        document.record.read_position = offset;
        document.record.last_read_time = time_now_secs();
        if let Err(e) = self.store.save_book(&document.key, &document.record) {
            log::warn!("could not save read position for {}: {e}", document.key);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn key(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.key.as_str())
    }

    pub fn encoding(&self) -> Option<EncodingGuess> {
        self.document.as_ref().map(|d| d.guess)
    }

    pub fn text(&self) -> Option<&DecodedText> {
        self.document.as_ref().map(|d| d.text.as_ref())
    }

    /// A shared handle to the open text, for paginating off this thread.
    pub fn shared_text(&self) -> Option<Arc<DecodedText>> {
        self.document.as_ref().map(|d| Arc::clone(&d.text))
    }

    /// Persisted read position of the open document.
    pub fn read_position(&self) -> Option<usize> {
        self.document.as_ref().map(|d| d.record.read_position)
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn page_count(&self) -> usize {
        self.pagination.as_ref().map_or(0, Pagination::len)
    }

    /// Zero-based index of the page on screen.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn current_span(&self) -> Option<PageSpan> {
        self.pagination.as_ref()?.page(self.current_page)
    }

    /// Text of the page on screen, empty when nothing is laid out.
    pub fn current_page_text(&self) -> &str {
        match (self.text(), self.current_span()) {
            (Some(text), Some(span)) => page_text(text, span),
            _ => "",
        }
    }

    /// The document outline, extracted on first use.
    pub fn outline(&self) -> Option<&Outline> {
        let document = self.document.as_ref()?;
        Some(
            document
                .outline
                .get_or_init(|| toc::extract(document.text.as_str())),
        )
    }

    /// Outline entry the current page falls under.
    pub fn current_chapter(&self) -> Option<usize> {
        let offset = self.current_span()?.start;
        self.outline()?.current_chapter(offset)
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        self.text()
            .map(|text| search::search(text.as_str(), query))
            .unwrap_or_default()
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

/// Whether `pagination` tiles a text of `length` characters.
fn covers(pagination: &Pagination, length: usize) -> bool {
    if pagination.viewport().is_degenerate() {
        return pagination.is_empty();
    }
    let pages = pagination.pages();
    match (pages.first(), pages.last()) {
        (Some(first), Some(last)) => first.start == 0 && last.end == length,
        _ => false,
    }
}
