//! Reading-time accumulation.
//!
//! The clock only adds up elapsed whole seconds; the host owns the periodic
//! timer that calls [`ReadingClock::tick`] and [`ReadingClock::flush`].

use std::io;
use std::time::{Duration, Instant};

use super::store::RecordStore;
use crate::util::epoch_day;

#[derive(Debug, Default)]
pub struct ReadingClock {
    book: Option<String>,
    running_since: Option<Instant>,
    accumulated: Duration,
}

impl ReadingClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(&self) -> Option<&str> {
        self.book.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Time counted but not yet flushed.
    pub fn pending(&self) -> Duration {
        self.accumulated
    }

    /// Switch to another document, flushing time counted for the previous one.
    ///
    /// A running clock is ticked up to `now` first and keeps running for the
    /// new document from `now`.
    pub fn set_book<S: RecordStore + ?Sized>(
        &mut self,
        key: &str,
        now: Instant,
        store: &mut S,
    ) -> io::Result<()> {
        if self.book.as_deref() == Some(key) {
            return Ok(());
        }
        let running = self.is_running();
        if running {
            self.tick(now);
        }
        self.flush(store)?;
        self.book = Some(key.to_string());
        self.accumulated = Duration::ZERO;
        if running {
            self.running_since = Some(now);
        }
        Ok(())
    }

    /// Start counting. Ignored without a book or when already running.
    pub fn start(&mut self, now: Instant) {
        if self.book.is_some() && self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Fold the whole seconds elapsed since the last tick into the total.
    pub fn tick(&mut self, now: Instant) {
        let Some(since) = self.running_since else {
            return;
        };
        let whole = Duration::from_secs(now.saturating_duration_since(since).as_secs());
        if !whole.is_zero() {
            self.accumulated += whole;
            self.running_since = Some(since + whole);
        }
    }

    /// Stop counting and flush.
    pub fn pause<S: RecordStore + ?Sized>(&mut self, now: Instant, store: &mut S) -> io::Result<()> {
        if self.running_since.is_none() {
            return Ok(());
        }
        self.tick(now);
        self.running_since = None;
        self.flush(store)
    }

    /// Write accumulated seconds to the store under today's date.
    pub fn flush<S: RecordStore + ?Sized>(&mut self, store: &mut S) -> io::Result<()> {
        let seconds = self.accumulated.as_secs();
        let Some(book) = self.book.as_deref() else {
            return Ok(());
        };
        if seconds == 0 {
            return Ok(());
        }
        store.add_reading_time(book, epoch_day(), seconds)?;
        self.accumulated = Duration::ZERO;
        Ok(())
    }
}
