//! Persisted records and the store they live in.
//!
//! The session only needs synchronous load/save with last-write-wins
//! semantics; any push-style observation belongs to the host.

use std::collections::HashMap;
use std::io;

/// Per-document reading state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct BookRecord {
    /// Charset tag from the last successful decode.
    pub encoding: String,
    pub total_chars: usize,
    /// Character offset of the last page start shown.
    pub read_position: usize,
    /// Seconds since the Unix epoch.
    pub last_read_time: u64,
}

impl Default for BookRecord {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            total_chars: 0,
            read_position: 0,
            last_read_time: 0,
        }
    }
}

/// Page background colour scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "lowercase"))]
pub enum Theme {
    #[default]
    White,
    Beige,
    Green,
    Dark,
}

/// Global reader settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct UserSettings {
    pub font_size: f32,
    pub line_spacing: f32,
    pub background_theme: Theme,
    pub eye_care_mode: bool,
    /// Screen brightness in `[0, 1]`; `None` follows the system.
    pub brightness: Option<f32>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            font_size: 18.0,
            line_spacing: 1.5,
            background_theme: Theme::White,
            eye_care_mode: false,
            brightness: None,
        }
    }
}

/// Storage collaborator injected into a reading session.
pub trait RecordStore {
    fn book(&self, key: &str) -> io::Result<Option<BookRecord>>;

    fn save_book(&mut self, key: &str, record: &BookRecord) -> io::Result<()>;

    /// Stored settings, or the defaults if none were saved.
    fn settings(&self) -> io::Result<UserSettings>;

    fn save_settings(&mut self, settings: &UserSettings) -> io::Result<()>;

    /// Add `seconds` of reading time for `key` on epoch day `day`.
    fn add_reading_time(&mut self, key: &str, day: u32, seconds: u64) -> io::Result<()>;
}

/// A [`RecordStore`] that keeps everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    books: HashMap<String, BookRecord>,
    settings: Option<UserSettings>,
    reading_time: HashMap<(String, u32), u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total seconds recorded for `key` across all days.
    pub fn total_reading_time(&self, key: &str) -> u64 {
        self.reading_time
            .iter()
            .filter(|((k, _), _)| k == key)
            .map(|(_, seconds)| seconds)
            .sum()
    }
}

impl RecordStore for MemoryStore {
    fn book(&self, key: &str) -> io::Result<Option<BookRecord>> {
        Ok(self.books.get(key).cloned())
    }

    fn save_book(&mut self, key: &str, record: &BookRecord) -> io::Result<()> {
        self.books.insert(key.to_string(), record.clone());
        Ok(())
    }

    fn settings(&self) -> io::Result<UserSettings> {
        Ok(self.settings.clone().unwrap_or_default())
    }

    fn save_settings(&mut self, settings: &UserSettings) -> io::Result<()> {
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn add_reading_time(&mut self, key: &str, day: u32, seconds: u64) -> io::Result<()> {
        *self.reading_time.entry((key.to_string(), day)).or_insert(0) += seconds;
        Ok(())
    }
}

#[cfg(feature = "cli")]
pub use json::JsonFileStore;

#[cfg(feature = "cli")]
mod json {
    use std::collections::BTreeMap;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    use serde::{Deserialize, Serialize};

    use super::{BookRecord, RecordStore, UserSettings};
    use crate::error::Result;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Snapshot {
        books: BTreeMap<String, BookRecord>,
        settings: Option<UserSettings>,
        /// Keyed by document, then by epoch day.
        reading_time: BTreeMap<String, BTreeMap<u32, u64>>,
    }

    /// A [`RecordStore`] persisted as one JSON file, rewritten on every save.
    #[derive(Debug)]
    pub struct JsonFileStore {
        path: PathBuf,
        snapshot: Snapshot,
    }

    impl JsonFileStore {
        /// Open the store at `path`, starting empty if the file is missing.
        pub fn open(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref().to_path_buf();
            let snapshot = match fs::read(&path) {
                Ok(bytes) => serde_json::from_slice(&bytes)?,
                Err(e) if e.kind() == io::ErrorKind::NotFound => Snapshot::default(),
                Err(e) => return Err(e.into()),
            };
            Ok(Self { path, snapshot })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Total seconds recorded for `key` across all days.
        pub fn total_reading_time(&self, key: &str) -> u64 {
            self.snapshot
                .reading_time
                .get(key)
                .map_or(0, |days| days.values().sum())
        }

        fn persist(&self) -> io::Result<()> {
            let json = serde_json::to_vec_pretty(&self.snapshot)?;
            fs::write(&self.path, json)
        }
    }

    impl RecordStore for JsonFileStore {
        fn book(&self, key: &str) -> io::Result<Option<BookRecord>> {
            Ok(self.snapshot.books.get(key).cloned())
        }

        fn save_book(&mut self, key: &str, record: &BookRecord) -> io::Result<()> {
            self.snapshot.books.insert(key.to_string(), record.clone());
            self.persist()
        }

        fn settings(&self) -> io::Result<UserSettings> {
            Ok(self.snapshot.settings.clone().unwrap_or_default())
        }

        fn save_settings(&mut self, settings: &UserSettings) -> io::Result<()> {
            self.snapshot.settings = Some(settings.clone());
            self.persist()
        }

        fn add_reading_time(&mut self, key: &str, day: u32, seconds: u64) -> io::Result<()> {
            *self
                .snapshot
                .reading_time
                .entry(key.to_string())
                .or_default()
                .entry(day)
                .or_insert(0) += seconds;
            self.persist()
        }
    }
}
