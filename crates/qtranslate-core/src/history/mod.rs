//! Translation history — in-memory list + JSON file persistence.
//!
//! # Disk format
//!
//! `~/.qtranslate/history.json` holds a JSON array of entries, newest first:
//! `[{"id": "...", "timestamp": "...", "sourceText": "...", "translatedText": "...", ...}]`

pub mod store;

pub use store::{HistoryEntry, HistoryStore};
