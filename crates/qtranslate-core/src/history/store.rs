//! History persistence and eviction.
//!
//! File format: a pretty-printed JSON array in `~/.qtranslate/history.json`,
//! newest entry first.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::utils;

// ─────────────────────────────────────────────
// HistoryEntry
// ─────────────────────────────────────────────

/// One remembered translation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source_text: String,
    pub translated_text: String,
    #[serde(default)]
    pub source_language: Option<String>,
    pub target_language: String,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl HistoryEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(
        source_text: impl Into<String>,
        translated_text: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            source_text: source_text.into(),
            translated_text: translated_text.into(),
            source_language: None,
            target_language: target_language.into(),
            provider_name: None,
            profile_id: None,
            is_favorite: false,
        }
    }

    pub fn with_provider(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    pub fn with_source_language(mut self, lang: impl Into<String>) -> Self {
        self.source_language = Some(lang.into());
        self
    }

    pub fn with_profile(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }
}

// ─────────────────────────────────────────────
// HistoryStore
// ─────────────────────────────────────────────

/// Translation history with in-memory state and JSON persistence.
///
/// Thread-safe via `RwLock`. Entries are kept newest first. Disk errors are
/// logged and never surface to callers.
pub struct HistoryStore {
    path: PathBuf,
    max_items: usize,
    entries: RwLock<Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// Open (or create) the history store.
    ///
    /// `path` defaults to `~/.qtranslate/history.json` if `None`. The parent
    /// directory is created if it doesn't exist.
    pub fn open(path: Option<PathBuf>, max_items: usize) -> std::io::Result<Self> {
        let path = path.unwrap_or_else(utils::get_history_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let entries = Self::load_from_disk(&path);
        Ok(HistoryStore {
            path,
            max_items,
            entries: RwLock::new(entries),
        })
    }

    /// Record a translation.
    ///
    /// An existing entry with the same source text and target language is
    /// refreshed in place (translation, provider, timestamp) and moved to the
    /// front. Otherwise the entry is inserted and the oldest non-favorites
    /// beyond `max_items` are evicted.
    pub fn add(&self, entry: HistoryEntry) {
        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

            let existing = entries.iter().position(|e| {
                e.source_text == entry.source_text && e.target_language == entry.target_language
            });

            match existing {
                Some(pos) => {
                    let mut current = entries.remove(pos);
                    current.translated_text = entry.translated_text;
                    current.provider_name = entry.provider_name;
                    current.timestamp = Utc::now();
                    entries.insert(0, current);
                }
                None => {
                    entries.insert(0, entry);
                    Self::evict(&mut entries, self.max_items);
                }
            }

            self.persist(&entries);
        }

        debug!("Added translation to history");
    }

    /// The `limit` most recent entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().take(limit).cloned().collect()
    }

    /// All favorite entries, newest first.
    pub fn favorites(&self) -> Vec<HistoryEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().filter(|e| e.is_favorite).cloned().collect()
    }

    /// Flip the favorite flag. Returns the new value, or `None` if the id is unknown.
    pub fn toggle_favorite(&self, id: &str) -> Option<bool> {
        let flag = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let entry = entries.iter_mut().find(|e| e.id == id)?;
            entry.is_favorite = !entry.is_favorite;
            let flag = entry.is_favorite;
            self.persist(&entries);
            flag
        };

        info!(id, favorite = flag, "Toggled history favorite");
        Some(flag)
    }

    /// Remove an entry. Returns `true` if it existed.
    pub fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let before = entries.len();
            entries.retain(|e| e.id != id);
            let removed = entries.len() != before;
            if removed {
                self.persist(&entries);
            }
            removed
        };

        if removed {
            info!(id, "Removed history entry");
        }
        removed
    }

    /// Drop every non-favorite entry. Returns the number of favorites kept.
    pub fn clear(&self) -> usize {
        let kept = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            entries.retain(|e| e.is_favorite);
            self.persist(&entries);
            entries.len()
        };

        info!(kept, "Cleared history");
        kept
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict the oldest non-favorites so that at most `max_items` entries remain,
    /// never evicting favorites.
    fn evict(entries: &mut Vec<HistoryEntry>, max_items: usize) {
        if entries.len() <= max_items {
            return;
        }
        let favorites = entries.iter().filter(|e| e.is_favorite).count();
        let mut keep_regular = max_items.saturating_sub(favorites);
        entries.retain(|e| {
            if e.is_favorite {
                true
            } else if keep_regular > 0 {
                keep_regular -= 1;
                true
            } else {
                false
            }
        });
    }

    fn load_from_disk(path: &Path) -> Vec<HistoryEntry> {
        if !path.exists() {
            return Vec::new();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read history file {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&content) {
            Ok(entries) => {
                info!("Loaded {} history items", entries.len());
                entries
            }
            Err(e) => {
                warn!("Failed to parse history file {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Write `entries` to disk. Called with the write guard held.
    fn persist(&self, entries: &[HistoryEntry]) {
        if let Err(e) = self.save_to_disk(entries) {
            warn!("Failed to persist history to {}: {}", self.path.display(), e);
        }
    }

    fn save_to_disk(&self, entries: &[HistoryEntry]) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        debug!(
            "Saved {} history items to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
