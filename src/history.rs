use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::translate::interface::{Direction, LanguagePair};

pub const SHARE_TITLE: &str = "TrueText Translation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub original: String,
    pub translation: String,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
}

impl HistoryEntry {
    pub fn new(original: impl Into<String>, translation: impl Into<String>, direction: Direction) -> Self {
        Self {
            id: Uuid::new_v4(),
            original: original.into(),
            translation: translation.into(),
            timestamp: Utc::now(),
            direction,
        }
    }

    /// Text handed to the share sheet
    pub fn share_text(&self) -> String {
        format!("Original: {}\n\nTranslation: {}", self.original, self.translation)
    }

    pub fn source_lang<'a>(&self, languages: &'a LanguagePair) -> &'a str {
        languages.source_for(self.direction)
    }

    pub fn target_lang<'a>(&self, languages: &'a LanguagePair) -> &'a str {
        languages.target_for(self.direction)
    }

    pub fn relative_time(&self, now: DateTime<Utc>) -> String {
        format_relative(self.timestamp, now)
    }
}

/// "12m ago", "3h ago", "2d ago"
pub fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let minutes = elapsed.num_minutes().max(0);
    let hours = elapsed.num_hours().max(0);
    let days = elapsed.num_days().max(0);

    if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", days)
    }
}

/// In-memory translation history, newest first. Lost on restart.
pub struct HistoryStore {
    entries: RwLock<Vec<HistoryEntry>>,
    limit: usize,
}

impl HistoryStore {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            limit,
        }
    }

    pub async fn record(
        &self,
        original: impl Into<String>,
        translation: impl Into<String>,
        direction: Direction,
    ) -> HistoryEntry {
        let entry = HistoryEntry::new(original, translation, direction);
        self.insert(entry.clone()).await;
        entry
    }

    pub async fn insert(&self, entry: HistoryEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(0, entry);
        if entries.len() > self.limit {
            let dropped = entries.len() - self.limit;
            entries.truncate(self.limit);
            tracing::debug!("History limit reached, dropped {} oldest entries", dropped);
        }
    }

    pub async fn list(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<HistoryEntry> {
        self.entries.read().await.iter().find(|e| e.id == id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
