use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::AbortHandle;
use tracing::{debug, error, info};

use crate::history::{HistoryEntry, HistoryStore};
use crate::translate::error::DispatchError;
use crate::translate::interface::{Direction, LanguagePair, Translator};

/// Slot used when the caller does not name one
pub const DEFAULT_SLOT: &str = "default";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please enter text to translate")]
    EmptyInput,

    #[error("translation was cancelled or superseded by a newer request")]
    Superseded,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("internal error: {0}")]
    Internal(String),
}

struct InFlight {
    generation: u64,
    handle: AbortHandle,
}

/// Frees the slot when its dispatch settles or the caller goes away. An
/// abandoned dispatch is aborted.
struct SlotGuard<'a> {
    in_flight: &'a DashMap<String, InFlight>,
    slot: &'a str,
    generation: u64,
    handle: AbortHandle,
}

impl SlotGuard<'_> {
    /// Free the slot; false when a newer call or `cancel` took it over first
    fn release(&self) -> bool {
        let generation = self.generation;
        self.in_flight
            .remove_if(self.slot, |_, in_flight| in_flight.generation == generation)
            .is_some()
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.handle.abort();
        self.release();
    }
}

/// Caller side of the translator: validates input, keeps at most one dispatch
/// in flight per slot and records successful translations.
pub struct TranslationSession {
    translator: Arc<dyn Translator>,
    history: Arc<HistoryStore>,
    in_flight: DashMap<String, InFlight>,
    generation: AtomicU64,
}

impl TranslationSession {
    pub fn new(translator: Arc<dyn Translator>, history: Arc<HistoryStore>) -> Self {
        Self {
            translator,
            history,
            in_flight: DashMap::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn languages(&self) -> &LanguagePair {
        self.translator.languages()
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Translate `text` in `slot`. A dispatch already running in the same slot
    /// is aborted and its caller gets [`SessionError::Superseded`].
    pub async fn translate(
        &self,
        slot: &str,
        text: &str,
        direction: Direction,
    ) -> Result<HistoryEntry, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        let translator = self.translator.clone();
        let owned_text = text.to_string();
        let task = tokio::spawn(async move { translator.translate(&owned_text, direction).await });

        let current = InFlight {
            generation,
            handle: task.abort_handle(),
        };
        if let Some(previous) = self.in_flight.insert(slot.to_string(), current) {
            debug!("Aborting in-flight translation in slot {}", slot);
            previous.handle.abort();
        }

        let guard = SlotGuard {
            in_flight: &self.in_flight,
            slot,
            generation,
            handle: task.abort_handle(),
        };
        let joined = task.await;
        let still_owner = guard.release();
        drop(guard);

        let translation = match joined {
            // a result that lands after the slot was taken over is discarded
            Ok(_) if !still_owner => return Err(SessionError::Superseded),
            Ok(result) => result?,
            Err(e) if e.is_cancelled() => return Err(SessionError::Superseded),
            Err(e) => {
                error!("Translation task failed: {}", e);
                return Err(SessionError::Internal(e.to_string()));
            }
        };

        let entry = self.history.record(text, translation, direction).await;
        info!("Recorded translation {} in slot {}", entry.id, slot);
        Ok(entry)
    }

    /// Abort the dispatch running in `slot`, if any
    pub fn cancel(&self, slot: &str) -> bool {
        match self.in_flight.remove(slot) {
            Some((_, in_flight)) => {
                in_flight.handle.abort();
                debug!("Cancelled translation in slot {}", slot);
                true
            }
            None => false,
        }
    }

    pub fn is_busy(&self, slot: &str) -> bool {
        self.in_flight.contains_key(slot)
    }
}
