use std::sync::Arc;

use crate::config::Config;
use crate::history::HistoryStore;
use crate::session::TranslationSession;
use crate::translate::{TranslationDispatcher, Translator};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<TranslationSession>,
    pub history: Arc<HistoryStore>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let dispatcher = Arc::new(TranslationDispatcher::new(&config.translator)?);
        Ok(Self::with_translator(config, dispatcher))
    }

    /// State around any translator implementation
    pub fn with_translator(config: Config, translator: Arc<dyn Translator>) -> Self {
        let history = Arc::new(HistoryStore::new(config.translator.history_limit));
        let session = Arc::new(TranslationSession::new(translator, history.clone()));
        Self { session, history }
    }
}
