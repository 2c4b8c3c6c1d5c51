use std::sync::Arc;

use omnicall_directory_core::{DirectoryStore, PhoneMatcher};

use crate::config::ServerConfig;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DirectoryStore>,
    pub matcher: PhoneMatcher,
    pub caller_id: String,
    pub fallback_agent_id: String,
}

impl AppState {
    pub fn new(store: Arc<dyn DirectoryStore>, config: &ServerConfig) -> Self {
        Self {
            store,
            matcher: PhoneMatcher::new(),
            caller_id: config.caller_id.clone(),
            fallback_agent_id: config.fallback_agent_id.clone(),
        }
    }

    pub fn with_matcher(mut self, matcher: PhoneMatcher) -> Self {
        self.matcher = matcher;
        self
    }
}
