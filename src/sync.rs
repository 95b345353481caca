use crate::api::models::Conversation;
use crate::app::ConnectionConfig;
use crate::error::Result;
use std::time::Duration;

pub const SYNC_INTERVAL: Duration = Duration::from_secs(300);

/// Tracks fetch requests so only the newest response is applied.
#[derive(Debug, Default)]
pub struct ConversationSync {
    issued: u64,
    finished: u64,
    loading: bool,
}

impl ConversationSync {
    /// Issue a new generation, or `None` when the settings cannot reach the
    /// helpdesk yet.
    pub fn begin(&mut self, config: Option<&ConnectionConfig>) -> Option<u64> {
        if !config.is_some_and(ConnectionConfig::is_complete) {
            log::debug!("skipping sync: connection settings incomplete");
            return None;
        }
        self.issued += 1;
        self.loading = true;
        Some(self.issued)
    }

    /// Apply a finished fetch to `conversations`. Returns whether anything
    /// visible changed.
    pub fn finish(
        &mut self,
        generation: u64,
        result: Result<Vec<Conversation>>,
        conversations: &mut Vec<Conversation>,
    ) -> bool {
        if generation != self.issued {
            log::debug!("discarding sync #{}; #{} is newer", generation, self.issued);
            return false;
        }
        if generation == self.finished {
            log::debug!("discarding repeated result for sync #{}", generation);
            return false;
        }
        self.finished = generation;
        self.loading = false;
        match result {
            Ok(fetched) => {
                log::info!("synced {} conversations", fetched.len());
                *conversations = fetched;
            }
            Err(e) => log::error!("sync failed, keeping previous conversations: {}", e),
        }
        true
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
