use std::sync::Arc;

use mabot_ai::{ChatEngine, GeminiModel};
use mabot_sheets::SheetsClient;
use mabot_storage::DbPool;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub engine: Arc<ChatEngine<GeminiModel>>,
    pub sheets: Arc<SheetsClient>,
    pub config: Arc<Config>,
}

impl AppState {
    /// The key for session-token digests at rest.
    pub fn secret(&self) -> &str {
        &self.config.secret_key
    }
}
