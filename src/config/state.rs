// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;

use super::types::Config;
use crate::dispatch::{Dispatcher, HandlerRunner};

/// Application state
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: Config, runner: Arc<dyn HandlerRunner>) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(runner),
        }
    }
}
