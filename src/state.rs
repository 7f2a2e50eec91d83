//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::webhook::WebhookDispatcher;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    dispatcher: WebhookDispatcher,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The dispatcher is constructed here, once, from the webhook section
    /// of the configuration; request handlers borrow it per call.
    pub fn new(config: Config) -> Self {
        let dispatcher = WebhookDispatcher::new(config.webhook.clone());

        Self {
            inner: Arc::new(AppStateInner { config, dispatcher }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the webhook dispatcher
    pub fn dispatcher(&self) -> &WebhookDispatcher {
        &self.inner.dispatcher
    }
}
