use crate::observability::AppMetrics;
use crate::security::validation::RequestValidator;
use crate::services::chat::ChatService;
use std::sync::Arc;

/// Application state shared by all API handlers
#[derive(Clone)]
pub struct AppState {
    /// Chat service owning the widget sessions
    pub chat_service: Arc<dyn ChatService>,
    /// Request metrics
    pub metrics: Arc<AppMetrics>,
    /// Validator for incoming chat messages
    pub validator: Arc<RequestValidator>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("chat_service", &"Arc<dyn ChatService>")
            .field("metrics", &self.metrics)
            .field("validator", &self.validator)
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(chat_service: Box<dyn ChatService>, metrics: Arc<AppMetrics>) -> Self {
        let validator = RequestValidator::new(chat_service.settings().max_message_length);
        Self {
            chat_service: Arc::from(chat_service),
            metrics,
            validator: Arc::new(validator),
        }
    }
}
