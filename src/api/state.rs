//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::TranslationService;

/// Application state shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub translation_service: Arc<TranslationService>,
}

impl AppState {
    pub fn new(translation_service: TranslationService) -> Self {
        Self {
            translation_service: Arc::new(translation_service),
        }
    }
}
