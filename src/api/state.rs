use std::sync::Arc;

use crate::application::EmbeddingService;
use crate::domain::ports::Encoder;
use crate::infrastructure::Config;

#[derive(Clone)]
pub struct AppState {
    pub embedding_service: Arc<EmbeddingService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the loaded encoder into the request handlers using the
    /// validation and similarity settings from `config`.
    pub fn new(encoder: Arc<dyn Encoder>, config: Config) -> Self {
        let embedding_service = EmbeddingService::new(encoder)
            .with_min_text_length(config.validation.min_text_length)
            .with_degenerate_fallback(config.similarity.degenerate_fallback);

        Self {
            embedding_service: Arc::new(embedding_service),
            config: Arc::new(config),
        }
    }
}
