mod hashing;
mod local;

use std::sync::Arc;
use tracing::warn;

pub use hashing::HashingEncoder;
pub use local::FastEmbedEncoder;

use crate::domain::ports::Encoder;
use crate::infrastructure::config::{EmbeddingConfig, EncoderProvider};

/// Builds the process-wide encoder. Blocks until the model is loaded.
pub fn create_encoder(config: &EmbeddingConfig) -> anyhow::Result<Arc<dyn Encoder>> {
    match config.provider {
        EncoderProvider::Fastembed => Ok(Arc::new(FastEmbedEncoder::load(config)?)),
        EncoderProvider::Hashing => {
            warn!("Using hashing encoder; vectors carry no semantic meaning");
            Ok(Arc::new(HashingEncoder::new(config.dimension)))
        }
    }
}
