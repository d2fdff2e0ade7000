pub mod config;
pub mod embedding;

pub use config::{Config, EmbeddingConfig, EncoderProvider};
pub use embedding::{create_encoder, FastEmbedEncoder, HashingEncoder};
