mod embedding;

pub use embedding::{EmbeddingService, EncodedBatch, EncodedText, SimilarityScore};
