//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete
//! encoders, so the real model and test doubles are interchangeable.

pub mod services;

pub use services::{EmbeddingService, EncodedBatch, EncodedText, SimilarityScore};
