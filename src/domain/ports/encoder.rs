use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// A loaded text encoder. Both methods must run through the same model
/// instance so that vectors from different calls share one embedding space.
#[async_trait]
pub trait Encoder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    /// Encodes all `texts` in one pass and returns one vector per input, in order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn model(&self) -> &str;
    fn dimension(&self) -> usize;
}
