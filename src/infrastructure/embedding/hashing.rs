use async_trait::async_trait;

use crate::domain::{ports::Encoder, DomainError, Embedding};

/// Deterministic encoder that needs no model weights.
///
/// Each lowercase alphanumeric token is hashed (FNV-1a) into a signed bucket
/// and the resulting bag-of-words vector is L2-normalized, so texts sharing
/// vocabulary score higher. Text with no tokens maps to the zero vector.
pub struct HashingEncoder {
    model: String,
    dimension: usize,
}

impl HashingEncoder {
    pub const MODEL_ID: &'static str = "hashing";

    pub fn new(dimension: usize) -> Self {
        Self {
            model: Self::MODEL_ID.to_string(),
            dimension,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn encode(&self, text: &str) -> Embedding {
        let mut vec = vec![0.0f64; self.dimension];
        if self.dimension == 0 {
            return Embedding::new(vec);
        }

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign;
        }

        let norm = vec.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            vec.iter_mut().for_each(|x| *x /= norm);
        }
        Embedding::new(vec)
    }
}

fn fnv1a(token: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    token
        .bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

#[async_trait]
impl Encoder for HashingEncoder {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        Ok(self.encode(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts.iter().map(|t| self.encode(t)).collect())
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
