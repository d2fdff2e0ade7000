use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::{ports::Encoder, DomainError, Embedding, ModelInfo};

#[derive(Debug, Clone)]
pub struct EncodedText {
    pub embedding: Embedding,
    pub dimension: usize,
    pub text_length: usize,
}

#[derive(Debug, Clone)]
pub struct EncodedBatch {
    pub embeddings: Vec<Embedding>,
    pub count: usize,
    pub dimension: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct SimilarityScore {
    pub similarity: f64,
    pub text1_length: usize,
    pub text2_length: usize,
}

/// Validates requests and drives the shared encoder.
///
/// Single-text encoding enforces `min_text_length` on the trimmed text. Batch
/// encoding only rejects an empty list and passes short items through.
pub struct EmbeddingService {
    encoder: Arc<dyn Encoder>,
    min_text_length: usize,
    degenerate_fallback: f64,
}

impl EmbeddingService {
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self {
            encoder,
            min_text_length: 10,
            degenerate_fallback: 0.0,
        }
    }

    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length;
        self
    }

    pub fn with_degenerate_fallback(mut self, fallback: f64) -> Self {
        self.degenerate_fallback = fallback;
        self
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo::new(self.encoder.model(), self.encoder.dimension())
    }

    #[instrument(skip(self, text), fields(text_length = char_len(text)))]
    pub async fn encode_one(&self, text: &str) -> Result<EncodedText, DomainError> {
        let text_length = char_len(text);

        if char_len(text.trim()) < self.min_text_length {
            return Err(DomainError::validation(format!(
                "text too short or empty: length must be at least {} characters after trimming",
                self.min_text_length
            )));
        }

        let embedding = self.encoder.embed(text).await?;
        debug!(dimension = embedding.dimension(), "Encoded text");

        Ok(EncodedText {
            dimension: embedding.dimension(),
            embedding,
            text_length,
        })
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    pub async fn encode_batch(&self, texts: &[String]) -> Result<EncodedBatch, DomainError> {
        if texts.is_empty() {
            return Err(DomainError::validation("no text provided"));
        }

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = self.encoder.embed_batch(&refs).await?;
        if embeddings.len() != texts.len() {
            return Err(DomainError::internal(format!(
                "encoder returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        let dimension = embeddings.first().map(Embedding::dimension).unwrap_or(0);
        debug!(dimension, "Encoded batch");

        Ok(EncodedBatch {
            count: embeddings.len(),
            dimension,
            embeddings,
        })
    }

    #[instrument(skip(self, text1, text2))]
    pub async fn similarity(
        &self,
        text1: &str,
        text2: &str,
    ) -> Result<SimilarityScore, DomainError> {
        if text1.is_empty() || text2.is_empty() {
            return Err(DomainError::validation("two texts are required"));
        }

        let embeddings = self.encoder.embed_batch(&[text1, text2]).await?;
        let [a, b] = embeddings.as_slice() else {
            return Err(DomainError::internal(format!(
                "encoder returned {} embeddings for 2 texts",
                embeddings.len()
            )));
        };

        let similarity = a.cosine_similarity(b, self.degenerate_fallback)?;
        debug!(similarity, "Computed similarity");

        Ok(SimilarityScore {
            similarity,
            text1_length: char_len(text1),
            text2_length: char_len(text2),
        })
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::HashingEncoder;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and returns fixed vectors.
    struct CountingEncoder {
        single_calls: AtomicUsize,
        batch_calls: AtomicUsize,
        vector: Vec<f64>,
    }

    impl CountingEncoder {
        fn new(vector: Vec<f64>) -> Self {
            Self {
                single_calls: AtomicUsize::new(0),
                batch_calls: AtomicUsize::new(0),
                vector,
            }
        }
    }

    #[async_trait]
    impl Encoder for CountingEncoder {
        async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Embedding::new(self.vector.clone()))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|_| Embedding::new(self.vector.clone()))
                .collect())
        }

        fn model(&self) -> &str {
            "counting"
        }

        fn dimension(&self) -> usize {
            self.vector.len()
        }
    }

    struct FailingEncoder;

    #[async_trait]
    impl Encoder for FailingEncoder {
        async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
            Err(DomainError::internal("out of memory"))
        }

        async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            Err(DomainError::internal("out of memory"))
        }

        fn model(&self) -> &str {
            "failing"
        }

        fn dimension(&self) -> usize {
            0
        }
    }

    /// Returns one vector fewer than it was given.
    struct DroppingEncoder;

    #[async_trait]
    impl Encoder for DroppingEncoder {
        async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
            Ok(Embedding::new(vec![1.0, 0.0]))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            Ok(texts
                .iter()
                .skip(1)
                .map(|_| Embedding::new(vec![1.0, 0.0]))
                .collect())
        }

        fn model(&self) -> &str {
            "dropping"
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn hashing_service() -> EmbeddingService {
        EmbeddingService::new(Arc::new(HashingEncoder::new(384)))
    }

    #[tokio::test]
    async fn test_encode_one() {
        let service = hashing_service();
        let text = "Experienced backend engineer with 5 years in distributed systems.";

        let encoded = service.encode_one(text).await.unwrap();
        assert_eq!(encoded.dimension, 384);
        assert_eq!(encoded.embedding.dimension(), 384);
        assert_eq!(encoded.text_length, 65);
    }

    #[tokio::test]
    async fn test_encode_one_rejects_short_text() {
        let service = hashing_service();
        for text in ["", "short", "   padded   ", "123456789"] {
            let err = service.encode_one(text).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{text:?}");
            assert!(err.message().contains("too short"));
        }
    }

    #[tokio::test]
    async fn test_encode_one_boundary_counts_characters() {
        let service = hashing_service();
        assert!(service.encode_one("0123456789").await.is_ok());
        // 10 characters, 20 bytes
        assert!(service.encode_one("éééééééééé").await.is_ok());
        assert!(service.encode_one("  012345678  ").await.is_err());
    }

    #[tokio::test]
    async fn test_encode_one_is_deterministic() {
        let service = hashing_service();
        let text = "Distributed tracing across microservices";
        let a = service.encode_one(text).await.unwrap();
        let b = service.encode_one(text).await.unwrap();
        assert_eq!(a.embedding, b.embedding);
    }

    #[tokio::test]
    async fn test_custom_min_text_length() {
        let service = hashing_service().with_min_text_length(3);
        assert!(service.encode_one("abc").await.is_ok());
        assert!(service.encode_one("ab").await.is_err());
    }

    #[tokio::test]
    async fn test_encode_batch_single_call() {
        let encoder = Arc::new(CountingEncoder::new(vec![1.0, 0.0, 0.0]));
        let service = EmbeddingService::new(encoder.clone());
        let texts = vec!["a".to_string(), "bb".to_string(), "".to_string()];

        let batch = service.encode_batch(&texts).await.unwrap();
        assert_eq!(batch.count, 3);
        assert_eq!(batch.dimension, 3);
        assert_eq!(batch.embeddings.len(), 3);
        assert_eq!(encoder.batch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(encoder.single_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_encode_batch_rejects_empty() {
        let service = hashing_service();
        let err = service.encode_batch(&[]).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.message(), "no text provided");
    }

    #[tokio::test]
    async fn test_similarity_uses_one_batch_call() {
        let encoder = Arc::new(CountingEncoder::new(vec![0.6, 0.8]));
        let service = EmbeddingService::new(encoder.clone());

        let score = service.similarity("first", "second").await.unwrap();
        assert!((score.similarity - 1.0).abs() < 1e-12);
        assert_eq!(score.text1_length, 5);
        assert_eq!(score.text2_length, 6);
        assert_eq!(encoder.batch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(encoder.single_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_similarity_properties() {
        let service = hashing_service();
        let a = "Senior Java developer";
        let b = "Junior Python developer with cloud experience";

        let same = service.similarity(a, a).await.unwrap().similarity;
        assert!((same - 1.0).abs() < 1e-4);

        let ab = service.similarity(a, b).await.unwrap().similarity;
        let ba = service.similarity(b, a).await.unwrap().similarity;
        assert!((ab - ba).abs() < 1e-9);
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[tokio::test]
    async fn test_similarity_rejects_empty_text() {
        let service = hashing_service();
        for (t1, t2) in [("", "something"), ("something", ""), ("", "")] {
            let err = service.similarity(t1, t2).await.unwrap_err();
            assert_eq!(err.message(), "two texts are required");
        }
        // no minimum length here
        assert!(service.similarity("a", "b").await.is_ok());
    }

    #[tokio::test]
    async fn test_similarity_degenerate_fallback() {
        let encoder = Arc::new(CountingEncoder::new(vec![0.0, 0.0]));
        let service = EmbeddingService::new(encoder);
        let score = service.similarity("x", "y").await.unwrap();
        assert_eq!(score.similarity, 0.0);

        let encoder = Arc::new(CountingEncoder::new(vec![0.0, 0.0]));
        let service = EmbeddingService::new(encoder).with_degenerate_fallback(-1.0);
        let score = service.similarity("x", "y").await.unwrap();
        assert_eq!(score.similarity, -1.0);
    }

    #[tokio::test]
    async fn test_encoder_failure_is_internal() {
        let service = EmbeddingService::new(Arc::new(FailingEncoder));
        let err = service
            .encode_one("long enough text for encoding")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
        assert_eq!(err.message(), "out of memory");

        let err = service.encode_batch(&["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));

        let err = service.similarity("a", "b").await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[tokio::test]
    async fn test_short_encoder_output_is_internal() {
        let service = EmbeddingService::new(Arc::new(DroppingEncoder));

        let texts = vec!["first".to_string(), "second".to_string(), "third".to_string()];
        let err = service.encode_batch(&texts).await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
        assert_eq!(err.message(), "encoder returned 2 embeddings for 3 texts");

        let err = service.similarity("first", "second").await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
        assert_eq!(err.message(), "encoder returned 1 embeddings for 2 texts");
    }

    #[test]
    fn test_model_info() {
        let info = hashing_service().model_info();
        assert_eq!(info, ModelInfo::new("hashing", 384));
    }
}
