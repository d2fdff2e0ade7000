use anyhow::{bail, Context};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::domain::{ports::Encoder, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

const WARMUP_TEXT: &str = "embedding service warm-up";

/// Model identifiers accepted in `embedding.model`, with their output size.
const SUPPORTED_MODELS: &[(&str, usize)] = &[
    ("all-MiniLM-L6-v2", 384),
    ("all-MiniLM-L12-v2", 384),
    ("bge-small-en-v1.5", 384),
    ("paraphrase-multilingual-MiniLM-L12-v2", 384),
    ("multilingual-e5-small", 384),
];

fn resolve_model(id: &str) -> anyhow::Result<EmbeddingModel> {
    let model = match id {
        "all-MiniLM-L6-v2" => EmbeddingModel::AllMiniLML6V2,
        "all-MiniLM-L12-v2" => EmbeddingModel::AllMiniLML12V2,
        "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "paraphrase-multilingual-MiniLM-L12-v2" => EmbeddingModel::ParaphraseMLMiniLML12V2,
        "multilingual-e5-small" => EmbeddingModel::MultilingualE5Small,
        other => {
            let known: Vec<&str> = SUPPORTED_MODELS.iter().map(|(name, _)| *name).collect();
            bail!("unsupported embedding model {other:?}, expected one of {known:?}")
        }
    };
    Ok(model)
}

/// A panic inside `embed` poisons the mutex without leaving the model
/// half-updated, so the guard is recovered instead of failing every later call.
fn lock_model<T>(model: &Mutex<T>) -> MutexGuard<'_, T> {
    model.lock().unwrap_or_else(|poisoned| {
        warn!("Embedding model lock was poisoned by a panicked request; recovering");
        model.clear_poison();
        poisoned.into_inner()
    })
}

fn expected_dimension(id: &str) -> Option<usize> {
    SUPPORTED_MODELS
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, dim)| *dim)
}

/// Pretrained sentence encoder running in-process on ONNX Runtime.
///
/// `TextEmbedding::embed` needs exclusive access, so every call takes the
/// mutex on the blocking pool; concurrent requests queue here.
pub struct FastEmbedEncoder {
    model: Arc<Mutex<TextEmbedding>>,
    model_id: String,
    dimension: usize,
    batch_size: Option<usize>,
}

impl FastEmbedEncoder {
    /// Loads the model synchronously and runs one warm-up encode.
    ///
    /// Fails if the model cannot be fetched or initialized, or if it produces
    /// vectors of a different length than `config.dimension`.
    pub fn load(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let model_id = config.model.clone();
        let variant = resolve_model(&model_id)?;

        if let Some(expected) = expected_dimension(&model_id) {
            if expected != config.dimension {
                bail!(
                    "model {model_id} produces {expected}-dimensional vectors but embedding.dimension is {}",
                    config.dimension
                );
            }
        }

        info!(model = %model_id, "Loading embedding model...");
        let started = Instant::now();

        let mut options =
            InitOptions::new(variant).with_show_download_progress(config.show_download_progress);
        if let Some(dir) = &config.cache_dir {
            options = options.with_cache_dir(dir.clone());
        }

        let mut model = TextEmbedding::try_new(options)
            .with_context(|| format!("Failed to initialize embedding model {model_id}"))?;

        let warmup = model
            .embed(vec![WARMUP_TEXT], None)
            .context("warm-up encode failed")?;
        let produced = warmup.first().map(Vec::len).unwrap_or(0);
        if produced != config.dimension {
            bail!(
                "model {model_id} produced {produced}-dimensional vectors, expected {}",
                config.dimension
            );
        }

        info!(
            model = %model_id,
            dimension = produced,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Embedding model ready"
        );

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_id,
            dimension: config.dimension,
            batch_size: config.batch_size,
        })
    }

    fn run(
        &self,
        texts: Vec<String>,
    ) -> impl FnOnce() -> Result<Vec<Embedding>, DomainError> + Send + 'static {
        let model = self.model.clone();
        let batch_size = self.batch_size;
        move || {
            let mut guard = lock_model(model.as_ref());
            let vectors = guard
                .embed(texts, batch_size)
                .map_err(|e| DomainError::internal(e.to_string()))?;
            Ok(vectors.into_iter().map(Embedding::from).collect())
        }
    }
}

#[async_trait]
impl Encoder for FastEmbedEncoder {
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let job = self.run(vec![text.to_string()]);
        tokio::task::spawn_blocking(job)
            .await??
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::internal("No embedding returned"))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let owned = texts.iter().map(|t| t.to_string()).collect();
        let job = self.run(owned);
        tokio::task::spawn_blocking(job).await?
    }

    fn model(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
