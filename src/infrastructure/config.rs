use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub embedding: EmbeddingConfig,
    pub validation: ValidationConfig,
    pub similarity: SimilarityConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body; larger requests get 413.
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderProvider {
    /// ONNX sentence-transformer loaded through fastembed.
    Fastembed,
    /// Model-free token hashing, for development and tests.
    Hashing,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EncoderProvider,
    pub model: String,
    pub dimension: usize,
    pub cache_dir: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub show_download_progress: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum number of characters in a trimmed text for single encoding.
    pub min_text_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Score reported when either embedding has a zero norm.
    pub degenerate_fallback: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5002,
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EncoderProvider::Fastembed,
            model: "all-MiniLM-L6-v2".to_string(),
            dimension: 384,
            cache_dir: None,
            batch_size: None,
            show_download_progress: false,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { min_text_length: 10 }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            degenerate_fallback: 0.0,
        }
    }
}

impl Config {
    /// Defaults, then the YAML file named by `EMBEDDING_CONFIG` (or
    /// `config.yaml` when present), then environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var("EMBEDDING_CONFIG").ok();
        let path = explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else if explicit.is_some() {
            bail!("config file {path} does not exist");
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(host) = var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("SERVER_PORT") {
            self.server.port = port.parse().context("SERVER_PORT must be a port number")?;
        }
        if let Some(limit) = var("MAX_BODY_BYTES") {
            self.server.max_body_bytes = limit
                .parse()
                .context("MAX_BODY_BYTES must be a positive integer")?;
        }
        if let Some(provider) = var("EMBEDDING_PROVIDER") {
            self.embedding.provider = match provider.to_ascii_lowercase().as_str() {
                "fastembed" => EncoderProvider::Fastembed,
                "hashing" => EncoderProvider::Hashing,
                other => bail!("unknown EMBEDDING_PROVIDER {other:?}"),
            };
        }
        if let Some(model) = var("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(dimension) = var("EMBEDDING_DIMENSION") {
            self.embedding.dimension = dimension
                .parse()
                .context("EMBEDDING_DIMENSION must be a positive integer")?;
        }
        if let Some(dir) = var("EMBEDDING_CACHE_DIR") {
            self.embedding.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(min) = var("MIN_TEXT_LENGTH") {
            self.validation.min_text_length =
                min.parse().context("MIN_TEXT_LENGTH must be an integer")?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_body_bytes == 0 {
            bail!("server.max_body_bytes must be greater than zero");
        }
        if self.embedding.dimension == 0 {
            bail!("embedding.dimension must be greater than zero");
        }
        if self.embedding.model.trim().is_empty() {
            bail!("embedding.model must not be empty");
        }
        if self.embedding.batch_size == Some(0) {
            bail!("embedding.batch_size must be greater than zero");
        }
        if !self.similarity.degenerate_fallback.is_finite() {
            bail!("similarity.degenerate_fallback must be a finite number");
        }
        Ok(())
    }
}
