use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, state::AppState};
use crate::application::{EncodedBatch, EncodedText, SimilarityScore};

// Fields are optional so a missing key reaches validation and yields 400.

#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmbedBatchRequest {
    #[serde(default)]
    pub texts: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarityRequest {
    #[serde(default)]
    pub text1: Option<String>,
    #[serde(default)]
    pub text2: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub embedding: Vec<f64>,
    pub dimension: usize,
    pub text_length: usize,
}

impl From<EncodedText> for EmbedResponse {
    fn from(encoded: EncodedText) -> Self {
        Self {
            embedding: encoded.embedding.into_inner(),
            dimension: encoded.dimension,
            text_length: encoded.text_length,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmbedBatchResponse {
    pub embeddings: Vec<Vec<f64>>,
    pub count: usize,
    pub dimension: usize,
}

impl From<EncodedBatch> for EmbedBatchResponse {
    fn from(batch: EncodedBatch) -> Self {
        Self {
            embeddings: batch.embeddings.into_iter().map(|e| e.into_inner()).collect(),
            count: batch.count,
            dimension: batch.dimension,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SimilarityResponse {
    pub similarity: f64,
    pub text1_length: usize,
    pub text2_length: usize,
}

impl From<SimilarityScore> for SimilarityResponse {
    fn from(score: SimilarityScore) -> Self {
        Self {
            similarity: score.similarity,
            text1_length: score.text1_length,
            text2_length: score.text2_length,
        }
    }
}

pub async fn embed(
    State(state): State<AppState>,
    payload: Result<Json<EmbedRequest>, JsonRejection>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let Json(request) = payload?;
    let text = request.text.unwrap_or_default();

    let encoded = state.embedding_service.encode_one(&text).await?;
    tracing::info!(text_length = encoded.text_length, "Embedding generated");

    Ok(Json(EmbedResponse::from(encoded)))
}

pub async fn embed_batch(
    State(state): State<AppState>,
    payload: Result<Json<EmbedBatchRequest>, JsonRejection>,
) -> Result<Json<EmbedBatchResponse>, ApiError> {
    let Json(request) = payload?;
    let texts = request.texts.unwrap_or_default();

    let batch = state.embedding_service.encode_batch(&texts).await?;
    tracing::info!(count = batch.count, "Batch embeddings generated");

    Ok(Json(EmbedBatchResponse::from(batch)))
}

pub async fn similarity(
    State(state): State<AppState>,
    payload: Result<Json<SimilarityRequest>, JsonRejection>,
) -> Result<Json<SimilarityResponse>, ApiError> {
    let Json(request) = payload?;
    let text1 = request.text1.unwrap_or_default();
    let text2 = request.text2.unwrap_or_default();

    let score = state.embedding_service.similarity(&text1, &text2).await?;
    tracing::info!(similarity = score.similarity, "Similarity computed");

    Ok(Json(SimilarityResponse::from(score)))
}
