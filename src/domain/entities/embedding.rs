use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(pub Vec<f64>);

impl Embedding {
    pub fn new(vec: Vec<f64>) -> Self {
        Self(vec)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    pub fn norm(&self) -> f64 {
        self.0.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Cosine similarity `dot(a, b) / (|a| * |b|)`.
    ///
    /// Both vectors must come from the same model, so a length mismatch is a
    /// broken invariant and is reported as an internal error. When either
    /// vector has a zero norm the ratio is undefined and `degenerate` is
    /// returned instead. The result is clamped to `[-1, 1]`.
    pub fn cosine_similarity(
        &self,
        other: &Embedding,
        degenerate: f64,
    ) -> Result<f64, DomainError> {
        if self.0.len() != other.0.len() || self.0.is_empty() {
            return Err(DomainError::internal(format!(
                "cannot compare embeddings of dimension {} and {}",
                self.0.len(),
                other.0.len()
            )));
        }

        let dot_product: f64 = self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum();
        let norm_a = self.norm();
        let norm_b = other.norm();

        if norm_a == 0.0 || norm_b == 0.0 {
            return Ok(degenerate);
        }

        let similarity = dot_product / (norm_a * norm_b);
        if !similarity.is_finite() {
            return Ok(degenerate);
        }

        Ok(similarity.clamp(-1.0, 1.0))
    }
}

impl From<Vec<f64>> for Embedding {
    fn from(vec: Vec<f64>) -> Self {
        Self(vec)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vec: Vec<f32>) -> Self {
        Self(vec.into_iter().map(f64::from).collect())
    }
}
