/// Identity of the loaded encoder: which model produced the vectors and how
/// long they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub model: String,
    pub dimension: usize,
}

impl ModelInfo {
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            model: model.into(),
            dimension,
        }
    }
}
