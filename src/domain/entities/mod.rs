mod embedding;
mod model;

pub use embedding::Embedding;
pub use model::ModelInfo;
