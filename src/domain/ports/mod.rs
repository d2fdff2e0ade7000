mod encoder;

pub use encoder::Encoder;
