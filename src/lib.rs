//! Text embedding and cosine similarity over HTTP.
//!
//! A pretrained sentence encoder is loaded once at startup and shared by all
//! requests through [`api::AppState`].

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
