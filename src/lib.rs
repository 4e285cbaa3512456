//! Little Language Lessons - contextual language-learning content from a generative model
//!
//! Each feature asks the model for a single structured function call (vocabulary,
//! grammar topics, a slang dialogue, or image-grounded words) and returns it as a
//! typed lesson artifact over a small JSON HTTP API.

pub mod ai;
pub mod config;
pub mod error;
pub mod lessons;
pub mod media;
pub mod models;
pub mod prompts;
pub mod ratelimit;
pub mod schema;
pub mod server;

pub use error::{Error, Result};
