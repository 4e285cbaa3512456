//! Model adapter integration
//!
//! Lesson generators talk to the generative model through [`ModelAdapter`]:
//! one instruction, one function declaration describing the reply shape,
//! and an optional image. The adapter answers with the single function call
//! the model produced.

pub mod gemini;
pub mod mock;
pub mod retry;

pub use gemini::GeminiModelAdapter;
pub use mock::{MockFailure, MockModelAdapter};
pub use retry::{RetryPolicy, Retrying};

use crate::media::MediaAttachment;
use crate::schema::Schema;
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// Output-shape constraint attached to a model call.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Schema,
}

impl FunctionDeclaration {
    pub fn new(name: &str, description: &str, parameters: Schema) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

/// The structured reply: the invoked function name and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Map<String, Value>,
}

#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Invoke the model once. Text-only when `media` is `None`, vision otherwise.
    async fn generate(
        &self,
        instruction: &str,
        declaration: &FunctionDeclaration,
        media: Option<&MediaAttachment>,
    ) -> Result<FunctionCall>;
}
