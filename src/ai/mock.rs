use super::{FunctionCall, FunctionDeclaration, ModelAdapter};
use crate::media::MediaAttachment;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Failure a [`MockModelAdapter`] can be scripted to return.
#[derive(Debug, Clone, Copy)]
pub enum MockFailure {
    Timeout,
    Transport,
    Upstream(u16),
    SchemaMismatch,
    InvalidSchema,
}

impl MockFailure {
    fn to_error(self) -> Error {
        match self {
            Self::Timeout => Error::Timeout,
            Self::Transport => Error::Transport("connection reset".to_string()),
            Self::Upstream(status) => Error::Upstream {
                status,
                body: "mock upstream error".to_string(),
            },
            Self::SchemaMismatch => {
                Error::SchemaMismatch("No function call found in the response".to_string())
            }
            Self::InvalidSchema => Error::InvalidSchema("mock invalid schema".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Call(FunctionCall),
    Fail(MockFailure),
}

/// A call observed by the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub instruction: String,
    pub function_name: String,
    pub media_mime_type: Option<String>,
}

/// Scripted adapter: replies are served in order and the last one repeats.
pub struct MockModelAdapter {
    replies: Arc<Mutex<Vec<MockReply>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockModelAdapter {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_call(self, name: &str, args: Value) -> Self {
        let args = match args {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        self.replies.lock().unwrap().push(MockReply::Call(FunctionCall {
            name: name.to_string(),
            args,
        }));
        self
    }

    pub fn with_failure(self, failure: MockFailure) -> Self {
        self.replies.lock().unwrap().push(MockReply::Fail(failure));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockModelAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelAdapter for MockModelAdapter {
    async fn generate(
        &self,
        instruction: &str,
        declaration: &FunctionDeclaration,
        media: Option<&MediaAttachment>,
    ) -> Result<FunctionCall> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                instruction: instruction.to_string(),
                function_name: declaration.name.clone(),
                media_mime_type: media.map(|m| m.mime_type().to_string()),
            });
            calls.len() - 1
        };

        let replies = self.replies.lock().unwrap();
        let reply = replies
            .get(index)
            .or_else(|| replies.last())
            .cloned()
            .unwrap_or(MockReply::Fail(MockFailure::SchemaMismatch));

        match reply {
            MockReply::Call(call) => Ok(call),
            MockReply::Fail(failure) => Err(failure.to_error()),
        }
    }
}
