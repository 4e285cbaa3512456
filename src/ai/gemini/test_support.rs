use wiremock::matchers::{method, path_regex};
use wiremock::MockBuilder;

pub const GENERATE_CONTENT_PATH_REGEX: &str = r"/v1beta/models/.+:generateContent";

pub fn post_path_regex(pattern: &str) -> MockBuilder {
    wiremock::Mock::given(method("POST")).and(path_regex(pattern))
}

/// A `generateContent` body whose single candidate calls `name` with `args`.
pub fn function_call_body(name: &str, args: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "functionCall": { "name": name, "args": args } }]
            },
            "finishReason": "STOP"
        }]
    })
}
