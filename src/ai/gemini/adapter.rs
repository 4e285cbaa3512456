//! Gemini implementation of [`ModelAdapter`].
//!
//! Text-only calls go to the text deployment; calls carrying an image go to
//! the vision deployment. Both attach the function declaration as a forced
//! tool call and check the returned arguments against its schema.

use super::client::GeminiHttpClient;
use super::types::{
    Content, FunctionCallingConfig, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, InlineData, Part, Tool, ToolConfig,
};
use crate::ai::{FunctionCall, FunctionDeclaration, ModelAdapter};
use crate::config::Config;
use crate::media::MediaAttachment;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct GeminiModelAdapter {
    text: GeminiHttpClient,
    vision: GeminiHttpClient,
    sampling: GenerationConfig,
}

impl GeminiModelAdapter {
    pub fn new(api_key: String, text_model: String, vision_model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, text_model, vision_model, timeout, reqwest::Client::new())
    }

    /// Both deployments share one connection pool.
    pub fn new_with_client(
        api_key: String,
        text_model: String,
        vision_model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            text: GeminiHttpClient::new_with_client(
                api_key.clone(),
                text_model,
                timeout,
                client.clone(),
            ),
            vision: GeminiHttpClient::new_with_client(api_key, vision_model, timeout, client),
            sampling: GenerationConfig::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_vision_model.clone(),
            config.timeout,
        )
        .with_base_url(config.gemini_base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.text = self.text.with_base_url(base_url.clone());
        self.vision = self.vision.with_base_url(base_url);
        self
    }

    fn build_request<'a>(
        &self,
        instruction: &str,
        declaration: &'a FunctionDeclaration,
        media: Option<&MediaAttachment>,
    ) -> GenerateContentRequest<'a> {
        let mut parts = vec![Part::Text {
            text: instruction.to_string(),
        }];
        if let Some(media) = media {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: media.mime_type().to_string(),
                    data: media.to_base64(),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            tools: vec![Tool {
                function_declarations: vec![declaration],
            }],
            tool_config: ToolConfig {
                function_calling_config: FunctionCallingConfig {
                    mode: "ANY".to_string(),
                    allowed_function_names: vec![declaration.name.clone()],
                },
            },
            generation_config: self.sampling,
        }
    }
}

#[async_trait]
impl ModelAdapter for GeminiModelAdapter {
    async fn generate(
        &self,
        instruction: &str,
        declaration: &FunctionDeclaration,
        media: Option<&MediaAttachment>,
    ) -> Result<FunctionCall> {
        let http = if media.is_some() {
            &self.vision
        } else {
            &self.text
        };
        tracing::debug!(
            "Calling Gemini {} for {} (media: {})",
            http.model(),
            declaration.name,
            media.map_or("none", |m| m.mime_type())
        );

        let request = self.build_request(instruction, declaration, media);
        let response: GenerateContentResponse = http.generate_content(&request).await?;

        let finish_reason = response.finish_reason().map(str::to_string);
        let call = response.first_function_call().ok_or_else(|| {
            tracing::warn!(
                "No function call found in the response (finish reason: {})",
                finish_reason.as_deref().unwrap_or("unknown")
            );
            Error::SchemaMismatch("No function call found in the response".to_string())
        })?;

        declaration.parameters.check_args(&call.args)?;

        Ok(FunctionCall {
            name: call.name,
            args: call.args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::ai::{RetryPolicy, Retrying};
    use crate::media::MediaPolicy;
    use crate::schema::Schema;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEXT_MODEL: &str = "gemini-1.5-pro";
    const VISION_MODEL: &str = "gemini-1.5-flash";

    fn make_adapter(server: &MockServer) -> GeminiModelAdapter {
        GeminiModelAdapter::new(
            "test-key".to_string(),
            TEXT_MODEL.to_string(),
            VISION_MODEL.to_string(),
            Duration::from_secs(5),
        )
        .with_base_url(server.uri())
    }

    fn detect_declaration() -> FunctionDeclaration {
        let object = Schema::object(
            [
                ("name", Schema::string()),
                (
                    "coordinates",
                    Schema::array(Schema::number()).item_bounds(4, 4).unwrap(),
                ),
            ],
            &["name", "coordinates"],
        )
        .unwrap();
        FunctionDeclaration::new(
            "detect_objects",
            "Detect objects",
            Schema::object([("objects", Schema::array(object))], &["objects"]).unwrap(),
        )
    }

    fn png() -> MediaAttachment {
        MediaPolicy::new(vec!["image/png".to_string()], 1)
            .decode("iVBORw==", "image/png")
            .unwrap()
    }

    #[tokio::test]
    async fn test_text_call_uses_text_model_and_forces_function_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
            .and(body_string_contains("\"functionDeclarations\""))
            .and(body_string_contains("\"allowedFunctionNames\":[\"detect_objects\"]"))
            .and(body_string_contains("\"mode\":\"ANY\""))
            .and(body_string_contains("\"topK\":64"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                test_support::function_call_body("detect_objects", json!({ "objects": [] })),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let call = make_adapter(&server)
            .generate("find things", &detect_declaration(), None)
            .await
            .unwrap();
        assert_eq!(call.name, "detect_objects");
        assert_eq!(call.args["objects"], json!([]));
    }

    #[tokio::test]
    async fn test_media_call_uses_vision_model_with_inline_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(body_string_contains("\"inlineData\""))
            .and(body_string_contains("\"mimeType\":\"image/png\""))
            .and(body_string_contains("\"data\":\"iVBORw==\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                test_support::function_call_body("detect_objects", json!({ "objects": [] })),
            ))
            .expect(1)
            .mount(&server)
            .await;

        make_adapter(&server)
            .generate("look", &detect_declaration(), Some(&png()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reply_without_function_call_is_schema_mismatch() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "I can't do that" }] } }]
            })))
            .mount(&server)
            .await;

        let err = make_adapter(&server)
            .generate("x", &detect_declaration(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }

    #[tokio::test]
    async fn test_first_of_several_function_calls_wins() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "parts": [
                            { "functionCall": { "name": "detect_objects", "args": { "objects": [] } } },
                            { "functionCall": { "name": "something_else", "args": {} } }
                        ]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let call = make_adapter(&server)
            .generate("x", &detect_declaration(), None)
            .await
            .unwrap();
        assert_eq!(call.name, "detect_objects");
    }

    #[tokio::test]
    async fn test_short_coordinates_are_schema_mismatch() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(
                test_support::function_call_body(
                    "detect_objects",
                    json!({ "objects": [{ "name": "cup", "coordinates": [1, 2, 3] }] }),
                ),
            ))
            .mount(&server)
            .await;

        let err = make_adapter(&server)
            .generate("x", &detect_declaration(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(msg) if msg.contains("coordinates")));
    }

    #[tokio::test]
    async fn test_upstream_status_is_reported() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let err = make_adapter(&server)
            .generate("x", &detect_declaration(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_retrying_recovers_after_two_upstream_failures() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(
                test_support::function_call_body("detect_objects", json!({ "objects": [] })),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = Retrying::new(
            make_adapter(&server),
            RetryPolicy::new(3).with_delays(Duration::from_millis(2), Duration::from_millis(10)),
        );

        let call = adapter
            .generate("x", &detect_declaration(), None)
            .await
            .unwrap();
        assert_eq!(call.name, "detect_objects");
    }

    #[tokio::test]
    async fn test_retrying_exhausts_after_three_attempts() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(3)
            .mount(&server)
            .await;

        let adapter = Retrying::new(
            make_adapter(&server),
            RetryPolicy::new(3).with_delays(Duration::from_millis(2), Duration::from_millis(10)),
        );

        let err = adapter
            .generate("x", &detect_declaration(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { status: 503, .. }));
    }
}
