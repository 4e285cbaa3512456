//! Slang-heavy dialogue between native speakers.

use super::{decode, expect_call, fail, Feature};
use crate::ai::{FunctionDeclaration, ModelAdapter};
use crate::models::{DialogueLine, LanguageContext, SlangConversation};
use crate::schema::Schema;
use crate::{prompts, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct SlangHangGenerator {
    adapter: Arc<dyn ModelAdapter>,
}

impl SlangHangGenerator {
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
        Self { adapter }
    }

    pub async fn generate(&self, languages: &LanguageContext) -> Result<SlangConversation> {
        self.try_generate(languages)
            .await
            .map_err(|e| fail(Feature::SlangHang, e))
    }

    async fn try_generate(&self, languages: &LanguageContext) -> Result<SlangConversation> {
        let declaration = declaration()?;
        let instruction = prompts::render(
            prompts::SLANG_HANG,
            &[
                ("source_language", languages.source_language.as_str()),
                ("target_language", languages.target_language.as_str()),
            ],
        );

        let call = self.adapter.generate(&instruction, &declaration, None).await?;
        let args = expect_call(&call, Feature::SlangHang)?;
        Ok(decode_conversation(args))
    }
}

fn declaration() -> Result<FunctionDeclaration> {
    let line = Schema::object(
        [
            ("speaker", Schema::string().describe("The name of the speaker")),
            (
                "message",
                Schema::string()
                    .describe("The spoken message containing slang or idiomatic expressions"),
            ),
            (
                "notes",
                Schema::string().describe("Notes explaining the slang or idioms used"),
            ),
        ],
        &["speaker", "message", "notes"],
    )?;

    let parameters = Schema::object(
        [
            (
                "context",
                Schema::string().describe("The conversational context or setting"),
            ),
            (
                "dialogue",
                Schema::array(line)
                    .describe("The dialogue between speakers with slang expressions"),
            ),
        ],
        &["context", "dialogue"],
    )?;

    Ok(FunctionDeclaration::new(
        Feature::SlangHang.function_name(),
        "Generate a conversation that includes slang and idiomatic expressions",
        parameters,
    ))
}

fn decode_conversation(args: &Map<String, Value>) -> SlangConversation {
    SlangConversation {
        context: decode::text(args, "context"),
        dialogue: decode::objects(args, "dialogue")
            .map(|line| DialogueLine {
                speaker: decode::text(line, "speaker"),
                message: decode::text(line, "message"),
                notes: decode::text(line, "notes"),
            })
            .collect(),
    }
}
